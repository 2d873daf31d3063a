//! Stroke outlines.
//!
//! A stroke is turned into a set of closed polygons that together cover
//! it: one quad per segment, a disc on every joint, and a cap at each open
//! end. All polygons share one orientation, so filling them with the
//! nonzero rule unions them without seams or double coverage.

use std::f64::consts::PI;

use crate::basics::PointD;
use crate::fill_style::CapStyle;

const MIN_DISC_STEPS: usize = 8;

#[derive(Debug, Clone)]
pub struct MathStroke {
    half_width: f64,
    approx_scale: f64,
    start_cap: CapStyle,
    end_cap: CapStyle,
}

impl MathStroke {
    /// `width` is the full stroke width in output units.
    pub fn new(width: f64) -> Self {
        Self {
            half_width: (width * 0.5).abs(),
            approx_scale: 1.0,
            start_cap: CapStyle::Round,
            end_cap: CapStyle::Round,
        }
    }

    pub fn set_caps(&mut self, start: CapStyle, end: CapStyle) {
        self.start_cap = start;
        self.end_cap = end;
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        if s > 0.0 {
            self.approx_scale = s;
        }
    }

    pub fn width(&self) -> f64 {
        self.half_width * 2.0
    }

    /// Append the polygons covering the stroke of `points` to `out`. A
    /// closed polyline gets a joint at its first point instead of caps.
    pub fn stroke_polyline(&self, points: &[PointD], closed: bool, out: &mut Vec<Vec<PointD>>) {
        if points.is_empty() || self.half_width <= 0.0 {
            return;
        }
        let mut pts: Vec<PointD> = Vec::with_capacity(points.len());
        for &p in points {
            if pts.last() != Some(&p) {
                pts.push(p);
            }
        }

        if pts.len() == 1 {
            // Zero length: only the caps show.
            let p = pts[0];
            match self.start_cap {
                CapStyle::Round => out.push(self.disc(p)),
                CapStyle::Square => out.push(self.quad(
                    PointD::new(p.x - self.half_width, p.y),
                    PointD::new(p.x + self.half_width, p.y),
                )),
                CapStyle::None => {}
            }
            return;
        }

        let last = pts.len() - 2;
        for (i, seg) in pts.windows(2).enumerate() {
            let (mut a, mut b) = (seg[0], seg[1]);
            if !closed && i == 0 && self.start_cap == CapStyle::Square {
                a = self.extend(b, a);
            }
            if !closed && i == last && self.end_cap == CapStyle::Square {
                b = self.extend(a, b);
            }
            out.push(self.quad(a, b));
        }

        let n = pts.len();
        for (i, &p) in pts.iter().enumerate() {
            let cap = if closed {
                CapStyle::Round
            } else if i == 0 {
                self.start_cap
            } else if i == n - 1 {
                self.end_cap
            } else {
                CapStyle::Round
            };
            if cap == CapStyle::Round {
                out.push(self.disc(p));
            }
        }
    }

    /// `to` moved half a width further away from `from`.
    fn extend(&self, from: PointD, to: PointD) -> PointD {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len = (dx * dx + dy * dy).sqrt();
        PointD::new(
            to.x + dx / len * self.half_width,
            to.y + dy / len * self.half_width,
        )
    }

    fn quad(&self, a: PointD, b: PointD) -> Vec<PointD> {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        let nx = -dy / len * self.half_width;
        let ny = dx / len * self.half_width;
        vec![
            PointD::new(a.x + nx, a.y + ny),
            PointD::new(b.x + nx, b.y + ny),
            PointD::new(b.x - nx, b.y - ny),
            PointD::new(a.x - nx, a.y - ny),
        ]
    }

    /// Circle around `c`, wound the same way as `quad`.
    fn disc(&self, c: PointD) -> Vec<PointD> {
        let w = self.half_width;
        let da = (w / (w + 0.125 / self.approx_scale)).acos() * 2.0;
        let steps = ((2.0 * PI / da).ceil() as usize).max(MIN_DISC_STEPS);
        (0..steps)
            .map(|i| {
                let a = -2.0 * PI * i as f64 / steps as f64;
                PointD::new(c.x + a.cos() * w, c.y + a.sin() * w)
            })
            .collect()
    }
}
