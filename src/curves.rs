//! Quadratic Bezier flattening.
//!
//! SWF curves are quadratic only. They are flattened by recursive de
//! Casteljau subdivision, stopping once the control point lies within the
//! distance tolerance of the chord.

use crate::basics::PointD;

const CURVE_COLLINEARITY_EPSILON: f64 = 1e-30;
const CURVE_RECURSION_LIMIT: u32 = 16;

/// Adaptive quadratic curve flattener.
#[derive(Debug, Clone)]
pub struct Curve3Div {
    approximation_scale: f64,
    distance_tolerance_square: f64,
}

impl Curve3Div {
    pub fn new() -> Self {
        let mut c = Self {
            approximation_scale: 1.0,
            distance_tolerance_square: 0.0,
        };
        c.set_approximation_scale(1.0);
        c
    }

    /// Larger scales produce more segments. A scale of 1.0 keeps the
    /// flattening error around half a unit of the output space.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approximation_scale = if s > 0.0 { s } else { 1.0 };
        let tolerance = 0.5 / self.approximation_scale;
        self.distance_tolerance_square = tolerance * tolerance;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.approximation_scale
    }

    /// Append the points of the curve (p1, p2, p3) to `out`, excluding
    /// `p1` and ending exactly on `p3`.
    pub fn flatten(&self, p1: PointD, p2: PointD, p3: PointD, out: &mut Vec<PointD>) {
        self.recursive_bezier(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y, 0, out);
        out.push(p3);
    }

    #[allow(clippy::too_many_arguments)]
    fn recursive_bezier(
        &self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
        level: u32,
        out: &mut Vec<PointD>,
    ) {
        if level > CURVE_RECURSION_LIMIT {
            return;
        }

        let x12 = (x1 + x2) / 2.0;
        let y12 = (y1 + y2) / 2.0;
        let x23 = (x2 + x3) / 2.0;
        let y23 = (y2 + y3) / 2.0;
        let x123 = (x12 + x23) / 2.0;
        let y123 = (y12 + y23) / 2.0;

        let dx = x3 - x1;
        let dy = y3 - y1;
        let d = ((x2 - x3) * dy - (y2 - y3) * dx).abs();

        if d > CURVE_COLLINEARITY_EPSILON {
            if d * d <= self.distance_tolerance_square * (dx * dx + dy * dy) {
                out.push(PointD::new(x123, y123));
                return;
            }
        } else {
            // Collinear: only a control point outside the chord needs a
            // vertex of its own.
            let da = dx * dx + dy * dy;
            let p2 = PointD::new(x2, y2);
            let d_val = if da == 0.0 {
                p2.square_distance(PointD::new(x1, y1))
            } else {
                let t = ((x2 - x1) * dx + (y2 - y1) * dy) / da;
                if t > 0.0 && t < 1.0 {
                    return;
                }
                if t <= 0.0 {
                    p2.square_distance(PointD::new(x1, y1))
                } else {
                    p2.square_distance(PointD::new(x3, y3))
                }
            };
            if d_val < self.distance_tolerance_square {
                out.push(p2);
                return;
            }
        }

        self.recursive_bezier(x1, y1, x12, y12, x123, y123, level + 1, out);
        self.recursive_bezier(x123, y123, x23, y23, x3, y3, level + 1, out);
    }
}

impl Default for Curve3Div {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_curve(p1: PointD, p2: PointD, p3: PointD, t: f64) -> PointD {
        let mt = 1.0 - t;
        PointD::new(
            mt * mt * p1.x + 2.0 * mt * t * p2.x + t * t * p3.x,
            mt * mt * p1.y + 2.0 * mt * t * p2.y + t * t * p3.y,
        )
    }

    #[test]
    fn test_ends_on_anchor() {
        let c = Curve3Div::new();
        let mut out = Vec::new();
        let (a, b, e) = (
            PointD::new(0.0, 0.0),
            PointD::new(50.0, 100.0),
            PointD::new(100.0, 0.0),
        );
        c.flatten(a, b, e, &mut out);
        assert!(out.len() > 4);
        assert_eq!(*out.last().unwrap(), e);
    }

    #[test]
    fn test_vertices_stay_near_curve() {
        let c = Curve3Div::new();
        let (a, b, e) = (
            PointD::new(0.0, 0.0),
            PointD::new(200.0, 300.0),
            PointD::new(400.0, 0.0),
        );
        let mut out = Vec::new();
        c.flatten(a, b, e, &mut out);
        // Every emitted vertex lies close to some point on the curve.
        for p in &out {
            let best = (0..=1000)
                .map(|i| on_curve(a, b, e, i as f64 / 1000.0).square_distance(*p))
                .fold(f64::MAX, f64::min);
            assert!(best < 1.0, "vertex {:?} is {} away", p, best.sqrt());
        }
    }

    #[test]
    fn test_scale_controls_density() {
        let (a, b, e) = (
            PointD::new(0.0, 0.0),
            PointD::new(50.0, 80.0),
            PointD::new(100.0, 0.0),
        );
        let mut coarse = Vec::new();
        Curve3Div::new().flatten(a, b, e, &mut coarse);
        let mut fine_c = Curve3Div::new();
        fine_c.set_approximation_scale(10.0);
        let mut fine = Vec::new();
        fine_c.flatten(a, b, e, &mut fine);
        assert!(fine.len() > coarse.len());
    }

    #[test]
    fn test_degenerate_curve() {
        let p = PointD::new(5.0, 5.0);
        let mut out = Vec::new();
        Curve3Div::new().flatten(p, p, p, &mut out);
        assert_eq!(*out.last().unwrap(), p);
    }
}
