//! Path/edge outline model.
//!
//! A [`Path`] is an origin point followed by straight or quadratic edges,
//! all in twips, plus the fill and line style indices that apply to it.
//! SWF paths are not closed individually: the left (`fill0`) and right
//! (`fill1`) fills of every edge together describe the filled regions.

use crate::basics::{PointD, PointI};
use crate::bounding_rect::BoundingRect;
use crate::curves::Curve3Div;
use crate::trans_affine::TransAffine;

// ============================================================================
// Edge
// ============================================================================

/// Straight when `cp == ap`, otherwise a quadratic Bezier from the previous
/// anchor through `cp` to `ap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub cp: PointI,
    pub ap: PointI,
}

impl Edge {
    pub fn straight(x: i32, y: i32) -> Self {
        let p = PointI::new(x, y);
        Self { cp: p, ap: p }
    }

    pub fn curve(cx: i32, cy: i32, ax: i32, ay: i32) -> Self {
        Self {
            cp: PointI::new(cx, cy),
            ap: PointI::new(ax, ay),
        }
    }

    #[inline]
    pub fn is_straight(&self) -> bool {
        self.cp == self.ap
    }

    /// Point at parameter `t` on the quadratic (a, c, b).
    pub fn point_on_curve(a: PointD, c: PointD, b: PointD, t: f64) -> PointD {
        if t == 0.0 {
            return a;
        }
        if t == 1.0 {
            return b;
        }
        let mt = 1.0 - t;
        PointD::new(
            mt * mt * a.x + 2.0 * mt * t * c.x + t * t * b.x,
            mt * mt * a.y + 2.0 * mt * t * c.y + t * t * b.y,
        )
    }

    /// Squared distance from `p` to the segment (a, b).
    pub fn square_distance_pt_seg(p: PointD, a: PointD, b: PointD) -> f64 {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return p.square_distance(a);
        }
        let u = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
        if u <= 0.0 {
            p.square_distance(a)
        } else if u >= 1.0 {
            p.square_distance(b)
        } else {
            p.square_distance(PointD::new(a.x + u * dx, a.y + u * dy))
        }
    }
}

// ============================================================================
// Curve crossings
// ============================================================================

/// X coordinates where a quadratic crosses a horizontal line, in order of
/// increasing curve parameter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Crossings {
    count: usize,
    x: [f64; 2],
}

impl Crossings {
    fn push(&mut self, x: f64) {
        self.x[self.count] = x;
        self.count += 1;
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.x[..self.count]
    }
}

/// Solve the Y component of the quadratic (`a` start, `c` control, `b`
/// anchor) for `y` and return the X of every root with t in [0, 1).
pub fn curve_crossings(a: PointD, c: PointD, b: PointD, y: f64) -> Crossings {
    // A*t^2 + B*t + C = 0
    let qa = a.y + b.y - 2.0 * c.y;
    let qb = 2.0 * (c.y - a.y);
    let qc = a.y - y;

    let mut roots = [0.0f64; 2];
    let nroots = if qa == 0.0 {
        if qb == 0.0 {
            0
        } else {
            roots[0] = -qc / qb;
            1
        }
    } else {
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            0
        } else {
            let sq = disc.sqrt();
            let t1 = (-qb - sq) / (2.0 * qa);
            let t2 = (-qb + sq) / (2.0 * qa);
            roots[0] = t1.min(t2);
            roots[1] = t1.max(t2);
            2
        }
    };

    let mut out = Crossings::default();
    for &t in &roots[..nroots] {
        if (0.0..1.0).contains(&t) {
            out.push((a.x - 2.0 * c.x + b.x) * t * t + 2.0 * (c.x - a.x) * t + a.x);
        }
    }
    out
}

/// Tight bounds of a quadratic, including its interior extremum.
pub fn quadratic_bounds(a: PointD, c: PointD, b: PointD) -> (PointD, PointD) {
    let mut min = PointD::new(a.x.min(b.x), a.y.min(b.y));
    let mut max = PointD::new(a.x.max(b.x), a.y.max(b.y));

    if c.x < min.x || c.x > max.x {
        let t = ((a.x - c.x) / (a.x - 2.0 * c.x + b.x)).clamp(0.0, 1.0);
        let q = Edge::point_on_curve(a, c, b, t).x;
        min.x = min.x.min(q);
        max.x = max.x.max(q);
    }
    if c.y < min.y || c.y > max.y {
        let t = ((a.y - c.y) / (a.y - 2.0 * c.y + b.y)).clamp(0.0, 1.0);
        let q = Edge::point_on_curve(a, c, b, t).y;
        min.y = min.y.min(q);
        max.y = max.y.max(q);
    }
    (min, max)
}

// ============================================================================
// Path
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    /// Origin (start point) of the first edge.
    pub ap: PointI,
    pub edges: Vec<Edge>,
    /// Left fill style, 1-based; 0 = none.
    pub fill0: u32,
    /// Right fill style, 1-based; 0 = none.
    pub fill1: u32,
    /// Line style, 1-based; 0 = none.
    pub line: u32,
    /// First path of a new subshape.
    pub new_shape: bool,
}

impl Path {
    pub fn new(x: i32, y: i32, fill0: u32, fill1: u32, line: u32, new_shape: bool) -> Self {
        Self {
            ap: PointI::new(x, y),
            edges: Vec::new(),
            fill0,
            fill1,
            line,
            new_shape,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn line_to(&mut self, x: i32, y: i32) {
        self.edges.push(Edge::straight(x, y));
    }

    pub fn curve_to(&mut self, cx: i32, cy: i32, ax: i32, ay: i32) {
        self.edges.push(Edge::curve(cx, cy, ax, ay));
    }

    /// Start point of every edge paired with the edge.
    pub fn segments(&self) -> impl Iterator<Item = (PointI, &Edge)> + '_ {
        let starts = std::iter::once(self.ap).chain(self.edges.iter().map(|e| e.ap));
        starts.zip(self.edges.iter())
    }

    /// True when `p` lies within `sqdist` (squared) of the outline. Curves
    /// are approximated by a 10-segment polyline.
    pub fn within_square_distance(&self, p: PointD, sqdist: f64) -> bool {
        for (start, e) in self.segments() {
            let a = start.to_f64();
            let b = e.ap.to_f64();
            if e.is_straight() {
                if Edge::square_distance_pt_seg(p, a, b) <= sqdist {
                    return true;
                }
            } else {
                let c = e.cp.to_f64();
                let mut prev = a;
                for i in 1..=10 {
                    let q = Edge::point_on_curve(a, c, b, i as f64 / 10.0);
                    if Edge::square_distance_pt_seg(p, prev, q) <= sqdist {
                        return true;
                    }
                    prev = q;
                }
            }
        }
        false
    }

    /// Grow `r` by this path's extent, padded by `radius` twips on every
    /// side. Paths without edges contribute nothing.
    pub fn expand_bounds(&self, r: &mut BoundingRect, radius: i32) {
        if self.is_empty() {
            return;
        }
        r.expand_to_circle(self.ap.x, self.ap.y, radius);
        for (start, e) in self.segments() {
            if e.is_straight() {
                r.expand_to_circle(e.ap.x, e.ap.y, radius);
            } else {
                let (min, max) = quadratic_bounds(start.to_f64(), e.cp.to_f64(), e.ap.to_f64());
                r.expand_to_circle(min.x.floor() as i32, min.y.floor() as i32, radius);
                r.expand_to_circle(max.x.ceil() as i32, max.y.ceil() as i32, radius);
            }
        }
    }

    /// Device-space polyline of this path: the transformed origin followed
    /// by one vertex per straight edge and a flattened run per curve.
    pub fn flatten(&self, mtx: &TransAffine, curve: &Curve3Div, out: &mut Vec<PointD>) {
        out.clear();
        if self.is_empty() {
            return;
        }
        let xf = |p: PointI| {
            let (mut x, mut y) = (p.x as f64, p.y as f64);
            mtx.transform(&mut x, &mut y);
            PointD::new(x, y)
        };
        let mut last = xf(self.ap);
        out.push(last);
        for e in &self.edges {
            let ap = xf(e.ap);
            if e.is_straight() {
                out.push(ap);
            } else {
                curve.flatten(last, xf(e.cp), ap, out);
            }
            last = ap;
        }
    }
}
