//! Parsed shape definitions and geometric hit testing.

use crate::basics::{PointD, WindingRule};
use crate::bounding_rect::BoundingRect;
use crate::fill_style::{FillStyle, LineStyle};
use crate::log_once;
use crate::path::{curve_crossings, Path};
use crate::trans_affine::TransAffine;

/// Grid the query point is snapped to before testing, per twip.
const HIT_SNAP: f64 = 2000.0;

/// Outline of a shape plus the styles its paths index into.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    pub paths: Vec<Path>,
    pub fill_styles: Vec<FillStyle>,
    pub line_styles: Vec<LineStyle>,
    pub bounds: BoundingRect,
    /// Bounds without stroke padding; DefineShape4 only.
    pub edge_bounds: Option<BoundingRect>,
    pub winding_rule: WindingRule,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounds(&self) -> &BoundingRect {
        &self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(Path::is_empty)
    }

    pub fn line_style(&self, path: &Path) -> Option<&LineStyle> {
        path.line.checked_sub(1).and_then(|i| self.line_styles.get(i as usize))
    }

    /// Union of the path extents, each padded by half its stroke width.
    pub fn compute_bounds(&self) -> BoundingRect {
        let mut r = BoundingRect::null();
        for path in &self.paths {
            let radius = self
                .line_style(path)
                .map_or(0, |ls| (ls.width / 2) as i32);
            path.expand_bounds(&mut r, radius);
        }
        r
    }

    /// Runs of paths that share one style scope. A run starts at every
    /// path flagged `new_shape`.
    pub fn subshapes(&self) -> impl Iterator<Item = &[Path]> + '_ {
        let mut rest: &[Path] = &self.paths;
        std::iter::from_fn(move || {
            if rest.is_empty() {
                return None;
            }
            let len = rest
                .iter()
                .skip(1)
                .position(|p| p.new_shape)
                .map_or(rest.len(), |i| i + 1);
            let (head, tail) = rest.split_at(len);
            rest = tail;
            Some(head)
        })
    }

    /// True when (x, y), in shape twips, hits a fill or a stroke. `world`
    /// is the shape's placement, used to size non-scaling strokes.
    pub fn point_test_local(&self, x: f64, y: f64, world: &TransAffine) -> bool {
        self.point_test_local_with_rule(x, y, world, self.winding_rule)
    }

    pub fn point_test_local_with_rule(
        &self,
        x: f64,
        y: f64,
        world: &TransAffine,
        rule: WindingRule,
    ) -> bool {
        let x = snap(x);
        let y = snap(y);
        if !self.bounds.point_within(x, y) {
            return false;
        }

        let pt = PointD::new(x, y);
        let mut counter = 0i32;
        for path in &self.paths {
            if path.new_shape {
                if rule.is_inside(counter) {
                    return true;
                }
                counter = 0;
            }

            if let Some(ls) = self.line_style(path) {
                let radius = self.stroke_radius(ls, world);
                if path.within_square_distance(pt, radius * radius) {
                    return true;
                }
            }

            if path.fill0 == 0 && path.fill1 == 0 {
                continue;
            }
            let mut apply = |dir: i32| {
                if path.fill0 != 0 {
                    counter += dir;
                }
                if path.fill1 != 0 {
                    counter -= dir;
                }
            };

            for (start, e) in path.segments() {
                let l = start.to_f64();
                let a = e.ap.to_f64();
                if e.is_straight() {
                    if l.y == a.y {
                        continue;
                    }
                    if (l.y <= y && a.y > y) || (l.y > y && a.y <= y) {
                        let cross = l.x + (a.x - l.x) * (y - l.y) / (a.y - l.y);
                        if cross <= x {
                            apply(if l.y > a.y { -1 } else { 1 });
                        }
                    }
                } else {
                    let crossings = curve_crossings(l, e.cp.to_f64(), a, y);
                    let dir1 = if l.y > y { -1 } else { 1 };
                    for (i, &cross) in crossings.as_slice().iter().enumerate() {
                        if cross <= x {
                            apply(if i == 0 { dir1 } else { -dir1 });
                        }
                    }
                }
            }
        }
        rule.is_inside(counter)
    }

    /// Hit tolerance of a stroke, in shape twips.
    fn stroke_radius(&self, ls: &LineStyle, world: &TransAffine) -> f64 {
        if ls.is_hairline() {
            return 1.0;
        }
        let mut thickness = ls.width as f64;
        if !ls.scale_horizontally && !ls.scale_vertically {
            let inv = world.inverted();
            thickness *= inv.x_scale().max(inv.y_scale());
        } else if ls.is_non_scaling() {
            log_once::unimplemented("strokes scaling along one axis only");
        }
        thickness / 2.0
    }
}

#[inline]
fn snap(c: f64) -> f64 {
    ((c * HIT_SNAP).round() + 0.5) / HIT_SNAP
}
