mod common;

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use common::{stream, BitWriter};
use swf_raster::basics::WindingRule;
use swf_raster::bounding_rect::BoundingRect;
use swf_raster::color::{ColorTransform, Rgba8};
use swf_raster::fill_style::FillStyle;
use swf_raster::path::Path;
use swf_raster::render_context::RenderContext;
use swf_raster::renderer_scanline::render_shape;
use swf_raster::rendering_buffer::RenderingBuffer;
use swf_raster::shape::Shape;
use swf_raster::trans_affine::TransAffine;

#[quickcheck]
fn bit_fields_read_back(fields: Vec<(u32, u8)>) -> bool {
    let fields: Vec<(u32, u32)> = fields
        .into_iter()
        .map(|(v, n)| {
            let n = (n % 32) as u32 + 1;
            (v & (u32::MAX >> (32 - n)), n)
        })
        .collect();
    let mut w = BitWriter::new();
    for &(v, n) in &fields {
        w.write_bits(v, n);
    }
    let mut s = stream(w.into_bytes());
    fields
        .iter()
        .all(|&(v, n)| s.read_uint(n).map_or(false, |r| r == v))
}

fn polygon_shape(pts: &[(i32, i32)]) -> Shape {
    let mut path = Path::new(pts[0].0, pts[0].1, 1, 0, 0, false);
    for &(x, y) in &pts[1..] {
        path.line_to(x, y);
    }
    path.line_to(pts[0].0, pts[0].1);
    let mut shape = Shape {
        paths: vec![path],
        fill_styles: vec![FillStyle::Solid(Rgba8::BLACK)],
        ..Shape::default()
    };
    shape.bounds = shape.compute_bounds();
    shape
}

/// Signed crossing count of a ray from (x, y) towards -x.
fn reference_winding(pts: &[(i32, i32)], x: f64, y: f64) -> i32 {
    let mut w = 0;
    for i in 0..pts.len() {
        let (x0, y0) = (pts[i].0 as f64, pts[i].1 as f64);
        let (x1, y1) = {
            let q = pts[(i + 1) % pts.len()];
            (q.0 as f64, q.1 as f64)
        };
        if (y0 <= y) != (y1 <= y) {
            let cx = x0 + (x1 - x0) * (y - y0) / (y1 - y0);
            if cx <= x {
                w += if y1 > y0 { 1 } else { -1 };
            }
        }
    }
    w
}

#[quickcheck]
fn hit_test_matches_reference_winding(pts: Vec<(i8, i8)>, qx: i8, qy: i8) -> TestResult {
    if pts.len() < 3 {
        return TestResult::discard();
    }
    let pts: Vec<(i32, i32)> = pts
        .iter()
        .take(8)
        .map(|&(x, y)| (x as i32 * 10, y as i32 * 10))
        .collect();
    let shape = polygon_shape(&pts);
    // Off the integer grid so the query never lies on a vertex row.
    let x = qx as f64 * 10.0 + 0.37;
    let y = qy as f64 * 10.0 + 0.53;
    // The hit tester snaps queries to a 1/2000 twip grid.
    let snap = |c: f64| ((c * 2000.0).round() + 0.5) / 2000.0;
    let w = reference_winding(&pts, snap(x), snap(y));
    let id = TransAffine::new();
    let even_odd = shape.point_test_local_with_rule(x, y, &id, WindingRule::EvenOdd);
    let non_zero = shape.point_test_local_with_rule(x, y, &id, WindingRule::NonZero);
    TestResult::from_bool(even_odd == (w % 2 != 0) && non_zero == (w != 0))
}

#[quickcheck]
fn shared_edge_leaves_no_seam(split: u8) -> bool {
    // Red on [0, s), blue on [s, 400) with s anywhere inside.
    let s = 40 + split as i32;
    let mut left = Path::new(s, 0, 1, 0, 0, false);
    left.line_to(0, 0);
    left.line_to(0, 100);
    left.line_to(s, 100);
    let mut right = Path::new(s, 0, 0, 2, 0, false);
    right.line_to(400, 0);
    right.line_to(400, 100);
    right.line_to(s, 100);
    let mut middle = Path::new(s, 0, 2, 1, 0, false);
    middle.line_to(s, 100);
    let shape = Shape {
        paths: vec![left, right, middle],
        fill_styles: vec![
            FillStyle::Solid(Rgba8::new_opaque(255, 0, 0)),
            FillStyle::Solid(Rgba8::new_opaque(0, 0, 255)),
        ],
        bounds: BoundingRect::new(0, 0, 400, 100),
        ..Shape::default()
    };
    let mut buf = RenderingBuffer::new(20, 5);
    render_shape(
        &mut buf,
        &shape,
        &TransAffine::new_scaling(0.05, 0.05),
        &ColorTransform::IDENTITY,
        &RenderContext::default(),
    );
    (0..20).all(|x| buf.pixel(x, 2).a >= 250)
}
