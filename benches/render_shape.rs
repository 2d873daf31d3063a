use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use swf_raster::color::{ColorTransform, Rgba8};
use swf_raster::fill_style::{
    FillStyle, Gradient, GradientRecord, InterpolationMode, LineStyle, SpreadMode,
};
use swf_raster::path::Path;
use swf_raster::render_context::RenderContext;
use swf_raster::renderer_scanline::render_shape;
use swf_raster::rendering_buffer::RenderingBuffer;
use swf_raster::shape::Shape;
use swf_raster::trans_affine::TransAffine;

/// A star of curved spikes around (2560, 2560) twips.
fn star(spikes: i32) -> Shape {
    let (cx, cy) = (2560.0, 2560.0);
    let at = |i: i32, r: f64| {
        let a = i as f64 * std::f64::consts::PI / spikes as f64;
        ((cx + a.cos() * r).round() as i32, (cy + a.sin() * r).round() as i32)
    };
    let (x0, y0) = at(0, 2400.0);
    let mut path = Path::new(x0, y0, 1, 0, 1, false);
    for i in 0..spikes {
        let (c, a) = (at(2 * i + 1, 600.0), at(2 * i + 2, 2400.0));
        path.curve_to(c.0, c.1, a.0, a.1);
    }
    let mut gm = TransAffine::new_scaling(5120.0 / 32768.0, 5120.0 / 32768.0);
    gm.multiply(&TransAffine::new_translation(cx, cy));
    let gradient = Gradient::new(
        gm,
        SpreadMode::Reflect,
        InterpolationMode::Normal,
        vec![
            GradientRecord {
                ratio: 0,
                color: Rgba8::new_opaque(255, 200, 0),
            },
            GradientRecord {
                ratio: 255,
                color: Rgba8::new(160, 0, 40, 200),
            },
        ],
    );
    let mut shape = Shape {
        paths: vec![path],
        fill_styles: vec![FillStyle::RadialGradient(gradient)],
        line_styles: vec![LineStyle::new(40, Rgba8::BLACK)],
        ..Shape::default()
    };
    shape.bounds = shape.compute_bounds();
    shape
}

fn criterion_benchmark(c: &mut Criterion) {
    let ctx = RenderContext::default();
    let mtx = TransAffine::new_scaling(0.05, 0.05);
    let mut group = c.benchmark_group("render_shape");
    for &spikes in &[5, 50] {
        let shape = star(spikes);
        group.bench_with_input(BenchmarkId::new("star", spikes), &shape, |b, shape| {
            let mut buf = RenderingBuffer::new(256, 256);
            b.iter(|| {
                render_shape(
                    &mut buf,
                    black_box(shape),
                    &mtx,
                    &ColorTransform::IDENTITY,
                    &ctx,
                )
            });
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
