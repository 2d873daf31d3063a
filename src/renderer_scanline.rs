//! Scanline fill engine.
//!
//! `render_scanlines_compound` drains a compound rasterizer into a pixel
//! format, asking a `StyleSource` for colors. `render_shape` drives the
//! whole pipeline for one shape: per subshape, fills first, then strokes.

use crate::basics::{twips_to_pixels, WindingRule, COVER_FULL};
use crate::color::{ColorTransform, Rgba8};
use crate::curves::Curve3Div;
use crate::fill_style::{JoinStyle, LineStyle};
use crate::gamma::GammaPower;
use crate::log_once;
use crate::math_stroke::MathStroke;
use crate::path::Path;
use crate::pixfmt_rgba::{PixelFormat, PixfmtRgba32Pre};
use crate::rasterizer_compound_aa::RasterizerCompoundAa;
use crate::render_context::{RenderConfig, RenderContext};
use crate::rendering_buffer::RenderingBuffer;
use crate::scanline_u::{Scanline, ScanlineU8};
use crate::shape::Shape;
use crate::style_handler::{MaskStyleHandler, StyleHandler, StyleSource};
use crate::trans_affine::TransAffine;

// ============================================================================
// SpanGenerator trait
// ============================================================================

/// Produces the colors of a horizontal run of pixels, straight alpha.
pub trait SpanGenerator {
    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32);
}

// ============================================================================
// render_scanlines_compound
// ============================================================================

/// Render every scanline of `ras`. Rows where only one style is active are
/// blended straight into `ren`. Rows with several styles are first mixed
/// in a buffer where earlier styles claim coverage first, so the total
/// coverage of a pixel never exceeds full.
pub fn render_scanlines_compound<PF, SH>(
    ras: &mut RasterizerCompoundAa,
    sl: &mut ScanlineU8,
    ren: &mut PF,
    sh: &mut SH,
) where
    PF: PixelFormat,
    SH: StyleSource + ?Sized,
{
    if !ras.rewind_scanlines() {
        return;
    }

    let min_x = ras.min_x();
    let len = (ras.max_x() - min_x + 2) as usize;
    sl.reset(min_x, ras.max_x());

    let mut color_span = vec![Rgba8::TRANSPARENT; len];
    let mut mix_buffer = vec![Rgba8::TRANSPARENT; len];
    let mut cover_buffer = vec![0u32; len];

    loop {
        let num_styles = ras.sweep_styles();
        if num_styles == 0 {
            break;
        }

        if num_styles == 1 {
            if ras.sweep_scanline(sl, 0) {
                let style = ras.style(0);
                let y = sl.y();
                if sh.is_solid(style) {
                    let c = sh.color(style);
                    for span in sl.spans() {
                        ren.blend_solid_hspan(span.x, y, c, sl.covers(span));
                    }
                } else {
                    for span in sl.spans() {
                        let colors = &mut color_span[..span.len as usize];
                        sh.generate_span(colors, span.x, y, style);
                        premultiply(colors);
                        ren.blend_color_hspan(span.x, y, colors, sl.covers(span), COVER_FULL);
                    }
                }
            }
            continue;
        }

        let sl_start = ras.scanline_start();
        let sl_len = ras.scanline_length() as usize;
        if sl_len == 0 {
            continue;
        }
        let off = (sl_start - min_x) as usize;
        mix_buffer[off..off + sl_len].fill(Rgba8::TRANSPARENT);
        cover_buffer[off..off + sl_len].fill(0);

        let mut sl_y = None;
        for i in 0..num_styles {
            let style = ras.style(i);
            if !ras.sweep_scanline(sl, i) {
                continue;
            }
            let y = sl.y();
            sl_y = Some(y);
            let solid = sh.is_solid(style);
            let solid_color = sh.color(style).premultiplied();
            for span in sl.spans() {
                let base = (span.x - min_x) as usize;
                let n = span.len as usize;
                if !solid {
                    sh.generate_span(&mut color_span[..n], span.x, y, style);
                }
                for (k, &cover) in sl.covers(span).iter().enumerate() {
                    let c = if solid {
                        solid_color
                    } else {
                        color_span[k].premultiplied()
                    };
                    mix_pixel(&mut mix_buffer[base + k], &mut cover_buffer[base + k], c, cover);
                }
            }
        }
        if let Some(y) = sl_y {
            ren.blend_color_hspan(sl_start, y, &mix_buffer[off..off + sl_len], &[], COVER_FULL);
        }
    }
}

#[inline]
fn mix_pixel(dst: &mut Rgba8, claimed: &mut u32, c: Rgba8, cover: u8) {
    let full = COVER_FULL as u32;
    let mut cover = cover as u32;
    if *claimed + cover > full {
        cover = full - *claimed;
    }
    if cover > 0 {
        dst.add(&c, cover);
        *claimed += cover;
    }
}

fn premultiply(span: &mut [Rgba8]) {
    for c in span {
        *c = c.premultiplied();
    }
}

// ============================================================================
// Shape rendering
// ============================================================================

/// Render `shape` into `buf`. `matrix` maps shape twips to device pixels.
pub fn render_shape(
    buf: &mut RenderingBuffer,
    shape: &Shape,
    matrix: &TransAffine,
    cxform: &ColorTransform,
    ctx: &RenderContext,
) {
    if cxform.is_invisible() || shape.is_empty() {
        return;
    }
    let mut handler = StyleHandler::new(shape, matrix, cxform, ctx);
    let line_base = handler.line_base();
    let mut pf = PixfmtRgba32Pre::new(buf);
    render_paths(&mut pf, shape, matrix, &mut handler, line_base, &ctx.config);
}

/// Render the coverage of `shape` as opaque white, for use as a clip mask.
pub fn render_shape_mask(
    buf: &mut RenderingBuffer,
    shape: &Shape,
    matrix: &TransAffine,
    ctx: &RenderContext,
) {
    if shape.is_empty() {
        return;
    }
    let line_base = shape.fill_styles.len() as u32;
    let mut pf = PixfmtRgba32Pre::new(buf);
    render_paths(&mut pf, shape, matrix, &mut MaskStyleHandler, line_base, &ctx.config);
}

fn render_paths<PF: PixelFormat, SH: StyleSource>(
    pf: &mut PF,
    shape: &Shape,
    matrix: &TransAffine,
    sh: &mut SH,
    line_base: u32,
    config: &RenderConfig,
) {
    let mut ras = RasterizerCompoundAa::new();
    ras.clip_box(0.0, 0.0, pf.width() as f64, pf.height() as f64);
    ras.gamma(&GammaPower::new(config.gamma));
    let mut sl = ScanlineU8::new();
    let mut curve = Curve3Div::new();
    curve.set_approximation_scale(0.5 / config.curve_tolerance.max(1e-3));
    let mut points = Vec::new();
    let mut polygons = Vec::new();

    for subshape in shape.subshapes() {
        ras.reset();
        ras.winding_rule(shape.winding_rule);
        for path in subshape.iter().filter(|p| p.fill0 != 0 || p.fill1 != 0) {
            path.flatten(matrix, &curve, &mut points);
            ras.styles(path.fill0 as i32 - 1, path.fill1 as i32 - 1);
            ras.add_polyline(&points);
        }
        render_scanlines_compound(&mut ras, &mut sl, pf, sh);

        ras.winding_rule(WindingRule::NonZero);
        for path in subshape {
            let ls = match shape.line_style(path) {
                Some(ls) => ls,
                None => continue,
            };
            path.flatten(matrix, &curve, &mut points);
            polygons.clear();
            let stroke = stroker(ls, matrix, config);
            stroke.stroke_polyline(&points, is_closed(path, ls), &mut polygons);

            ras.reset();
            ras.styles((line_base + path.line - 1) as i32, -1);
            for poly in &polygons {
                ras.add_polyline(poly);
                ras.close_polygon();
            }
            render_scanlines_compound(&mut ras, &mut sl, pf, sh);
        }
    }
}

fn is_closed(path: &Path, ls: &LineStyle) -> bool {
    !ls.no_close && path.edges.last().map_or(false, |e| e.ap == path.ap)
}

fn stroker(ls: &LineStyle, matrix: &TransAffine, config: &RenderConfig) -> MathStroke {
    let width = if ls.is_hairline() {
        config.hairline_width
    } else {
        let w = ls.width as f64;
        let device = if !ls.scale_horizontally && !ls.scale_vertically {
            twips_to_pixels(w)
        } else {
            if ls.is_non_scaling() {
                log_once::unimplemented("strokes scaling along one axis only");
            }
            w * matrix.scale_factor()
        };
        device.max(config.hairline_width)
    };
    if ls.join != JoinStyle::Round {
        log_once::unimplemented("bevel and miter stroke joins");
    }
    let mut stroke = MathStroke::new(width);
    stroke.set_caps(ls.start_cap, ls.end_cap);
    stroke.set_approximation_scale(0.5 / config.curve_tolerance.max(1e-3));
    stroke
}
