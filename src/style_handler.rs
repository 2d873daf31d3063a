//! Fill styles resolved for one render pass.
//!
//! `resolve` turns a parsed `FillStyle` into something the fill engine can
//! paint with: a solid color, or a span generator positioned in device
//! space. `StyleHandler` holds the resolved styles of one shape and answers
//! the fill engine's per-style questions through `StyleSource`.

use std::sync::Arc;

use crate::bitmap::BitmapInfo;
use crate::color::{ColorTransform, Rgba8};
use crate::fill_style::{FillStyle, Gradient, LineStyle, EMPTY_BITMAP_ID};
use crate::log_once;
use crate::render_context::RenderContext;
use crate::renderer_scanline::SpanGenerator;
use crate::shape::Shape;
use crate::span_gradient::{
    GradientRadialD, GradientRadialFocus, GradientShape, GradientX, SpanGradient,
};
use crate::span_image_filter_rgba::SpanBitmap;
use crate::trans_affine::TransAffine;

/// Focal points on or past the rim are pulled in to this ratio.
const MAX_FOCAL_RATIO: f64 = 0.99;

// ============================================================================
// StyleSource
// ============================================================================

/// Style lookup used by the compound fill engine. Style indices are
/// 0-based.
pub trait StyleSource {
    fn is_solid(&self, style: u32) -> bool;

    /// Color of a solid style, straight alpha.
    fn color(&self, style: u32) -> Rgba8;

    /// Fill `span` with the colors of a non-solid style for the pixels
    /// starting at (x, y), straight alpha.
    fn generate_span(&mut self, span: &mut [Rgba8], x: i32, y: i32, style: u32);
}

// ============================================================================
// ResolvedStyle
// ============================================================================

pub enum ResolvedStyle {
    Solid(Rgba8),
    Gradient(SpanGradient),
    Bitmap(SpanBitmap),
}

impl ResolvedStyle {
    pub fn is_solid(&self) -> bool {
        matches!(self, ResolvedStyle::Solid(_))
    }

    /// The solid color, or transparent for span styles.
    pub fn color(&self) -> Rgba8 {
        match self {
            ResolvedStyle::Solid(c) => *c,
            _ => Rgba8::TRANSPARENT,
        }
    }
}

impl SpanGenerator for ResolvedStyle {
    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32) {
        match self {
            ResolvedStyle::Solid(c) => span.iter_mut().for_each(|p| *p = *c),
            ResolvedStyle::Gradient(g) => g.generate(span, x, y),
            ResolvedStyle::Bitmap(b) => b.generate(span, x, y),
        }
    }
}

/// Resolve `style` for a render where `matrix` maps shape twips to device
/// pixels.
pub fn resolve(
    style: &FillStyle,
    matrix: &TransAffine,
    cxform: &ColorTransform,
    ctx: &RenderContext,
) -> ResolvedStyle {
    match style {
        FillStyle::Solid(c) => ResolvedStyle::Solid(cxform.transform(*c)),
        FillStyle::LinearGradient(g) => {
            // Gradient square -16384..16384 onto 0..256.
            let mut mtx = device_to_gradient(g, matrix);
            mtx.multiply(&TransAffine::new_scaling(1.0 / 128.0, 1.0 / 128.0));
            mtx.multiply(&TransAffine::new_translation(128.0, 128.0));
            gradient_style(g, mtx, GradientShape::Linear(GradientX), 256.0, cxform)
        }
        FillStyle::RadialGradient(g) => {
            // Gradient square onto a circle of radius 32 around the origin.
            let mut mtx = device_to_gradient(g, matrix);
            mtx.multiply(&TransAffine::new_scaling(1.0 / 512.0, 1.0 / 512.0));
            gradient_style(g, mtx, GradientShape::Radial(GradientRadialD), 32.0, cxform)
        }
        FillStyle::FocalGradient {
            gradient,
            focal_point,
        } => {
            let mut fp = *focal_point;
            if !(fp.abs() < 1.0) {
                log_once::unimplemented("focal points on the gradient rim");
                fp = if fp < 0.0 {
                    -MAX_FOCAL_RATIO
                } else {
                    MAX_FOCAL_RATIO
                };
            }
            let mut mtx = device_to_gradient(gradient, matrix);
            mtx.multiply(&TransAffine::new_scaling(1.0 / 512.0, 1.0 / 512.0));
            let focus = GradientRadialFocus::new(32.0, fp * 32.0, 0.0);
            gradient_style(gradient, mtx, GradientShape::Focal(focus), 32.0, cxform)
        }
        FillStyle::Bitmap {
            bitmap,
            bitmap_id,
            matrix: bitmap_matrix,
            repeat,
            smooth,
        } => {
            let info = bitmap.clone().or_else(|| lookup_bitmap(*bitmap_id, ctx));
            match info {
                Some(info) => {
                    let mut to_device = *bitmap_matrix;
                    to_device.multiply(matrix);
                    ResolvedStyle::Bitmap(SpanBitmap::new(
                        to_device.inverted(),
                        info,
                        *repeat,
                        ctx.config.bitmap_smoothing.apply(*smooth),
                        *cxform,
                    ))
                }
                None => ResolvedStyle::Solid(Rgba8::TRANSPARENT),
            }
        }
    }
}

fn device_to_gradient(g: &Gradient, matrix: &TransAffine) -> TransAffine {
    let mut to_device = g.matrix;
    to_device.multiply(matrix);
    to_device.inverted()
}

fn gradient_style(
    g: &Gradient,
    mtx: TransAffine,
    shape: GradientShape,
    d2: f64,
    cxform: &ColorTransform,
) -> ResolvedStyle {
    let lut = g.lut();
    let lut = if cxform.is_identity() {
        lut
    } else {
        Arc::new(lut.transformed(cxform))
    };
    ResolvedStyle::Gradient(SpanGradient::new(mtx, shape, g.spread, lut, 0.0, d2))
}

fn lookup_bitmap(id: u16, ctx: &RenderContext) -> Option<Arc<BitmapInfo>> {
    if id == EMPTY_BITMAP_ID {
        return None;
    }
    match ctx.bitmap_resolver() {
        None => {
            log_once::unimplemented("bitmap fills without a bitmap resolver");
            None
        }
        Some(resolver) => {
            let found = resolver.bitmap(id);
            if found.is_none() {
                log::warn!("bitmap fill references unknown bitmap {}", id);
            }
            found
        }
    }
}

// ============================================================================
// StyleHandler
// ============================================================================

/// Resolved fill styles of one shape followed by the colors of its line
/// styles. Line style `n` (1-based) is style `line_base() + n - 1`.
pub struct StyleHandler {
    styles: Vec<ResolvedStyle>,
    line_base: u32,
}

impl StyleHandler {
    pub fn new(
        shape: &Shape,
        matrix: &TransAffine,
        cxform: &ColorTransform,
        ctx: &RenderContext,
    ) -> Self {
        let mut styles: Vec<ResolvedStyle> = shape
            .fill_styles
            .iter()
            .map(|s| resolve(s, matrix, cxform, ctx))
            .collect();
        let line_base = styles.len() as u32;
        styles.extend(
            shape
                .line_styles
                .iter()
                .map(|ls: &LineStyle| ResolvedStyle::Solid(cxform.transform(ls.color))),
        );
        Self { styles, line_base }
    }

    pub fn line_base(&self) -> u32 {
        self.line_base
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn get(&self, style: u32) -> Option<&ResolvedStyle> {
        self.styles.get(style as usize)
    }
}

impl StyleSource for StyleHandler {
    fn is_solid(&self, style: u32) -> bool {
        self.get(style).map_or(true, ResolvedStyle::is_solid)
    }

    fn color(&self, style: u32) -> Rgba8 {
        self.get(style).map_or(Rgba8::TRANSPARENT, ResolvedStyle::color)
    }

    fn generate_span(&mut self, span: &mut [Rgba8], x: i32, y: i32, style: u32) {
        match self.styles.get_mut(style as usize) {
            Some(s) => s.generate(span, x, y),
            None => span.iter_mut().for_each(|p| *p = Rgba8::TRANSPARENT),
        }
    }
}

// ============================================================================
// MaskStyleHandler
// ============================================================================

/// Paints every style opaque white, for rendering clip masks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaskStyleHandler;

impl StyleSource for MaskStyleHandler {
    fn is_solid(&self, _style: u32) -> bool {
        true
    }

    fn color(&self, _style: u32) -> Rgba8 {
        Rgba8::WHITE
    }

    fn generate_span(&mut self, _span: &mut [Rgba8], _x: i32, _y: i32, _style: u32) {
        panic!("generate_span called on a mask style; mask styles are always solid");
    }
}
