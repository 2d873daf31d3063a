//! Bitmap fill span generation.
//!
//! `SpanBitmap` samples a bitmap through the inverse fill matrix. Pixel
//! layout, edge handling and filtering are chosen per span from a table of
//! monomorphized samplers: {Rgb24, Rgba32} x {clamp, repeat} x {nearest,
//! bilinear}.

use std::sync::Arc;

use crate::bitmap::{BitmapFormat, BitmapInfo};
use crate::color::{ColorTransform, Rgba8};
use crate::image_accessors::{
    ImageAccessorClamp, ImageAccessorRepeat, ImageSource, Rgb24, Rgba32,
};
use crate::renderer_scanline::SpanGenerator;
use crate::span_interpolator_linear::{SpanInterpolatorLinear, SUBPIXEL_SHIFT};
use crate::trans_affine::TransAffine;

pub const IMAGE_SUBPIXEL_SHIFT: u32 = SUBPIXEL_SHIFT;
pub const IMAGE_SUBPIXEL_SCALE: i32 = 1 << IMAGE_SUBPIXEL_SHIFT;
pub const IMAGE_SUBPIXEL_MASK: i32 = IMAGE_SUBPIXEL_SCALE - 1;

// ============================================================================
// Filters
// ============================================================================

/// Nearest neighbor.
pub fn span_filter_nn<S: ImageSource>(
    interpolator: &mut SpanInterpolatorLinear,
    mut source: S,
    span: &mut [Rgba8],
) {
    for pixel in span.iter_mut() {
        let (x_hr, y_hr) = interpolator.coordinates();
        *pixel = source.pixel(x_hr >> IMAGE_SUBPIXEL_SHIFT, y_hr >> IMAGE_SUBPIXEL_SHIFT);
        interpolator.next();
    }
}

/// 2x2 weighted blend. Weights apply to premultiplied samples so that
/// transparent texels do not bleed their color into the result.
pub fn span_filter_bilinear<S: ImageSource>(
    interpolator: &mut SpanInterpolatorLinear,
    mut source: S,
    span: &mut [Rgba8],
) {
    let subpix = IMAGE_SUBPIXEL_SCALE;
    let half = (subpix * subpix / 2) as u32;
    for pixel in span.iter_mut() {
        let (mut x_hr, mut y_hr) = interpolator.coordinates();
        x_hr -= subpix / 2;
        y_hr -= subpix / 2;
        let x_lr = x_hr >> IMAGE_SUBPIXEL_SHIFT;
        let y_lr = y_hr >> IMAGE_SUBPIXEL_SHIFT;
        let x_frac = x_hr & IMAGE_SUBPIXEL_MASK;
        let y_frac = y_hr & IMAGE_SUBPIXEL_MASK;

        let taps = [
            (x_lr, y_lr, (subpix - x_frac) * (subpix - y_frac)),
            (x_lr + 1, y_lr, x_frac * (subpix - y_frac)),
            (x_lr, y_lr + 1, (subpix - x_frac) * y_frac),
            (x_lr + 1, y_lr + 1, x_frac * y_frac),
        ];
        let mut fg = [half; 4];
        for &(tx, ty, weight) in &taps {
            let p = source.pixel(tx, ty).premultiplied();
            let w = weight as u32;
            fg[0] += w * p.r as u32;
            fg[1] += w * p.g as u32;
            fg[2] += w * p.b as u32;
            fg[3] += w * p.a as u32;
        }
        let shift = IMAGE_SUBPIXEL_SHIFT * 2;
        let a = (fg[3] >> shift).min(255) as u8;
        let c = Rgba8::new(
            (fg[0] >> shift).min(a as u32) as u8,
            (fg[1] >> shift).min(a as u32) as u8,
            (fg[2] >> shift).min(a as u32) as u8,
            a,
        );
        *pixel = c.demultiplied();
        interpolator.next();
    }
}

// ============================================================================
// SpanBitmap
// ============================================================================

/// Bitmap span generator for one fill in one render pass.
pub struct SpanBitmap {
    interpolator: SpanInterpolatorLinear,
    bitmap: Arc<BitmapInfo>,
    repeat: bool,
    smooth: bool,
    cxform: ColorTransform,
}

impl SpanBitmap {
    /// `device_to_bitmap` maps device pixels to bitmap pixels.
    pub fn new(
        device_to_bitmap: TransAffine,
        bitmap: Arc<BitmapInfo>,
        repeat: bool,
        smooth: bool,
        cxform: ColorTransform,
    ) -> Self {
        Self {
            interpolator: SpanInterpolatorLinear::new(device_to_bitmap),
            bitmap,
            repeat,
            smooth,
            cxform,
        }
    }

    pub fn bitmap(&self) -> &Arc<BitmapInfo> {
        &self.bitmap
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    pub fn is_smooth(&self) -> bool {
        self.smooth
    }
}

impl SpanGenerator for SpanBitmap {
    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32) {
        self.interpolator
            .begin(x as f64 + 0.5, y as f64 + 0.5, span.len() as u32);
        let it = &mut self.interpolator;
        let img: &BitmapInfo = &self.bitmap;
        match (img.format, self.repeat, self.smooth) {
            (BitmapFormat::Rgb24, false, false) => {
                span_filter_nn(it, ImageAccessorClamp::<Rgb24>::new(img), span)
            }
            (BitmapFormat::Rgb24, false, true) => {
                span_filter_bilinear(it, ImageAccessorClamp::<Rgb24>::new(img), span)
            }
            (BitmapFormat::Rgb24, true, false) => {
                span_filter_nn(it, ImageAccessorRepeat::<Rgb24>::new(img), span)
            }
            (BitmapFormat::Rgb24, true, true) => {
                span_filter_bilinear(it, ImageAccessorRepeat::<Rgb24>::new(img), span)
            }
            (BitmapFormat::Rgba32, false, false) => {
                span_filter_nn(it, ImageAccessorClamp::<Rgba32>::new(img), span)
            }
            (BitmapFormat::Rgba32, false, true) => {
                span_filter_bilinear(it, ImageAccessorClamp::<Rgba32>::new(img), span)
            }
            (BitmapFormat::Rgba32, true, false) => {
                span_filter_nn(it, ImageAccessorRepeat::<Rgba32>::new(img), span)
            }
            (BitmapFormat::Rgba32, true, true) => {
                span_filter_bilinear(it, ImageAccessorRepeat::<Rgba32>::new(img), span)
            }
        }
        if !self.cxform.is_identity() {
            self.cxform.transform_span(span);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba8 = Rgba8::new_opaque(255, 0, 0);
    const GREEN: Rgba8 = Rgba8::new_opaque(0, 255, 0);

    // 2x1: red | green
    fn strip() -> Arc<BitmapInfo> {
        Arc::new(
            BitmapInfo::new(2, 1, BitmapFormat::Rgb24, vec![255, 0, 0, 0, 255, 0]).unwrap(),
        )
    }

    fn sample(repeat: bool, smooth: bool, x: i32, len: usize) -> Vec<Rgba8> {
        let mut g = SpanBitmap::new(
            TransAffine::new(),
            strip(),
            repeat,
            smooth,
            ColorTransform::IDENTITY,
        );
        let mut span = vec![Rgba8::TRANSPARENT; len];
        g.generate(&mut span, x, 0);
        span
    }

    #[test]
    fn test_clamp_extends_edges() {
        assert_eq!(sample(false, false, -3, 2), vec![RED, RED]);
        assert_eq!(sample(false, false, 0, 5), vec![RED, GREEN, GREEN, GREEN, GREEN]);
    }

    #[test]
    fn test_repeat_tiles() {
        assert_eq!(sample(true, false, 0, 5), vec![RED, GREEN, RED, GREEN, RED]);
        assert_eq!(sample(true, false, -1, 2), vec![GREEN, RED]);
    }

    #[test]
    fn test_bilinear_on_texel_centers() {
        // Pixel centers land on texel centers, so no blending happens.
        assert_eq!(sample(false, true, 0, 2), vec![RED, GREEN]);
    }

    #[test]
    fn test_bilinear_blends_between_texels() {
        let mut g = SpanBitmap::new(
            TransAffine::new_translation(0.5, 0.0),
            strip(),
            false,
            true,
            ColorTransform::IDENTITY,
        );
        let mut span = vec![Rgba8::TRANSPARENT; 1];
        g.generate(&mut span, 0, 0);
        let c = span[0];
        assert!((c.r as i32 - 128).abs() <= 2 && (c.g as i32 - 128).abs() <= 2);
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_color_transform_applied() {
        let cx = ColorTransform {
            ra: 0,
            ..ColorTransform::IDENTITY
        };
        let mut g = SpanBitmap::new(TransAffine::new(), strip(), false, false, cx);
        let mut span = vec![Rgba8::TRANSPARENT; 1];
        g.generate(&mut span, 0, 0);
        assert_eq!(span[0], Rgba8::BLACK);
    }
}
