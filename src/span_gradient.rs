//! Gradient span generator and gradient functions.
//!
//! A gradient function maps a point in gradient space (1/16 subpixel
//! units) to a scalar distance. `SpanGradient` walks a span through the
//! inverse fill matrix, evaluates the function, applies the spread mode and
//! looks the result up in a `GradientLut`.

use std::sync::Arc;

use crate::basics::{iround, uround};
use crate::color::Rgba8;
use crate::fill_style::SpreadMode;
use crate::gradient_lut::GradientLut;
use crate::renderer_scanline::SpanGenerator;
use crate::span_interpolator_linear::{SpanInterpolatorLinear, SUBPIXEL_SHIFT};
use crate::trans_affine::TransAffine;

// ============================================================================
// Constants
// ============================================================================

pub const GRADIENT_SUBPIXEL_SHIFT: i32 = 4;
pub const GRADIENT_SUBPIXEL_SCALE: i32 = 1 << GRADIENT_SUBPIXEL_SHIFT;

/// Downscale shift from interpolator subpixel to gradient subpixel.
const DOWNSCALE_SHIFT: i32 = SUBPIXEL_SHIFT as i32 - GRADIENT_SUBPIXEL_SHIFT;

// ============================================================================
// GradientFunction trait
// ============================================================================

/// Maps a point `(x, y)` to a distance. `d` is the length of one full
/// gradient cycle, which only the spread adaptors need.
pub trait GradientFunction {
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32;
}

impl<G: GradientFunction> GradientFunction for &G {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        (**self).calculate(x, y, d)
    }
}

/// Distance along X.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientX;

impl GradientFunction for GradientX {
    #[inline]
    fn calculate(&self, x: i32, _y: i32, _d: i32) -> i32 {
        x
    }
}

/// Distance from the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRadialD;

impl GradientFunction for GradientRadialD {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let (x, y) = (x as f64, y as f64);
        uround((x * x + y * y).sqrt()) as i32
    }
}

// ============================================================================
// Radial gradient with focal point
// ============================================================================

/// Radial gradient whose zero distance sits on a focal point inside the
/// circle rather than at its center.
#[derive(Debug, Clone, Copy)]
pub struct GradientRadialFocus {
    r: i32,
    fx: i32,
    fy: i32,
    r2: f64,
    fx2: f64,
    fy2: f64,
    mul: f64,
}

impl GradientRadialFocus {
    /// Circle of radius `r` around the origin with the focus at
    /// (`fx`, `fy`), all in gradient units.
    pub fn new(r: f64, fx: f64, fy: f64) -> Self {
        let mut s = Self {
            r: iround(r * GRADIENT_SUBPIXEL_SCALE as f64),
            fx: iround(fx * GRADIENT_SUBPIXEL_SCALE as f64),
            fy: iround(fy * GRADIENT_SUBPIXEL_SCALE as f64),
            r2: 0.0,
            fx2: 0.0,
            fy2: 0.0,
            mul: 0.0,
        };
        s.update_values();
        s
    }

    pub fn radius(&self) -> f64 {
        self.r as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus_x(&self) -> f64 {
        self.fx as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    fn update_values(&mut self) {
        self.r2 = self.r as f64 * self.r as f64;
        self.fx2 = self.fx as f64 * self.fx as f64;
        self.fy2 = self.fy as f64 * self.fy as f64;
        let mut d = self.r2 - (self.fx2 + self.fy2);
        if d == 0.0 {
            // Focus on the circle: pull it one subpixel toward the center.
            self.fx -= self.fx.signum();
            self.fy -= self.fy.signum();
            self.fx2 = self.fx as f64 * self.fx as f64;
            self.fy2 = self.fy as f64 * self.fy as f64;
            d = self.r2 - (self.fx2 + self.fy2);
        }
        self.mul = if d != 0.0 { self.r as f64 / d } else { 0.0 };
    }
}

impl GradientFunction for GradientRadialFocus {
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let dx = x as f64 - self.fx as f64;
        let dy = y as f64 - self.fy as f64;
        let d2 = dx * self.fy as f64 - dy * self.fx as f64;
        let d3 = self.r2 * (dx * dx + dy * dy) - d2 * d2;
        iround((dx * self.fx as f64 + dy * self.fy as f64 + d3.abs().sqrt()) * self.mul)
    }
}

// ============================================================================
// Spread adaptors
// ============================================================================

/// Wraps distances into one cycle.
pub struct GradientRepeatAdaptor<G> {
    gradient: G,
}

impl<G: GradientFunction> GradientRepeatAdaptor<G> {
    pub fn new(gradient: G) -> Self {
        Self { gradient }
    }
}

impl<G: GradientFunction> GradientFunction for GradientRepeatAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        if d <= 0 {
            return 0;
        }
        self.gradient.calculate(x, y, d).rem_euclid(d)
    }
}

/// Mirrors distances at every cycle boundary.
pub struct GradientReflectAdaptor<G> {
    gradient: G,
}

impl<G: GradientFunction> GradientReflectAdaptor<G> {
    pub fn new(gradient: G) -> Self {
        Self { gradient }
    }
}

impl<G: GradientFunction> GradientFunction for GradientReflectAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        if d <= 0 {
            return 0;
        }
        let d2 = d << 1;
        let ret = self.gradient.calculate(x, y, d).rem_euclid(d2);
        if ret >= d {
            d2 - ret
        } else {
            ret
        }
    }
}

// ============================================================================
// GradientShape
// ============================================================================

/// The gradient functions a SWF fill can use.
#[derive(Debug, Clone, Copy)]
pub enum GradientShape {
    Linear(GradientX),
    Radial(GradientRadialD),
    Focal(GradientRadialFocus),
}

impl GradientFunction for GradientShape {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        match self {
            GradientShape::Linear(g) => g.calculate(x, y, d),
            GradientShape::Radial(g) => g.calculate(x, y, d),
            GradientShape::Focal(g) => g.calculate(x, y, d),
        }
    }
}

// ============================================================================
// SpanGradient
// ============================================================================

/// Gradient span generator for one fill in one render pass.
pub struct SpanGradient {
    interpolator: SpanInterpolatorLinear,
    shape: GradientShape,
    spread: SpreadMode,
    lut: Arc<GradientLut>,
    d1: i32,
    d2: i32,
}

impl SpanGradient {
    /// `device_to_gradient` maps device pixels into gradient units, where
    /// distances from `d1` to `d2` cover the whole table.
    pub fn new(
        device_to_gradient: TransAffine,
        shape: GradientShape,
        spread: SpreadMode,
        lut: Arc<GradientLut>,
        d1: f64,
        d2: f64,
    ) -> Self {
        Self {
            interpolator: SpanInterpolatorLinear::new(device_to_gradient),
            shape,
            spread,
            lut,
            d1: iround(d1 * GRADIENT_SUBPIXEL_SCALE as f64),
            d2: iround(d2 * GRADIENT_SUBPIXEL_SCALE as f64),
        }
    }

    pub fn shape(&self) -> &GradientShape {
        &self.shape
    }

    pub fn spread(&self) -> SpreadMode {
        self.spread
    }

    pub fn lut(&self) -> &Arc<GradientLut> {
        &self.lut
    }
}

fn fill_span<G: GradientFunction>(
    interpolator: &mut SpanInterpolatorLinear,
    gradient: G,
    lut: &GradientLut,
    d1: i32,
    d2: i32,
    span: &mut [Rgba8],
) {
    let dd = (d2 - d1).max(1);
    let size = lut.size() as i32;
    for pixel in span.iter_mut() {
        let (ix, iy) = interpolator.coordinates();
        let d = gradient.calculate(ix >> DOWNSCALE_SHIFT, iy >> DOWNSCALE_SHIFT, d2);
        let d = ((d as i64 - d1 as i64) * size as i64 / dd as i64).clamp(0, size as i64 - 1);
        *pixel = lut.get(d as usize);
        interpolator.next();
    }
}

impl SpanGenerator for SpanGradient {
    fn generate(&mut self, span: &mut [Rgba8], x: i32, y: i32) {
        self.interpolator
            .begin(x as f64 + 0.5, y as f64 + 0.5, span.len() as u32);
        let lut: &GradientLut = &self.lut;
        match self.spread {
            SpreadMode::Pad => {
                fill_span(&mut self.interpolator, &self.shape, lut, self.d1, self.d2, span)
            }
            SpreadMode::Repeat => fill_span(
                &mut self.interpolator,
                GradientRepeatAdaptor::new(&self.shape),
                lut,
                self.d1,
                self.d2,
                span,
            ),
            SpreadMode::Reflect => fill_span(
                &mut self.interpolator,
                GradientReflectAdaptor::new(&self.shape),
                lut,
                self.d1,
                self.d2,
                span,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill_style::GradientRecord;

    fn ramp() -> Arc<GradientLut> {
        Arc::new(GradientLut::from_records(&[
            GradientRecord {
                ratio: 0,
                color: Rgba8::BLACK,
            },
            GradientRecord {
                ratio: 255,
                color: Rgba8::WHITE,
            },
        ]))
    }

    #[test]
    fn test_gradient_functions() {
        assert_eq!(GradientX.calculate(7, 100, 0), 7);
        assert_eq!(GradientRadialD.calculate(30, 40, 0), 50);
        let centered = GradientRadialFocus::new(32.0, 0.0, 0.0);
        let r = 32 * GRADIENT_SUBPIXEL_SCALE;
        assert!((centered.calculate(r, 0, 0) - r).abs() <= 1);
        assert!((centered.calculate(0, -r, 0) - r).abs() <= 1);
    }

    #[test]
    fn test_focus_shifts_zero_point() {
        let f = GradientRadialFocus::new(32.0, 16.0, 0.0);
        let s = GRADIENT_SUBPIXEL_SCALE;
        assert_eq!(f.calculate(16 * s, 0, 0), 0);
        // The rim still maps to the radius.
        assert!((f.calculate(32 * s, 0, 0) - 32 * s).abs() <= 1);
        assert!((f.calculate(-32 * s, 0, 0) - 32 * s).abs() <= 1);
    }

    #[test]
    fn test_focus_on_rim_is_pulled_inside() {
        let f = GradientRadialFocus::new(32.0, 32.0, 0.0);
        assert!(f.focus_x() < 32.0);
        assert!(f.calculate(0, 0, 0) >= 0);
    }

    #[test]
    fn test_spread_adaptors() {
        let rep = GradientRepeatAdaptor::new(GradientX);
        assert_eq!(rep.calculate(130, 0, 100), 30);
        assert_eq!(rep.calculate(-30, 0, 100), 70);
        let refl = GradientReflectAdaptor::new(GradientX);
        assert_eq!(refl.calculate(130, 0, 100), 70);
        assert_eq!(refl.calculate(-30, 0, 100), 30);
        assert_eq!(refl.calculate(230, 0, 100), 30);
    }

    #[test]
    fn test_linear_span_pad() {
        // One device pixel per gradient unit, over 0..256.
        let mut g = SpanGradient::new(
            TransAffine::new(),
            GradientShape::Linear(GradientX),
            SpreadMode::Pad,
            ramp(),
            0.0,
            256.0,
        );
        let mut span = vec![Rgba8::TRANSPARENT; 4];
        g.generate(&mut span, 0, 0);
        assert!(span[0].r <= 1);
        assert!(span[3].r >= 2 && span[3].r <= 5);
        g.generate(&mut span, 300, 0);
        assert!(span.iter().all(|c| *c == Rgba8::WHITE));
        g.generate(&mut span, -50, 0);
        assert!(span.iter().all(|c| *c == Rgba8::BLACK));
    }

    #[test]
    fn test_linear_span_repeat() {
        let mut g = SpanGradient::new(
            TransAffine::new(),
            GradientShape::Linear(GradientX),
            SpreadMode::Repeat,
            ramp(),
            0.0,
            256.0,
        );
        let mut a = vec![Rgba8::TRANSPARENT; 1];
        let mut b = vec![Rgba8::TRANSPARENT; 1];
        g.generate(&mut a, 10, 0);
        g.generate(&mut b, 266, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_radial_span() {
        let mut g = SpanGradient::new(
            TransAffine::new(),
            GradientShape::Radial(GradientRadialD),
            SpreadMode::Pad,
            ramp(),
            0.0,
            32.0,
        );
        let mut center = vec![Rgba8::TRANSPARENT; 1];
        g.generate(&mut center, 0, 0);
        assert!(center[0].r < 16);
        let mut outside = vec![Rgba8::TRANSPARENT; 1];
        g.generate(&mut outside, 40, 0);
        assert_eq!(outside[0], Rgba8::WHITE);
    }
}
