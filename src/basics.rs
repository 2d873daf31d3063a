//! Foundation types and constants shared by the parser, the hit tester and
//! the rasterizer: rounding helpers, coverage and subpixel constants, twips
//! conversion, points and the winding rule.

use core::ops::{Add, Sub};

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round to the nearest integer, half away from zero.
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round to the nearest unsigned integer, half up.
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

/// Floor toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

// ============================================================================
// Coverage
// ============================================================================

/// Anti-aliasing coverage value.
pub type CoverType = u8;

pub const COVER_SHIFT: u32 = 8;
pub const COVER_SIZE: u32 = 1 << COVER_SHIFT;
pub const COVER_MASK: u32 = COVER_SIZE - 1;
pub const COVER_NONE: CoverType = 0;
pub const COVER_FULL: CoverType = COVER_MASK as CoverType;

// ============================================================================
// Subpixel constants
// ============================================================================

/// Fractional bits of rasterizer coordinates. With 32-bit cells this leaves
/// 24 bits of integer range, far more than any clipped device coordinate.
pub const POLY_SUBPIXEL_SHIFT: u32 = 8;
pub const POLY_SUBPIXEL_SCALE: u32 = 1 << POLY_SUBPIXEL_SHIFT;
pub const POLY_SUBPIXEL_MASK: u32 = POLY_SUBPIXEL_SCALE - 1;

// ============================================================================
// Twips
// ============================================================================

/// SWF coordinates are stored in twips, 1/20th of a pixel.
pub const TWIPS_PER_PIXEL: f64 = 20.0;

#[inline]
pub fn twips_to_pixels(twips: f64) -> f64 {
    twips / TWIPS_PER_PIXEL
}

#[inline]
pub fn pixels_to_twips(pixels: f64) -> f64 {
    pixels * TWIPS_PER_PIXEL
}

// ============================================================================
// Winding rule
// ============================================================================

/// Fill determination from accumulated signed edge crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindingRule {
    /// Inside when the counter is odd.
    #[default]
    EvenOdd,
    /// Inside when the counter is anything but zero.
    NonZero,
}

impl WindingRule {
    #[inline]
    pub fn is_inside(self, counter: i32) -> bool {
        match self {
            WindingRule::EvenOdd => counter % 2 != 0,
            WindingRule::NonZero => counter != 0,
        }
    }
}

// ============================================================================
// Point
// ============================================================================

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct PointBase<T: Copy> {
    pub x: T,
    pub y: T,
}

impl<T: Copy> PointBase<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Copy + Add<Output = T>> Add for PointBase<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl<T: Copy + Sub<Output = T>> Sub for PointBase<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Point in twips.
pub type PointI = PointBase<i32>;
/// Point in floating point (twips or device pixels, depending on context).
pub type PointD = PointBase<f64>;

impl PointI {
    #[inline]
    pub fn to_f64(self) -> PointD {
        PointD::new(self.x as f64, self.y as f64)
    }
}

impl PointD {
    #[inline]
    pub fn square_distance(self, other: PointD) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two corner points, used for device clip boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Swap corners so that x1 <= x2 and y1 <= y2.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

pub type RectI = Rect<i32>;
pub type RectD = Rect<f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iround() {
        assert_eq!(iround(0.5), 1);
        assert_eq!(iround(-0.5), -1);
        assert_eq!(iround(2.4), 2);
        assert_eq!(iround(-2.6), -3);
    }

    #[test]
    fn test_ifloor() {
        assert_eq!(ifloor(1.7), 1);
        assert_eq!(ifloor(-1.2), -2);
        assert_eq!(ifloor(-3.0), -3);
    }

    #[test]
    fn test_twips() {
        assert_eq!(twips_to_pixels(100.0), 5.0);
        assert_eq!(pixels_to_twips(1.5), 30.0);
    }

    #[test]
    fn test_winding_rule() {
        assert!(WindingRule::EvenOdd.is_inside(1));
        assert!(WindingRule::EvenOdd.is_inside(-3));
        assert!(!WindingRule::EvenOdd.is_inside(2));
        assert!(WindingRule::NonZero.is_inside(2));
        assert!(WindingRule::NonZero.is_inside(-1));
        assert!(!WindingRule::NonZero.is_inside(0));
    }

    #[test]
    fn test_point_ops() {
        let a = PointI::new(3, 4);
        let b = PointI::new(1, 1);
        assert_eq!(a - b, PointI::new(2, 3));
        assert_eq!(a + b, PointI::new(4, 5));
        assert_eq!(PointD::new(0.0, 0.0).square_distance(a.to_f64()), 25.0);
    }

    #[test]
    fn test_rect_normalize_and_hit() {
        let mut r = RectI::new(10, 20, 0, 5);
        r.normalize();
        assert_eq!(r, RectI::new(0, 5, 10, 20));
        assert!(r.hit_test(10, 20));
        assert!(!r.hit_test(11, 20));
    }
}
