//! Image accessors for bitmap fills.
//!
//! An accessor answers "which pixel is at (x, y)" for coordinates that may
//! fall outside the bitmap. Clipped fills clamp to the edge pixels;
//! repeating fills wrap around with `WrapModeRepeat`.

use std::marker::PhantomData;

use crate::bitmap::BitmapInfo;
use crate::color::Rgba8;

// ============================================================================
// Pixel layouts
// ============================================================================

/// Decodes one pixel of a byte layout into straight-alpha RGBA.
pub trait PixelLayout {
    fn decode(p: &[u8]) -> Rgba8;
}

pub struct Rgb24;

impl PixelLayout for Rgb24 {
    #[inline]
    fn decode(p: &[u8]) -> Rgba8 {
        Rgba8::new_opaque(p[0], p[1], p[2])
    }
}

pub struct Rgba32;

impl PixelLayout for Rgba32 {
    #[inline]
    fn decode(p: &[u8]) -> Rgba8 {
        Rgba8::new(p[0], p[1], p[2], p[3])
    }
}

// ============================================================================
// ImageSource trait
// ============================================================================

pub trait ImageSource {
    fn pixel(&mut self, x: i32, y: i32) -> Rgba8;
}

// ============================================================================
// ImageAccessorClamp
// ============================================================================

/// Out-of-range coordinates read the nearest edge pixel.
pub struct ImageAccessorClamp<'a, L> {
    img: &'a BitmapInfo,
    _layout: PhantomData<L>,
}

impl<'a, L: PixelLayout> ImageAccessorClamp<'a, L> {
    pub fn new(img: &'a BitmapInfo) -> Self {
        Self {
            img,
            _layout: PhantomData,
        }
    }
}

impl<L: PixelLayout> ImageSource for ImageAccessorClamp<'_, L> {
    #[inline]
    fn pixel(&mut self, x: i32, y: i32) -> Rgba8 {
        let x = x.clamp(0, self.img.width as i32 - 1) as u32;
        let y = y.clamp(0, self.img.height as i32 - 1) as u32;
        L::decode(self.img.pixel_bytes(x, y))
    }
}

// ============================================================================
// Wrap modes
// ============================================================================

pub trait WrapMode {
    fn new(size: u32) -> Self;
    fn func(&mut self, v: i32) -> u32;
}

/// Repeat: `v mod size`, also for negative `v`.
pub struct WrapModeRepeat {
    size: u32,
}

impl WrapMode for WrapModeRepeat {
    fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    #[inline]
    fn func(&mut self, v: i32) -> u32 {
        (v as i64).rem_euclid(self.size as i64) as u32
    }
}

// ============================================================================
// ImageAccessorWrap
// ============================================================================

/// Out-of-range coordinates wrap independently along each axis.
pub struct ImageAccessorWrap<'a, L, WX, WY> {
    img: &'a BitmapInfo,
    wrap_x: WX,
    wrap_y: WY,
    _layout: PhantomData<L>,
}

impl<'a, L: PixelLayout, WX: WrapMode, WY: WrapMode> ImageAccessorWrap<'a, L, WX, WY> {
    pub fn new(img: &'a BitmapInfo) -> Self {
        Self {
            img,
            wrap_x: WX::new(img.width),
            wrap_y: WY::new(img.height),
            _layout: PhantomData,
        }
    }
}

impl<L: PixelLayout, WX: WrapMode, WY: WrapMode> ImageSource for ImageAccessorWrap<'_, L, WX, WY> {
    #[inline]
    fn pixel(&mut self, x: i32, y: i32) -> Rgba8 {
        let x = self.wrap_x.func(x);
        let y = self.wrap_y.func(y);
        L::decode(self.img.pixel_bytes(x, y))
    }
}

pub type ImageAccessorRepeat<'a, L> = ImageAccessorWrap<'a, L, WrapModeRepeat, WrapModeRepeat>;
