//! Decoded bitmaps referenced by bitmap fills.
//!
//! Bitmap decoding itself happens elsewhere; this module only describes
//! the pixels and how styles find them by character id.

use std::sync::Arc;

use crate::color::Rgba8;
use crate::error::{ParseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitmapFormat {
    /// Three bytes per pixel, opaque.
    Rgb24,
    /// Four bytes per pixel, straight alpha.
    Rgba32,
}

impl BitmapFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            BitmapFormat::Rgb24 => 3,
            BitmapFormat::Rgba32 => 4,
        }
    }
}

/// Pixel storage of one bitmap character. Rows are `stride` bytes apart
/// and run top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapInfo {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub format: BitmapFormat,
    pub data: Vec<u8>,
}

impl BitmapInfo {
    /// Wrap tightly packed rows.
    pub fn new(width: u32, height: u32, format: BitmapFormat, data: Vec<u8>) -> Result<Self> {
        let stride = width as usize * format.bytes_per_pixel();
        Self::with_stride(width, height, stride, format, data)
    }

    pub fn with_stride(
        width: u32,
        height: u32,
        stride: usize,
        format: BitmapFormat,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ParseError::InvalidData(format!(
                "empty bitmap {}x{}",
                width, height
            )));
        }
        let row = width as usize * format.bytes_per_pixel();
        if stride < row {
            return Err(ParseError::InvalidData(format!(
                "bitmap stride {} shorter than a row of {} bytes",
                stride, row
            )));
        }
        let needed = stride * (height as usize - 1) + row;
        if data.len() < needed {
            return Err(ParseError::InvalidData(format!(
                "bitmap data holds {} bytes, {}x{} needs {}",
                data.len(),
                width,
                height,
                needed
            )));
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    /// Raw bytes of the pixel at (x, y). Callers keep the coordinates in
    /// range.
    #[inline]
    pub fn pixel_bytes(&self, x: u32, y: u32) -> &[u8] {
        let bpp = self.format.bytes_per_pixel();
        let off = y as usize * self.stride + x as usize * bpp;
        &self.data[off..off + bpp]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let p = self.pixel_bytes(x, y);
        match self.format {
            BitmapFormat::Rgb24 => Rgba8::new_opaque(p[0], p[1], p[2]),
            BitmapFormat::Rgba32 => Rgba8::new(p[0], p[1], p[2], p[3]),
        }
    }
}

/// Looks bitmaps up by character id.
pub trait BitmapResolver: Send + Sync {
    fn bitmap(&self, id: u16) -> Option<Arc<BitmapInfo>>;
}

impl<F> BitmapResolver for F
where
    F: Fn(u16) -> Option<Arc<BitmapInfo>> + Send + Sync,
{
    fn bitmap(&self, id: u16) -> Option<Arc<BitmapInfo>> {
        self(id)
    }
}
