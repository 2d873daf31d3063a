//! Rendering buffer: row-oriented access to an owned pixel array.
//!
//! Rows are stored top-down, 4 bytes per pixel, in premultiplied RGBA
//! order. Rows may be padded; `stride` is the byte distance between the
//! starts of two consecutive rows.

use crate::color::Rgba8;

const BPP: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct RenderingBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: usize,
}

impl RenderingBuffer {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_stride(width, height, width as usize * BPP)
    }

    /// A fully transparent buffer with rows `stride` bytes apart. Strides
    /// shorter than a row are widened to one.
    pub fn with_stride(width: u32, height: u32, stride: usize) -> Self {
        let stride = stride.max(width as usize * BPP);
        Self {
            data: vec![0; stride * height as usize],
            width,
            height,
            stride,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * BPP]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.width as usize * BPP]
    }

    /// Premultiplied pixel at (x, y); transparent outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Rgba8::TRANSPARENT;
        }
        let p = &self.row(y as u32)[x as usize * BPP..x as usize * BPP + BPP];
        Rgba8::new(p[0], p[1], p[2], p[3])
    }

    /// Fill every pixel with `c`, given in straight alpha.
    pub fn clear(&mut self, c: Rgba8) {
        let c = c.premultiplied();
        for y in 0..self.height {
            for p in self.row_mut(y).chunks_exact_mut(BPP) {
                p.copy_from_slice(&[c.r, c.g, c.b, c.a]);
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}
