//! Premultiplied RGBA pixel format with source-over blending.
//!
//! Every blend is clipped to the buffer, so callers may pass spans that
//! hang off any edge. Solid colors are given in straight alpha and
//! premultiplied here; color spans are expected premultiplied already.

use crate::basics::{CoverType, COVER_FULL};
use crate::color::Rgba8;
use crate::rendering_buffer::RenderingBuffer;

const BPP: usize = 4;

pub trait PixelFormat {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn pixel(&self, x: i32, y: i32) -> Rgba8;
    fn copy_pixel(&mut self, x: i32, y: i32, c: Rgba8);
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: Rgba8, cover: CoverType);
    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: Rgba8, covers: &[CoverType]);
    /// `colors` are premultiplied. Each is scaled by its entry in `covers`
    /// or, when `covers` is empty, by `cover`.
    fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        colors: &[Rgba8],
        covers: &[CoverType],
        cover: CoverType,
    );
}

pub struct PixfmtRgba32Pre<'a> {
    rbuf: &'a mut RenderingBuffer,
}

impl<'a> PixfmtRgba32Pre<'a> {
    pub fn new(rbuf: &'a mut RenderingBuffer) -> Self {
        Self { rbuf }
    }

    /// Source-over of premultiplied `c` scaled by `cover`.
    #[inline]
    fn blend_pix(p: &mut [u8], c: Rgba8, cover: CoverType) {
        let c = if cover == COVER_FULL {
            c
        } else {
            Rgba8::new(
                Rgba8::mult_cover(c.r, cover),
                Rgba8::mult_cover(c.g, cover),
                Rgba8::mult_cover(c.b, cover),
                Rgba8::mult_cover(c.a, cover),
            )
        };
        match c.a {
            0 => {}
            255 => p.copy_from_slice(&[c.r, c.g, c.b, c.a]),
            a => {
                p[0] = Rgba8::prelerp(p[0], c.r, a);
                p[1] = Rgba8::prelerp(p[1], c.g, a);
                p[2] = Rgba8::prelerp(p[2], c.b, a);
                p[3] = Rgba8::prelerp(p[3], a, a);
            }
        }
    }

    /// Visible part of the run [x, x + len) on row y, as (first pixel,
    /// skipped prefix, visible length).
    fn clip_run(&self, x: i32, y: i32, len: usize) -> Option<(usize, usize, usize)> {
        if y < 0 || y as u32 >= self.rbuf.height() {
            return None;
        }
        let x0 = x.max(0) as i64;
        let x1 = (x as i64 + len as i64).min(self.rbuf.width() as i64);
        if x1 <= x0 {
            return None;
        }
        Some((x0 as usize, (x0 - x as i64) as usize, (x1 - x0) as usize))
    }
}

impl<'a> PixelFormat for PixfmtRgba32Pre<'a> {
    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn pixel(&self, x: i32, y: i32) -> Rgba8 {
        self.rbuf.pixel(x, y)
    }

    fn copy_pixel(&mut self, x: i32, y: i32, c: Rgba8) {
        if let Some((x0, _, _)) = self.clip_run(x, y, 1) {
            let c = c.premultiplied();
            let row = self.rbuf.row_mut(y as u32);
            row[x0 * BPP..x0 * BPP + BPP].copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: Rgba8, cover: CoverType) {
        if let Some((x0, _, n)) = self.clip_run(x, y, len as usize) {
            let c = c.premultiplied();
            let row = self.rbuf.row_mut(y as u32);
            for p in row[x0 * BPP..(x0 + n) * BPP].chunks_exact_mut(BPP) {
                Self::blend_pix(p, c, cover);
            }
        }
    }

    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: Rgba8, covers: &[CoverType]) {
        if let Some((x0, skip, n)) = self.clip_run(x, y, covers.len()) {
            let c = c.premultiplied();
            let row = self.rbuf.row_mut(y as u32);
            let pixels = row[x0 * BPP..(x0 + n) * BPP].chunks_exact_mut(BPP);
            for (p, &cover) in pixels.zip(&covers[skip..]) {
                Self::blend_pix(p, c, cover);
            }
        }
    }

    fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        colors: &[Rgba8],
        covers: &[CoverType],
        cover: CoverType,
    ) {
        if let Some((x0, skip, n)) = self.clip_run(x, y, colors.len()) {
            let row = self.rbuf.row_mut(y as u32);
            let pixels = row[x0 * BPP..(x0 + n) * BPP].chunks_exact_mut(BPP);
            for (i, (p, &c)) in pixels.zip(&colors[skip..]).enumerate() {
                let k = covers.get(skip + i).copied().unwrap_or(cover);
                Self::blend_pix(p, c, k);
            }
        }
    }
}
