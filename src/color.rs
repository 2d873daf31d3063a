//! Colors and color transforms.
//!
//! `Rgba8` is the straight (non-premultiplied) 8-bit color that styles and
//! span generators produce. `ColorTransform` is the SWF CXFORM: a per
//! channel 8.8 fixed point multiplier followed by an additive offset.

use std::io::{Read, Seek};

use crate::basics::{uround, CoverType, COVER_MASK};
use crate::error::Result;
use crate::stream::SwfStream;

// ============================================================================
// Rgba8
// ============================================================================

/// RGBA color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BASE_SHIFT: u32 = 8;
    pub const BASE_SCALE: u32 = 1 << Self::BASE_SHIFT;
    pub const BASE_MASK: u32 = Self::BASE_SCALE - 1;
    pub const BASE_MSB: u32 = 1 << (Self::BASE_SHIFT - 1);

    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn new_opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// RGB record (3 bytes, opaque).
    pub fn read_rgb<R: Read + Seek>(stream: &mut SwfStream<R>) -> Result<Self> {
        stream.ensure_bytes(3)?;
        let r = stream.read_u8()?;
        let g = stream.read_u8()?;
        let b = stream.read_u8()?;
        Ok(Self::new_opaque(r, g, b))
    }

    /// RGBA record (4 bytes).
    pub fn read_rgba<R: Read + Seek>(stream: &mut SwfStream<R>) -> Result<Self> {
        stream.ensure_bytes(4)?;
        let r = stream.read_u8()?;
        let g = stream.read_u8()?;
        let b = stream.read_u8()?;
        let a = stream.read_u8()?;
        Ok(Self::new(r, g, b, a))
    }

    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.a as u32 == Self::BASE_MASK
    }

    /// Fixed-point multiply, exact over u8: `(a * b + 128) >> 8` with
    /// rounding correction.
    #[inline]
    pub fn multiply(a: u8, b: u8) -> u8 {
        let t: u32 = a as u32 * b as u32 + Self::BASE_MSB;
        (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT) as u8
    }

    #[inline]
    pub fn mult_cover(a: u8, cover: CoverType) -> u8 {
        Self::multiply(a, cover)
    }

    /// Interpolate p to q by a, assuming q is premultiplied by a.
    #[inline]
    pub fn prelerp(p: u8, q: u8, a: u8) -> u8 {
        p.wrapping_add(q).wrapping_sub(Self::multiply(p, a))
    }

    /// Interpolate p to q by a.
    #[inline]
    pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
        let t = (q as i32 - p as i32) * a as i32 + Self::BASE_MSB as i32 - (p > q) as i32;
        (p as i32 + (((t >> Self::BASE_SHIFT) + t) >> Self::BASE_SHIFT)) as u8
    }

    /// Color components scaled by alpha.
    pub fn premultiplied(&self) -> Rgba8 {
        match self.a {
            255 => *self,
            0 => Self::TRANSPARENT,
            a => Rgba8::new(
                Self::multiply(self.r, a),
                Self::multiply(self.g, a),
                Self::multiply(self.b, a),
                a,
            ),
        }
    }

    /// Inverse of `premultiplied`.
    pub fn demultiplied(&self) -> Rgba8 {
        match self.a {
            255 => *self,
            0 => Self::TRANSPARENT,
            a => {
                let div = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
                Rgba8::new(div(self.r), div(self.g), div(self.b), a)
            }
        }
    }

    /// Interpolate between `self` and `c` by `k` in [0, 1].
    pub fn gradient(&self, c: &Rgba8, k: f64) -> Rgba8 {
        let ik = uround(k * Self::BASE_MASK as f64) as u8;
        Rgba8 {
            r: Self::lerp(self.r, c.r, ik),
            g: Self::lerp(self.g, c.g, ik),
            b: Self::lerp(self.b, c.b, ik),
            a: Self::lerp(self.a, c.a, ik),
        }
    }

    /// Accumulate premultiplied color `c` with coverage `cover`.
    pub fn add(&mut self, c: &Rgba8, cover: u32) {
        let (cr, cg, cb, ca);
        if cover == COVER_MASK {
            if c.a as u32 == Self::BASE_MASK {
                *self = *c;
                return;
            }
            cr = self.r as u32 + c.r as u32;
            cg = self.g as u32 + c.g as u32;
            cb = self.b as u32 + c.b as u32;
            ca = self.a as u32 + c.a as u32;
        } else {
            cr = self.r as u32 + Self::mult_cover(c.r, cover as u8) as u32;
            cg = self.g as u32 + Self::mult_cover(c.g, cover as u8) as u32;
            cb = self.b as u32 + Self::mult_cover(c.b, cover as u8) as u32;
            ca = self.a as u32 + Self::mult_cover(c.a, cover as u8) as u32;
        }
        self.r = cr.min(Self::BASE_MASK) as u8;
        self.g = cg.min(Self::BASE_MASK) as u8;
        self.b = cb.min(Self::BASE_MASK) as u8;
        self.a = ca.min(Self::BASE_MASK) as u8;
    }
}

// ============================================================================
// ColorTransform
// ============================================================================

/// Per-channel `c * mult / 256 + add`, clamped to [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTransform {
    pub ra: i16,
    pub ga: i16,
    pub ba: i16,
    pub aa: i16,
    pub rb: i16,
    pub gb: i16,
    pub bb: i16,
    pub ab: i16,
}

impl Default for ColorTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorTransform {
    pub const IDENTITY: ColorTransform = ColorTransform {
        ra: 256,
        ga: 256,
        ba: 256,
        aa: 256,
        rb: 0,
        gb: 0,
        bb: 0,
        ab: 0,
    };

    /// CXFORM record (no alpha channel).
    pub fn read_rgb<R: Read + Seek>(stream: &mut SwfStream<R>) -> Result<Self> {
        Self::read_channels(stream, false)
    }

    /// CXFORMWITHALPHA record.
    pub fn read_rgba<R: Read + Seek>(stream: &mut SwfStream<R>) -> Result<Self> {
        Self::read_channels(stream, true)
    }

    fn read_channels<R: Read + Seek>(stream: &mut SwfStream<R>, with_alpha: bool) -> Result<Self> {
        stream.align();
        stream.ensure_bits(6)?;
        let has_add = stream.read_bit()?;
        let has_mult = stream.read_bit()?;
        let nbits = stream.read_uint(4)?;

        let channels: u64 = if with_alpha { 4 } else { 3 };
        let fields = channels * (has_add as u64 + has_mult as u64);
        stream.ensure_bits(fields * nbits as u64)?;

        let mut cx = Self::IDENTITY;
        if has_mult {
            cx.ra = stream.read_sint(nbits)? as i16;
            cx.ga = stream.read_sint(nbits)? as i16;
            cx.ba = stream.read_sint(nbits)? as i16;
            if with_alpha {
                cx.aa = stream.read_sint(nbits)? as i16;
            }
        }
        if has_add {
            cx.rb = stream.read_sint(nbits)? as i16;
            cx.gb = stream.read_sint(nbits)? as i16;
            cx.bb = stream.read_sint(nbits)? as i16;
            if with_alpha {
                cx.ab = stream.read_sint(nbits)? as i16;
            }
        }
        stream.align();
        Ok(cx)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when every input alpha maps to 0.
    pub fn is_invisible(&self) -> bool {
        ((255 * self.aa.max(0) as i32) >> 8) + self.ab as i32 <= 0
    }

    #[inline]
    fn channel(c: u8, mult: i16, add: i16) -> u8 {
        (((c as i32 * mult as i32) >> 8) + add as i32).clamp(0, 255) as u8
    }

    #[inline]
    pub fn transform(&self, c: Rgba8) -> Rgba8 {
        Rgba8::new(
            Self::channel(c.r, self.ra, self.rb),
            Self::channel(c.g, self.ga, self.gb),
            Self::channel(c.b, self.ba, self.bb),
            Self::channel(c.a, self.aa, self.ab),
        )
    }

    pub fn transform_span(&self, span: &mut [Rgba8]) {
        for c in span.iter_mut() {
            *c = self.transform(*c);
        }
    }

    /// Compose so that `other` is applied first, then `self`.
    pub fn concatenate(&mut self, other: &ColorTransform) {
        fn mul(a: i16, b: i16) -> i16 {
            ((a as i32 * b as i32) >> 8).clamp(i16::MIN as i32, i16::MAX as i32) as i16
        }
        fn add(a: i16, b: i16) -> i16 {
            (a as i32 + b as i32).clamp(i16::MIN as i32, i16::MAX as i32) as i16
        }
        self.rb = add(self.rb, mul(self.ra, other.rb));
        self.gb = add(self.gb, mul(self.ga, other.gb));
        self.bb = add(self.bb, mul(self.ba, other.bb));
        self.ab = add(self.ab, mul(self.aa, other.ab));
        self.ra = mul(self.ra, other.ra);
        self.ga = mul(self.ga, other.ga);
        self.ba = mul(self.ba, other.ba);
        self.aa = mul(self.aa, other.aa);
    }
}
