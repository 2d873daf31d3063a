//! Affine transformation matrix.
//!
//! One type serves both as the SWF MATRIX record (shape placement, bitmap
//! and gradient fill placement) and as the device transform the renderer
//! works with.

use std::io::{Read, Seek};

use log::debug;

use crate::error::Result;
use crate::stream::SwfStream;

/// Epsilon for matrix comparisons.
pub const AFFINE_EPSILON: f64 = 1e-14;

/// 2D affine transformation matrix.
///
/// ```text
///   | sx  shx tx |
///   | shy  sy ty |
///   |  0    0  1 |
/// ```
///
/// Transform: `x' = x*sx + y*shx + tx`, `y' = x*shy + y*sy + ty`.
///
/// In SWF terms `sx`/`sy` are ScaleX/ScaleY, `shy` is RotateSkew0 and
/// `shx` is RotateSkew1.
#[derive(Debug, Clone, Copy)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl TransAffine {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Identity matrix.
    pub const fn new() -> Self {
        Self {
            sx: 1.0,
            shy: 0.0,
            shx: 0.0,
            sy: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub const fn new_custom(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self {
            sx,
            shy,
            shx,
            sy,
            tx,
            ty,
        }
    }

    pub const fn new_scaling(x: f64, y: f64) -> Self {
        Self::new_custom(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub const fn new_translation(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Read a MATRIX record: optional scale, optional rotate/skew, then
    /// the mandatory translation in twips.
    pub fn read<R: Read + Seek>(stream: &mut SwfStream<R>) -> Result<Self> {
        stream.align();
        let mut m = Self::new();

        stream.ensure_bits(1)?;
        if stream.read_bit()? {
            stream.ensure_bits(5)?;
            let nbits = stream.read_uint(5)?;
            stream.ensure_bits(nbits as u64 * 2)?;
            m.sx = stream.read_sint(nbits)? as f64 / 65536.0;
            m.sy = stream.read_sint(nbits)? as f64 / 65536.0;
        }

        stream.ensure_bits(1)?;
        if stream.read_bit()? {
            stream.ensure_bits(5)?;
            let nbits = stream.read_uint(5)?;
            stream.ensure_bits(nbits as u64 * 2)?;
            m.shy = stream.read_sint(nbits)? as f64 / 65536.0;
            m.shx = stream.read_sint(nbits)? as f64 / 65536.0;
        }

        stream.ensure_bits(5)?;
        let nbits = stream.read_uint(5)?;
        stream.ensure_bits(nbits as u64 * 2)?;
        m.tx = stream.read_sint(nbits)? as f64;
        m.ty = stream.read_sint(nbits)? as f64;

        debug!("matrix: {:?}", m);
        Ok(m)
    }

    // ====================================================================
    // Operations (mutate self)
    // ====================================================================

    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += x;
        self.ty += y;
        self
    }

    /// Non-uniform scale applied after the current transform.
    pub fn scale(&mut self, x: f64, y: f64) -> &mut Self {
        self.sx *= x;
        self.shx *= x;
        self.tx *= x;
        self.shy *= y;
        self.sy *= y;
        self.ty *= y;
        self
    }

    /// Post-multiply: `self = self * m`, i.e. apply `self` first, then `m`.
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        let t0 = self.sx * m.sx + self.shy * m.shx;
        let t2 = self.shx * m.sx + self.sy * m.shx;
        let t4 = self.tx * m.sx + self.ty * m.shx + m.tx;
        self.shy = self.sx * m.shy + self.shy * m.sy;
        self.sy = self.shx * m.shy + self.sy * m.sy;
        self.ty = self.tx * m.shy + self.ty * m.sy + m.ty;
        self.sx = t0;
        self.shx = t2;
        self.tx = t4;
        self
    }

    /// Pre-multiply: `self = m * self`, i.e. apply `m` first.
    pub fn premultiply(&mut self, m: &TransAffine) -> &mut Self {
        let mut t = *m;
        t.multiply(self);
        *self = t;
        self
    }

    /// Invert in place. A singular (or non-finite) matrix becomes the
    /// identity so that later compositions stay finite.
    pub fn invert(&mut self) -> &mut Self {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            debug!("inverting a degenerate matrix {:?}, using identity", self);
            return self.reset();
        }
        let d = 1.0 / det;
        let t0 = self.sy * d;
        self.sy = self.sx * d;
        self.shy = -self.shy * d;
        self.shx = -self.shx * d;
        let t4 = -self.tx * t0 - self.ty * self.shx;
        self.ty = -self.tx * self.shy - self.ty * self.sy;
        self.sx = t0;
        self.tx = t4;
        self
    }

    pub fn inverted(&self) -> Self {
        let mut m = *self;
        m.invert();
        m
    }

    // ====================================================================
    // Transformations
    // ====================================================================

    #[inline]
    pub fn transform(&self, x: &mut f64, y: &mut f64) {
        let tmp = *x;
        *x = tmp * self.sx + *y * self.shx + self.tx;
        *y = tmp * self.shy + *y * self.sy + self.ty;
    }

    /// Forward transform without translation.
    #[inline]
    pub fn transform_2x2(&self, x: &mut f64, y: &mut f64) {
        let tmp = *x;
        *x = tmp * self.sx + *y * self.shx;
        *y = tmp * self.shy + *y * self.sy;
    }

    // ====================================================================
    // Auxiliary
    // ====================================================================

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    /// True when every component is finite.
    pub fn is_valid(&self) -> bool {
        self.sx.is_finite()
            && self.shy.is_finite()
            && self.shx.is_finite()
            && self.sy.is_finite()
            && self.tx.is_finite()
            && self.ty.is_finite()
    }

    pub fn is_identity(&self) -> bool {
        self.is_equal(&Self::new(), AFFINE_EPSILON)
    }

    pub fn is_equal(&self, m: &TransAffine, epsilon: f64) -> bool {
        (self.sx - m.sx).abs() <= epsilon
            && (self.shy - m.shy).abs() <= epsilon
            && (self.shx - m.shx).abs() <= epsilon
            && (self.sy - m.sy).abs() <= epsilon
            && (self.tx - m.tx).abs() <= epsilon
            && (self.ty - m.ty).abs() <= epsilon
    }

    /// Length of the transformed unit X vector.
    pub fn x_scale(&self) -> f64 {
        (self.sx * self.sx + self.shy * self.shy).sqrt()
    }

    /// Length of the transformed unit Y vector.
    pub fn y_scale(&self) -> f64 {
        (self.shx * self.shx + self.sy * self.sy).sqrt()
    }

    /// Average scale factor, used to pick curve flattening density.
    pub fn scale_factor(&self) -> f64 {
        let s = std::f64::consts::FRAC_1_SQRT_2;
        let x = s * self.sx + s * self.shx;
        let y = s * self.shy + s * self.sy;
        (x * x + y * y).sqrt()
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TransAffine {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other, AFFINE_EPSILON)
    }
}

impl std::ops::Mul for TransAffine {
    type Output = TransAffine;
    fn mul(self, rhs: TransAffine) -> TransAffine {
        let mut result = self;
        result.multiply(&rhs);
        result
    }
}
