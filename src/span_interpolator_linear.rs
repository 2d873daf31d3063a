//! Linear span interpolator.
//!
//! Maps device pixel centers back into a fill's own space (gradient square
//! or bitmap pixels). Only the span's two end points go through the affine
//! matrix; the pixels in between are stepped with an integer DDA.

use crate::basics::iround;
use crate::trans_affine::TransAffine;

pub const SUBPIXEL_SHIFT: u32 = 8;
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;

// ============================================================================
// Dda2LineInterpolator
// ============================================================================

/// Integer DDA that spreads `y2 - y1` over `count` steps without drift.
#[derive(Debug, Clone, Copy)]
struct Dda2LineInterpolator {
    cnt: i32,
    lft: i32,
    rem: i32,
    mod_val: i32,
    y: i32,
}

impl Dda2LineInterpolator {
    fn new(y1: i32, y2: i32, count: i32) -> Self {
        let cnt = count.max(1);
        let delta = y2.wrapping_sub(y1);
        let mut lft = delta / cnt;
        let mut rem = delta % cnt;
        let mut mod_val = rem;

        if mod_val <= 0 {
            mod_val += cnt;
            rem += cnt;
            lft -= 1;
        }
        mod_val -= cnt;

        Self {
            cnt,
            lft,
            rem,
            mod_val,
            y: y1,
        }
    }

    #[inline]
    fn inc(&mut self) {
        self.mod_val += self.rem;
        self.y = self.y.wrapping_add(self.lft);
        if self.mod_val > 0 {
            self.mod_val -= self.cnt;
            self.y = self.y.wrapping_add(1);
        }
    }

    #[inline]
    fn y(&self) -> i32 {
        self.y
    }
}

// ============================================================================
// SpanInterpolatorLinear
// ============================================================================

#[derive(Debug, Clone)]
pub struct SpanInterpolatorLinear {
    trans: TransAffine,
    li_x: Dda2LineInterpolator,
    li_y: Dda2LineInterpolator,
}

impl SpanInterpolatorLinear {
    /// `trans` maps device pixels into the target space.
    pub fn new(trans: TransAffine) -> Self {
        Self {
            trans,
            li_x: Dda2LineInterpolator::new(0, 0, 1),
            li_y: Dda2LineInterpolator::new(0, 0, 1),
        }
    }

    pub fn transformer(&self) -> &TransAffine {
        &self.trans
    }

    pub fn set_transformer(&mut self, trans: TransAffine) {
        self.trans = trans;
    }

    pub fn begin(&mut self, x: f64, y: f64, len: u32) {
        let (mut tx, mut ty) = (x, y);
        self.trans.transform(&mut tx, &mut ty);
        let x1 = iround(tx * SUBPIXEL_SCALE as f64);
        let y1 = iround(ty * SUBPIXEL_SCALE as f64);

        let (mut tx2, mut ty2) = (x + len as f64, y);
        self.trans.transform(&mut tx2, &mut ty2);
        let x2 = iround(tx2 * SUBPIXEL_SCALE as f64);
        let y2 = iround(ty2 * SUBPIXEL_SCALE as f64);

        self.li_x = Dda2LineInterpolator::new(x1, x2, len as i32);
        self.li_y = Dda2LineInterpolator::new(y1, y2, len as i32);
    }

    #[inline]
    pub fn next(&mut self) {
        self.li_x.inc();
        self.li_y.inc();
    }

    /// Current position in target space, in 1/256 units.
    #[inline]
    pub fn coordinates(&self) -> (i32, i32) {
        (self.li_x.y(), self.li_y.y())
    }
}
