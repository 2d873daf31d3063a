//! Gradient color lookup table.
//!
//! SWF gradients carry up to 15 stops, each with a ratio in 0..=255. The
//! table samples the piecewise-linear ramp through those stops at 256
//! evenly spaced positions, which `SpanGradient` then indexes directly.

use crate::color::{ColorTransform, Rgba8};
use crate::fill_style::GradientRecord;

pub const LUT_SIZE: usize = 256;

// ============================================================================
// GradientLut
// ============================================================================

#[derive(Clone)]
pub struct GradientLut {
    colors: Box<[Rgba8; LUT_SIZE]>,
}

impl GradientLut {
    /// Table filled with a single color.
    pub fn solid(c: Rgba8) -> Self {
        Self {
            colors: Box::new([c; LUT_SIZE]),
        }
    }

    /// Build the table from stops sorted by ratio.
    ///
    /// Entry `i` sits at offset `i / 255`. Before the first stop and after
    /// the last one the end colors extend. Two stops sharing a ratio form
    /// a hard edge: the earlier one wins up to that ratio, the later one
    /// takes over after it. No stops at all give a transparent table.
    pub fn from_records(records: &[GradientRecord]) -> Self {
        let (first, last) = match (records.first(), records.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Self::solid(Rgba8::TRANSPARENT),
        };

        let mut colors = Box::new([Rgba8::TRANSPARENT; LUT_SIZE]);
        let mut seg = 0usize;
        for (i, out) in colors.iter_mut().enumerate() {
            let pos = i as u32;
            if pos <= first.ratio as u32 {
                *out = first.color;
                continue;
            }
            if pos >= last.ratio as u32 {
                *out = last.color;
                continue;
            }
            while seg + 1 < records.len() && records[seg + 1].ratio as u32 <= pos {
                seg += 1;
            }
            let a = &records[seg];
            let b = match records.get(seg + 1) {
                Some(b) => b,
                None => {
                    *out = a.color;
                    continue;
                }
            };
            let span = b.ratio as f64 - a.ratio as f64;
            let k = if span > 0.0 {
                (pos as f64 - a.ratio as f64) / span
            } else {
                0.0
            };
            *out = a.color.gradient(&b.color, k);
        }
        Self { colors }
    }

    /// Copy of this table with `cxform` applied to every entry.
    pub fn transformed(&self, cxform: &ColorTransform) -> Self {
        let mut colors = self.colors.clone();
        cxform.transform_span(&mut colors[..]);
        Self { colors }
    }

    #[inline]
    pub fn size(&self) -> usize {
        LUT_SIZE
    }

    #[inline]
    pub fn get(&self, index: usize) -> Rgba8 {
        self.colors[index.min(LUT_SIZE - 1)]
    }

    pub fn as_slice(&self) -> &[Rgba8] {
        &self.colors[..]
    }
}

impl std::fmt::Debug for GradientLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradientLut")
            .field("first", &self.colors[0])
            .field("last", &self.colors[LUT_SIZE - 1])
            .finish()
    }
}
