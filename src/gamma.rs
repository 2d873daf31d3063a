//! Coverage gamma curves.
//!
//! The compound rasterizer maps every computed coverage value through a
//! 256-entry table built from one of these functions before it reaches the
//! scanline.

use crate::basics::uround;

/// Maps normalized coverage in [0, 1] to adjusted coverage in [0, 1].
pub trait GammaFunction {
    fn call(&self, x: f64) -> f64;
}

/// Identity curve.
#[derive(Debug, Clone, Copy, Default)]
pub struct GammaNone;

impl GammaFunction for GammaNone {
    #[inline]
    fn call(&self, x: f64) -> f64 {
        x
    }
}

/// `x^gamma`. Values below 1.0 thicken anti-aliased edges, values above
/// thin them.
#[derive(Debug, Clone, Copy)]
pub struct GammaPower {
    gamma: f64,
}

impl GammaPower {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for GammaPower {
    fn default() -> Self {
        Self { gamma: 1.0 }
    }
}

impl GammaFunction for GammaPower {
    #[inline]
    fn call(&self, x: f64) -> f64 {
        x.powf(self.gamma)
    }
}

/// Sample `f` into a coverage lookup table.
pub fn gamma_table<G: GammaFunction>(f: &G) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, v) in table.iter_mut().enumerate() {
        let g = f.call(i as f64 / 255.0).max(0.0).min(1.0);
        *v = uround(g * 255.0) as u8;
    }
    table
}
