//! Render configuration and the context passed to every render call.

use std::fmt;
use std::sync::Arc;

use crate::bitmap::BitmapResolver;

/// Which bitmap filter fills use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingPolicy {
    /// Bilinear when the fill style asks for smoothing, nearest otherwise.
    FromStyle,
    Always,
    Never,
}

impl Default for SmoothingPolicy {
    fn default() -> Self {
        SmoothingPolicy::FromStyle
    }
}

impl SmoothingPolicy {
    pub fn apply(self, style_smooth: bool) -> bool {
        match self {
            SmoothingPolicy::FromStyle => style_smooth,
            SmoothingPolicy::Always => true,
            SmoothingPolicy::Never => false,
        }
    }
}

/// Quality settings of a render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub bitmap_smoothing: SmoothingPolicy,
    /// Maximum distance between a curve and its flattening, in device
    /// pixels.
    pub curve_tolerance: f64,
    /// Power applied to anti-aliased coverage.
    pub gamma: f64,
    /// Device width of hairline strokes, and the minimum of all others.
    pub hairline_width: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            bitmap_smoothing: SmoothingPolicy::FromStyle,
            curve_tolerance: 0.25,
            gamma: 1.0,
            hairline_width: 1.0,
        }
    }
}

/// Everything a render needs besides the shape and its placement.
#[derive(Clone, Default)]
pub struct RenderContext {
    pub config: RenderConfig,
    bitmaps: Option<Arc<dyn BitmapResolver>>,
}

impl RenderContext {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            bitmaps: None,
        }
    }

    pub fn with_bitmap_resolver(mut self, resolver: Arc<dyn BitmapResolver>) -> Self {
        self.bitmaps = Some(resolver);
        self
    }

    pub fn has_bitmap_resolver(&self) -> bool {
        self.bitmaps.is_some()
    }

    pub fn bitmap_resolver(&self) -> Option<&dyn BitmapResolver> {
        self.bitmaps.as_deref()
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.config)
            .field("has_bitmap_resolver", &self.has_bitmap_resolver())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::BitmapInfo;

    #[test]
    fn test_smoothing_policy() {
        assert!(SmoothingPolicy::FromStyle.apply(true));
        assert!(!SmoothingPolicy::FromStyle.apply(false));
        assert!(SmoothingPolicy::Always.apply(false));
        assert!(!SmoothingPolicy::Never.apply(true));
    }

    #[test]
    fn test_resolver_registration() {
        let ctx = RenderContext::default();
        assert!(!ctx.has_bitmap_resolver());
        assert_eq!(ctx.config, RenderConfig::default());

        let resolver = |_id: u16| -> Option<Arc<BitmapInfo>> { None };
        let ctx = ctx.with_bitmap_resolver(Arc::new(resolver));
        assert!(ctx.has_bitmap_resolver());
        assert!(ctx.bitmap_resolver().and_then(|r| r.bitmap(3)).is_none());
        assert!(format!("{:?}", ctx).contains("has_bitmap_resolver: true"));
    }
}
