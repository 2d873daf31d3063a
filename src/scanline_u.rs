//! Unpacked scanline container.
//!
//! Holds one coverage byte per pixel for a single row, grouped into spans
//! of adjacent pixels. The compound rasterizer fills it one style at a
//! time; the renderer walks its spans.

// ============================================================================
// Scanline trait
// ============================================================================

/// Sink for the spans of one rasterized row. X values must be added in
/// increasing order between `reset_spans` and `finalize`.
pub trait Scanline {
    fn reset_spans(&mut self);
    fn add_cell(&mut self, x: i32, cover: u32);
    fn add_span(&mut self, x: i32, len: u32, cover: u32);
    fn finalize(&mut self, y: i32);
    fn num_spans(&self) -> u32;
    fn y(&self) -> i32;
}

/// A horizontal run within a scanline. `cover_offset` indexes the
/// scanline's coverage array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanlineSpan {
    pub x: i32,
    pub len: u32,
    pub cover_offset: usize,
}

// ============================================================================
// ScanlineU8
// ============================================================================

/// Scanline with one u8 coverage value per pixel, indexed by `x - min_x`.
///
/// Call `reset(min_x, max_x)` once per render with the rasterizer's X
/// range before adding cells.
#[derive(Debug, Clone)]
pub struct ScanlineU8 {
    min_x: i32,
    last_x: i32,
    y: i32,
    covers: Vec<u8>,
    spans: Vec<ScanlineSpan>,
}

const NO_LAST_X: i32 = 0x7FFF_FFF0;

impl ScanlineU8 {
    pub fn new() -> Self {
        Self {
            min_x: 0,
            last_x: NO_LAST_X,
            y: 0,
            covers: Vec::new(),
            spans: Vec::new(),
        }
    }

    pub fn reset(&mut self, min_x: i32, max_x: i32) {
        let max_len = (max_x - min_x + 2).max(0) as usize;
        if max_len > self.covers.len() {
            self.covers.resize(max_len, 0);
        }
        self.spans.clear();
        self.last_x = NO_LAST_X;
        self.min_x = min_x;
    }

    pub fn spans(&self) -> &[ScanlineSpan] {
        &self.spans
    }

    /// Coverage values of `span`.
    pub fn covers(&self, span: &ScanlineSpan) -> &[u8] {
        &self.covers[span.cover_offset..span.cover_offset + span.len as usize]
    }

    fn push(&mut self, x: i32, xi: usize, len: u32) {
        match self.spans.last_mut() {
            Some(last) if xi as i32 == self.last_x + 1 => last.len += len,
            _ => self.spans.push(ScanlineSpan {
                x,
                len,
                cover_offset: xi,
            }),
        }
        self.last_x = xi as i32 + len as i32 - 1;
    }
}

impl Scanline for ScanlineU8 {
    fn reset_spans(&mut self) {
        self.last_x = NO_LAST_X;
        self.spans.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        let xi = (x - self.min_x) as usize;
        self.covers[xi] = cover as u8;
        self.push(x, xi, 1);
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let xi = (x - self.min_x) as usize;
        for c in &mut self.covers[xi..xi + len as usize] {
            *c = cover as u8;
        }
        self.push(x, xi, len);
    }

    fn finalize(&mut self, y: i32) {
        self.y = y;
    }

    fn num_spans(&self) -> u32 {
        self.spans.len() as u32
    }

    fn y(&self) -> i32 {
        self.y
    }
}

impl Default for ScanlineU8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_cells_merge() {
        let mut sl = ScanlineU8::new();
        sl.reset(10, 30);
        sl.add_cell(10, 100);
        sl.add_cell(11, 200);
        sl.add_span(12, 3, 255);
        sl.finalize(7);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.y(), 7);
        let span = sl.spans()[0];
        assert_eq!((span.x, span.len), (10, 5));
        assert_eq!(sl.covers(&span), &[100, 200, 255, 255, 255]);
    }

    #[test]
    fn test_gap_starts_new_span() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 20);
        sl.add_cell(2, 50);
        sl.add_span(5, 2, 60);
        assert_eq!(sl.num_spans(), 2);
        assert_eq!(sl.spans()[1].x, 5);
        assert_eq!(sl.covers(&sl.spans()[1]), &[60, 60]);

        sl.reset_spans();
        assert_eq!(sl.num_spans(), 0);
        sl.add_cell(0, 1);
        assert_eq!(sl.spans()[0].cover_offset, 0);
    }

    #[test]
    fn test_negative_min_x() {
        let mut sl = ScanlineU8::new();
        sl.reset(-5, 5);
        sl.add_cell(-5, 9);
        assert_eq!(sl.spans()[0].x, -5);
        assert_eq!(sl.covers(&sl.spans()[0]), &[9]);
    }
}
