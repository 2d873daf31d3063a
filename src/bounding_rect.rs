//! Nullable axis-aligned bounding rectangle in twips.
//!
//! Mirrors the SWF RECT record. A null rectangle is the identity for
//! union: expanding it by a point yields that point's degenerate box.

use std::io::{Read, Seek};

use crate::basics::RectI;
use crate::error::Result;
use crate::stream::SwfStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingRect {
    range: Option<RectI>,
}

impl BoundingRect {
    pub const fn null() -> Self {
        Self { range: None }
    }

    /// Rectangle from its extremes; the corners are normalized.
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        let mut r = RectI::new(x_min, y_min, x_max, y_max);
        r.normalize();
        Self { range: Some(r) }
    }

    /// Read a RECT record: 5-bit field width, then xmin, xmax, ymin, ymax.
    ///
    /// A record with inverted extremes yields a null rectangle.
    pub fn read<R: Read + Seek>(stream: &mut SwfStream<R>) -> Result<Self> {
        stream.align();
        stream.ensure_bits(5)?;
        let nbits = stream.read_uint(5)?;
        stream.ensure_bits(nbits as u64 * 4)?;
        let x_min = stream.read_sint(nbits)?;
        let x_max = stream.read_sint(nbits)?;
        let y_min = stream.read_sint(nbits)?;
        let y_max = stream.read_sint(nbits)?;
        stream.align();

        if x_max < x_min || y_max < y_min {
            log::warn!(
                "inverted rectangle ({}, {}) - ({}, {}), treating as null",
                x_min,
                y_min,
                x_max,
                y_max
            );
            return Ok(Self::null());
        }
        Ok(Self {
            range: Some(RectI::new(x_min, y_min, x_max, y_max)),
        })
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.range.is_none()
    }

    pub fn rect(&self) -> Option<RectI> {
        self.range
    }

    pub fn width(&self) -> i32 {
        self.range.map_or(0, |r| r.x2 - r.x1)
    }

    pub fn height(&self) -> i32 {
        self.range.map_or(0, |r| r.y2 - r.y1)
    }

    pub fn expand_to_point(&mut self, x: i32, y: i32) {
        match &mut self.range {
            None => self.range = Some(RectI::new(x, y, x, y)),
            Some(r) => {
                r.x1 = r.x1.min(x);
                r.y1 = r.y1.min(y);
                r.x2 = r.x2.max(x);
                r.y2 = r.y2.max(y);
            }
        }
    }

    /// Expand by the box around a circle of `radius` centered on (x, y).
    pub fn expand_to_circle(&mut self, x: i32, y: i32, radius: i32) {
        self.expand_to_point(x.saturating_sub(radius), y.saturating_sub(radius));
        self.expand_to_point(x.saturating_add(radius), y.saturating_add(radius));
    }

    pub fn expand_to_rect(&mut self, other: &BoundingRect) {
        if let Some(r) = other.range {
            self.expand_to_point(r.x1, r.y1);
            self.expand_to_point(r.x2, r.y2);
        }
    }

    /// Inclusive containment test in (fractional) twips.
    pub fn point_within(&self, x: f64, y: f64) -> bool {
        self.range.map_or(false, |r| {
            x >= r.x1 as f64 && x <= r.x2 as f64 && y >= r.y1 as f64 && y <= r.y2 as f64
        })
    }

    /// True when `other` lies entirely inside `self`. A null `other` is
    /// contained in anything.
    pub fn contains(&self, other: &BoundingRect) -> bool {
        match (self.range, other.range) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => b.x1 >= a.x1 && b.y1 >= a.y1 && b.x2 <= a.x2 && b.y2 <= a.y2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_writer::BitWriter;
    use std::io::Cursor;

    #[test]
    fn test_read_rect() {
        let mut w = BitWriter::new();
        w.write_rect(-20, 2000, 0, 1500);
        w.write_u8(0xAB);
        let mut s = SwfStream::new(Cursor::new(w.into_bytes()));
        let r = BoundingRect::read(&mut s).unwrap();
        assert_eq!(r, BoundingRect::new(-20, 0, 2000, 1500));
        assert_eq!(r.width(), 2020);
        assert_eq!(s.read_u8().unwrap(), 0xAB);
    }

    #[test]
    fn test_read_inverted_rect_is_null() {
        let mut w = BitWriter::new();
        w.write_rect(100, 0, 0, 100);
        let mut s = SwfStream::new(Cursor::new(w.into_bytes()));
        assert!(BoundingRect::read(&mut s).unwrap().is_null());
    }

    #[test]
    fn test_expand() {
        let mut r = BoundingRect::null();
        assert!(r.is_null());
        assert!(!r.point_within(0.0, 0.0));
        r.expand_to_point(10, 10);
        r.expand_to_point(-5, 20);
        assert_eq!(r, BoundingRect::new(-5, 10, 10, 20));
        r.expand_to_circle(0, 0, 3);
        assert_eq!(r, BoundingRect::new(-5, -3, 10, 20));
        let mut u = BoundingRect::null();
        u.expand_to_rect(&r);
        assert_eq!(u, r);
    }

    #[test]
    fn test_point_within_and_contains() {
        let r = BoundingRect::new(0, 0, 100, 100);
        assert!(r.point_within(100.0, 0.0));
        assert!(!r.point_within(100.001, 50.0));
        assert!(r.contains(&BoundingRect::new(10, 10, 90, 100)));
        assert!(!r.contains(&BoundingRect::new(10, 10, 90, 101)));
        assert!(r.contains(&BoundingRect::null()));
        assert!(!BoundingRect::null().contains(&r));
    }
}
