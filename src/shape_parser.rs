//! SHAPEWITHSTYLE and glyph SHAPE record decoding.
//!
//! Shape records are a bit-packed stream of style changes and edges. Each
//! style change ends the current path; edges extend it. Style indices are
//! 1-based and relative to the style arrays introduced by the most recent
//! NEW_STYLES record, so they are rebased as they are read.

use std::io::{Read, Seek};

use bitflags::bitflags;
use log::{debug, warn};

use crate::basics::{PointI, WindingRule};
use crate::bitmap::BitmapResolver;
use crate::bounding_rect::BoundingRect;
use crate::error::{ParseError, Result};
use crate::fill_style::{read_fill_styles, read_line_styles, ShapeTag};
use crate::log_once;
use crate::path::Path;
use crate::shape::Shape;
use crate::stream::SwfStream;

bitflags! {
    /// Flag bits of a STYLECHANGERECORD. All clear marks the end of the
    /// shape.
    pub struct StyleChange: u8 {
        const MOVE = 0x01;
        const FILL0 = 0x02;
        const FILL1 = 0x04;
        const LINE = 0x08;
        const NEW_STYLES = 0x10;
    }
}

/// DefineShape4 flag: fill with the nonzero winding rule.
const SHAPE4_NONZERO_WINDING: u8 = 0x04;
const SHAPE4_NON_SCALING_STROKES: u8 = 0x02;

/// Read a SHAPEWITHSTYLE body: bounds, styles and records.
pub fn read_shape<R: Read + Seek>(
    stream: &mut SwfStream<R>,
    tag: ShapeTag,
    resolver: Option<&dyn BitmapResolver>,
) -> Result<Shape> {
    let mut shape = Shape::new();
    shape.bounds = BoundingRect::read(stream)?;

    if tag == ShapeTag::DefineShape4 {
        shape.edge_bounds = Some(BoundingRect::read(stream)?);
        stream.ensure_bytes(1)?;
        let flags = stream.read_u8()?;
        if flags & SHAPE4_NONZERO_WINDING != 0 {
            shape.winding_rule = WindingRule::NonZero;
        }
        if flags & SHAPE4_NON_SCALING_STROKES != 0 {
            log_once::unimplemented("DefineShape4 stroke scaling hints");
        }
    }

    shape.fill_styles = read_fill_styles(stream, tag, resolver)?;
    shape.line_styles = read_line_styles(stream, tag, resolver)?;

    let declared = shape.bounds;
    ShapeParser::new(Some((tag, resolver))).read_records(stream, &mut shape)?;

    let computed = shape.compute_bounds();
    if !declared.contains(&computed) {
        debug!(
            "shape geometry {:?} exceeds declared bounds {:?}",
            computed.rect(),
            declared.rect()
        );
    }
    Ok(shape)
}

/// Read a glyph SHAPE: records only, no style arrays. Paths may use fill
/// style 1 and nothing else.
pub fn read_glyph<R: Read + Seek>(stream: &mut SwfStream<R>) -> Result<Shape> {
    let mut shape = Shape::new();
    ShapeParser::new(None).read_records(stream, &mut shape)?;
    shape.bounds = shape.compute_bounds();
    Ok(shape)
}

/// Record decoder state. `styled` is `None` in glyph context.
struct ShapeParser<'a> {
    styled: Option<(ShapeTag, Option<&'a dyn BitmapResolver>)>,
    pen: PointI,
    fill_base: u32,
    line_base: u32,
    fill_bits: u32,
    line_bits: u32,
}

impl<'a> ShapeParser<'a> {
    fn new(styled: Option<(ShapeTag, Option<&'a dyn BitmapResolver>)>) -> Self {
        Self {
            styled,
            pen: PointI::new(0, 0),
            fill_base: 0,
            line_base: 0,
            fill_bits: 0,
            line_bits: 0,
        }
    }

    fn read_records<R: Read + Seek>(
        &mut self,
        stream: &mut SwfStream<R>,
        shape: &mut Shape,
    ) -> Result<()> {
        stream.ensure_bytes(1)?;
        let widths = stream.read_u8()?;
        self.fill_bits = (widths >> 4) as u32;
        self.line_bits = (widths & 0x0F) as u32;
        if self.styled.is_none() && self.fill_bits == 0 && self.line_bits == 0 {
            return Ok(());
        }

        let mut current = Path::new(0, 0, 0, 0, 0, false);
        loop {
            stream.ensure_bits(1)?;
            let is_edge = stream.read_bit()?;
            if is_edge {
                self.read_edge(stream, &mut current)?;
                continue;
            }

            stream.ensure_bits(5)?;
            let bits = stream.read_uint(5)? as u8;
            if bits == 0 {
                break;
            }
            let flags = StyleChange::from_bits_truncate(bits);

            if !current.is_empty() {
                let next = Path::new(
                    self.pen.x,
                    self.pen.y,
                    current.fill0,
                    current.fill1,
                    current.line,
                    false,
                );
                shape.paths.push(std::mem::replace(&mut current, next));
            }

            if flags.contains(StyleChange::MOVE) {
                stream.ensure_bits(5)?;
                let n = stream.read_uint(5)?;
                stream.ensure_bits(2 * n as u64)?;
                let x = stream.read_sint(n)?;
                let y = stream.read_sint(n)?;
                self.pen = PointI::new(x, y);
            }
            current.ap = self.pen;

            if flags.contains(StyleChange::FILL0) {
                current.fill0 = self.read_fill_index(stream, shape)?;
            }
            if flags.contains(StyleChange::FILL1) {
                current.fill1 = self.read_fill_index(stream, shape)?;
            }
            if flags.contains(StyleChange::LINE) {
                current.line = self.read_line_index(stream, shape)?;
            }

            if flags.contains(StyleChange::NEW_STYLES) {
                let (tag, resolver) = match self.styled {
                    Some(s) => s,
                    None => {
                        return Err(ParseError::InvalidData(
                            "glyph shape declares new styles".into(),
                        ))
                    }
                };
                self.fill_base = shape.fill_styles.len() as u32;
                self.line_base = shape.line_styles.len() as u32;
                let fills = read_fill_styles(stream, tag, resolver)?;
                let lines = read_line_styles(stream, tag, resolver)?;
                debug!(
                    "new styles: {} fills at {}, {} lines at {}",
                    fills.len(),
                    self.fill_base,
                    lines.len(),
                    self.line_base
                );
                shape.fill_styles.extend(fills);
                shape.line_styles.extend(lines);
                stream.ensure_bits(8)?;
                self.fill_bits = stream.read_uint(4)?;
                self.line_bits = stream.read_uint(4)?;
                current.new_shape = true;
            }
        }

        if !current.is_empty() {
            shape.paths.push(current);
        }
        Ok(())
    }

    fn read_edge<R: Read + Seek>(&mut self, stream: &mut SwfStream<R>, path: &mut Path) -> Result<()> {
        stream.ensure_bits(5)?;
        let straight = stream.read_bit()?;
        let n = stream.read_uint(4)? + 2;

        if !straight {
            stream.ensure_bits(4 * n as u64)?;
            let cx = self.pen.x.saturating_add(stream.read_sint(n)?);
            let cy = self.pen.y.saturating_add(stream.read_sint(n)?);
            let ax = cx.saturating_add(stream.read_sint(n)?);
            let ay = cy.saturating_add(stream.read_sint(n)?);
            path.curve_to(cx, cy, ax, ay);
            self.pen = PointI::new(ax, ay);
            return Ok(());
        }

        stream.ensure_bits(1)?;
        let (dx, dy) = if stream.read_bit()? {
            stream.ensure_bits(2 * n as u64)?;
            let dx = stream.read_sint(n)?;
            let dy = stream.read_sint(n)?;
            (dx, dy)
        } else {
            stream.ensure_bits(1 + n as u64)?;
            let vertical = stream.read_bit()?;
            let d = stream.read_sint(n)?;
            if vertical {
                (0, d)
            } else {
                (d, 0)
            }
        };
        self.pen = PointI::new(self.pen.x.saturating_add(dx), self.pen.y.saturating_add(dy));
        path.line_to(self.pen.x, self.pen.y);
        Ok(())
    }

    fn read_fill_index<R: Read + Seek>(
        &mut self,
        stream: &mut SwfStream<R>,
        shape: &Shape,
    ) -> Result<u32> {
        stream.ensure_bits(self.fill_bits as u64)?;
        let raw = stream.read_uint(self.fill_bits)?;
        self.check_index(raw, self.fill_base, shape.fill_styles.len(), "fill")
    }

    fn read_line_index<R: Read + Seek>(
        &mut self,
        stream: &mut SwfStream<R>,
        shape: &Shape,
    ) -> Result<u32> {
        stream.ensure_bits(self.line_bits as u64)?;
        let raw = stream.read_uint(self.line_bits)?;
        self.check_index(raw, self.line_base, shape.line_styles.len(), "line")
    }

    fn check_index(&self, raw: u32, base: u32, count: usize, kind: &str) -> Result<u32> {
        if raw == 0 {
            return Ok(0);
        }
        if self.styled.is_none() {
            if raw > 1 {
                return Err(ParseError::InvalidData(format!(
                    "glyph uses {} style {}",
                    kind, raw
                )));
            }
            return Ok(raw);
        }
        let index = raw.saturating_add(base);
        if index as usize > count {
            warn!(
                "{} style index {} out of range ({} styles), using none",
                kind, index, count
            );
            return Ok(0);
        }
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_writer::BitWriter;
    use crate::color::Rgba8;
    use crate::fill_style::FillStyle;
    use std::io::Cursor;

    fn stream(bytes: Vec<u8>) -> SwfStream<Cursor<Vec<u8>>> {
        SwfStream::new(Cursor::new(bytes))
    }

    fn style_change(
        w: &mut BitWriter,
        moveto: Option<(i32, i32)>,
        fill0: Option<u32>,
        fill1: Option<u32>,
        fill_bits: u32,
    ) {
        w.write_bit(false);
        w.write_bit(false); // new styles
        w.write_bit(false); // line
        w.write_bit(fill1.is_some());
        w.write_bit(fill0.is_some());
        w.write_bit(moveto.is_some());
        if let Some((x, y)) = moveto {
            w.write_bits(15, 5);
            w.write_sbits(x, 15);
            w.write_sbits(y, 15);
        }
        if let Some(f) = fill0 {
            w.write_bits(f, fill_bits);
        }
        if let Some(f) = fill1 {
            w.write_bits(f, fill_bits);
        }
    }

    fn line(w: &mut BitWriter, dx: i32, dy: i32) {
        w.write_bit(true);
        w.write_bit(true);
        w.write_bits(14, 4); // 16-bit deltas
        if dx == 0 || dy == 0 {
            w.write_bit(false);
            w.write_bit(dx == 0);
            w.write_sbits(if dx == 0 { dy } else { dx }, 16);
        } else {
            w.write_bit(true);
            w.write_sbits(dx, 16);
            w.write_sbits(dy, 16);
        }
    }

    fn curve(w: &mut BitWriter, cdx: i32, cdy: i32, adx: i32, ady: i32) {
        w.write_bit(true);
        w.write_bit(false);
        w.write_bits(14, 4);
        for v in [cdx, cdy, adx, ady] {
            w.write_sbits(v, 16);
        }
    }

    fn end(w: &mut BitWriter) {
        w.write_bit(false);
        w.write_bits(0, 5);
        w.align();
    }

    /// DefineShape body up to the records: bounds, `fills` solid fills, no
    /// lines, then the record widths.
    fn shape_header(w: &mut BitWriter, fills: u8, fill_bits: u8) {
        w.write_rect(0, 100, 0, 100);
        w.write_u8(fills);
        for i in 0..fills {
            w.write_bytes(&[0x00, i, 0, 0]);
        }
        w.write_u8(0);
        w.write_u8(fill_bits << 4);
    }

    #[test]
    fn test_square() {
        let mut w = BitWriter::new();
        shape_header(&mut w, 1, 2);
        style_change(&mut w, Some((0, 0)), Some(1), None, 2);
        line(&mut w, 100, 0);
        line(&mut w, 0, 100);
        line(&mut w, -100, 0);
        line(&mut w, 0, -100);
        end(&mut w);

        let shape = read_shape(&mut stream(w.into_bytes()), ShapeTag::DefineShape, None).unwrap();
        assert_eq!(shape.paths.len(), 1);
        assert_eq!(shape.paths[0].edges.len(), 4);
        assert_eq!(shape.paths[0].fill0, 1);
        assert_eq!(shape.bounds, BoundingRect::new(0, 0, 100, 100));
        assert_eq!(shape.fill_styles, vec![FillStyle::Solid(Rgba8::BLACK)]);
        assert_eq!(shape.winding_rule, WindingRule::EvenOdd);
    }

    #[test]
    fn test_curve_anchor_accumulates_from_control() {
        let mut w = BitWriter::new();
        shape_header(&mut w, 1, 2);
        style_change(&mut w, Some((10, 10)), Some(1), None, 2);
        curve(&mut w, 40, -10, 40, 10);
        end(&mut w);
        let shape = read_shape(&mut stream(w.into_bytes()), ShapeTag::DefineShape, None).unwrap();
        let e = shape.paths[0].edges[0];
        assert_eq!(e.cp, PointI::new(50, 0));
        assert_eq!(e.ap, PointI::new(90, 10));
    }

    #[test]
    fn test_style_change_splits_paths() {
        let mut w = BitWriter::new();
        shape_header(&mut w, 2, 2);
        style_change(&mut w, Some((0, 0)), Some(1), None, 2);
        line(&mut w, 50, 0);
        style_change(&mut w, None, None, Some(2), 2);
        line(&mut w, 0, 50);
        end(&mut w);
        let shape = read_shape(&mut stream(w.into_bytes()), ShapeTag::DefineShape, None).unwrap();
        assert_eq!(shape.paths.len(), 2);
        let second = &shape.paths[1];
        assert_eq!(second.ap, PointI::new(50, 0));
        assert_eq!((second.fill0, second.fill1), (1, 2));
        assert!(!second.new_shape);
    }

    #[test]
    fn test_out_of_range_fill_clamped() {
        let mut w = BitWriter::new();
        shape_header(&mut w, 2, 3);
        style_change(&mut w, Some((0, 0)), Some(5), None, 3);
        line(&mut w, 50, 0);
        end(&mut w);
        let shape = read_shape(&mut stream(w.into_bytes()), ShapeTag::DefineShape, None).unwrap();
        assert_eq!(shape.paths[0].fill0, 0);
    }

    #[test]
    fn test_new_styles_rebase() {
        let mut w = BitWriter::new();
        shape_header(&mut w, 1, 2);
        style_change(&mut w, Some((0, 0)), Some(1), None, 2);
        line(&mut w, 50, 0);
        // NEW_STYLES: two more fills, then new widths.
        w.write_bit(false);
        w.write_bits(0x10, 5);
        w.write_u8(2);
        w.write_bytes(&[0x00, 1, 1, 1, 0x00, 2, 2, 2]);
        w.write_u8(0);
        w.write_bits(2, 4);
        w.write_bits(0, 4);
        style_change(&mut w, None, None, Some(2), 2);
        line(&mut w, 0, 50);
        end(&mut w);

        let shape = read_shape(&mut stream(w.into_bytes()), ShapeTag::DefineShape2, None).unwrap();
        assert_eq!(shape.fill_styles.len(), 3);
        assert_eq!(shape.paths.len(), 2);
        let p = &shape.paths[1];
        assert!(p.new_shape);
        assert_eq!(p.fill1, 3);
        assert_eq!(shape.fill_styles[2], FillStyle::Solid(Rgba8::new_opaque(2, 2, 2)));
        assert_eq!(shape.subshapes().count(), 2);
    }

    #[test]
    fn test_shape4_header() {
        let mut w = BitWriter::new();
        w.write_rect(-10, 110, -10, 110);
        w.write_rect(0, 100, 0, 100);
        w.write_u8(0x04);
        w.write_u8(0);
        w.write_u8(0);
        w.write_u8(0x00);
        end(&mut w);
        let shape = read_shape(&mut stream(w.into_bytes()), ShapeTag::DefineShape4, None).unwrap();
        assert_eq!(shape.winding_rule, WindingRule::NonZero);
        assert_eq!(shape.edge_bounds, Some(BoundingRect::new(0, 0, 100, 100)));
        assert!(shape.is_empty());
    }

    #[test]
    fn test_truncated_shape_fails() {
        let mut w = BitWriter::new();
        shape_header(&mut w, 1, 2);
        style_change(&mut w, Some((0, 0)), Some(1), None, 2);
        let mut body = w.into_bytes();
        body.truncate(body.len() - 1);
        let mut tag = BitWriter::new();
        tag.write_tag(2, &body);
        let mut s = stream(tag.into_bytes());
        s.open_tag().unwrap();
        assert!(read_shape(&mut s, ShapeTag::DefineShape, None).is_err());
    }

    fn glyph_header(w: &mut BitWriter) {
        w.write_u8(0x10);
    }

    #[test]
    fn test_glyph() {
        let mut w = BitWriter::new();
        glyph_header(&mut w);
        // Glyph records use a 1-bit fill index.
        w.write_bit(false);
        w.write_bits(0x03, 5); // FILL0 | MOVE
        w.write_bits(15, 5);
        w.write_sbits(-20, 15);
        w.write_sbits(0, 15);
        w.write_bits(1, 1);
        line(&mut w, 40, 0);
        line(&mut w, 0, -60);
        line(&mut w, -40, 60);
        end(&mut w);
        let shape = read_glyph(&mut stream(w.into_bytes())).unwrap();
        assert_eq!(shape.paths.len(), 1);
        assert_eq!(shape.paths[0].fill0, 1);
        assert_eq!(shape.bounds, BoundingRect::new(-20, -60, 20, 0));
        assert!(shape.fill_styles.is_empty());
    }

    #[test]
    fn test_glyph_rejects_style_two() {
        let mut w = BitWriter::new();
        w.write_u8(0x20);
        w.write_bit(false);
        w.write_bits(0x02, 5);
        w.write_bits(2, 2);
        end(&mut w);
        match read_glyph(&mut stream(w.into_bytes())) {
            Err(ParseError::InvalidData(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_glyph_rejects_new_styles() {
        let mut w = BitWriter::new();
        glyph_header(&mut w);
        w.write_bit(false);
        w.write_bits(0x10, 5);
        w.write_bytes(&[0, 0, 0]);
        match read_glyph(&mut stream(w.into_bytes())) {
            Err(ParseError::InvalidData(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_glyph() {
        // Both widths zero: nothing else is read.
        let shape = read_glyph(&mut stream(vec![0x00])).unwrap();
        assert!(shape.paths.is_empty());
        assert!(shape.bounds.is_null());
    }
}
