//! Definition loading.
//!
//! Walks the tag stream of a movie and decodes the definitions this crate
//! renders: shapes and DefineFont glyph outlines. Every other tag is
//! skipped. A tag that fails to decode is logged and dropped; the loop
//! resumes at the next tag header.

use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::sync::Arc;

use log::{debug, error, warn};

use crate::bitmap::{BitmapInfo, BitmapResolver};
use crate::error::{ParseError, Result};
use crate::fill_style::ShapeTag;
use crate::header::{read_header, SwfHeader};
use crate::shape::Shape;
use crate::shape_parser::{read_glyph, read_shape};
use crate::stream::{SwfStream, TagHeader};

pub const TAG_END: u16 = 0;
pub const TAG_DEFINE_FONT: u16 = 10;

/// Glyph outlines of a DefineFont.
#[derive(Debug, Clone, Default)]
pub struct Font {
    pub glyphs: Vec<Shape>,
}

#[derive(Debug, Clone)]
pub enum Character {
    Shape(Arc<Shape>),
    Font(Arc<Font>),
}

/// Characters by id, plus the bitmaps registered by the host.
#[derive(Debug, Default)]
pub struct Library {
    characters: BTreeMap<u16, Character>,
    bitmaps: BTreeMap<u16, Arc<BitmapInfo>>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `bitmap` available to fills referencing `id`. Register bitmaps
    /// before loading the shapes that use them.
    pub fn add_bitmap(&mut self, id: u16, bitmap: Arc<BitmapInfo>) {
        self.bitmaps.insert(id, bitmap);
    }

    pub fn character(&self, id: u16) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn shape(&self, id: u16) -> Option<&Arc<Shape>> {
        match self.characters.get(&id) {
            Some(Character::Shape(s)) => Some(s),
            _ => None,
        }
    }

    pub fn font(&self, id: u16) -> Option<&Arc<Font>> {
        match self.characters.get(&id) {
            Some(Character::Font(f)) => Some(f),
            _ => None,
        }
    }

    /// Characters in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Character)> + '_ {
        self.characters.iter().map(|(&id, c)| (id, c))
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    fn define(&mut self, id: u16, c: Character) {
        if self.characters.contains_key(&id) {
            warn!("character {} defined twice, keeping the first", id);
            return;
        }
        self.characters.insert(id, c);
    }

    /// Decode the tags of `stream` until an End tag or the end of input.
    /// Returns the number of definitions added. An error here means a tag
    /// header could not be read; whatever was loaded before it stays.
    pub fn load_tags<R: Read + Seek>(&mut self, stream: &mut SwfStream<R>, end: u64) -> Result<usize> {
        let before = self.len();
        while stream.tell() < end {
            let tag = stream.open_tag()?;
            if tag.tag_type == TAG_END {
                stream.close_tag()?;
                break;
            }
            if let Err(e) = self.load_tag(stream, &tag) {
                error!(
                    "failed to decode tag {} at offset {}: {}",
                    tag.tag_type, tag.start, e
                );
                if e.is_desynchronizing() {
                    return Err(e);
                }
            }
            stream.close_tag()?;
        }
        Ok(self.len() - before)
    }

    fn load_tag<R: Read + Seek>(&mut self, stream: &mut SwfStream<R>, tag: &TagHeader) -> Result<()> {
        if let Some(kind) = ShapeTag::from_tag_code(tag.tag_type) {
            stream.ensure_bytes(2)?;
            let id = stream.read_u16()?;
            let shape = read_shape(stream, kind, Some(&*self as &dyn BitmapResolver))?;
            debug!("shape {}: {} paths", id, shape.paths.len());
            self.define(id, Character::Shape(Arc::new(shape)));
        } else if tag.tag_type == TAG_DEFINE_FONT {
            stream.ensure_bytes(2)?;
            let id = stream.read_u16()?;
            let font = read_define_font(stream, tag)?;
            debug!("font {}: {} glyphs", id, font.glyphs.len());
            self.define(id, Character::Font(Arc::new(font)));
        }
        Ok(())
    }
}

impl BitmapResolver for Library {
    fn bitmap(&self, id: u16) -> Option<Arc<BitmapInfo>> {
        self.bitmaps.get(&id).cloned()
    }
}

/// DefineFont body after the id: a table of 16-bit glyph offsets relative
/// to the table start, then the glyph shapes. The first offset gives the
/// table size and so the glyph count.
fn read_define_font<R: Read + Seek>(stream: &mut SwfStream<R>, tag: &TagHeader) -> Result<Font> {
    let table = stream.tell();
    if table == tag.end {
        return Ok(Font::default());
    }
    stream.ensure_bytes(2)?;
    let first = stream.read_u16()?;
    if first % 2 != 0 {
        return Err(ParseError::InvalidData(format!(
            "odd font offset table size {}",
            first
        )));
    }
    let count = (first / 2) as usize;
    stream.ensure_bytes(2 * count.saturating_sub(1) as u64)?;
    let mut offsets = vec![first];
    for _ in 1..count {
        offsets.push(stream.read_u16()?);
    }

    let mut glyphs = Vec::with_capacity(count);
    for off in offsets {
        stream.set_position(table + off as u64)?;
        glyphs.push(read_glyph(stream)?);
    }
    Ok(Font { glyphs })
}

/// Outcome of loading a whole file.
#[derive(Debug)]
pub struct LoadedMovie {
    pub header: SwfHeader,
    pub library: Library,
    /// Set when loading stopped early. The library holds everything
    /// decoded before the failure.
    pub error: Option<ParseError>,
}

/// Read an SWF file and decode its definitions into `library`, which may
/// already hold host bitmaps.
pub fn load_movie<R: Read>(input: R, mut library: Library) -> Result<LoadedMovie> {
    let (header, mut stream) = read_header(input)?;
    let end = stream.get_ref().get_ref().len() as u64;
    let error = library.load_tags(&mut stream, end).err();
    Ok(LoadedMovie {
        header,
        library,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_writer::BitWriter;
    use crate::color::Rgba8;
    use crate::fill_style::FillStyle;
    use std::io::Cursor;

    /// DefineShape body: one red square of side 100 starting at (0, 0).
    fn square_shape(id: u16) -> Vec<u8> {
        let mut w = BitWriter::new();
        w.write_u16(id);
        w.write_rect(0, 100, 0, 100);
        w.write_u8(1);
        w.write_bytes(&[0x00, 255, 0, 0]);
        w.write_u8(0);
        w.write_u8(0x10);
        // MOVE | FILL0, 1-bit fill index
        w.write_bit(false);
        w.write_bits(0x03, 5);
        w.write_bits(1, 5);
        w.write_sbits(0, 1);
        w.write_sbits(0, 1);
        w.write_bits(1, 1);
        for (dx, dy) in [(100, 0), (0, 100), (-100, 0), (0, -100)] {
            // General line, 9-bit deltas.
            w.write_bit(true);
            w.write_bit(true);
            w.write_bits(7, 4);
            w.write_bit(true);
            w.write_sbits(dx, 9);
            w.write_sbits(dy, 9);
        }
        w.write_bit(false);
        w.write_bits(0, 5);
        w.into_bytes()
    }

    fn load(tags: BitWriter) -> (Library, Result<usize>) {
        let bytes = tags.into_bytes();
        let end = bytes.len() as u64;
        let mut stream = SwfStream::new(Cursor::new(bytes));
        let mut lib = Library::new();
        let r = lib.load_tags(&mut stream, end);
        (lib, r)
    }

    #[test]
    fn test_loads_shapes_until_end_tag() {
        let mut w = BitWriter::new();
        w.write_tag(2, &square_shape(1));
        w.write_tag(1, &[]);
        w.write_tag(0, &[]);
        w.write_tag(2, &square_shape(2));
        let (lib, r) = load(w);
        assert_eq!(r.unwrap(), 1);
        let shape = lib.shape(1).unwrap();
        assert_eq!(shape.fill_styles, vec![FillStyle::Solid(Rgba8::new_opaque(255, 0, 0))]);
        assert_eq!(shape.paths[0].edges.len(), 4);
        assert!(lib.shape(2).is_none());
    }

    #[test]
    fn test_truncated_tag_is_skipped() {
        let mut body = square_shape(1);
        body.truncate(body.len() - 3);
        let mut w = BitWriter::new();
        w.write_tag(2, &body);
        w.write_tag(22, &square_shape(2));
        let (lib, r) = load(w);
        assert_eq!(r.unwrap(), 1);
        assert!(lib.shape(1).is_none());
        assert!(lib.shape(2).is_some());
    }

    #[test]
    fn test_bad_tag_header_keeps_partial_library() {
        let mut w = BitWriter::new();
        w.write_tag(2, &square_shape(7));
        // One stray byte where the next tag header should be.
        w.write_u8(0x80);
        let (lib, r) = load(w);
        assert!(r.is_err());
        assert!(lib.shape(7).is_some());
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let mut w = BitWriter::new();
        w.write_tag(2, &square_shape(3));
        let mut other = square_shape(3);
        // Second definition is green.
        other[9] = 0;
        other[10] = 255;
        w.write_tag(2, &other);
        let (lib, _) = load(w);
        assert_eq!(lib.len(), 1);
        assert_eq!(
            lib.shape(3).unwrap().fill_styles[0],
            FillStyle::Solid(Rgba8::new_opaque(255, 0, 0))
        );
    }

    #[test]
    fn test_define_font_glyphs() {
        let mut glyph = BitWriter::new();
        glyph.write_u8(0x10);
        glyph.write_bit(false);
        glyph.write_bits(0x03, 5);
        glyph.write_bits(1, 5);
        glyph.write_sbits(0, 1);
        glyph.write_sbits(0, 1);
        glyph.write_bits(1, 1);
        glyph.write_bit(true);
        glyph.write_bit(true);
        glyph.write_bits(7, 4);
        glyph.write_bit(true);
        glyph.write_sbits(50, 9);
        glyph.write_sbits(-50, 9);
        glyph.write_bit(false);
        glyph.write_bits(0, 5);
        let glyph = glyph.into_bytes();

        let mut body = BitWriter::new();
        body.write_u16(5);
        body.write_u16(4);
        body.write_u16(4 + glyph.len() as u16);
        body.write_bytes(&glyph);
        body.write_u8(0x00);
        let mut w = BitWriter::new();
        w.write_tag(TAG_DEFINE_FONT, &body.into_bytes());
        let (lib, r) = load(w);
        assert_eq!(r.unwrap(), 1);
        let font = lib.font(5).unwrap();
        assert_eq!(font.glyphs.len(), 2);
        assert_eq!(font.glyphs[0].paths[0].edges.len(), 1);
        assert!(font.glyphs[1].paths.is_empty());
        assert!(lib.shape(5).is_none());
    }

    #[test]
    fn test_font_offset_past_tag_end_is_skipped() {
        let mut body = BitWriter::new();
        body.write_u16(7);
        body.write_u16(4);
        body.write_u16(0x4000);
        // One empty glyph.
        body.write_u8(0x10);
        body.write_bit(false);
        body.write_bits(0, 5);
        let mut w = BitWriter::new();
        w.write_tag(TAG_DEFINE_FONT, &body.into_bytes());
        w.write_tag(2, &square_shape(4));
        w.write_tag(0, &[]);
        let (lib, r) = load(w);
        assert_eq!(r.unwrap(), 1);
        assert!(lib.font(7).is_none());
        assert!(lib.shape(4).is_some());
    }

    #[test]
    fn test_library_resolves_bitmaps() {
        let mut lib = Library::new();
        let bmp = Arc::new(
            BitmapInfo::new(1, 1, crate::bitmap::BitmapFormat::Rgb24, vec![1, 2, 3]).unwrap(),
        );
        lib.add_bitmap(9, bmp.clone());
        assert!(Arc::ptr_eq(&lib.bitmap(9).unwrap(), &bmp));
        assert!(lib.bitmap(10).is_none());
    }

    #[test]
    fn test_load_movie() {
        let mut body = BitWriter::new();
        body.write_rect(0, 2000, 0, 2000);
        body.write_u16(12 << 8);
        body.write_u16(1);
        body.write_tag(2, &square_shape(1));
        body.write_tag(0, &[]);
        let body = body.into_bytes();
        let mut file = b"FWS".to_vec();
        file.push(6);
        file.extend_from_slice(&(body.len() as u32 + 8).to_le_bytes());
        file.extend_from_slice(&body);

        let movie = load_movie(&file[..], Library::new()).unwrap();
        assert!(movie.error.is_none());
        assert_eq!(movie.header.frame_rate, 12.0);
        assert_eq!(movie.library.len(), 1);
    }
}
