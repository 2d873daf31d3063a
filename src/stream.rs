//! Bit and byte cursor over a tag-delimited SWF byte source.
//!
//! `SwfStream` reads the packed little-endian/bit-big-endian mix SWF uses.
//! Bit fields are read most significant bit first; every byte-sized read
//! aligns to the next byte boundary. A stack of tag frames bounds every
//! read: nothing may be read past the end of the innermost open tag, and
//! [`SwfStream::close_tag`] always resynchronises to the declared tag end.
//!
//! Callers must run [`ensure_bytes`](SwfStream::ensure_bytes) or
//! [`ensure_bits`](SwfStream::ensure_bits) before any read whose size comes
//! from the stream itself.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};

use crate::error::{ParseError, Result};

/// Escape value in the 6-bit short length field.
const LONG_TAG_LENGTH: u16 = 0x3F;

/// Decoded tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    /// Tag code (top 10 bits of the header word).
    pub tag_type: u16,
    /// Offset of the header itself.
    pub start: u64,
    /// Offset of the first body byte.
    pub body_start: u64,
    /// Offset one past the last body byte.
    pub end: u64,
}

impl TagHeader {
    /// Declared body length.
    #[inline]
    pub fn length(&self) -> u64 {
        self.end - self.body_start
    }
}

// ============================================================================
// SwfStream
// ============================================================================

/// Bit/byte reader with tag boundary enforcement.
///
/// Offsets are relative to the position the source had when the stream was
/// created.
pub struct SwfStream<R> {
    input: R,
    pos: u64,
    current_byte: u8,
    unused_bits: u32,
    tag_bounds: Vec<(u64, u64)>,
}

impl<R: Read + Seek> SwfStream<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            pos: 0,
            current_byte: 0,
            unused_bits: 0,
            tag_bounds: Vec::new(),
        }
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    pub fn get_ref(&self) -> &R {
        &self.input
    }

    /// Current byte offset. A partially consumed byte counts as consumed.
    #[inline]
    pub fn tell(&self) -> u64 {
        self.pos
    }

    /// Discard the remaining bits of a partially consumed byte.
    #[inline]
    pub fn align(&mut self) {
        self.unused_bits = 0;
    }

    /// End offset of the innermost open tag, if any.
    pub fn tag_end_position(&self) -> Option<u64> {
        self.tag_bounds.last().map(|&(_, end)| end)
    }

    /// Number of currently open (nested) tags.
    pub fn open_tag_count(&self) -> usize {
        self.tag_bounds.len()
    }

    fn bytes_left(&self) -> Option<u64> {
        self.tag_end_position()
            .map(|end| end.saturating_sub(self.pos))
    }

    // ------------------------------------------------------------------------
    // Bounds checks
    // ------------------------------------------------------------------------

    /// Fail unless `needed` whole bytes remain before the current tag end.
    ///
    /// Outside of any tag this is a no-op; the source's own end of file is
    /// reported by the read that hits it.
    pub fn ensure_bytes(&self, needed: u64) -> Result<()> {
        match self.bytes_left() {
            Some(available) if available < needed => {
                Err(ParseError::PrematureEnd { needed, available })
            }
            _ => Ok(()),
        }
    }

    /// Fail unless `needed` bits remain before the current tag end,
    /// counting the unread bits of the current byte.
    pub fn ensure_bits(&self, needed: u64) -> Result<()> {
        match self.bytes_left() {
            Some(bytes) => {
                let available = bytes * 8 + self.unused_bits as u64;
                if available < needed {
                    Err(ParseError::PrematureEnd { needed, available })
                } else {
                    Ok(())
                }
            }
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Raw byte access
    // ------------------------------------------------------------------------

    fn fetch_byte(&mut self) -> Result<u8> {
        self.ensure_bytes(1)?;
        let b = self.input.read_u8()?;
        self.pos += 1;
        Ok(b)
    }

    fn seek_to(&mut self, pos: u64) -> Result<()> {
        let delta = pos as i64 - self.pos as i64;
        if delta != 0 {
            self.input.seek(SeekFrom::Current(delta))?;
        }
        self.pos = pos;
        self.unused_bits = 0;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Bit fields
    // ------------------------------------------------------------------------

    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_uint(1)? == 1)
    }

    /// Read an unsigned `bitcount`-bit field, most significant bit first.
    pub fn read_uint(&mut self, bitcount: u32) -> Result<u32> {
        if bitcount > 32 {
            return Err(ParseError::ValueTooWide(bitcount));
        }

        let mut value: u32 = 0;
        let mut remaining = bitcount;
        while remaining > 0 {
            if self.unused_bits == 0 {
                self.current_byte = self.fetch_byte()?;
                self.unused_bits = 8;
            }
            let take = remaining.min(self.unused_bits);
            let shift = self.unused_bits - take;
            let bits = (self.current_byte as u32 >> shift) & ((1u32 << take) - 1);
            value = (value << take) | bits;
            self.unused_bits -= take;
            remaining -= take;
        }
        Ok(value)
    }

    /// Read a signed `bitcount`-bit two's complement field.
    pub fn read_sint(&mut self, bitcount: u32) -> Result<i32> {
        let raw = self.read_uint(bitcount)?;
        if bitcount == 0 || bitcount == 32 {
            return Ok(raw as i32);
        }
        if raw & (1 << (bitcount - 1)) != 0 {
            Ok((raw | (!0u32 << bitcount)) as i32)
        } else {
            Ok(raw as i32)
        }
    }

    // ------------------------------------------------------------------------
    // Byte-aligned integers
    // ------------------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        self.align();
        self.fetch_byte()
    }

    pub fn read_s8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.align();
        self.ensure_bytes(2)?;
        let v = self.input.read_u16::<LittleEndian>()?;
        self.pos += 2;
        Ok(v)
    }

    pub fn read_s16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.align();
        self.ensure_bytes(4)?;
        let v = self.input.read_u32::<LittleEndian>()?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_s32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    // ------------------------------------------------------------------------
    // Fixed point and floats
    // ------------------------------------------------------------------------

    /// Signed 16.16 fixed point.
    pub fn read_fixed(&mut self) -> Result<f64> {
        Ok(self.read_s32()? as f64 / 65536.0)
    }

    /// Unsigned 16.16 fixed point.
    pub fn read_ufixed(&mut self) -> Result<f64> {
        Ok(self.read_u32()? as f64 / 65536.0)
    }

    /// Signed 8.8 fixed point.
    pub fn read_short_fixed(&mut self) -> Result<f64> {
        Ok(self.read_s16()? as f64 / 256.0)
    }

    /// Unsigned 8.8 fixed point.
    pub fn read_short_ufixed(&mut self) -> Result<f64> {
        Ok(self.read_u16()? as f64 / 256.0)
    }

    /// Half precision float (sign:1, exponent:5, mantissa:10). The raw
    /// bit pattern is what `read_u16` returns.
    pub fn read_float16(&mut self) -> Result<f32> {
        let bits = self.read_u16()?;
        let sign = if bits & 0x8000 != 0 { -1.0f32 } else { 1.0 };
        let exponent = ((bits >> 10) & 0x1F) as i32;
        let mantissa = (bits & 0x3FF) as f32;
        let magnitude = match exponent {
            0 => mantissa * 2f32.powi(-24),
            0x1F if mantissa == 0.0 => f32::INFINITY,
            0x1F => f32::NAN,
            e => (1.0 + mantissa / 1024.0) * 2f32.powi(e - 15),
        };
        Ok(sign * magnitude)
    }

    pub fn read_float(&mut self) -> Result<f32> {
        self.align();
        self.ensure_bytes(4)?;
        let v = self.input.read_f32::<LittleEndian>()?;
        self.pos += 4;
        Ok(v)
    }

    pub fn read_d64(&mut self) -> Result<f64> {
        self.align();
        self.ensure_bytes(8)?;
        let v = self.input.read_f64::<LittleEndian>()?;
        self.pos += 8;
        Ok(v)
    }

    // ------------------------------------------------------------------------
    // Byte runs and strings
    // ------------------------------------------------------------------------

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.align();
        self.ensure_bytes(len as u64)?;
        let mut buf = vec![0u8; len];
        self.input.read_exact(&mut buf)?;
        self.pos += len as u64;
        Ok(buf)
    }

    pub fn skip_bytes(&mut self, len: u64) -> Result<()> {
        self.align();
        self.ensure_bytes(len)?;
        let target = self.pos + len;
        self.seek_to(target)
    }

    /// NUL-terminated string. Stops with an error at the tag end if no
    /// terminator is found.
    pub fn read_string(&mut self) -> Result<String> {
        self.align();
        let mut bytes = Vec::new();
        loop {
            let b = self.fetch_byte()?;
            if b == 0 {
                break;
            }
            bytes.push(b);
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn read_string_with_length(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// String with a one byte length prefix; a prefix of 0xFF escapes to a
    /// two byte length.
    pub fn read_length_prefixed_string(&mut self) -> Result<String> {
        let mut len = self.read_u8()? as usize;
        if len == 0xFF {
            len = self.read_u16()? as usize;
        }
        self.read_string_with_length(len)
    }

    // ------------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------------

    /// Read a tag header and push its bounds.
    pub fn open_tag(&mut self) -> Result<TagHeader> {
        self.align();
        let start = self.pos;
        let header = self.read_u16()?;
        let tag_type = header >> 6;
        let mut length = (header & LONG_TAG_LENGTH) as u64;
        if length == LONG_TAG_LENGTH as u64 {
            length = self.read_u32()? as u64;
        }
        let body_start = self.pos;
        let mut end = body_start + length;

        if let Some(parent_end) = self.tag_end_position() {
            if end > parent_end {
                warn!(
                    "tag {} at offset {} declares end {} past its parent's end {}, truncating",
                    tag_type, start, end, parent_end
                );
                end = parent_end;
            }
        }

        self.tag_bounds.push((start, end));
        debug!(
            "open tag {} at {} (body {} bytes)",
            tag_type,
            start,
            end - body_start
        );
        Ok(TagHeader {
            tag_type,
            start,
            body_start,
            end,
        })
    }

    /// Seek to the end of the innermost tag and pop it, however much of
    /// the body was consumed.
    pub fn close_tag(&mut self) -> Result<()> {
        let (_, end) = self
            .tag_bounds
            .pop()
            .ok_or_else(|| ParseError::InvalidData("close_tag without an open tag".into()))?;
        if self.pos != end {
            debug!(
                "closing tag at {} with cursor at {} ({} bytes unread)",
                end,
                self.pos,
                end as i64 - self.pos as i64
            );
        }
        self.seek_to(end)
    }

    /// Move the cursor; fails if `pos` lies outside the innermost tag.
    pub fn set_position(&mut self, pos: u64) -> Result<()> {
        if let Some(&(start, end)) = self.tag_bounds.last() {
            if pos < start || pos > end {
                return Err(ParseError::SeekOutOfBounds { pos, start, end });
            }
        }
        self.seek_to(pos)
    }
}
