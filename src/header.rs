//! SWF file header.
//!
//! The first 8 bytes are uncompressed: signature, version and total file
//! length. Everything after them is the body, which `CWS` files store
//! zlib-deflated. The body opens with the frame rectangle, rate and count,
//! followed by the tag stream.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use log::{debug, warn};

use crate::bounding_rect::BoundingRect;
use crate::error::{ParseError, Result};
use crate::stream::SwfStream;

/// Size of the signature, version and length fields.
pub const FILE_HEADER_LEN: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Zlib,
    Lzma,
}

impl Compression {
    fn from_signature(sig: &[u8; 3]) -> Result<Self> {
        match sig {
            b"FWS" => Ok(Compression::None),
            b"CWS" => Ok(Compression::Zlib),
            b"ZWS" => Ok(Compression::Lzma),
            _ => Err(ParseError::InvalidData(format!(
                "not an SWF file (signature {:02x?})",
                sig
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwfHeader {
    pub compression: Compression,
    pub version: u8,
    /// Uncompressed length of the whole file, header included.
    pub file_length: u32,
    /// Stage bounds in twips.
    pub frame_size: BoundingRect,
    /// Frames per second.
    pub frame_rate: f64,
    pub frame_count: u16,
}

/// Read the header and return it with a stream positioned at the first
/// tag. Stream offsets count from the start of the body.
pub fn read_header<R: Read>(mut input: R) -> Result<(SwfHeader, SwfStream<Cursor<Vec<u8>>>)> {
    let mut sig = [0u8; 3];
    input.read_exact(&mut sig)?;
    let compression = Compression::from_signature(&sig)?;
    let version = input.read_u8()?;
    let file_length = input.read_u32::<LittleEndian>()?;
    let body_len = file_length.saturating_sub(FILE_HEADER_LEN) as u64;

    let mut body = Vec::new();
    match compression {
        Compression::None => {
            input.take(body_len).read_to_end(&mut body)?;
        }
        Compression::Zlib => {
            ZlibDecoder::new(input)
                .take(body_len)
                .read_to_end(&mut body)?;
        }
        Compression::Lzma => return Err(ParseError::Unsupported("LZMA-compressed SWF")),
    }
    if (body.len() as u64) < body_len {
        warn!(
            "SWF body is {} bytes, header declares {}",
            body.len(),
            body_len
        );
    }
    debug!(
        "SWF version {}, {:?}, {} body bytes",
        version,
        compression,
        body.len()
    );

    let mut stream = SwfStream::new(Cursor::new(body));
    let frame_size = BoundingRect::read(&mut stream)?;
    let frame_rate = stream.read_u16()? as f64 / 256.0;
    let frame_count = stream.read_u16()?;

    Ok((
        SwfHeader {
            compression,
            version,
            file_length,
            frame_size,
            frame_rate,
            frame_count,
        },
        stream,
    ))
}
