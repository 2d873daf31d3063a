//! Parse errors raised while decoding SWF tag streams.
//!
//! Every bounds violation in [`SwfStream`](crate::stream::SwfStream) surfaces
//! as a [`ParseError`]. Tag loaders catch them per tag; nothing below the
//! loader recovers from one.

use thiserror::Error;

/// Structured parse failure with a human-readable reason.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A read would cross the end of the innermost open tag.
    #[error("premature end of tag: {needed} needed, {available} available")]
    PrematureEnd { needed: u64, available: u64 },

    /// A bit field wider than 32 bits was requested.
    #[error("bit field of {0} bits is too wide (max 32)")]
    ValueTooWide(u32),

    /// A seek target lies outside the innermost open tag.
    #[error("seek to {pos} outside of tag bounds [{start}, {end}]")]
    SeekOutOfBounds { pos: u64, start: u64, end: u64 },

    /// The stream decoded to a value the format does not allow.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The stream uses a feature this crate does not decode.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// The underlying byte source failed or ran dry.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// True for errors after which the stream position can no longer be
    /// trusted to find the next tag.
    pub fn is_desynchronizing(&self) -> bool {
        matches!(self, ParseError::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
