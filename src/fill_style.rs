//! Fill and line style records.
//!
//! Styles are materialized once at parse time: bitmap references are
//! resolved against the host's `BitmapResolver` and gradient tables are
//! built lazily and cached on first render.

use std::io::{Read, Seek};
use std::sync::Arc;

use log::warn;
use once_cell::sync::OnceCell;

use crate::bitmap::{BitmapInfo, BitmapResolver};
use crate::color::Rgba8;
use crate::error::{ParseError, Result};
use crate::gradient_lut::GradientLut;
use crate::log_once;
use crate::stream::SwfStream;
use crate::trans_affine::TransAffine;

/// Bitmap id that deliberately references no bitmap.
pub const EMPTY_BITMAP_ID: u16 = 0xFFFF;

// ============================================================================
// ShapeTag
// ============================================================================

/// Which shape definition tag a record belongs to. Later versions widen
/// the encoding of several records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeTag {
    DefineShape,
    DefineShape2,
    DefineShape3,
    DefineShape4,
}

impl ShapeTag {
    pub fn from_tag_code(code: u16) -> Option<Self> {
        match code {
            2 => Some(ShapeTag::DefineShape),
            22 => Some(ShapeTag::DefineShape2),
            32 => Some(ShapeTag::DefineShape3),
            83 => Some(ShapeTag::DefineShape4),
            _ => None,
        }
    }

    pub fn tag_code(self) -> u16 {
        match self {
            ShapeTag::DefineShape => 2,
            ShapeTag::DefineShape2 => 22,
            ShapeTag::DefineShape3 => 32,
            ShapeTag::DefineShape4 => 83,
        }
    }

    /// Colors are RGBA rather than RGB.
    pub fn has_alpha(self) -> bool {
        self >= ShapeTag::DefineShape3
    }

    /// Fill style counts may escape to 16 bits. Line style counts always can.
    pub fn has_extended_counts(self) -> bool {
        self >= ShapeTag::DefineShape2
    }

    fn read_color<R: Read + Seek>(self, stream: &mut SwfStream<R>) -> Result<Rgba8> {
        if self.has_alpha() {
            Rgba8::read_rgba(stream)
        } else {
            Rgba8::read_rgb(stream)
        }
    }
}

/// Style array count: one byte, where 0xFF escapes to a following u16 when
/// `extended` is set.
fn read_count<R: Read + Seek>(stream: &mut SwfStream<R>, extended: bool) -> Result<u16> {
    stream.ensure_bytes(1)?;
    let count = stream.read_u8()?;
    if count == 0xFF && extended {
        stream.ensure_bytes(2)?;
        return stream.read_u16();
    }
    Ok(count as u16)
}

// ============================================================================
// Gradients
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMode {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Normal,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientRecord {
    pub ratio: u8,
    pub color: Rgba8,
}

#[derive(Debug, Clone)]
pub struct Gradient {
    /// Maps the gradient square (-16384..16384 twips) into shape space.
    pub matrix: TransAffine,
    pub spread: SpreadMode,
    pub interpolation: InterpolationMode,
    /// Sorted by ratio.
    pub records: Vec<GradientRecord>,
    lut: OnceCell<Arc<GradientLut>>,
}

impl Gradient {
    pub fn new(
        matrix: TransAffine,
        spread: SpreadMode,
        interpolation: InterpolationMode,
        records: Vec<GradientRecord>,
    ) -> Self {
        Self {
            matrix,
            spread,
            interpolation,
            records,
            lut: OnceCell::new(),
        }
    }

    /// MATRIX followed by a GRADIENT record.
    pub fn read<R: Read + Seek>(stream: &mut SwfStream<R>, tag: ShapeTag) -> Result<Self> {
        let matrix = TransAffine::read(stream)?;

        stream.ensure_bytes(1)?;
        let header = stream.read_u8()?;
        let (spread, interpolation) = if tag == ShapeTag::DefineShape4 {
            let spread = match header >> 6 {
                0 => SpreadMode::Pad,
                1 => SpreadMode::Reflect,
                2 => SpreadMode::Repeat,
                other => {
                    warn!("reserved gradient spread mode {}, using pad", other);
                    SpreadMode::Pad
                }
            };
            let interpolation = match (header >> 4) & 0x3 {
                0 => InterpolationMode::Normal,
                1 => InterpolationMode::Linear,
                other => {
                    warn!("reserved gradient interpolation mode {}", other);
                    InterpolationMode::Normal
                }
            };
            (spread, interpolation)
        } else {
            (SpreadMode::Pad, InterpolationMode::Normal)
        };

        let count = (header & 0x0F) as usize;
        if count == 0 {
            warn!("gradient without records");
        }
        let mut records: Vec<GradientRecord> = Vec::with_capacity(count);
        for _ in 0..count {
            stream.ensure_bytes(1)?;
            let mut ratio = stream.read_u8()?;
            let color = tag.read_color(stream)?;
            if let Some(prev) = records.last() {
                if ratio < prev.ratio {
                    warn!(
                        "gradient ratios not increasing ({} after {}), clamping",
                        ratio, prev.ratio
                    );
                    ratio = prev.ratio;
                }
            }
            records.push(GradientRecord { ratio, color });
        }

        Ok(Self::new(matrix, spread, interpolation, records))
    }

    /// Color table for this gradient, built on first use and shared after.
    pub fn lut(&self) -> Arc<GradientLut> {
        self.lut
            .get_or_init(|| {
                if self.interpolation == InterpolationMode::Linear {
                    log_once::unimplemented("linear RGB gradient interpolation");
                }
                Arc::new(GradientLut::from_records(&self.records))
            })
            .clone()
    }

    /// Color of the first stop, or transparent.
    pub fn first_color(&self) -> Rgba8 {
        self.records.first().map_or(Rgba8::TRANSPARENT, |r| r.color)
    }
}

impl PartialEq for Gradient {
    fn eq(&self, other: &Self) -> bool {
        self.matrix == other.matrix
            && self.spread == other.spread
            && self.interpolation == other.interpolation
            && self.records == other.records
    }
}

// ============================================================================
// FillStyle
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    Solid(Rgba8),
    LinearGradient(Gradient),
    RadialGradient(Gradient),
    FocalGradient {
        gradient: Gradient,
        /// Focus position along the gradient's X axis, in -1..1.
        focal_point: f64,
    },
    Bitmap {
        /// `None` for the empty id or a dangling reference.
        bitmap: Option<Arc<BitmapInfo>>,
        bitmap_id: u16,
        /// Maps bitmap pixels into shape space.
        matrix: TransAffine,
        repeat: bool,
        smooth: bool,
    },
}

impl FillStyle {
    pub fn read<R: Read + Seek>(
        stream: &mut SwfStream<R>,
        tag: ShapeTag,
        resolver: Option<&dyn BitmapResolver>,
    ) -> Result<Self> {
        stream.ensure_bytes(1)?;
        let fill_type = stream.read_u8()?;
        match fill_type {
            0x00 => Ok(FillStyle::Solid(tag.read_color(stream)?)),
            0x10 => Ok(FillStyle::LinearGradient(Gradient::read(stream, tag)?)),
            0x12 => Ok(FillStyle::RadialGradient(Gradient::read(stream, tag)?)),
            0x13 => {
                let gradient = Gradient::read(stream, tag)?;
                stream.ensure_bytes(2)?;
                let focal_point = stream.read_short_fixed()?;
                Ok(FillStyle::FocalGradient {
                    gradient,
                    focal_point,
                })
            }
            0x40..=0x43 => {
                stream.ensure_bytes(2)?;
                let bitmap_id = stream.read_u16()?;
                let matrix = TransAffine::read(stream)?;
                let bitmap = resolve_bitmap(bitmap_id, resolver);
                Ok(FillStyle::Bitmap {
                    bitmap,
                    bitmap_id,
                    matrix,
                    repeat: fill_type & 0x01 == 0,
                    smooth: fill_type & 0x02 == 0,
                })
            }
            other => Err(ParseError::InvalidData(format!(
                "unknown fill style type {:#04x}",
                other
            ))),
        }
    }

    pub fn is_solid(&self) -> bool {
        matches!(self, FillStyle::Solid(_))
    }

    pub fn gradient(&self) -> Option<&Gradient> {
        match self {
            FillStyle::LinearGradient(g)
            | FillStyle::RadialGradient(g)
            | FillStyle::FocalGradient { gradient: g, .. } => Some(g),
            _ => None,
        }
    }
}

fn resolve_bitmap(id: u16, resolver: Option<&dyn BitmapResolver>) -> Option<Arc<BitmapInfo>> {
    if id == EMPTY_BITMAP_ID {
        return None;
    }
    let resolver = match resolver {
        Some(r) => r,
        None => {
            log_once::unimplemented("bitmap fills without a bitmap resolver");
            return None;
        }
    };
    let bitmap = resolver.bitmap(id);
    if bitmap.is_none() {
        warn!("fill references unknown bitmap {}", id);
    }
    bitmap
}

/// FILLSTYLEARRAY: count (with escape) followed by the styles.
pub fn read_fill_styles<R: Read + Seek>(
    stream: &mut SwfStream<R>,
    tag: ShapeTag,
    resolver: Option<&dyn BitmapResolver>,
) -> Result<Vec<FillStyle>> {
    let count = read_count(stream, tag.has_extended_counts())?;
    let mut styles = Vec::with_capacity(count as usize);
    for _ in 0..count {
        styles.push(FillStyle::read(stream, tag, resolver)?);
    }
    Ok(styles)
}

// ============================================================================
// LineStyle
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapStyle {
    #[default]
    Round,
    None,
    Square,
}

impl CapStyle {
    fn from_bits(v: u32) -> Self {
        match v {
            1 => CapStyle::None,
            2 => CapStyle::Square,
            0 => CapStyle::Round,
            other => {
                warn!("reserved cap style {}, using round", other);
                CapStyle::Round
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum JoinStyle {
    #[default]
    Round,
    Bevel,
    /// Miter with its limit factor.
    Miter(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    /// Thickness in twips; 0 is a hairline.
    pub width: u16,
    pub color: Rgba8,
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
    pub join: JoinStyle,
    pub scale_horizontally: bool,
    pub scale_vertically: bool,
    pub pixel_hinting: bool,
    pub no_close: bool,
    /// Fill of a DefineShape4 stroke, when it has one.
    pub fill: Option<FillStyle>,
}

impl LineStyle {
    pub fn new(width: u16, color: Rgba8) -> Self {
        Self {
            width,
            color,
            start_cap: CapStyle::Round,
            end_cap: CapStyle::Round,
            join: JoinStyle::Round,
            scale_horizontally: true,
            scale_vertically: true,
            pixel_hinting: false,
            no_close: false,
            fill: None,
        }
    }

    pub fn read<R: Read + Seek>(
        stream: &mut SwfStream<R>,
        tag: ShapeTag,
        resolver: Option<&dyn BitmapResolver>,
    ) -> Result<Self> {
        stream.ensure_bytes(2)?;
        let width = stream.read_u16()?;
        if tag != ShapeTag::DefineShape4 {
            let color = tag.read_color(stream)?;
            return Ok(Self::new(width, color));
        }

        stream.ensure_bits(16)?;
        let start_cap = CapStyle::from_bits(stream.read_uint(2)?);
        let join_bits = stream.read_uint(2)?;
        let has_fill = stream.read_bit()?;
        let no_hscale = stream.read_bit()?;
        let no_vscale = stream.read_bit()?;
        let pixel_hinting = stream.read_bit()?;
        stream.read_uint(5)?;
        let no_close = stream.read_bit()?;
        let end_cap = CapStyle::from_bits(stream.read_uint(2)?);

        let join = match join_bits {
            0 => JoinStyle::Round,
            1 => JoinStyle::Bevel,
            2 => {
                stream.ensure_bytes(2)?;
                JoinStyle::Miter(stream.read_short_ufixed()?)
            }
            other => {
                warn!("reserved join style {}, using round", other);
                JoinStyle::Round
            }
        };

        let (color, fill) = if has_fill {
            let fill = FillStyle::read(stream, tag, resolver)?;
            let color = match &fill {
                FillStyle::Solid(c) => *c,
                other => {
                    log_once::unimplemented("non-solid line fills");
                    other.gradient().map_or(Rgba8::BLACK, Gradient::first_color)
                }
            };
            (color, Some(fill))
        } else {
            (Rgba8::read_rgba(stream)?, None)
        };

        Ok(Self {
            width,
            color,
            start_cap,
            end_cap,
            join,
            scale_horizontally: !no_hscale,
            scale_vertically: !no_vscale,
            pixel_hinting,
            no_close,
            fill,
        })
    }

    #[inline]
    pub fn is_hairline(&self) -> bool {
        self.width == 0
    }

    /// The stroke keeps its thickness under some axis of scaling.
    pub fn is_non_scaling(&self) -> bool {
        !self.scale_horizontally || !self.scale_vertically
    }
}

/// LINESTYLEARRAY: count (with escape) followed by the styles.
pub fn read_line_styles<R: Read + Seek>(
    stream: &mut SwfStream<R>,
    tag: ShapeTag,
    resolver: Option<&dyn BitmapResolver>,
) -> Result<Vec<LineStyle>> {
    let count = read_count(stream, true)?;
    let mut styles = Vec::with_capacity(count as usize);
    for _ in 0..count {
        styles.push(LineStyle::read(stream, tag, resolver)?);
    }
    Ok(styles)
}
