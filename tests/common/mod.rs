//! Byte-stream builders shared by the integration tests.
#![allow(dead_code)]

use std::io::Cursor;

use swf_raster::stream::SwfStream;

#[path = "../../src/bit_writer.rs"]
mod bit_writer;

pub use bit_writer::BitWriter;

/// Shape records with 16-bit coordinates. Fill indices use `fill_bits`.
pub struct ShapeRecords {
    pub w: BitWriter,
    pub fill_bits: u32,
}

impl ShapeRecords {
    pub fn move_to(&mut self, x: i32, y: i32, fill0: Option<u32>, fill1: Option<u32>) {
        let w = &mut self.w;
        w.write_bit(false);
        w.write_bit(false);
        w.write_bit(false);
        w.write_bit(fill1.is_some());
        w.write_bit(fill0.is_some());
        w.write_bit(true);
        w.write_bits(16, 5);
        w.write_sbits(x, 16);
        w.write_sbits(y, 16);
        for f in [fill0, fill1].iter().flatten() {
            w.write_bits(*f, self.fill_bits);
        }
    }

    pub fn line(&mut self, dx: i32, dy: i32) {
        let w = &mut self.w;
        w.write_bit(true);
        w.write_bit(true);
        w.write_bits(14, 4);
        w.write_bit(true);
        w.write_sbits(dx, 16);
        w.write_sbits(dy, 16);
    }

    pub fn curve(&mut self, cdx: i32, cdy: i32, adx: i32, ady: i32) {
        let w = &mut self.w;
        w.write_bit(true);
        w.write_bit(false);
        w.write_bits(14, 4);
        for v in [cdx, cdy, adx, ady] {
            w.write_sbits(v, 16);
        }
    }

    pub fn end(mut self) -> Vec<u8> {
        self.w.write_bit(false);
        self.w.write_bits(0, 5);
        self.w.into_bytes()
    }
}

/// DefineShape body without the character id: bounds and solid RGB fills,
/// no line styles. Records follow.
pub fn shape_body(bounds: (i32, i32, i32, i32), fills: &[[u8; 3]]) -> ShapeRecords {
    let mut w = BitWriter::new();
    w.write_rect(bounds.0, bounds.2, bounds.1, bounds.3);
    w.write_u8(fills.len() as u8);
    for c in fills {
        w.write_bytes(&[0x00, c[0], c[1], c[2]]);
    }
    w.write_u8(0);
    let fill_bits = 4;
    w.write_u8((fill_bits << 4) as u8);
    ShapeRecords { w, fill_bits }
}

pub fn stream(bytes: Vec<u8>) -> SwfStream<Cursor<Vec<u8>>> {
    SwfStream::new(Cursor::new(bytes))
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
