//! Bit packer used by the unit and integration tests to build SWF byte
//! streams.

/// Writes bit fields most significant bit first, bytes little-endian.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    used_bits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn align(&mut self) {
        self.used_bits = 0;
    }

    pub fn write_bits(&mut self, value: u32, n: u32) {
        for i in (0..n).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
    }

    pub fn write_sbits(&mut self, value: i32, n: u32) {
        self.write_bits(value as u32, n);
    }

    pub fn write_bit(&mut self, bit: bool) {
        if self.used_bits == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> self.used_bits;
        }
        self.used_bits = (self.used_bits + 1) % 8;
    }

    pub fn write_u8(&mut self, v: u8) {
        self.align();
        self.bytes.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.align();
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.align();
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_bytes(&mut self, b: &[u8]) {
        self.align();
        self.bytes.extend_from_slice(b);
    }

    /// RECT record with the smallest field width that fits.
    pub fn write_rect(&mut self, x_min: i32, x_max: i32, y_min: i32, y_max: i32) {
        let n = sbits_for(&[x_min, x_max, y_min, y_max]);
        self.write_bits(n, 5);
        for v in [x_min, x_max, y_min, y_max] {
            self.write_sbits(v, n);
        }
        self.align();
    }

    /// Tag with a short header when the body fits, long otherwise.
    pub fn write_tag(&mut self, tag_type: u16, body: &[u8]) {
        if body.len() < 0x3F {
            self.write_u16((tag_type << 6) | body.len() as u16);
            self.write_bytes(body);
        } else {
            self.write_long_tag(tag_type, body);
        }
    }

    pub fn write_long_tag(&mut self, tag_type: u16, body: &[u8]) {
        self.write_u16((tag_type << 6) | 0x3F);
        self.write_u32(body.len() as u32);
        self.write_bytes(body);
    }
}

/// Smallest signed field width holding every value.
pub fn sbits_for(values: &[i32]) -> u32 {
    values
        .iter()
        .map(|&v| {
            let magnitude = if v < 0 { !v } else { v } as u32;
            33 - magnitude.leading_zeros()
        })
        .max()
        .unwrap_or(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sbits_for() {
        assert_eq!(sbits_for(&[0]), 1);
        assert_eq!(sbits_for(&[-1]), 1);
        assert_eq!(sbits_for(&[1]), 2);
        assert_eq!(sbits_for(&[100, -100]), 8);
        assert_eq!(sbits_for(&[2000]), 12);
    }

    #[test]
    fn test_bits_pack_msb_first() {
        let mut w = BitWriter::new();
        w.write_bits(0b101, 3);
        w.write_bits(0b11111, 5);
        w.write_bit(true);
        assert_eq!(w.into_bytes(), vec![0b1011_1111, 0b1000_0000]);
    }
}
