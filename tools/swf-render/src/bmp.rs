//! BMP output (32-bit BGRA, top-down).

use std::io::{self, Write};

use swf_raster::rendering_buffer::RenderingBuffer;

const FILE_HEADER_LEN: u32 = 14;
const INFO_HEADER_LEN: u32 = 40;

/// Write `buf` as a 32-bit BMP with straight alpha.
pub fn write_bmp<W: Write>(out: &mut W, buf: &RenderingBuffer) -> io::Result<()> {
    let w = buf.width();
    let h = buf.height();
    let row_size = w * 4;
    let image_size = row_size * h;
    let offset = FILE_HEADER_LEN + INFO_HEADER_LEN;

    out.write_all(b"BM")?;
    out.write_all(&(offset + image_size).to_le_bytes())?;
    out.write_all(&[0u8; 4])?;
    out.write_all(&offset.to_le_bytes())?;

    out.write_all(&INFO_HEADER_LEN.to_le_bytes())?;
    out.write_all(&(w as i32).to_le_bytes())?;
    // negative height = top-down
    out.write_all(&(-(h as i32)).to_le_bytes())?;
    out.write_all(&1u16.to_le_bytes())?;
    out.write_all(&32u16.to_le_bytes())?;
    out.write_all(&0u32.to_le_bytes())?; // BI_RGB
    out.write_all(&image_size.to_le_bytes())?;
    out.write_all(&[0u8; 16])?;

    let mut row = vec![0u8; row_size as usize];
    for y in 0..h as i32 {
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let c = buf.pixel(x as i32, y).demultiplied();
            px.copy_from_slice(&[c.b, c.g, c.r, c.a]);
        }
        out.write_all(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use swf_raster::color::Rgba8;

    #[test]
    fn test_layout() {
        let mut buf = RenderingBuffer::new(2, 1);
        buf.clear(Rgba8::new_opaque(10, 20, 30));
        let mut out = Vec::new();
        write_bmp(&mut out, &buf).unwrap();
        assert_eq!(out.len(), 54 + 8);
        assert_eq!(&out[..2], b"BM");
        assert_eq!(&out[22..26], &(-1i32).to_le_bytes());
        assert_eq!(&out[54..58], &[30, 20, 10, 255]);
    }
}
