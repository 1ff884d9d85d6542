//! PNM (Portable Any Map) format support
//!
//! Reads and writes PGM (P5 binary) and PPM (P6 binary) with a maxval of
//! at most 255. ASCII variants and bitmaps are not supported.

use crate::{IoError, IoResult};
use capsolve_core::{ImageFormat, Pix, PixMut, PixelDepth, color, pix::set_data_byte};
use std::io::{Read, Write};

/// Read a PNM image (P5/P6) from a reader.
///
/// # Returns
/// A `Pix` at 8 bpp (PGM) or 32 bpp (PPM).
pub fn read_pnm<R: Read>(mut reader: R) -> IoResult<Pix> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let mut pos = 0usize;
    let magic = next_token(&data, &mut pos)?;
    let (depth, channels) = match magic {
        b"P5" => (PixelDepth::Bit8, 1usize),
        b"P6" => (PixelDepth::Bit32, 3),
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "unsupported PNM variant: {}",
                String::from_utf8_lossy(other)
            )));
        }
    };
    let width = parse_u32(next_token(&data, &mut pos)?)?;
    let height = parse_u32(next_token(&data, &mut pos)?)?;
    let maxval = parse_u32(next_token(&data, &mut pos)?)?;
    if maxval == 0 || maxval > 255 {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNM maxval: {}",
            maxval
        )));
    }
    // exactly one whitespace byte separates the header from the raster
    pos += 1;

    let expected = width as usize * height as usize * channels;
    let raster = data
        .get(pos..pos + expected)
        .ok_or_else(|| IoError::InvalidData("PNM raster is truncated".to_string()))?;

    let mut pix = PixMut::new(width, height, depth)?;
    pix.set_informat(ImageFormat::Pnm);

    for (y, row) in raster.chunks_exact(width as usize * channels).enumerate() {
        let line = pix.row_data_mut(y as u32);
        for x in 0..width as usize {
            if channels == 1 {
                set_data_byte(line, x as u32, scale(row[x], maxval));
            } else {
                let p = &row[x * 3..x * 3 + 3];
                line[x] = color::compose_rgb(
                    scale(p[0], maxval) as u8,
                    scale(p[1], maxval) as u8,
                    scale(p[2], maxval) as u8,
                );
            }
        }
    }

    Ok(pix.into())
}

/// Write a `Pix` as binary PNM to a writer.
///
/// Chooses P5 (8 bpp grayscale) or P6 (32 bpp RGB) based on the pixel depth.
pub fn write_pnm<W: Write>(pix: &Pix, mut writer: W) -> IoResult<()> {
    let (magic, channels) = match pix.depth() {
        PixelDepth::Bit8 => ("P5", 1usize),
        PixelDepth::Bit32 => ("P6", 3),
    };
    write!(writer, "{}\n{} {}\n255\n", magic, pix.width(), pix.height())?;

    let mut row = Vec::with_capacity(pix.width() as usize * channels);
    for y in 0..pix.height() {
        row.clear();
        for x in 0..pix.width() {
            let val = pix.get_pixel_unchecked(x, y);
            if channels == 1 {
                row.push(val as u8);
            } else {
                let (r, g, b) = color::extract_rgb(val);
                row.extend_from_slice(&[r, g, b]);
            }
        }
        writer.write_all(&row)?;
    }
    Ok(())
}

fn scale(v: u8, maxval: u32) -> u32 {
    if maxval == 255 {
        v as u32
    } else {
        (v as u32 * 255 + maxval / 2) / maxval
    }
}

fn parse_u32(token: &[u8]) -> IoResult<u32> {
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            IoError::InvalidData(format!(
                "bad PNM header field: {}",
                String::from_utf8_lossy(token)
            ))
        })
}

/// Next whitespace-delimited header token, skipping `#` comments.
fn next_token<'a>(data: &'a [u8], pos: &mut usize) -> IoResult<&'a [u8]> {
    loop {
        while *pos < data.len() && data[*pos].is_ascii_whitespace() {
            *pos += 1;
        }
        if *pos < data.len() && data[*pos] == b'#' {
            while *pos < data.len() && data[*pos] != b'\n' {
                *pos += 1;
            }
            continue;
        }
        break;
    }
    let start = *pos;
    while *pos < data.len() && !data[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
    if start == *pos {
        return Err(IoError::InvalidData("PNM header is truncated".to_string()));
    }
    Ok(&data[start..*pos])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pgm_roundtrip() {
        let pix = Pix::from_gray_samples(3, 2, &[0, 50, 255, 7, 8, 9]).unwrap();
        let mut buf = Vec::new();
        write_pnm(&pix, &mut buf).unwrap();
        assert!(buf.starts_with(b"P5\n3 2\n255\n"));
        let back = read_pnm(&buf[..]).unwrap();
        assert_eq!(back, pix);
        assert_eq!(back.informat(), ImageFormat::Pnm);
    }

    #[test]
    fn test_ppm_with_comment() {
        let mut data = b"P6\n# made by hand\n2 1\n255\n".to_vec();
        data.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
        let pix = read_pnm(&data[..]).unwrap();
        assert_eq!(pix.depth(), PixelDepth::Bit32);
        assert_eq!(pix.get_rgb(0, 0), Some((255, 0, 0)));
        assert_eq!(pix.get_rgb(1, 0), Some((0, 0, 255)));
    }

    #[test]
    fn test_pgm_low_maxval_is_scaled() {
        let mut data = b"P5 2 1 15\n".to_vec();
        data.extend_from_slice(&[15, 0]);
        let pix = read_pnm(&data[..]).unwrap();
        assert_eq!(pix.gray_samples().unwrap(), vec![255, 0]);
    }

    #[test]
    fn test_pnm_errors() {
        assert!(matches!(
            read_pnm(&b"P2\n1 1\n255\n0"[..]),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            read_pnm(&b"P5\n4 4\n255\n\x00\x01"[..]),
            Err(IoError::InvalidData(_))
        ));
        assert!(read_pnm(&b"P5\n4"[..]).is_err());
    }
}
