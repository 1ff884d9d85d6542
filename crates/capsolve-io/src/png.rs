//! PNG image format support

use crate::{IoError, IoResult};
use capsolve_core::{ImageFormat, Pix, PixMut, PixelDepth, color, pix::set_data_byte};
use png::{BitDepth, ColorType, Decoder, Encoder, Transformations};
use std::io::{BufRead, Seek, Write};

/// Read a PNG image
///
/// Palette and low-bit-depth images are expanded and 16-bit samples are
/// stripped to 8 bits, so the result is always 8 bpp (gray) or 32 bpp
/// (RGB / RGBA).
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG decode error: {}", e)))?;

    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "unsupported PNG output depth: {:?}",
            bit_depth
        )));
    }

    let (pix_depth, spp, samples) = match color_type {
        ColorType::Grayscale => (PixelDepth::Bit8, 1, 1usize),
        ColorType::GrayscaleAlpha => (PixelDepth::Bit32, 4, 2),
        ColorType::Rgb => (PixelDepth::Bit32, 3, 3),
        ColorType::Rgba => (PixelDepth::Bit32, 4, 4),
        ColorType::Indexed => {
            return Err(IoError::UnsupportedFormat(
                "unexpanded PNG palette".to_string(),
            ));
        }
    };

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;

    let width = output_info.width;
    let height = output_info.height;
    let bytes_per_row = output_info.line_size;
    let data = &buf[..output_info.buffer_size()];

    let mut pix = PixMut::new(width, height, pix_depth)?;
    pix.set_spp(spp);
    pix.set_informat(ImageFormat::Png);

    for y in 0..height {
        let row = &data[y as usize * bytes_per_row..];
        let line = pix.row_data_mut(y);
        for x in 0..width {
            let idx = x as usize * samples;
            match color_type {
                ColorType::Grayscale => set_data_byte(line, x, row[idx] as u32),
                ColorType::GrayscaleAlpha => {
                    let g = row[idx];
                    line[x as usize] = color::compose_rgba(g, g, g, row[idx + 1]);
                }
                ColorType::Rgb => {
                    line[x as usize] = color::compose_rgb(row[idx], row[idx + 1], row[idx + 2]);
                }
                _ => {
                    line[x as usize] =
                        color::compose_rgba(row[idx], row[idx + 1], row[idx + 2], row[idx + 3]);
                }
            }
        }
    }

    Ok(pix.into())
}

/// Write a PNG image
///
/// 8 bpp images are written as 8-bit grayscale, 32 bpp images as RGB
/// (or RGBA when `spp == 4`).
pub fn write_png<W: Write>(pix: &Pix, writer: W) -> IoResult<()> {
    let width = pix.width();
    let height = pix.height();

    let color_type = match pix.depth() {
        PixelDepth::Bit8 => ColorType::Grayscale,
        PixelDepth::Bit32 if pix.spp() == 4 => ColorType::Rgba,
        PixelDepth::Bit32 => ColorType::Rgb,
    };

    let mut encoder = Encoder::new(writer, width, height);
    encoder.set_color(color_type);
    encoder.set_depth(BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;

    let samples = color_type.samples();
    let mut data = Vec::with_capacity(width as usize * height as usize * samples);
    for y in 0..height {
        for x in 0..width {
            let val = pix.get_pixel_unchecked(x, y);
            match color_type {
                ColorType::Grayscale => data.push(val as u8),
                ColorType::Rgba => {
                    data.extend_from_slice(&[
                        color::red(val),
                        color::green(val),
                        color::blue(val),
                        color::alpha(val),
                    ]);
                }
                _ => {
                    let (r, g, b) = color::extract_rgb(val);
                    data.extend_from_slice(&[r, g, b]);
                }
            }
        }
    }

    writer
        .write_image_data(&data)
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;
    writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_gray_roundtrip() {
        let samples: Vec<u8> = (0..35 * 13).map(|i| (i * 7 % 256) as u8).collect();
        let pix = Pix::from_gray_samples(13, 35, &samples).unwrap();

        let mut buf = Vec::new();
        write_png(&pix, &mut buf).unwrap();
        let back = read_png(Cursor::new(&buf)).unwrap();

        assert_eq!(back.informat(), ImageFormat::Png);
        assert_eq!(back, pix);
    }

    #[test]
    fn test_png_rgb_roundtrip() {
        let mut pix = PixMut::new(3, 2, PixelDepth::Bit32).unwrap();
        pix.set_rgb(0, 0, 255, 0, 0).unwrap();
        pix.set_rgb(2, 1, 1, 2, 3).unwrap();
        let pix: Pix = pix.into();

        let mut buf = Vec::new();
        write_png(&pix, &mut buf).unwrap();
        let back = read_png(Cursor::new(&buf)).unwrap();

        assert_eq!(back.depth(), PixelDepth::Bit32);
        assert_eq!(back.get_rgb(0, 0), Some((255, 0, 0)));
        assert_eq!(back.get_rgb(2, 1), Some((1, 2, 3)));
    }

    #[test]
    fn test_png_garbage_is_decode_error() {
        let err = read_png(Cursor::new(b"\x89PNG\r\n\x1a\nnot really".to_vec())).unwrap_err();
        assert!(matches!(err, IoError::DecodeError(_)));
    }
}
