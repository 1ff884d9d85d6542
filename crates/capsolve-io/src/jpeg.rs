//! JPEG image format support
//!
//! Reads JPEG images using the `jpeg-decoder` crate.
//! Supports 8-bit grayscale and 24-bit RGB (decoded to 32-bit RGB internally).
//! The decoder is read-only; there is no JPEG writer.

use crate::{IoError, IoResult};
use capsolve_core::{ImageFormat, Pix, PixMut, PixelDepth, color, pix::set_data_byte};
use jpeg_decoder::{Decoder, PixelFormat};
use std::io::Read;

/// Read a JPEG image from a reader.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
///
/// # Returns
/// A `Pix` at 8-bpp (grayscale) or 32-bpp (RGB).
pub fn read_jpeg<R: Read>(reader: R) -> IoResult<Pix> {
    let mut decoder = Decoder::new(reader);
    let pixels = decoder
        .decode()
        .map_err(|e| IoError::DecodeError(format!("JPEG decode error: {}", e)))?;
    let info = decoder
        .info()
        .ok_or_else(|| IoError::DecodeError("JPEG header missing".to_string()))?;

    let width = u32::from(info.width);
    let height = u32::from(info.height);

    let (depth, bytes_per_pixel) = match info.pixel_format {
        PixelFormat::L8 => (PixelDepth::Bit8, 1usize),
        // big-endian samples; keep the high byte
        PixelFormat::L16 => (PixelDepth::Bit8, 2),
        PixelFormat::RGB24 => (PixelDepth::Bit32, 3),
        PixelFormat::CMYK32 => {
            return Err(IoError::UnsupportedFormat(
                "CMYK JPEG is not supported".to_string(),
            ));
        }
    };

    let expected = width as usize * height as usize * bytes_per_pixel;
    if pixels.len() < expected {
        return Err(IoError::InvalidData(format!(
            "JPEG pixel buffer too short: {} < {}",
            pixels.len(),
            expected
        )));
    }

    let mut pix = PixMut::new(width, height, depth)?;
    pix.set_informat(ImageFormat::Jpeg);

    for y in 0..height {
        let row = &pixels[y as usize * width as usize * bytes_per_pixel..];
        let line = pix.row_data_mut(y);
        for x in 0..width {
            let idx = x as usize * bytes_per_pixel;
            match info.pixel_format {
                PixelFormat::RGB24 => {
                    line[x as usize] = color::compose_rgb(row[idx], row[idx + 1], row[idx + 2]);
                }
                _ => set_data_byte(line, x, row[idx] as u32),
            }
        }
    }

    Ok(pix.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_truncated_is_decode_error() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let err = read_jpeg(&data[..]).unwrap_err();
        assert!(matches!(err, IoError::DecodeError(_)));
    }
}
