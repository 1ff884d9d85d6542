//! Depth conversion
//!
//! Everything downstream of decoding works on 8 bpp grayscale, so color
//! sources are reduced with a weighted sum of channels.

use super::{Pix, PixMut, PixelDepth, set_data_byte};
use crate::color;
use crate::error::{Error, Result};

/// ITU-R BT.709 luma weight for red
pub const LUMA709_RED_WEIGHT: f32 = 0.2126;
/// ITU-R BT.709 luma weight for green
pub const LUMA709_GREEN_WEIGHT: f32 = 0.7152;
/// ITU-R BT.709 luma weight for blue
pub const LUMA709_BLUE_WEIGHT: f32 = 0.0722;

const FIXED_SHIFT: u32 = 15;
const FIXED_ONE: u32 = 1 << FIXED_SHIFT;

impl Pix {
    /// Convert 32 bpp RGB to 8 bpp grayscale with custom weights.
    ///
    /// Weights are normalized to sum to 1.0 if they don't already, then
    /// applied in 15-bit fixed point with the result truncated, so the
    /// BT.709 weights give `(6966 r + 23436 g + 2366 b) >> 15`.
    /// Alpha is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 32 bpp.
    /// Returns [`Error::InvalidParameter`] if any weight is negative or
    /// all weights are zero.
    pub fn convert_rgb_to_gray(&self, rwt: f32, gwt: f32, bwt: f32) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit32 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        if rwt < 0.0 || gwt < 0.0 || bwt < 0.0 {
            return Err(Error::InvalidParameter("weights must all be >= 0.0".into()));
        }
        let sum = rwt + gwt + bwt;
        if sum <= 0.0 {
            return Err(Error::InvalidParameter(
                "at least one weight must be positive".into(),
            ));
        }
        let (rwt, gwt, bwt) = if (sum - 1.0).abs() > 0.0001 {
            (rwt / sum, gwt / sum, bwt / sum)
        } else {
            (rwt, gwt, bwt)
        };
        let fixed = |w: f32| (w * FIXED_ONE as f32).round() as u32;
        let (rw, gw, bw) = (fixed(rwt), fixed(gwt), fixed(bwt));

        let w = self.width();
        let h = self.height();
        let mut result = PixMut::new(w, h, PixelDepth::Bit8)?;

        for y in 0..h {
            let src = self.row_data(y);
            let line = result.row_data_mut(y);
            for x in 0..w {
                let (r, g, b) = color::extract_rgb(src[x as usize]);
                let gray = (rw * r as u32 + gw * g as u32 + bw * b as u32) >> FIXED_SHIFT;
                set_data_byte(line, x, gray.min(255));
            }
        }

        Ok(result.into())
    }
}
