//! Binarization
//!
//! The recognizer keeps binary images at 8 bpp with samples of exactly
//! 0 (background) or 255 (ink), so sums over regions stay on the same
//! scale as the reference data.

use super::{Pix, PixMut, PixelDepth, get_data_byte, set_data_byte};
use crate::error::{Error, Result};

impl Pix {
    /// Threshold an 8 bpp image into a 0/255 image.
    ///
    /// Samples `< thresh` become 0, all others become 255.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 8 bpp.
    pub fn threshold_to_binary_gray(&self, thresh: u8) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }

        let w = self.width();
        let h = self.height();
        let mut out = PixMut::new(w, h, PixelDepth::Bit8)?;
        for y in 0..h {
            let src = self.row_data(y);
            let line = out.row_data_mut(y);
            for x in 0..w {
                if get_data_byte(src, x) >= thresh as u32 {
                    set_data_byte(line, x, 255);
                }
            }
        }
        Ok(out.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        let pix = Pix::from_gray_samples(5, 1, &[0, 49, 50, 51, 255]).unwrap();
        let bin = pix.threshold_to_binary_gray(50).unwrap();
        assert_eq!(bin.gray_samples().unwrap(), vec![0, 0, 255, 255, 255]);
    }

    #[test]
    fn test_threshold_rejects_color() {
        let pix = Pix::new(2, 2, PixelDepth::Bit32).unwrap();
        assert!(pix.threshold_to_binary_gray(50).is_err());
    }
}
