//! Image arithmetic operations
//!
//! Pixel-wise saturating arithmetic on 8 bpp images:
//!
//! - Subtraction (`arith_subtract`), clipped at 0
//! - Multiplication by a constant (`multiply_constant`), clipped at 255
//!
//! The preprocessor computes `baseline - image` and amplifies it with
//! these two operations.

use super::{Pix, PixMut, PixelDepth, get_data_byte, set_data_byte};
use crate::error::{Error, Result};

impl Pix {
    /// Subtract another image from this one: self - other
    ///
    /// Creates a new image where each pixel is the difference of corresponding
    /// pixels. Values are clipped to 0 (no negative values).
    ///
    /// # Errors
    ///
    /// Returns error if images have different dimensions, or are not 8 bpp.
    ///
    /// # Example
    ///
    /// ```
    /// use capsolve_core::Pix;
    ///
    /// let blank = Pix::from_gray_samples(3, 1, &[200, 200, 200]).unwrap();
    /// let image = Pix::from_gray_samples(3, 1, &[100, 200, 250]).unwrap();
    /// let diff = blank.arith_subtract(&image).unwrap();
    /// assert_eq!(diff.gray_samples().unwrap(), vec![100, 0, 0]);
    /// ```
    pub fn arith_subtract(&self, other: &Pix) -> Result<Pix> {
        self.check_gray_pair(other)?;

        let w = self.width();
        let h = self.height();
        let mut out = PixMut::new(w, h, PixelDepth::Bit8)?;
        for y in 0..h {
            let a = self.row_data(y);
            let b = other.row_data(y);
            let line = out.row_data_mut(y);
            for x in 0..w {
                let v = get_data_byte(a, x).saturating_sub(get_data_byte(b, x));
                set_data_byte(line, x, v);
            }
        }
        Ok(out.into())
    }

    /// Multiply all pixels by a constant factor.
    ///
    /// Values are rounded and clipped to 255.
    ///
    /// # Errors
    ///
    /// Returns error if factor is negative or the image is not 8 bpp.
    pub fn multiply_constant(&self, factor: f32) -> Result<Pix> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        if factor < 0.0 || !factor.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "factor must be finite and >= 0.0, got {factor}"
            )));
        }

        let mut out = self.to_mut();
        for y in 0..self.height() {
            let line = out.row_data_mut(y);
            for x in 0..self.width() {
                let v = get_data_byte(line, x) as f32 * factor + 0.5;
                set_data_byte(line, x, (v as u32).min(255));
            }
        }
        Ok(out.into())
    }

    fn check_gray_pair(&self, other: &Pix) -> Result<()> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        if other.depth() != PixelDepth::Bit8 {
            return Err(Error::IncompatibleDepths(
                self.depth().bits(),
                other.depth().bits(),
            ));
        }
        if self.width() != other.width() || self.height() != other.height() {
            return Err(Error::IncompatibleSizes(
                self.width(),
                self.height(),
                other.width(),
                other.height(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtract_clamps_at_zero() {
        let a = Pix::from_gray_samples(4, 1, &[10, 50, 255, 0]).unwrap();
        let b = Pix::from_gray_samples(4, 1, &[20, 45, 0, 0]).unwrap();
        let d = a.arith_subtract(&b).unwrap();
        assert_eq!(d.gray_samples().unwrap(), vec![0, 5, 255, 0]);
    }

    #[test]
    fn test_subtract_size_mismatch() {
        let a = Pix::new(4, 1, PixelDepth::Bit8).unwrap();
        let b = Pix::new(5, 1, PixelDepth::Bit8).unwrap();
        assert!(matches!(
            a.arith_subtract(&b),
            Err(Error::IncompatibleSizes(4, 1, 5, 1))
        ));
    }

    #[test]
    fn test_subtract_depth_mismatch() {
        let a = Pix::new(4, 1, PixelDepth::Bit8).unwrap();
        let b = Pix::new(4, 1, PixelDepth::Bit32).unwrap();
        assert!(a.arith_subtract(&b).is_err());
        assert!(b.arith_subtract(&a).is_err());
    }

    #[test]
    fn test_multiply_saturates() {
        let a = Pix::from_gray_samples(4, 1, &[0, 4, 5, 30]).unwrap();
        let m = a.multiply_constant(10.0).unwrap();
        assert_eq!(m.gray_samples().unwrap(), vec![0, 40, 50, 255]);
    }

    #[test]
    fn test_multiply_rejects_negative() {
        let a = Pix::new(2, 2, PixelDepth::Bit8).unwrap();
        assert!(a.multiply_constant(-1.0).is_err());
        assert!(a.multiply_constant(f32::NAN).is_err());
    }
}
