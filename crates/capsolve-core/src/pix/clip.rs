//! Rectangle extraction

use super::{Pix, PixMut};
use crate::box_::Box;
use crate::error::{Error, Result};

impl Pix {
    /// Extract a rectangular region from the image.
    ///
    /// Regions extending beyond the image are clipped to the image bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `w` or `h` is zero
    /// - The rectangle origin is outside the image bounds
    ///
    /// # Examples
    ///
    /// ```
    /// use capsolve_core::{Pix, PixelDepth};
    ///
    /// let pix = Pix::new(100, 80, PixelDepth::Bit8).unwrap();
    /// let clipped = pix.clip_rectangle(80, 60, 50, 50).unwrap();
    /// assert_eq!(clipped.width(), 20);   // clipped: 100 - 80
    /// assert_eq!(clipped.height(), 20);  // clipped: 80 - 60
    /// ```
    pub fn clip_rectangle(&self, x: u32, y: u32, w: u32, h: u32) -> Result<Pix> {
        if w == 0 || h == 0 {
            return Err(Error::InvalidParameter(format!(
                "clip rectangle has zero dimension: {}x{}",
                w, h
            )));
        }

        let src_w = self.width();
        let src_h = self.height();

        if x >= src_w || y >= src_h {
            return Err(Error::InvalidParameter(format!(
                "clip rectangle origin ({}, {}) is outside image bounds ({}x{})",
                x, y, src_w, src_h
            )));
        }

        let clip_w = w.min(src_w - x);
        let clip_h = h.min(src_h - y);

        let mut pixd = PixMut::new(clip_w, clip_h, self.depth())?;
        pixd.set_spp(self.spp());

        for dy in 0..clip_h {
            for dx in 0..clip_w {
                let val = self.get_pixel_unchecked(x + dx, y + dy);
                pixd.set_pixel_unchecked(dx, dy, val);
            }
        }

        Ok(pixd.into())
    }

    /// Extract exactly the region described by `region`.
    ///
    /// Unlike [`Pix::clip_rectangle`], the region must lie entirely inside
    /// the image, so the output always has the requested size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the box is empty or not
    /// contained in the image.
    pub fn clip_box(&self, region: &Box) -> Result<Pix> {
        let bounds = Box::new_unchecked(0, 0, self.width() as i32, self.height() as i32);
        if region.is_empty() || region.x < 0 || region.y < 0 || !bounds.contains_box(region) {
            return Err(Error::InvalidParameter(format!(
                "region {:?} is not inside image bounds ({}x{})",
                region,
                self.width(),
                self.height()
            )));
        }
        self.clip_rectangle(
            region.x as u32,
            region.y as u32,
            region.w as u32,
            region.h as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PixelDepth;

    fn ramp(w: u32, h: u32) -> Pix {
        let samples: Vec<u8> = (0..w * h).map(|i| (i % 251) as u8).collect();
        Pix::from_gray_samples(w, h, &samples).unwrap()
    }

    #[test]
    fn test_clip_rectangle_copies_samples() {
        let pix = ramp(10, 6);
        let c = pix.clip_rectangle(2, 3, 4, 2).unwrap();
        assert_eq!((c.width(), c.height()), (4, 2));
        for y in 0..2 {
            for x in 0..4 {
                assert_eq!(c.get_pixel(x, y), pix.get_pixel(x + 2, y + 3));
            }
        }
    }

    #[test]
    fn test_clip_rectangle_errors() {
        let pix = ramp(10, 6);
        assert!(pix.clip_rectangle(0, 0, 0, 3).is_err());
        assert!(pix.clip_rectangle(10, 0, 1, 1).is_err());
    }

    #[test]
    fn test_clip_box_requires_containment() {
        let pix = Pix::new(250, 80, PixelDepth::Bit8).unwrap();
        let band = pix.clip_box(&Box::new_unchecked(75, 24, 130, 35)).unwrap();
        assert_eq!((band.width(), band.height()), (130, 35));

        let small = Pix::new(150, 50, PixelDepth::Bit8).unwrap();
        assert!(small.clip_box(&Box::new_unchecked(75, 24, 130, 35)).is_err());
        assert!(pix.clip_box(&Box::new_unchecked(-1, 0, 5, 5)).is_err());
        assert!(pix.clip_box(&Box::new_unchecked(0, 0, 0, 5)).is_err());
    }
}
