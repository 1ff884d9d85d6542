//! Image statistics operations
//!
//! - Sum of samples in a rectangular region
//! - Count of non-zero samples per column

use super::{Pix, PixelDepth, get_data_byte};
use crate::box_::Box;
use crate::error::{Error, Result};

impl Pix {
    /// Sum of 8 bpp sample values in a rectangular region.
    ///
    /// `None` sums the whole image. The region is clipped to the image;
    /// a region that does not intersect the image (including an empty
    /// one) sums to 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 8 bpp.
    pub fn sum_in_rect(&self, region: Option<&Box>) -> Result<u64> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }

        let full = Box::new_unchecked(0, 0, self.width() as i32, self.height() as i32);
        let Some(r) = region.unwrap_or(&full).clip(full.w, full.h) else {
            return Ok(0);
        };

        let mut sum = 0u64;
        for y in r.y..r.bottom() {
            let line = self.row_data(y as u32);
            for x in r.x..r.right() {
                sum += u64::from(get_data_byte(line, x as u32));
            }
        }
        Ok(sum)
    }

    /// Number of non-zero 8 bpp samples in each column, left to right.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 8 bpp.
    pub fn count_nonzero_by_column(&self) -> Result<Vec<u32>> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }

        let mut counts = vec![0u32; self.width() as usize];
        for y in 0..self.height() {
            let line = self.row_data(y);
            for (x, count) in counts.iter_mut().enumerate() {
                if get_data_byte(line, x as u32) != 0 {
                    *count += 1;
                }
            }
        }
        Ok(counts)
    }
}
