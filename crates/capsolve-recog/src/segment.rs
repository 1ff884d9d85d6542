//! Glyph segmentation
//!
//! The cleaned band is split at empty columns. Every maximal run of
//! consecutive columns containing ink is one glyph, and a glyph is only
//! complete once an empty column follows it. A run still open at the right
//! edge of the band is dropped; the crop is chosen so that real codes never
//! touch it.
//!
//! Glyphs keep the band's full height and its orientation: sample `(x, y)`
//! of a glyph starting at band column `c` is sample `(c + x, y)` of the band.

use crate::{RecogError, RecogResult};
use capsolve_core::{Box, Pix, PixelDepth};
use log::debug;

/// One segmented glyph
///
/// Always 8 bpp with samples 0 (background) or 255 (ink).
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphBitmap {
    pix: Pix,
    start: u32,
}

impl GlyphBitmap {
    /// Glyph width in columns
    pub fn width(&self) -> u32 {
        self.pix.width()
    }

    /// Glyph height in rows (the band height)
    pub fn height(&self) -> u32 {
        self.pix.height()
    }

    /// Band column of the glyph's first column
    pub fn start_column(&self) -> u32 {
        self.start
    }

    /// The glyph image
    pub fn pix(&self) -> &Pix {
        &self.pix
    }

    /// Sum of samples in a sub-rectangle of the glyph.
    ///
    /// Empty or out-of-range rectangles sum to 0.
    pub fn region_sum(&self, x: u32, y: u32, w: u32, h: u32) -> RecogResult<u64> {
        if w == 0 || h == 0 {
            return Ok(0);
        }
        let region = Box::new_unchecked(x as i32, y as i32, w as i32, h as i32);
        Ok(self.pix.sum_in_rect(Some(&region))?)
    }
}

/// Split a cleaned band into glyphs, left to right.
///
/// Any non-zero sample counts as ink. The returned glyphs are binarized to
/// 0/255 regardless of the input's ink values.
///
/// # Errors
/// Returns [`RecogError::InvalidParameter`] if the band is not 8 bpp.
pub fn segment(band: &Pix) -> RecogResult<Vec<GlyphBitmap>> {
    if band.depth() != PixelDepth::Bit8 {
        return Err(RecogError::InvalidParameter(format!(
            "segmentation needs an 8 bpp band, got {} bpp",
            band.depth().bits()
        )));
    }

    let ink = band.count_nonzero_by_column()?;
    let mut glyphs = Vec::new();
    let mut start: Option<u32> = None;

    for (x, &count) in ink.iter().enumerate() {
        let x = x as u32;
        if count > 0 {
            start.get_or_insert(x);
        } else if let Some(s) = start.take() {
            let pix = band
                .clip_rectangle(s, 0, x - s, band.height())?
                .threshold_to_binary_gray(1)?;
            glyphs.push(GlyphBitmap { pix, start: s });
        }
    }

    if let Some(s) = start {
        debug!(
            "dropping unterminated glyph at columns {}..{}",
            s,
            band.width()
        );
    }

    debug!("segmented {} glyph(s)", glyphs.len());
    Ok(glyphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use capsolve_core::PixMut;

    /// Band with ink in the given columns, rows `0..rows`.
    fn band_with_columns(width: u32, cols: &[u32], rows: u32) -> Pix {
        let mut pix = PixMut::new(width, 35, PixelDepth::Bit8).unwrap();
        for &x in cols {
            for y in 0..rows {
                pix.set_pixel(x, y, 255).unwrap();
            }
        }
        pix.into()
    }

    #[test]
    fn test_segment_empty_band() {
        let band = Pix::new(130, 35, PixelDepth::Bit8).unwrap();
        assert!(segment(&band).unwrap().is_empty());
    }

    #[test]
    fn test_segment_runs_split_on_empty_columns() {
        let band = band_with_columns(130, &[0, 1, 2, 5, 10, 11], 35);
        let glyphs = segment(&band).unwrap();
        let spans: Vec<(u32, u32)> = glyphs
            .iter()
            .map(|g| (g.start_column(), g.width()))
            .collect();
        assert_eq!(spans, vec![(0, 3), (5, 1), (10, 2)]);
        assert!(glyphs.iter().all(|g| g.height() == 35));
    }

    #[test]
    fn test_segment_drops_glyph_at_right_edge() {
        let band = band_with_columns(130, &[3, 4, 128, 129], 10);
        let glyphs = segment(&band).unwrap();
        assert_eq!(glyphs.len(), 1);
        assert_eq!(glyphs[0].start_column(), 3);

        // a glyph ending at column 128 is closed by column 129
        let band = band_with_columns(130, &[127, 128], 10);
        assert_eq!(segment(&band).unwrap().len(), 1);
    }

    #[test]
    fn test_segment_keeps_orientation() {
        let mut pix = PixMut::new(8, 35, PixelDepth::Bit8).unwrap();
        pix.set_pixel(2, 0, 255).unwrap();
        pix.set_pixel(3, 34, 255).unwrap();
        pix.set_pixel(4, 17, 1).unwrap();
        let glyphs = segment(&pix.into()).unwrap();
        assert_eq!(glyphs.len(), 1);
        let g = glyphs[0].pix();
        assert_eq!(g.width(), 3);
        assert_eq!(g.get_pixel(0, 0), Some(255));
        assert_eq!(g.get_pixel(1, 34), Some(255));
        // weak ink is normalized
        assert_eq!(g.get_pixel(2, 17), Some(255));
        assert_eq!(g.get_pixel(0, 34), Some(0));
    }

    #[test]
    fn test_region_sum() {
        let band = band_with_columns(10, &[1, 2], 35);
        let glyph = &segment(&band).unwrap()[0];
        assert_eq!(glyph.region_sum(0, 0, 2, 35).unwrap(), 2 * 35 * 255);
        assert_eq!(glyph.region_sum(1, 0, 5, 1).unwrap(), 255);
        assert_eq!(glyph.region_sum(0, 0, 0, 35).unwrap(), 0);
    }

    #[test]
    fn test_segment_rejects_color() {
        let band = Pix::new(130, 35, PixelDepth::Bit32).unwrap();
        assert!(segment(&band).is_err());
    }
}
