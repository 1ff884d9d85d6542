//! Synthetic code images
//!
//! Builds images shaped like real captures: a noisy gray background
//! (the baseline) and a copy of it with glyphs drawn darker inside the
//! glyph band. Cleaning such an image against its baseline gives back
//! exactly the band that was drawn, so tests can control the glyphs the
//! recognizer sees down to the pixel.
//!
//! All randomness comes from a seeded [`StdRng`], so fixtures are
//! identical on every run.

use crate::{TestError, TestResult};
use capsolve_core::{Box, Pix, PixMut, PixelDepth};
use rand::prelude::*;

/// Width of a full capture
pub const IMAGE_WIDTH: u32 = 250;
/// Height of a full capture
pub const IMAGE_HEIGHT: u32 = 80;
/// Glyph band inside a capture
pub const BAND: Box = Box::new_unchecked(75, 24, 130, 35);

/// How much darker than the background ink is drawn
const INK_DEPTH: u32 = 80;

/// A noisy background, gray levels 100..=220.
pub fn baseline(seed: u64) -> TestResult<Pix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pix = PixMut::new(IMAGE_WIDTH, IMAGE_HEIGHT, PixelDepth::Bit8)?;
    for y in 0..IMAGE_HEIGHT {
        for x in 0..IMAGE_WIDTH {
            pix.set_pixel_unchecked(x, y, rng.random_range(100..=220));
        }
    }
    Ok(pix.into())
}

/// A glyph drawn as a union of rectangles
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphShape {
    pub width: u32,
    /// `(x, y, w, h)` inside a `width x 35` cell
    pub rects: Vec<(u32, u32, u32, u32)>,
}

impl GlyphShape {
    /// Solid bar over rows 4..31
    pub fn bar(width: u32) -> Self {
        GlyphShape {
            width,
            rects: vec![(0, 4, width, 27)],
        }
    }

    /// Bar with its rows 10..20 cleared except for the first column
    pub fn hollow(width: u32) -> Self {
        // drawn as the three parts left after the cut
        GlyphShape {
            width,
            rects: vec![(0, 4, width, 6), (0, 10, 1, 10), (0, 20, width, 11)],
        }
    }

    /// True if `(x, y)` is ink
    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.rects
            .iter()
            .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh)
    }
}

/// Characters of the synthetic font, in [`shape`] order
pub const ALPHABET: &str = "ABCDEFGHJK";

/// Shape of the `index`-th synthetic character.
///
/// Widths 3, 5, 7, 9, 11 repeat twice, solid then hollow, so any two
/// characters differ in width or by a whole hollow section.
pub fn shape(index: usize) -> GlyphShape {
    let width = 3 + 2 * (index % 5) as u32;
    if index < 5 {
        GlyphShape::bar(width)
    } else {
        GlyphShape::hollow(width)
    }
}

/// Shape of a synthetic character.
pub fn shape_for(ch: char) -> TestResult<GlyphShape> {
    ALPHABET
        .chars()
        .position(|c| c == ch)
        .map(shape)
        .ok_or_else(|| TestError::Fixture(format!("no synthetic glyph for {:?}", ch)))
}

/// Draw shapes into a blank `BAND`-sized band, left to right.
///
/// The first glyph starts at column `gap`; consecutive glyphs are
/// separated by `gap` empty columns.
pub fn band(shapes: &[GlyphShape], gap: u32) -> TestResult<Pix> {
    let (w, h) = (BAND.w as u32, BAND.h as u32);
    let mut pix = PixMut::new(w, h, PixelDepth::Bit8)?;
    let mut x0 = gap;
    for s in shapes {
        if x0 + s.width >= w {
            return Err(TestError::Fixture(format!(
                "glyphs do not fit in a {} column band",
                w
            )));
        }
        for y in 0..h {
            for x in 0..s.width {
                if s.is_ink(x, y) {
                    pix.set_pixel(x0 + x, y, 255)?;
                }
            }
        }
        x0 += s.width + gap;
    }
    Ok(pix.into())
}

/// Band holding the synthetic glyphs of `code`, two columns apart.
pub fn code_band(code: &str) -> TestResult<Pix> {
    let shapes = code.chars().map(shape_for).collect::<TestResult<Vec<_>>>()?;
    band(&shapes, 2)
}

/// Draw a band into a copy of `baseline`.
///
/// Ink pixels of the band become `INK_DEPTH` darker than the baseline.
/// Every other pixel gets noise that cleaning must remove: slightly
/// darker (too little to survive the threshold) or lighter (clipped away
/// by the subtraction).
pub fn render(baseline: &Pix, band: &Pix, seed: u64) -> TestResult<Pix> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pix = baseline.to_mut();
    for y in 0..baseline.height() {
        for x in 0..baseline.width() {
            let base = baseline.get_pixel_unchecked(x, y);
            let in_band = x >= BAND.x as u32
                && y >= BAND.y as u32
                && x < BAND.right() as u32
                && y < BAND.bottom() as u32;
            let ink = in_band
                && band
                    .get_pixel(x - BAND.x as u32, y - BAND.y as u32)
                    .is_some_and(|v| v != 0);
            let v = if ink {
                base.saturating_sub(INK_DEPTH)
            } else {
                let delta: u32 = rng.random_range(0..=24);
                if delta < 4 {
                    base.saturating_sub(delta)
                } else {
                    (base + delta - 4).min(255)
                }
            };
            pix.set_pixel_unchecked(x, y, v);
        }
    }
    Ok(pix.into())
}

/// A full capture showing `code` over `baseline`.
pub fn render_code(baseline: &Pix, code: &str, seed: u64) -> TestResult<Pix> {
    render(baseline, &code_band(code)?, seed)
}

/// Expand an 8 bpp image into 32 bpp RGB with equal channels.
pub fn to_rgb(pix: &Pix) -> TestResult<Pix> {
    let mut out = PixMut::new(pix.width(), pix.height(), PixelDepth::Bit32)?;
    for y in 0..pix.height() {
        for x in 0..pix.width() {
            let v = pix.get_pixel_unchecked(x, y) as u8;
            out.set_rgb(x, y, v, v, v)?;
        }
    }
    Ok(out.into())
}

/// Labeled captures: `(code, image)` for every code in `codes`.
pub fn corpus(baseline: &Pix, codes: &[&str], seed: u64) -> TestResult<Vec<(String, Pix)>> {
    codes
        .iter()
        .enumerate()
        .map(|(i, code)| Ok((code.to_string(), render_code(baseline, code, seed + i as u64)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_deterministic() {
        let b = baseline(3).unwrap();
        let first = render_code(&b, "ABC", 7).unwrap();
        assert_eq!(render_code(&b, "ABC", 7).unwrap(), first);
        assert_ne!(render_code(&b, "ABC", 8).unwrap(), first);
    }

    #[test]
    fn test_baseline_range() {
        let b = baseline(1).unwrap();
        assert_eq!((b.width(), b.height()), (IMAGE_WIDTH, IMAGE_HEIGHT));
        for v in b.gray_samples().unwrap() {
            assert!((100..=220).contains(&v));
        }
        assert_eq!(baseline(1).unwrap(), b);
    }

    #[test]
    fn test_shapes_have_ink_in_every_column() {
        for i in 0..ALPHABET.len() {
            let s = shape(i);
            for x in 0..s.width {
                assert!((0..35).any(|y| s.is_ink(x, y)), "shape {} column {}", i, x);
            }
        }
        let hollow = shape(5);
        assert!(hollow.is_ink(0, 15));
        assert!(!hollow.is_ink(1, 15));
        assert!(hollow.is_ink(1, 9));
    }

    #[test]
    fn test_band_layout() {
        let b = code_band("AB").unwrap();
        assert_eq!((b.width(), b.height()), (130, 35));
        // A: columns 2..5, B: columns 7..12
        let cols = b.count_nonzero_by_column().unwrap();
        let inked: Vec<usize> = (0..130).filter(|&x| cols[x] > 0).collect();
        assert_eq!(inked, vec![2, 3, 4, 7, 8, 9, 10, 11]);
        assert!(code_band("A?").is_err());
    }

    #[test]
    fn test_band_overflow() {
        let wide = vec![GlyphShape::bar(40); 4];
        assert!(band(&wide, 2).is_err());
    }
}
