//! Background removal and binarization
//!
//! Every captured code image is drawn over the same noisy background. The
//! background is removed by subtracting the image from a stored blank
//! rendering, so only glyph strokes (which are darker than the background)
//! survive:
//!
//! 1. Convert image and baseline to 8 bpp gray
//! 2. `diff = baseline - image`, clipped at 0
//! 3. `diff *= gain`, clipped at 255
//! 4. Binarize: `< threshold` becomes 0, everything else 255
//! 5. Cut out the glyph band
//!
//! All steps are pixel-wise, so the band is cut out of both inputs first
//! and the arithmetic runs on the band only.

use crate::params::PreprocessParams;
use crate::{RecogError, RecogResult};
use capsolve_core::{Pix, PixelDepth};

/// Convert an image to 8 bpp gray using the configured channel weights.
pub fn to_gray(pix: &Pix, params: &PreprocessParams) -> RecogResult<Pix> {
    let gray = match pix.depth() {
        PixelDepth::Bit8 => pix.clone(),
        PixelDepth::Bit32 => {
            let [r, g, b] = params.gray_weights;
            pix.convert_rgb_to_gray(r, g, b)?
        }
    };
    Ok(gray)
}

/// Check that an image is large enough to contain the glyph band.
pub fn check_contains_band(pix: &Pix, params: &PreprocessParams) -> RecogResult<()> {
    let c = &params.crop;
    let far_edge = |origin: i32, size: i32| {
        u32::try_from(i64::from(origin) + i64::from(size)).unwrap_or(u32::MAX)
    };
    let min_width = far_edge(c.x, c.w);
    let min_height = far_edge(c.y, c.h);
    if pix.width() < min_width || pix.height() < min_height {
        return Err(RecogError::ImageTooSmall {
            min_width,
            min_height,
            actual_width: pix.width(),
            actual_height: pix.height(),
        });
    }
    Ok(())
}

/// Remove the background from `image` and return the binary glyph band.
///
/// # Arguments
/// * `image` - Captured code image, 8 or 32 bpp
/// * `baseline` - Blank rendering of the same background, same size
/// * `params` - Crop, gain, threshold and gray weights
///
/// # Returns
/// An 8 bpp image of exactly `crop.w x crop.h` whose samples are 0 or 255.
///
/// # Errors
/// [`RecogError::SizeMismatch`] if the image and baseline differ in size,
/// [`RecogError::ImageTooSmall`] if the band does not fit in the image.
pub fn clean(image: &Pix, baseline: &Pix, params: &PreprocessParams) -> RecogResult<Pix> {
    params.validate()?;

    if image.width() != baseline.width() || image.height() != baseline.height() {
        return Err(RecogError::SizeMismatch {
            width: baseline.width(),
            height: baseline.height(),
            actual_width: image.width(),
            actual_height: image.height(),
        });
    }
    check_contains_band(image, params)?;

    let image_band = to_gray(image, params)?.clip_box(&params.crop)?;
    let baseline_band = to_gray(baseline, params)?.clip_box(&params.crop)?;

    let diff = baseline_band.arith_subtract(&image_band)?;
    let amplified = diff.multiply_constant(params.gain)?;
    let band = amplified.threshold_to_binary_gray(params.threshold)?;

    Ok(band)
}
