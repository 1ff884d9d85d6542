//! PIX - The image container
//!
//! The `Pix` structure is the image type shared by every stage of the
//! recognizer. Two pixel depths are supported: 8 bpp grayscale (the
//! working depth of the whole pipeline) and 32 bpp RGB(A) as decoded
//! from color sources.
//!
//! # Pixel layout
//!
//! - Image data is stored in 32-bit words
//! - Every row starts on a 32-bit boundary
//! - Pixels are packed MSB to LSB within each word
//! - For 32-bit images, color order is RGBA (red in MSB)
//!
//! # Ownership model
//!
//! `Pix` uses `Arc` for cheap cloning (shared ownership), so a decoded
//! baseline can be handed to any number of concurrent solves.
//! To modify pixel data, build a [`PixMut`] (or copy with
//! [`Pix::to_mut`]), then convert back with `Into<Pix>`.

mod access;
pub mod arith;
mod clip;
pub mod convert;
mod statistics;
mod threshold;

pub use access::{get_data_byte, set_data_byte};
pub use convert::{LUMA709_BLUE_WEIGHT, LUMA709_GREEN_WEIGHT, LUMA709_RED_WEIGHT};

use crate::error::{Error, Result};
use std::sync::Arc;

/// Pixel depth (bits per pixel)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum PixelDepth {
    /// 8-bit grayscale
    Bit8 = 8,
    /// 32-bit RGB or RGBA
    Bit32 = 32,
}

impl PixelDepth {
    /// Get the number of bits per pixel.
    pub fn bits(self) -> u32 {
        self as u32
    }
}

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Unknown format
    #[default]
    Unknown,
    /// JFIF JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// PNM format (binary PGM / PPM)
    Pnm,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Pnm => "pnm",
        }
    }
}

/// Internal PIX data
#[derive(Debug, Clone)]
struct PixData {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Depth in bits per pixel
    depth: PixelDepth,
    /// Samples per pixel (1 for grayscale, 3 for RGB, 4 for RGBA)
    spp: u32,
    /// 32-bit words per line
    wpl: u32,
    /// Input file format
    informat: ImageFormat,
    /// The image data (packed 32-bit words)
    data: Vec<u32>,
}

impl PixData {
    fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }

        let wpl = compute_wpl(width, depth)?;
        let data = vec![0u32; (wpl as usize) * (height as usize)];
        let spp = match depth {
            PixelDepth::Bit32 => 3,
            PixelDepth::Bit8 => 1,
        };

        Ok(PixData {
            width,
            height,
            depth,
            spp,
            wpl,
            informat: ImageFormat::Unknown,
            data,
        })
    }
}

/// Compute words per line for given width and depth.
///
/// Uses u64 arithmetic to prevent overflow for large widths.
#[inline]
fn compute_wpl(width: u32, depth: PixelDepth) -> Result<u32> {
    let bits_per_line = u64::from(width) * u64::from(depth.bits());
    u32::try_from(bits_per_line.div_ceil(32)).map_err(|_| Error::InvalidDimension {
        width,
        height: 0,
    })
}

/// PIX - Main image container
///
/// Immutable once produced; every transform returns a new instance.
///
/// # Examples
///
/// ```
/// use capsolve_core::{Pix, PixelDepth};
///
/// // Create a new 8-bit grayscale image
/// let pix = Pix::new(250, 80, PixelDepth::Bit8).unwrap();
/// assert_eq!(pix.width(), 250);
/// assert_eq!(pix.height(), 80);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    inner: Arc<PixData>,
}

impl Pix {
    /// Create a new PIX with the specified dimensions and depth.
    ///
    /// The image data is initialized to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Ok(PixMut::new(width, height, depth)?.into())
    }

    /// Create an 8 bpp image from row-major samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferLength`] if `samples.len() != width * height`.
    pub fn from_gray_samples(width: u32, height: u32, samples: &[u8]) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if samples.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: samples.len(),
            });
        }
        let mut pix = PixMut::new(width, height, PixelDepth::Bit8)?;
        for (y, row) in samples.chunks_exact(width as usize).enumerate() {
            let line = pix.row_data_mut(y as u32);
            for (x, &v) in row.iter().enumerate() {
                set_data_byte(line, x as u32, v as u32);
            }
        }
        Ok(pix.into())
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Get the samples per pixel.
    #[inline]
    pub fn spp(&self) -> u32 {
        self.inner.spp
    }

    /// Get the words per line.
    #[inline]
    pub fn wpl(&self) -> u32 {
        self.inner.wpl
    }

    /// Get the input file format.
    #[inline]
    pub fn informat(&self) -> ImageFormat {
        self.inner.informat
    }

    /// Get the words of a specific row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = (y * self.inner.wpl) as usize;
        let end = start + self.inner.wpl as usize;
        &self.inner.data[start..end]
    }

    /// Copy out the 8 bpp samples in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 8 bpp.
    pub fn gray_samples(&self) -> Result<Vec<u8>> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let mut out = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in 0..self.height() {
            let line = self.row_data(y);
            out.extend((0..self.width()).map(|x| get_data_byte(line, x) as u8));
        }
        Ok(out)
    }

    /// Check if two PIX have the same width, height, and depth.
    pub fn sizes_equal(&self, other: &Pix) -> bool {
        self.inner.width == other.inner.width
            && self.inner.height == other.inner.height
            && self.inner.depth == other.inner.depth
    }

    /// Create a mutable copy of this PIX.
    ///
    /// Always creates a new copy that can be modified.
    pub fn to_mut(&self) -> PixMut {
        PixMut {
            inner: (*self.inner).clone(),
        }
    }
}

impl PartialEq for Pix {
    /// Two images are equal when geometry, depth and every sample match.
    fn eq(&self, other: &Self) -> bool {
        self.sizes_equal(other) && self.inner.data == other.inner.data
    }
}

/// Mutable PIX
///
/// Allows modification of image data. Convert back to an immutable
/// [`Pix`] using `Into<Pix>`.
#[derive(Debug)]
pub struct PixMut {
    inner: PixData,
}

impl PixMut {
    /// Create a new zero-filled mutable image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, depth: PixelDepth) -> Result<Self> {
        Ok(PixMut {
            inner: PixData::new(width, height, depth)?,
        })
    }

    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the pixel depth.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.inner.depth
    }

    /// Get samples per pixel.
    #[inline]
    pub fn spp(&self) -> u32 {
        self.inner.spp
    }

    /// Set the input file format.
    pub fn set_informat(&mut self, format: ImageFormat) {
        self.inner.informat = format;
    }

    /// Set samples per pixel.
    pub fn set_spp(&mut self, spp: u32) {
        self.inner.spp = spp;
    }


    /// Get the words of a specific row.
    #[inline]
    pub fn row_data(&self, y: u32) -> &[u32] {
        let start = (y * self.inner.wpl) as usize;
        let end = start + self.inner.wpl as usize;
        &self.inner.data[start..end]
    }

    /// Get mutable access to a specific row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_data_mut(&mut self, y: u32) -> &mut [u32] {
        let start = (y * self.inner.wpl) as usize;
        let end = start + self.inner.wpl as usize;
        &mut self.inner.data[start..end]
    }

    /// Set every pixel of an 8 bpp image to `grayval`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDepth`] if the image is not 8 bpp.
    pub fn set_all_gray(&mut self, grayval: u8) -> Result<()> {
        if self.depth() != PixelDepth::Bit8 {
            return Err(Error::UnsupportedDepth(self.depth().bits()));
        }
        let v = grayval as u32;
        let word = (v << 24) | (v << 16) | (v << 8) | v;
        self.inner.data.fill(word);
        Ok(())
    }
}

impl From<PixMut> for Pix {
    fn from(pix: PixMut) -> Self {
        Pix {
            inner: Arc::new(pix.inner),
        }
    }
}
