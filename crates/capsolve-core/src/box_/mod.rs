//! Box - Rectangle regions
//!
//! Used for the fixed crop band of the preprocessor and for the
//! half/quadrant sub-regions of the feature extractor.

use crate::error::{Error, Result};

/// A rectangle region
///
/// A simple Copy type since it's small and frequently copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Box {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Box {
    /// Create a new box
    ///
    /// # Errors
    ///
    /// Returns an error if width or height is negative.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Result<Self> {
        if w < 0 || h < 0 {
            return Err(Error::InvalidParameter(format!(
                "box dimensions must be non-negative: w={}, h={}",
                w, h
            )));
        }
        Ok(Self { x, y, w, h })
    }

    /// Create a box without validation
    pub const fn new_unchecked(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Check if the box is empty (zero or negative area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Check if this box contains another box
    pub fn contains_box(&self, other: &Box) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Clip the box to fit within bounds
    pub fn clip(&self, width: i32, height: i32) -> Option<Box> {
        let x = self.x.max(0);
        let y = self.y.max(0);
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);

        if x < right && y < bottom {
            Some(Box {
                x,
                y,
                w: right - x,
                h: bottom - y,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_new_rejects_negative() {
        assert!(Box::new(0, 0, -1, 5).is_err());
        assert!(Box::new(0, 0, 5, 0).is_ok());
    }

    #[test]
    fn test_box_edges() {
        let b = Box::new_unchecked(75, 24, 130, 35);
        assert_eq!(b.right(), 205);
        assert_eq!(b.bottom(), 59);
        assert!(!b.is_empty());
        assert!(Box::new_unchecked(3, 3, 0, 4).is_empty());
    }

    #[test]
    fn test_box_contains() {
        let outer = Box::new_unchecked(0, 0, 250, 80);
        assert!(outer.contains_box(&Box::new_unchecked(75, 24, 130, 35)));
        assert!(!outer.contains_box(&Box::new_unchecked(200, 24, 130, 35)));
    }

    #[test]
    fn test_box_clip() {
        let b = Box::new_unchecked(-5, 10, 20, 100);
        let c = b.clip(10, 50).unwrap();
        assert_eq!(c, Box::new_unchecked(0, 10, 10, 40));
        assert!(Box::new_unchecked(20, 20, 5, 5).clip(10, 10).is_none());
    }
}
