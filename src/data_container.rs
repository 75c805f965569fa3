//! This module defines the data structures passed between the deconvolution steps: real images,
//! complex spectra and the canvas sizes that tie them together.
//!
//! All arrays are row-major `ndarray` arrays indexed as `(row, column)`, i.e. `(y, x)`, so an
//! image of `width x height` pixels has the shape `(height, width)`.

use ndarray::Array2;
use num_complex::Complex32;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Single-channel floating point image. Values are unbounded intensities.
///
/// Point-spread functions use the same representation.
pub type Image = Array2<f32>;

/// Complex spectral field produced by [`crate::fft::forward`].
pub type Spectrum = Array2<Complex32>;

/// Width and height of an image, a padded canvas or a spectrum.
///
/// # Fields
/// - `width`: Number of columns.
/// - `height`: Number of rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: usize,
    pub height: usize,
}

impl CanvasSize {
    pub fn new(width: usize, height: usize) -> Self {
        CanvasSize { width, height }
    }

    /// Size of any 2D array, real or complex.
    pub fn of<T>(array: &Array2<T>) -> Self {
        let (height, width) = array.dim();
        CanvasSize { width, height }
    }

    /// `true` if either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The `ndarray` shape `(rows, columns)` of this size.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Number of pixels (or frequency bins).
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// `true` if both dimensions are at least as large as those of `other`.
    pub fn contains(&self, other: &CanvasSize) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl Display for CanvasSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_of_array_is_width_by_height() {
        let image = Image::zeros((3, 5));
        let size = CanvasSize::of(&image);
        assert_eq!(size, CanvasSize::new(5, 3));
        assert_eq!(size.shape(), (3, 5));
        assert_eq!(size.len(), 15);
        assert_eq!(size.to_string(), "5x3");
    }

    #[test]
    fn test_empty_and_contains() {
        assert!(CanvasSize::new(0, 4).is_empty());
        assert!(!CanvasSize::new(1, 1).is_empty());
        assert!(CanvasSize::new(6, 6).contains(&CanvasSize::new(6, 2)));
        assert!(!CanvasSize::new(6, 6).contains(&CanvasSize::new(7, 2)));
    }
}
