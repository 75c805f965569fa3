//! Forward model: blurs a sharp image with a point-spread function.
//!
//! The result has the size of the input image. Samples outside the image are zero, and the PSF is
//! anchored at `(width / 2, height / 2)`, the same anchor the deconvolution moves to the origin.

use crate::data_container::{CanvasSize, Image};
use crate::error::{DeconvolveError, Result};
use crate::filters::filter::{check_inputs, Filter, FilterConfig};

/// Linear convolution of `image` with `psf`, cropped to the size of `image`.
///
/// `out(y, x) = sum over (a, b) of psf(a, b) * image(y + ay - a, x + ax - b)` with the anchor
/// `(ay, ax) = (psf.height / 2, psf.width / 2)`.
///
/// # Errors
/// `EmptyInput` if either array has a zero dimension.
pub fn convolve(image: &Image, psf: &Image) -> Result<Image> {
    for (what, array) in [("image", image), ("psf", psf)] {
        let size = CanvasSize::of(array);
        if size.is_empty() {
            return Err(DeconvolveError::EmptyInput { what, size });
        }
    }

    let (height, width) = image.dim();
    let (kh, kw) = psf.dim();
    let (ay, ax) = (kh / 2, kw / 2);

    let mut output = Image::zeros((height, width));
    for ((y, x), out) in output.indexed_iter_mut() {
        let mut sum = 0.0;
        for ((a, b), &k) in psf.indexed_iter() {
            // source pixel (y + ay - a, x + ax - b), skipped outside the image
            let (Some(sy), Some(sx)) = ((y + ay).checked_sub(a), (x + ax).checked_sub(b)) else {
                continue;
            };
            if sy < height && sx < width {
                sum += k * image[[sy, sx]];
            }
        }
        *out = sum;
    }
    Ok(output)
}

/// Convolution step of a [`crate::pipeline::Pipeline`].
///
/// # Fields
/// - `image`: Handle of the sharp image.
/// - `psf`: Handle of the point-spread function.
/// - `output`: Handle under which the blurred image is stored.
#[derive(Clone, Debug)]
pub struct ConvolutionFilter {
    pub image: String,
    pub psf: String,
    pub output: String,
}

impl ConvolutionFilter {
    pub fn new(image: &str, psf: &str, output: &str) -> Self {
        ConvolutionFilter {
            image: image.to_string(),
            psf: psf.to_string(),
            output: output.to_string(),
        }
    }
}

impl Filter for ConvolutionFilter {
    fn config(&self) -> FilterConfig {
        FilterConfig {
            name: "Convolution".to_string(),
            description: "Blurs an image with a point-spread function (zero border).".to_string(),
            inputs: vec![self.image.clone(), self.psf.clone()],
            output: self.output.clone(),
        }
    }

    fn filter(&self, inputs: &[&Image]) -> Result<Image> {
        check_inputs(&self.config(), inputs)?;
        convolve(inputs[0], inputs[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_centered_delta_is_identity() {
        let image = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let mut delta = Image::zeros((3, 3));
        delta[[1, 1]] = 1.0;
        assert_eq!(convolve(&image, &delta).unwrap(), image);
        assert_eq!(convolve(&image, &array![[1.0f32]]).unwrap(), image);
    }

    #[test]
    fn test_box_blur_with_zero_border() {
        let image = Image::from_elem((3, 3), 1.0);
        let psf = Image::from_elem((3, 3), 1.0);
        let blurred = convolve(&image, &psf).unwrap();
        assert_eq!(
            blurred,
            array![[4.0f32, 6.0, 4.0], [6.0, 9.0, 6.0], [4.0, 6.0, 4.0]]
        );
    }

    #[test]
    fn test_kernel_is_flipped() {
        // a point source reproduces the kernel
        let mut image = Image::zeros((3, 3));
        image[[1, 1]] = 1.0;
        let psf = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let blurred = convolve(&image, &psf).unwrap();
        assert_eq!(blurred, psf);

        // weight right of the anchor moves content right, a correlation would move it left
        let shift_right = array![[0.0f32, 0.0, 1.0]];
        let row = array![[1.0f32, 2.0, 3.0, 4.0]];
        assert_eq!(
            convolve(&row, &shift_right).unwrap(),
            array![[0.0f32, 1.0, 2.0, 3.0]]
        );
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(
            convolve(&Image::zeros((2, 0)), &array![[1.0f32]]),
            Err(DeconvolveError::EmptyInput { what: "image", .. })
        ));
        assert!(matches!(
            convolve(&array![[1.0f32]], &Image::zeros((0, 0))),
            Err(DeconvolveError::EmptyInput { what: "psf", .. })
        ));
    }
}
