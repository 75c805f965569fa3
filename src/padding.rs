//! Transform sizing and padding.
//!
//! A circular convolution computed with the FFT only equals the linear convolution if the canvas
//! is at least `image + kernel - 1` wide and high. Both the image and the PSF are zero-padded
//! onto the same canvas, which is further grown to a size the FFT handles efficiently.

use crate::data_container::{CanvasSize, Image};
use crate::error::{DeconvolveError, Result};
use ndarray::s;

/// Size required for a linear (non-wraparound) convolution of `image` with `kernel`.
///
/// # Errors
/// `EmptyInput` if either array has a zero dimension.
pub fn target_size(image: &Image, kernel: &Image) -> Result<CanvasSize> {
    let image_size = non_empty(image, "image")?;
    let kernel_size = non_empty(kernel, "kernel")?;
    Ok(CanvasSize::new(
        image_size.width + kernel_size.width - 1,
        image_size.height + kernel_size.height - 1,
    ))
}

/// `true` if `n` factors into 2, 3 and 5 only.
pub fn is_fast_fft_size(n: usize) -> bool {
    if n == 0 {
        return false;
    }
    let mut m = n;
    for p in [2, 3, 5] {
        while m % p == 0 {
            m /= p;
        }
    }
    m == 1
}

/// Smallest `n >= size` that factors into 2, 3 and 5 only.
pub fn next_fast_fft_size(size: usize) -> usize {
    let mut n = size.max(1);
    while !is_fast_fft_size(n) {
        n += 1;
    }
    n
}

/// Canvas size shared by every input padded against `target`.
pub fn canvas_size(target: CanvasSize) -> CanvasSize {
    CanvasSize::new(
        next_fast_fft_size(target.width),
        next_fast_fft_size(target.height),
    )
}

/// Constant border added around an input to place it on the transform canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Border {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Border {
    /// Border placing `input` on the canvas derived from `target`.
    ///
    /// The canvas depends on `target` only, so an image and a kernel padded against the same
    /// target always end up with identical dimensions. The input is placed at
    /// `canvas / 2 - input / 2` on each axis: an even input receives its extra pixel of padding
    /// on the trailing side of an odd canvas, and [`unpad`] finds the content where it was put.
    ///
    /// # Errors
    /// `EmptyInput` for an empty input, `TargetTooSmall` if `target` does not contain `input`.
    pub fn centered(input: CanvasSize, target: CanvasSize) -> Result<Self> {
        if input.is_empty() {
            return Err(DeconvolveError::EmptyInput {
                what: "input",
                size: input,
            });
        }
        if !target.contains(&input) {
            return Err(DeconvolveError::TargetTooSmall { input, target });
        }
        let canvas = canvas_size(target);
        let (left, right) = axis_border(input.width, canvas.width);
        let (top, bottom) = axis_border(input.height, canvas.height);
        Ok(Border {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Size of `input` once this border is applied.
    pub fn padded_size(&self, input: CanvasSize) -> CanvasSize {
        CanvasSize::new(
            self.left + input.width + self.right,
            self.top + input.height + self.bottom,
        )
    }
}

fn axis_border(input: usize, canvas: usize) -> (usize, usize) {
    let leading = canvas / 2 - input / 2;
    (leading, canvas - input - leading)
}

/// Zero-pads `input` onto the transform canvas for `target`.
///
/// With `center_shift` the diagonal quadrants of the padded canvas are swapped afterwards
/// (see [`quadrant_shift`]). This is used for the PSF only: its anchor `(width / 2, height / 2)`
/// always lands on the canvas centre, so the swap moves the anchor to index `(0, 0)`.
///
/// # Returns
/// A newly allocated canvas; `input` is not modified.
pub fn pad(input: &Image, target: CanvasSize, center_shift: bool) -> Result<Image> {
    let size = CanvasSize::of(input);
    let border = Border::centered(size, target)?;
    let padded_size = border.padded_size(size);

    let mut padded = Image::zeros(padded_size.shape());
    padded
        .slice_mut(s![
            border.top..border.top + size.height,
            border.left..border.left + size.width
        ])
        .assign(input);

    if center_shift {
        Ok(quadrant_shift(&padded))
    } else {
        Ok(padded)
    }
}

/// Swaps top-left with bottom-right and top-right with bottom-left.
///
/// The element at `(height / 2, width / 2)` moves to `(0, 0)`. For odd dimensions the quadrants
/// have unequal sizes and the swap is the corresponding circular shift.
pub fn quadrant_shift(canvas: &Image) -> Image {
    let (height, width) = canvas.dim();
    let (sy, sx) = (height / 2, width / 2);
    Image::from_shape_fn((height, width), |(y, x)| {
        canvas[((y + sy) % height, (x + sx) % width)]
    })
}

/// Crops the centred `original` sized rectangle out of `result`.
///
/// The top-left corner is `(result.width / 2 - original.width / 2,
/// result.height / 2 - original.height / 2)`, which inverts the placement done by [`pad`].
///
/// # Errors
/// `EmptyInput` for an empty `original`, `TargetTooSmall` if `result` is smaller than it.
pub fn unpad(result: &Image, original: CanvasSize) -> Result<Image> {
    let size = CanvasSize::of(result);
    if original.is_empty() {
        return Err(DeconvolveError::EmptyInput {
            what: "unpad size",
            size: original,
        });
    }
    if !size.contains(&original) {
        return Err(DeconvolveError::TargetTooSmall {
            input: original,
            target: size,
        });
    }
    let left = size.width / 2 - original.width / 2;
    let top = size.height / 2 - original.height / 2;
    Ok(result
        .slice(s![top..top + original.height, left..left + original.width])
        .to_owned())
}

fn non_empty(image: &Image, what: &'static str) -> Result<CanvasSize> {
    let size = CanvasSize::of(image);
    if size.is_empty() {
        Err(DeconvolveError::EmptyInput { what, size })
    } else {
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn ramp(height: usize, width: usize) -> Image {
        Image::from_shape_fn((height, width), |(y, x)| (y * width + x) as f32 + 1.0)
    }

    #[test]
    fn test_fast_fft_sizes() {
        assert_eq!(next_fast_fft_size(1), 1);
        assert_eq!(next_fast_fft_size(6), 6);
        assert_eq!(next_fast_fft_size(7), 8);
        assert_eq!(next_fast_fft_size(11), 12);
        assert_eq!(next_fast_fft_size(17), 18);
        assert_eq!(next_fast_fft_size(97), 100);
        assert!(!is_fast_fft_size(0));
        assert!(!is_fast_fft_size(14));
    }

    #[test]
    fn test_extended_size_is_never_smaller_and_factors_into_small_primes() {
        for size in 1..300 {
            let n = next_fast_fft_size(size);
            assert!(n >= size);
            let mut m = n;
            for p in [2, 3, 5] {
                while m % p == 0 {
                    m /= p;
                }
            }
            assert_eq!(m, 1, "{n} has a prime factor larger than 5");
        }
    }

    #[test]
    fn test_target_size() {
        let image = Image::zeros((4, 6));
        let kernel = Image::zeros((3, 5));
        assert_eq!(
            target_size(&image, &kernel).unwrap(),
            CanvasSize::new(10, 6)
        );
        assert!(matches!(
            target_size(&image, &Image::zeros((0, 3))),
            Err(DeconvolveError::EmptyInput { what: "kernel", .. })
        ));
    }

    #[test]
    fn test_pad_unpad_roundtrip() {
        for height in 1..7 {
            for width in 1..7 {
                let image = ramp(height, width);
                for extra in [0, 1, 2, 5, 13] {
                    let target = CanvasSize::new(width + extra, height + extra + 1);
                    let padded = pad(&image, target, false).unwrap();
                    let recovered = unpad(&padded, CanvasSize::of(&image)).unwrap();
                    assert_eq!(recovered, image, "{width}x{height} -> {target}");
                }
            }
        }
    }

    #[test]
    fn test_padding_is_zero_outside_the_content() {
        let image = ramp(2, 3);
        let padded = pad(&image, CanvasSize::new(5, 4), false).unwrap();
        assert_eq!(padded.dim(), (4, 5));
        assert_eq!(padded.sum(), image.sum());
        assert_eq!(padded.iter().filter(|&&v| v != 0.0).count(), 6);
    }

    #[test]
    fn test_even_input_gets_trailing_pixel() {
        let border = Border::centered(CanvasSize::new(4, 4), CanvasSize::new(5, 5)).unwrap();
        assert_eq!(
            border,
            Border {
                left: 0,
                top: 0,
                right: 1,
                bottom: 1
            }
        );
    }

    #[test]
    fn test_image_and_kernel_share_canvas() {
        for (image_shape, kernel_shape) in [
            ((4, 4), (1, 1)),
            ((4, 4), (3, 3)),
            ((5, 8), (2, 7)),
            ((9, 2), (4, 3)),
            ((31, 17), (5, 5)),
        ] {
            let image = Image::zeros(image_shape);
            let kernel = Image::zeros(kernel_shape);
            let target = target_size(&image, &kernel).unwrap();
            let padded_image = pad(&image, target, false).unwrap();
            let padded_kernel = pad(&kernel, target, true).unwrap();
            assert_eq!(padded_image.dim(), padded_kernel.dim());
            assert!(CanvasSize::of(&padded_image).contains(&target));
        }
    }

    #[test]
    fn test_kernel_anchor_moves_to_origin() {
        for kernel_shape in [(1, 1), (3, 3), (2, 2), (3, 4), (5, 2)] {
            let mut kernel = Image::zeros(kernel_shape);
            kernel[[kernel_shape.0 / 2, kernel_shape.1 / 2]] = 1.0;
            let image = Image::zeros((5, 6));
            let target = target_size(&image, &kernel).unwrap();
            let shifted = pad(&kernel, target, true).unwrap();
            assert_eq!(shifted[[0, 0]], 1.0, "kernel {kernel_shape:?}");
            assert_eq!(shifted.sum(), 1.0);
        }
    }

    #[test]
    fn test_quadrant_shift_even_canvas_swaps_quadrants() {
        let canvas = array![
            [1.0f32, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0]
        ];
        let expected = array![
            [11.0f32, 12.0, 9.0, 10.0],
            [15.0, 16.0, 13.0, 14.0],
            [3.0, 4.0, 1.0, 2.0],
            [7.0, 8.0, 5.0, 6.0]
        ];
        assert_eq!(quadrant_shift(&canvas), expected);
    }

    #[test]
    fn test_target_smaller_than_input_is_rejected() {
        let image = ramp(4, 4);
        assert!(matches!(
            pad(&image, CanvasSize::new(3, 8), false),
            Err(DeconvolveError::TargetTooSmall { .. })
        ));
        assert!(matches!(
            unpad(&image, CanvasSize::new(5, 1)),
            Err(DeconvolveError::TargetTooSmall { .. })
        ));
    }
}
