//! Analytic frequency response of the Laplacian regularizer.
//!
//! Instead of padding and transforming a spatial Laplacian kernel, one quadrant of the response is
//! synthesized directly and reflected over the whole canvas.

use crate::data_container::{CanvasSize, Spectrum};
use num_complex::Complex32;
use std::f32::consts::PI;

/// Size of the synthesized quadrant for a given canvas: `(width / 2 - 1, height / 2 - 1)`.
///
/// Canvases narrower or lower than 4 pixels have an empty quadrant.
pub fn quadrant_size(canvas: CanvasSize) -> CanvasSize {
    CanvasSize::new(
        (canvas.width / 2).saturating_sub(1),
        (canvas.height / 2).saturating_sub(1),
    )
}

/// Regularization spectrum `L` with the dimensions of `canvas`.
///
/// Each quadrant bin holds `(pi * x / qw)^2 + (pi * y / qh)^2` with a zero imaginary part. The
/// quadrant is extended to the canvas by reflecting it at its borders (`abc|cba|abc`), so
/// `L[(0, 0)]` is the direct-current bin and always zero.
///
/// # Returns
/// An all-zero spectrum if the quadrant is empty, i.e. no regularization on tiny canvases.
pub fn laplacian_spectrum(canvas: CanvasSize) -> Spectrum {
    let quadrant = quadrant_size(canvas);
    if quadrant.is_empty() {
        return Spectrum::zeros(canvas.shape());
    }

    let (qw, qh) = (quadrant.width as f32, quadrant.height as f32);
    Spectrum::from_shape_fn(canvas.shape(), |(y, x)| {
        let wx = PI * reflect(x, quadrant.width) as f32 / qw;
        let wy = PI * reflect(y, quadrant.height) as f32 / qh;
        Complex32::new(wx * wx + wy * wy, 0.0)
    })
}

/// Maps a canvas index into `0..len` by repeated reflection with the edge pixel duplicated.
fn reflect(index: usize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let m = index % (2 * len);
    if m < len {
        m
    } else {
        2 * len - 1 - m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_reflect_duplicates_edge() {
        let indices: Vec<usize> = (0..8).map(|i| reflect(i, 3)).collect();
        assert_eq!(indices, vec![0, 1, 2, 2, 1, 0, 0, 1]);
        assert_eq!(reflect(17, 1), 0);
    }

    #[test]
    fn test_spectrum_has_canvas_size_and_zero_dc() {
        for canvas in [
            CanvasSize::new(8, 8),
            CanvasSize::new(10, 6),
            CanvasSize::new(9, 15),
        ] {
            let l = laplacian_spectrum(canvas);
            assert_eq!(CanvasSize::of(&l), canvas);
            assert_eq!(l[[0, 0]], Complex32::new(0.0, 0.0));
            assert!(l.iter().all(|c| c.im == 0.0 && c.re >= 0.0));
        }
    }

    #[test]
    fn test_quadrant_values() {
        let l = laplacian_spectrum(CanvasSize::new(10, 8));
        let q = quadrant_size(CanvasSize::new(10, 8));
        assert_eq!(q, CanvasSize::new(4, 3));
        let expected = (PI * 2.0 / 4.0).powi(2) + (PI * 1.0 / 3.0).powi(2);
        assert_abs_diff_eq!(l[[1, 2]].re, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_reflection_about_quadrant_borders() {
        let canvas = CanvasSize::new(12, 10);
        let q = quadrant_size(canvas);
        let l = laplacian_spectrum(canvas);
        for y in 0..q.height {
            for x in 0..q.width {
                let v = l[[y, x]];
                assert_eq!(l[[y, 2 * q.width - 1 - x]], v);
                assert_eq!(l[[2 * q.height - 1 - y, x]], v);
                assert_eq!(l[[2 * q.height - 1 - y, 2 * q.width - 1 - x]], v);
            }
        }
    }

    #[test]
    fn test_small_canvas_has_no_regularization() {
        for canvas in [
            CanvasSize::new(1, 1),
            CanvasSize::new(3, 8),
            CanvasSize::new(8, 2),
        ] {
            let l = laplacian_spectrum(canvas);
            assert_eq!(CanvasSize::of(&l), canvas);
            assert!(l.iter().all(|c| *c == Complex32::new(0.0, 0.0)));
        }
    }
}
