//! This module provides the pointwise complex arithmetic used by the inverse filter, together with
//! a few diagnostic helpers (min-max normalization, clamping, spectrum magnitudes and error
//! metrics) that are not required for a correct reconstruction.
//!
//! The complex operations are spelled out component by component instead of relying on the
//! operator overloads of `num_complex`, so the order of the floating point operations is fixed.

use crate::data_container::{Image, Spectrum};
use ndarray::Zip;
use num_complex::Complex32;

/// Complex sum `a + b`.
#[inline]
pub fn complex_add(a: Complex32, b: Complex32) -> Complex32 {
    Complex32::new(a.re + b.re, a.im + b.im)
}

/// Complex product `a * b`.
#[inline]
pub fn complex_mul(a: Complex32, b: Complex32) -> Complex32 {
    Complex32::new(a.re * b.re - a.im * b.im, a.re * b.im + a.im * b.re)
}

/// Complex value scaled by a real factor.
#[inline]
pub fn scalar_mul(a: Complex32, b: f32) -> Complex32 {
    Complex32::new(a.re * b, a.im * b)
}

/// Complex quotient `a / b`.
///
/// There is no guard against `b == 0`: the result is then non-finite (`NaN` or `inf`), which
/// callers are expected to handle or propagate.
#[inline]
pub fn complex_div(a: Complex32, b: Complex32) -> Complex32 {
    let re = a.re * b.re + a.im * b.im;
    let im = a.im * b.re - a.re * b.im;
    let d = b.re * b.re + b.im * b.im;
    Complex32::new(re / d, im / d)
}

/// Magnitude `|a|`.
#[inline]
pub fn complex_abs(a: Complex32) -> f32 {
    (a.re * a.re + a.im * a.im).sqrt()
}

/// Returns the minimum and maximum of the finite values of `image`.
///
/// Returns `None` if the image holds no finite value.
pub fn min_max(image: &Image) -> Option<(f32, f32)> {
    image
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Rescales `image` in place to the range [0, 1] using its minimum and maximum.
///
/// A constant image (zero range) is mapped to all zeros. Non-finite values stay non-finite.
pub fn normalize(image: &mut Image) {
    let Some((min, max)) = min_max(image) else {
        return;
    };
    let range = max - min;
    if range > 0.0 {
        image.mapv_inplace(|v| (v - min) / range);
    } else {
        image.mapv_inplace(|v| if v.is_finite() { 0.0 } else { v });
    }
}

/// Clamps every value of `image` in place to [0, 1].
pub fn clamp(image: &mut Image) {
    image.mapv_inplace(|v| v.clamp(0.0, 1.0));
}

/// Magnitude of every bin of a spectrum.
pub fn spectrum_magnitude(spectrum: &Spectrum) -> Image {
    spectrum.mapv(complex_abs)
}

/// `ln(1 + |X|)` for every bin, the usual scaling for displaying a spectrum.
pub fn log_magnitude(spectrum: &Spectrum) -> Image {
    spectrum_magnitude(spectrum).mapv(f32::ln_1p)
}

/// Number of `NaN` or infinite values in `image`.
pub fn count_non_finite(image: &Image) -> usize {
    image.iter().filter(|v| !v.is_finite()).count()
}

/// Mean absolute difference between two images of equal shape.
///
/// # Returns
/// `None` if the shapes differ or the images are empty.
pub fn mean_absolute_error(a: &Image, b: &Image) -> Option<f32> {
    if a.dim() != b.dim() || a.is_empty() {
        return None;
    }
    let mut sum = 0.0f64;
    Zip::from(a).and(b).for_each(|&x, &y| {
        sum += (x - y).abs() as f64;
    });
    Some((sum / a.len() as f64) as f32)
}
