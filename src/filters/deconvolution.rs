//! This module implements the regularized inverse filter that restores a blurred image from a known
//! point-spread function.
//!
//! Both inputs are zero-padded onto one FFT canvas large enough for a linear convolution. With the
//! PSF spectrum `H`, the blurred spectrum `Y` and the Laplacian spectrum `L`, every frequency bin
//! is restored independently:
//!
//! ```text
//! FA = H * H + lambda * (L * L)
//! X  = Y * (H / FA)
//! ```
//!
//! `H * H` is the complex self-product and not `|H|^2`. The restored image is the inverse
//! transform of `X`, cropped back to the size of the blurred image.

use crate::config::{DeconvolutionConfig, DenominatorGuard};
use crate::data_container::{CanvasSize, Image, Spectrum};
use crate::error::{DeconvolveError, Result};
use crate::filters::filter::{check_inputs, Filter, FilterConfig};
use crate::filters::laplacian::laplacian_spectrum;
use crate::math_tools::{
    complex_abs, complex_add, complex_div, complex_mul, count_non_finite, scalar_mul,
};
use crate::{fft, padding};
use ndarray::Zip;
use num_complex::Complex32;

/// Restores `blurred` given the `psf` that degraded it.
///
/// # Arguments
/// - `blurred`: The degraded image.
/// - `psf`: The point-spread function, anchored at `(width / 2, height / 2)`.
/// - `config`: Regularization weight, denominator guard and post-processing.
///
/// # Returns
/// An image with the dimensions of `blurred`. With [`DenominatorGuard::Propagate`], bins with a
/// vanishing denominator yield non-finite pixels; they are counted and logged, not rejected.
///
/// # Errors
/// - `InvalidParameter` if `config` does not validate.
/// - `EmptyInput` if either image has a zero dimension.
/// - `DimensionMismatch` if the two spectra end up with different sizes.
pub fn deconvolve(blurred: &Image, psf: &Image, config: &DeconvolutionConfig) -> Result<Image> {
    config.validate()?;
    let target = padding::target_size(blurred, psf)?;

    let h = fft::forward(&padding::pad(psf, target, true)?)?;
    let y = fft::forward(&padding::pad(blurred, target, false)?)?;
    let canvas = CanvasSize::of(&h);
    if CanvasSize::of(&y) != canvas {
        return Err(DeconvolveError::DimensionMismatch {
            expected: canvas,
            found: CanvasSize::of(&y),
        });
    }
    log::debug!(
        "deconvolving {} with psf {}: target {target}, canvas {canvas}, lambda {}",
        CanvasSize::of(blurred),
        CanvasSize::of(psf),
        config.lambda
    );

    let l = laplacian_spectrum(canvas);
    let x = inverse_filter(&h, &y, &l, config.lambda, config.denominator_guard)?;

    let mut restored = padding::unpad(&fft::inverse(&x)?, CanvasSize::of(blurred))?;

    let non_finite = count_non_finite(&restored);
    if non_finite > 0 {
        log::warn!(
            "{non_finite} of {} restored pixels are not finite (vanishing filter denominator)",
            restored.len()
        );
    }

    config.post_processing.apply(&mut restored);
    Ok(restored)
}

/// Evaluates the regularized inverse filter bin by bin and returns `X = Y * H / (H*H + lambda*L*L)`.
///
/// # Errors
/// `DimensionMismatch` if `h`, `y` and `l` differ in size.
pub fn inverse_filter(
    h: &Spectrum,
    y: &Spectrum,
    l: &Spectrum,
    lambda: f32,
    guard: DenominatorGuard,
) -> Result<Spectrum> {
    let expected = CanvasSize::of(h);
    for other in [y, l] {
        let found = CanvasSize::of(other);
        if found != expected {
            return Err(DeconvolveError::DimensionMismatch { expected, found });
        }
    }

    let mut x = Spectrum::zeros(h.raw_dim());
    Zip::from(&mut x)
        .and(h)
        .and(y)
        .and(l)
        .for_each(|x, &h, &y, &l| {
            let h2 = complex_mul(h, h);
            let l2 = scalar_mul(complex_mul(l, l), lambda);
            let fa = guard_denominator(complex_add(h2, l2), guard);
            let fp = complex_div(h, fa);
            *x = complex_mul(y, fp);
        });
    Ok(x)
}

#[inline]
fn guard_denominator(fa: Complex32, guard: DenominatorGuard) -> Complex32 {
    match guard {
        DenominatorGuard::Propagate => fa,
        DenominatorGuard::Floor { epsilon } if complex_abs(fa) < epsilon => {
            Complex32::new(epsilon, 0.0)
        }
        DenominatorGuard::Floor { .. } => fa,
    }
}

/// Deconvolution step of a [`crate::pipeline::Pipeline`].
///
/// # Fields
/// - `blurred`: Handle of the degraded image.
/// - `psf`: Handle of the point-spread function.
/// - `output`: Handle under which the restored image is stored.
/// - `config`: Filter parameters.
#[derive(Clone, Debug)]
pub struct DeconvolutionFilter {
    pub blurred: String,
    pub psf: String,
    pub output: String,
    pub config: DeconvolutionConfig,
}

impl DeconvolutionFilter {
    pub fn new(blurred: &str, psf: &str, output: &str, config: DeconvolutionConfig) -> Self {
        DeconvolutionFilter {
            blurred: blurred.to_string(),
            psf: psf.to_string(),
            output: output.to_string(),
            config,
        }
    }
}

impl Filter for DeconvolutionFilter {
    fn config(&self) -> FilterConfig {
        FilterConfig {
            name: "Deconvolution".to_string(),
            description: "Regularized inverse filter with a Laplacian smoothness prior."
                .to_string(),
            inputs: vec![self.blurred.clone(), self.psf.clone()],
            output: self.output.clone(),
        }
    }

    fn filter(&self, inputs: &[&Image]) -> Result<Image> {
        check_inputs(&self.config(), inputs)?;
        deconvolve(inputs[0], inputs[1], &self.config)
    }
}
