//! Image processing steps for blurring and restoring images.
//!
//! Each step implements the `Filter` trait defined in the `filter` module, which declares the
//! image handles it reads and writes so that steps can be wired into a
//! [`crate::pipeline::Pipeline`].

/// Forward model that blurs a sharp image with a point-spread function.
pub mod convolution;

/// Regularized inverse filter that restores a blurred image.
pub mod deconvolution;

/// Core filter interfaces and shared components.
/// Defines the `Filter` trait and supporting structures used by all filter implementations.
pub mod filter;

/// Analytic Laplacian spectrum used as the smoothness prior of the deconvolution.
pub mod laplacian;

/// Point Spread Function utilities.
/// Generates delta and Gaussian kernels, separable kernels from 1D profiles.
pub mod psf;
