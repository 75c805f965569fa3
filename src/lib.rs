//! Restoration of blurred images with a known point-spread function.
//!
//! The core is [`filters::deconvolution::deconvolve`], a one-shot regularized inverse filter in
//! the frequency domain. [`filters::convolution::convolve`] is the matching forward model, and
//! [`pipeline::Pipeline`] wires both into a graph of named images.
//!
//! ```no_run
//! use psf_deconvolve::config::DeconvolutionConfig;
//! use psf_deconvolve::filters::deconvolution::deconvolve;
//! use psf_deconvolve::filters::psf::gaussian_psf;
//! use psf_deconvolve::io::{read_image, write_image};
//! use std::path::Path;
//!
//! # fn main() -> psf_deconvolve::error::Result<()> {
//! let blurred = read_image(Path::new("blurred.npy"))?;
//! let psf = gaussian_psf(5, 5, 1.0)?;
//! let restored = deconvolve(&blurred, &psf, &DeconvolutionConfig::default())?;
//! write_image(Path::new("restored.npy"), &restored)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data_container;
pub mod error;
pub mod fft;
pub mod filters;
pub mod io;
pub mod math_tools;
pub mod padding;
pub mod pipeline;
