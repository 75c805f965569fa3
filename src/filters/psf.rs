use crate::data_container::{CanvasSize, Image};
use crate::error::{DeconvolveError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Sampled point-spread function that can be generated instead of loaded from a file.
///
/// The textual form is used on the command line:
/// - `delta:SIZE`: a `SIZE x SIZE` kernel with a single 1 at the anchor (identity blur).
/// - `gaussian:SIZE:SIGMA`: a normalized `SIZE x SIZE` Gaussian with standard deviation `SIGMA`
///   pixels, centred on the anchor.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PsfSpec {
    Delta { size: usize },
    Gaussian { size: usize, sigma: f32 },
}

impl PsfSpec {
    /// Renders the kernel.
    ///
    /// # Errors
    /// `InvalidParameter` for a zero size or a non-positive `sigma`.
    pub fn render(&self) -> Result<Image> {
        match *self {
            PsfSpec::Delta { size } => delta_psf(size, size),
            PsfSpec::Gaussian { size, sigma } => gaussian_psf(size, size, sigma),
        }
    }
}

impl Display for PsfSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PsfSpec::Delta { size } => write!(f, "delta:{size}"),
            PsfSpec::Gaussian { size, sigma } => write!(f, "gaussian:{size}:{sigma}"),
        }
    }
}

impl FromStr for PsfSpec {
    type Err = DeconvolveError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DeconvolveError::InvalidParameter(format!("invalid psf description {s:?}"));
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            ["delta", size] => Ok(PsfSpec::Delta {
                size: size.parse().map_err(|_| invalid())?,
            }),
            ["gaussian", size, sigma] => Ok(PsfSpec::Gaussian {
                size: size.parse().map_err(|_| invalid())?,
                sigma: sigma.parse().map_err(|_| invalid())?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// Identity kernel: zeros with 1 at the anchor `(height / 2, width / 2)`.
pub fn delta_psf(width: usize, height: usize) -> Result<Image> {
    check_size(width, height)?;
    let mut psf = Image::zeros((height, width));
    psf[[height / 2, width / 2]] = 1.0;
    Ok(psf)
}

/// Isotropic Gaussian kernel centred on the anchor and normalized to unit sum.
///
/// # Arguments
/// - `width`, `height`: Kernel size in pixels.
/// - `sigma`: Standard deviation in pixels.
pub fn gaussian_psf(width: usize, height: usize, sigma: f32) -> Result<Image> {
    check_size(width, height)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(DeconvolveError::InvalidParameter(format!(
            "gaussian sigma must be positive, got {sigma}"
        )));
    }
    let profile_x = gaussian(&anchored_axis(width), &[0.0, sigma]);
    let profile_y = gaussian(&anchored_axis(height), &[0.0, sigma]);
    create_psf_2d(&profile_x, &profile_y)
}

/// Creates a separable 2D PSF from two 1D profiles.
///
/// # Arguments
/// - `psf_x`: Profile along the columns; its length is the kernel width.
/// - `psf_y`: Profile along the rows; its length is the kernel height.
///
/// # Returns
/// The outer product `psf_y[i] * psf_x[j]`, normalized so that it sums to 1.
///
/// # Errors
/// `EmptyInput` for an empty profile, `InvalidParameter` if the product does not have a positive
/// finite sum.
pub fn create_psf_2d(psf_x: &Array1<f32>, psf_y: &Array1<f32>) -> Result<Image> {
    check_size(psf_x.len(), psf_y.len())?;
    let mut psf_2d = Image::from_shape_fn((psf_y.len(), psf_x.len()), |(i, j)| psf_y[i] * psf_x[j]);

    let sum = psf_2d.sum();
    if !sum.is_finite() || sum <= 0.0 {
        return Err(DeconvolveError::InvalidParameter(format!(
            "psf profiles must have a positive sum, got {sum}"
        )));
    }
    psf_2d.mapv_inplace(|v| v / sum);
    Ok(psf_2d)
}

/// Gaussian function evaluated at every position of `x`.
///
/// # Arguments
/// - `x`: Sample positions.
/// - `params`: The parameters of the Gaussian:
///   - `params[0]`: The center.
///   - `params[1]`: The standard deviation.
pub fn gaussian(x: &Array1<f32>, params: &[f32; 2]) -> Array1<f32> {
    let [x0, sigma] = *params;
    x.mapv(|xi| (-(xi - x0).powi(2) / (2.0 * sigma * sigma)).exp())
}

/// Pixel positions relative to the anchor `len / 2`.
fn anchored_axis(len: usize) -> Array1<f32> {
    let anchor = (len / 2) as f32;
    Array1::from_shape_fn(len, |i| i as f32 - anchor)
}

fn check_size(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(DeconvolveError::EmptyInput {
            what: "psf",
            size: CanvasSize::new(width, height),
        });
    }
    Ok(())
}
