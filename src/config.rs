//! Settings of a deconvolution run.
//!
//! Every field has a default, so a JSON file only needs to list what it changes:
//!
//! ```json
//! { "lambda": 0.01, "denominator_guard": { "floor": { "epsilon": 1e-6 } } }
//! ```

use crate::data_container::Image;
use crate::error::{DeconvolveError, Result};
use crate::math_tools;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Regularization weight used when nothing else is configured.
pub const DEFAULT_LAMBDA: f32 = 0.001;

/// What happens to a frequency bin whose filter denominator `FA` vanishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenominatorGuard {
    /// `FA` is used unchanged; a zero produces `NaN`/`inf` that reach the restored image.
    #[default]
    Propagate,
    /// `FA` is replaced by `epsilon + 0i` wherever `|FA| < epsilon`.
    Floor { epsilon: f32 },
}

/// Optional rescaling of the restored image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostProcessing {
    #[default]
    None,
    /// Clamp every value to [0, 1].
    Clamp,
    /// Min-max normalize to [0, 1].
    Normalize,
}

impl PostProcessing {
    pub fn apply(&self, image: &mut Image) {
        match self {
            PostProcessing::None => {}
            PostProcessing::Clamp => math_tools::clamp(image),
            PostProcessing::Normalize => math_tools::normalize(image),
        }
    }
}

/// Parameters of the regularized inverse filter.
///
/// # Fields
/// - `lambda`: Weight of the Laplacian regularization term. `0` gives the plain inverse filter.
/// - `denominator_guard`: Handling of vanishing denominators.
/// - `post_processing`: Rescaling applied to the restored image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeconvolutionConfig {
    pub lambda: f32,
    pub denominator_guard: DenominatorGuard,
    pub post_processing: PostProcessing,
}

impl Default for DeconvolutionConfig {
    fn default() -> Self {
        DeconvolutionConfig {
            lambda: DEFAULT_LAMBDA,
            denominator_guard: DenominatorGuard::default(),
            post_processing: PostProcessing::default(),
        }
    }
}

impl DeconvolutionConfig {
    pub fn with_lambda(lambda: f32) -> Self {
        DeconvolutionConfig {
            lambda,
            ..Default::default()
        }
    }

    /// Checks that `lambda` is finite and non-negative and that a floor epsilon is positive.
    ///
    /// # Errors
    /// `InvalidParameter` describing the offending value.
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || self.lambda < 0.0 {
            return Err(DeconvolveError::InvalidParameter(format!(
                "lambda must be finite and non-negative, got {}",
                self.lambda
            )));
        }
        if let DenominatorGuard::Floor { epsilon } = self.denominator_guard {
            if !epsilon.is_finite() || epsilon <= 0.0 {
                return Err(DeconvolveError::InvalidParameter(format!(
                    "denominator floor must be finite and positive, got {epsilon}"
                )));
            }
        }
        Ok(())
    }

    /// Reads a JSON configuration file and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: DeconvolutionConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::info!("loaded deconvolution config from {:?}", path);
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
