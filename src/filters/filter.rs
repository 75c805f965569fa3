//! This module provides the `Filter` trait and the `FilterConfig` metadata that every processing step
//! exposes. A filter is a pure function from named input images to one named output image; the
//! names are the edges from which [`crate::pipeline::Pipeline`] builds its dependency graph.

use crate::data_container::Image;
use crate::error::{DeconvolveError, Result};
use std::fmt::Debug;

/// The `Filter` trait defines the structure and behavior of a processing step.
///
/// Filters must implement:
/// - A `config` function that names the step and declares its input and output handles.
/// - A `filter` function that computes the output from the inputs, in the declared order.
///
/// Filters hold only their parameters. They must not keep state between calls, so the same
/// instance can be run concurrently on independent image sets.
///
/// **Example**:
/// ```ignore
/// use psf_deconvolve::data_container::Image;
/// use psf_deconvolve::error::Result;
/// use psf_deconvolve::filters::filter::{Filter, FilterConfig};
///
/// #[derive(Clone, Debug)]
/// struct Invert;
///
/// impl Filter for Invert {
///     fn config(&self) -> FilterConfig {
///         FilterConfig {
///             name: "Invert".to_string(),
///             description: "Negates every pixel.".to_string(),
///             inputs: vec!["in".to_string()],
///             output: "inverted".to_string(),
///         }
///     }
///
///     fn filter(&self, inputs: &[&Image]) -> Result<Image> {
///         Ok(inputs[0].mapv(|v| -v))
///     }
/// }
/// ```
pub trait Filter: Send + Sync + Debug + CloneBoxedFilter {
    /// Returns the filter configuration, including name, description and image handles.
    fn config(&self) -> FilterConfig;

    /// Applies the filter.
    ///
    /// # Arguments
    /// - `inputs`: One image per handle in `config().inputs`, in the same order.
    ///
    /// # Returns
    /// The image to be stored under `config().output`.
    fn filter(&self, inputs: &[&Image]) -> Result<Image>;
}

/// Configuration of a filter.
///
/// # Fields
/// - `name`: The name of the filter, used in log messages.
/// - `description`: A short description of what the filter computes.
/// - `inputs`: Handles of the images the filter reads, in argument order.
/// - `output`: Handle of the image the filter produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    pub name: String,
    pub description: String,
    pub inputs: Vec<String>,
    pub output: String,
}

/// A trait to allow cloning of boxed filters.
/// This is necessary because `Box<dyn Filter>` cannot be cloned directly.
pub trait CloneBoxedFilter {
    fn clone_box(&self) -> Box<dyn Filter>;
}

impl<T> CloneBoxedFilter for T
where
    T: 'static + Filter + Clone,
{
    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Filter> {
    fn clone(&self) -> Box<dyn Filter> {
        self.as_ref().clone_box()
    }
}

/// Checks that a filter received exactly as many images as it declares inputs.
///
/// # Errors
/// `InvalidParameter` naming the filter and both counts.
pub fn check_inputs(config: &FilterConfig, inputs: &[&Image]) -> Result<()> {
    if inputs.len() != config.inputs.len() {
        return Err(DeconvolveError::InvalidParameter(format!(
            "filter `{}` expects {} inputs, got {}",
            config.name,
            config.inputs.len(),
            inputs.len()
        )));
    }
    Ok(())
}
