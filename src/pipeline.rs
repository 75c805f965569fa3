//! Explicit dependency graph of filters.
//!
//! A [`Pipeline`] connects filters through named image handles: a filter runs once every handle
//! it reads has been produced, either by another filter or by the caller in the [`ImageStore`].

use crate::config::DeconvolutionConfig;
use crate::data_container::Image;
use crate::error::{DeconvolveError, Result};
use crate::filters::convolution::ConvolutionFilter;
use crate::filters::deconvolution::DeconvolutionFilter;
use crate::filters::filter::Filter;
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};

/// Images keyed by handle.
pub type ImageStore = HashMap<String, Image>;

/// Handle names used by [`Pipeline::round_trip`].
pub const INPUT: &str = "in";
pub const PSF: &str = "psf";
pub const CONVOLVED: &str = "convolved";
pub const DECONVOLVED: &str = "deconvolved";

#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::default()
    }

    /// Blurs `in` with `psf` into `convolved`, then restores `deconvolved` from `convolved`.
    pub fn round_trip(config: DeconvolutionConfig) -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.add(ConvolutionFilter::new(INPUT, PSF, CONVOLVED));
        pipeline.add(DeconvolutionFilter::new(CONVOLVED, PSF, DECONVOLVED, config));
        pipeline
    }

    pub fn add<F: Filter + 'static>(&mut self, filter: F) -> &mut Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Orders the filters so that every filter comes after the producers of its inputs.
    ///
    /// Filters without mutual dependencies keep their insertion order. Inputs that no filter
    /// produces are expected in the store and impose no ordering.
    ///
    /// # Errors
    /// - `DuplicateOutput` if two filters write the same handle.
    /// - `CyclicPipeline` if the dependencies form a cycle.
    pub fn schedule(&self) -> Result<Vec<usize>> {
        let configs: Vec<_> = self.filters.iter().map(|f| f.config()).collect();

        let mut producers: HashMap<&str, usize> = HashMap::new();
        for (index, config) in configs.iter().enumerate() {
            if producers.insert(config.output.as_str(), index).is_some() {
                return Err(DeconvolveError::DuplicateOutput(config.output.clone()));
            }
        }

        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); configs.len()];
        let mut pending: Vec<usize> = vec![0; configs.len()];
        for (index, config) in configs.iter().enumerate() {
            for input in &config.inputs {
                if let Some(&producer) = producers.get(input.as_str()) {
                    dependents[producer].push(index);
                    pending[index] += 1;
                }
            }
        }

        // Kahn's algorithm
        let mut ready: VecDeque<usize> = (0..configs.len()).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(configs.len());
        while let Some(index) = ready.pop_front() {
            order.push(index);
            for &dependent in &dependents[index] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push_back(dependent);
                }
            }
        }

        if order.len() != configs.len() {
            return Err(DeconvolveError::CyclicPipeline);
        }
        Ok(order)
    }

    /// Runs every filter in schedule order and stores each output in `store`.
    ///
    /// # Errors
    /// Scheduling errors, `MissingImage` for an input that is neither in `store` nor produced by
    /// any filter, and the first error returned by a filter. Outputs of filters that ran before
    /// the error remain in `store`.
    pub fn run(&self, store: &mut ImageStore) -> Result<()> {
        let order = self.schedule()?;
        for index in order {
            let filter = &self.filters[index];
            let config = filter.config();
            let inputs = config
                .inputs
                .iter()
                .map(|handle| {
                    store
                        .get(handle)
                        .ok_or_else(|| DeconvolveError::MissingImage(handle.clone()))
                })
                .collect::<Result<Vec<&Image>>>()?;

            log::info!("running {} -> {}", config.name, config.output);
            let output = filter.filter(&inputs)?;
            store.insert(config.output, output);
        }
        Ok(())
    }
}

/// Runs `pipeline` on independent stores in parallel.
///
/// # Returns
/// One result per store, in input order.
pub fn run_batch(pipeline: &Pipeline, stores: &mut [ImageStore]) -> Vec<Result<()>> {
    stores
        .par_iter_mut()
        .map(|store| pipeline.run(store))
        .collect()
}
