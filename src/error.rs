//! Error type shared by every deconvolution step.
//!
//! Non-finite restored pixels are not an error. They are part of the numerical result and are
//! reported through the log (see `filters::deconvolution`).

use crate::data_container::CanvasSize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DeconvolveError>;

#[derive(Debug, Error)]
pub enum DeconvolveError {
    #[error("{what} has an empty dimension ({size})")]
    EmptyInput { what: &'static str, size: CanvasSize },

    #[error("size mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        expected: CanvasSize,
        found: CanvasSize,
    },

    #[error("target size {target} is smaller than the input size {input}")]
    TargetTooSmall { input: CanvasSize, target: CanvasSize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("transform failed: {0}")]
    Transform(#[from] realfft::FftError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read npy array: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    #[error("failed to write npy array: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid configuration file: {0}")]
    Config(#[from] serde_json::Error),

    #[error("unsupported image file extension: {0:?}")]
    UnsupportedFormat(String),

    #[error("image handle `{0}` is never produced")]
    MissingImage(String),

    #[error("image handle `{0}` is produced by more than one step")]
    DuplicateOutput(String),

    #[error("pipeline steps form a cycle")]
    CyclicPipeline,
}
