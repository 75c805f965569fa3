//! 2D discrete Fourier transforms of images and spectra.
//!
//! The forward transform runs a real-to-complex FFT (`realfft`) over every row, completes each
//! row from its conjugate-symmetric half and then transforms the columns with `rustfft`.
//!
//! The inverse transform follows the convention of the deconvolution filter: the spectrum is
//! passed through the *forward* transform again, scaled by `1/N`, and the resulting image is
//! flipped by 180 degrees about the origin (`(y, x) -> (-y mod h, -x mod w)`). Transforming twice
//! reverses every index; the flip undoes that reversal, so the composition is exactly the
//! `1/N`-scaled inverse DFT. Only the real part is kept.

use crate::data_container::{CanvasSize, Image, Spectrum};
use crate::error::{DeconvolveError, Result};
use ndarray::Axis;
use num_complex::Complex32;
use realfft::RealFftPlanner;
use rustfft::{Fft, FftPlanner};

/// Full-size spectrum of a real image.
///
/// # Returns
/// A complex field with the same dimensions as `image`.
///
/// # Errors
/// `EmptyInput` for an empty image.
pub fn forward(image: &Image) -> Result<Spectrum> {
    let size = non_empty(CanvasSize::of(image), "transform input")?;
    let (height, width) = size.shape();
    let mut spectrum = Spectrum::zeros((height, width));

    let mut real_planner = RealFftPlanner::<f32>::new();
    let r2c = real_planner.plan_fft_forward(width);
    let mut input = r2c.make_input_vec();
    let mut output = r2c.make_output_vec();
    let mut scratch = r2c.make_scratch_vec();

    for (row, mut spectrum_row) in image.rows().into_iter().zip(spectrum.rows_mut()) {
        input.iter_mut().zip(row.iter()).for_each(|(i, &v)| *i = v);
        r2c.process_with_scratch(&mut input, &mut output, &mut scratch)?;
        // bins above width / 2 mirror the lower half
        for (x, bin) in spectrum_row.iter_mut().enumerate() {
            *bin = if x < output.len() {
                output[x]
            } else {
                output[width - x].conj()
            };
        }
    }

    let mut planner = FftPlanner::<f32>::new();
    let column_fft = planner.plan_fft_forward(height);
    transform_lanes(&mut spectrum, Axis(0), column_fft.as_ref());

    Ok(spectrum)
}

/// Real image recovered from a spectrum, scaled by `1/N`.
///
/// # Errors
/// `EmptyInput` for an empty spectrum.
pub fn inverse(spectrum: &Spectrum) -> Result<Image> {
    let size = non_empty(CanvasSize::of(spectrum), "inverse transform input")?;
    let (height, width) = size.shape();

    let mut planner = FftPlanner::<f32>::new();
    let row_fft = planner.plan_fft_forward(width);
    let column_fft = planner.plan_fft_forward(height);

    let mut data = spectrum.to_owned();
    transform_lanes(&mut data, Axis(1), row_fft.as_ref());
    transform_lanes(&mut data, Axis(0), column_fft.as_ref());

    let scale = 1.0 / size.len() as f32;
    Ok(Image::from_shape_fn((height, width), |(y, x)| {
        data[((height - y) % height, (width - x) % width)].re * scale
    }))
}

/// In-place 1D transform of every lane along `axis`: gather, transform, scatter.
fn transform_lanes(data: &mut Spectrum, axis: Axis, fft: &dyn Fft<f32>) {
    let len = data.len_of(axis);
    let mut buffer = vec![Complex32::default(); len];
    let mut scratch = vec![Complex32::default(); fft.get_inplace_scratch_len()];

    for mut lane in data.lanes_mut(axis) {
        buffer.iter_mut().zip(lane.iter()).for_each(|(b, &v)| *b = v);
        fft.process_with_scratch(&mut buffer, &mut scratch);
        lane.iter_mut().zip(buffer.iter()).for_each(|(v, &b)| *v = b);
    }
}

fn non_empty(size: CanvasSize, what: &'static str) -> Result<CanvasSize> {
    if size.is_empty() {
        Err(DeconvolveError::EmptyInput { what, size })
    } else {
        Ok(size)
    }
}
