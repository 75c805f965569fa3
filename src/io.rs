//! Reading and writing single-channel float images.
//!
//! `.npy` files hold the raw `f32` values and are lossless. `.png`, `.tif` and `.tiff` files are
//! read as luma scaled to [0, 1] and written as min-max normalized 16-bit luma.

use crate::data_container::{Image, Spectrum};
use crate::error::{DeconvolveError, Result};
use crate::math_tools;
use crate::padding::quadrant_shift;
use image::{ImageBuffer, Luma};
use ndarray_npy::{read_npy, write_npy};
use std::ffi::OsStr;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Npy,
    Raster,
}

fn format_of(path: &Path) -> Result<Format> {
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "npy" => Ok(Format::Npy),
        "png" | "tif" | "tiff" => Ok(Format::Raster),
        _ => Err(DeconvolveError::UnsupportedFormat(extension)),
    }
}

/// Reads a 2D single-channel image.
///
/// Color raster images are converted to luma.
pub fn read_image(path: &Path) -> Result<Image> {
    let image = match format_of(path)? {
        Format::Npy => read_npy::<_, Image>(path)?,
        Format::Raster => {
            let luma = image::open(path)?.to_luma32f();
            let (width, height) = luma.dimensions();
            Image::from_shape_vec((height as usize, width as usize), luma.into_raw()).map_err(
                |err| DeconvolveError::InvalidParameter(format!("malformed raster image: {err}")),
            )?
        }
    };
    log::info!("read {:?} ({}x{})", path, image.ncols(), image.nrows());
    Ok(image)
}

/// Writes a 2D single-channel image.
///
/// Raster formats store the min-max normalized image quantized to 16 bit; non-finite pixels are
/// written as 0.
pub fn write_image(path: &Path, image: &Image) -> Result<()> {
    match format_of(path)? {
        Format::Npy => write_npy(path, image)?,
        Format::Raster => {
            let mut normalized = image.clone();
            math_tools::normalize(&mut normalized);
            let pixels: Vec<u16> = normalized
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16)
                .collect();
            let (height, width) = image.dim();
            let buffer = ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(
                dimension(width)?,
                dimension(height)?,
                pixels,
            )
            .ok_or_else(|| {
                DeconvolveError::InvalidParameter("image buffer size mismatch".to_string())
            })?;
            buffer.save(path)?;
        }
    }
    log::info!("wrote {:?}", path);
    Ok(())
}

/// Writes `ln(1 + |X|)` of a spectrum with the zero frequency moved to the centre.
pub fn write_spectrum_visualization(path: &Path, spectrum: &Spectrum) -> Result<()> {
    let magnitude = quadrant_shift(&math_tools::log_magnitude(spectrum));
    write_image(path, &magnitude)
}

fn dimension(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        DeconvolveError::InvalidParameter(format!("image dimension {len} exceeds u32"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use num_complex::Complex32;
    use tempfile::tempdir;

    #[test]
    fn test_npy_is_lossless() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("image.npy");
        let image = array![[-1.5f32, 0.25, 1e-7], [3.0, f32::MAX, 0.0]];
        write_image(&path, &image).unwrap();
        assert_eq!(read_image(&path).unwrap(), image);
    }

    #[test]
    fn test_raster_formats_store_normalized_luma() {
        let dir = tempdir().unwrap();
        let image = array![[0.0f32, 2.0, 4.0], [1.0, 3.0, 4.0]];
        for name in ["image.png", "image.tif", "image.TIFF"] {
            let path = dir.path().join(name);
            write_image(&path, &image).unwrap();
            let read = read_image(&path).unwrap();
            assert_eq!(read.dim(), (2, 3));
            for (a, b) in read.iter().zip(image.iter()) {
                assert_abs_diff_eq!(*a, b / 4.0, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let image = Image::zeros((2, 2));
        assert!(matches!(
            write_image(&dir.path().join("image.bmp"), &image),
            Err(DeconvolveError::UnsupportedFormat(ext)) if ext == "bmp"
        ));
        assert!(matches!(
            read_image(&dir.path().join("image")),
            Err(DeconvolveError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_image(&dir.path().join("missing.npy")).is_err());
    }

    #[test]
    fn test_spectrum_visualization_is_centred() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spectrum.npy");
        let mut spectrum = Spectrum::zeros((4, 6));
        spectrum[[0, 0]] = Complex32::new(3.0, 4.0);
        write_spectrum_visualization(&path, &spectrum).unwrap();
        let written = read_image(&path).unwrap();
        assert_abs_diff_eq!(written[[2, 3]], 6.0f32.ln(), epsilon = 1e-6);
        assert_eq!(written.sum(), written[[2, 3]]);
    }
}
