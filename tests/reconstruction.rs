use approx::assert_abs_diff_eq;
use psf_deconvolve::config::DeconvolutionConfig;
use psf_deconvolve::data_container::Image;
use psf_deconvolve::filters::convolution::convolve;
use psf_deconvolve::filters::deconvolution::deconvolve;
use psf_deconvolve::filters::psf::{delta_psf, gaussian_psf};
use psf_deconvolve::math_tools::mean_absolute_error;
use psf_deconvolve::padding::{pad, target_size};
use psf_deconvolve::pipeline::{self, ImageStore, Pipeline};

/// Gaussian blob with values in [0, 1], peaking in the image centre.
fn blob(height: usize, width: usize, sigma: f32) -> Image {
    let (cy, cx) = ((height as f32 - 1.0) / 2.0, (width as f32 - 1.0) / 2.0);
    Image::from_shape_fn((height, width), |(y, x)| {
        let r2 = (y as f32 - cy).powi(2) + (x as f32 - cx).powi(2);
        (-r2 / (2.0 * sigma * sigma)).exp()
    })
}

fn pattern(height: usize, width: usize) -> Image {
    Image::from_shape_fn((height, width), |(y, x)| {
        ((y * 5 + x * 3) % 7) as f32 / 7.0
    })
}

#[test]
fn test_round_trip_recovers_sharp_image() {
    let sharp = blob(16, 16, 2.0);
    let psf = gaussian_psf(5, 5, 1.0).unwrap();
    let blurred = convolve(&sharp, &psf).unwrap();
    let restored = deconvolve(&blurred, &psf, &DeconvolutionConfig::with_lambda(0.001)).unwrap();

    let blurred_error = mean_absolute_error(&sharp, &blurred).unwrap();
    let restored_error = mean_absolute_error(&sharp, &restored).unwrap();
    assert!(restored_error < 0.05, "restored error {restored_error}");
    assert!(
        restored_error < blurred_error,
        "restored error {restored_error} not below blurred error {blurred_error}"
    );
}

#[test]
fn test_identity_psf_with_zero_lambda() {
    let config = DeconvolutionConfig::with_lambda(0.0);
    for shape in [(1, 1), (4, 4), (5, 7), (8, 3), (12, 10)] {
        let image = pattern(shape.0, shape.1);
        for psf in [delta_psf(1, 1).unwrap(), delta_psf(3, 3).unwrap()] {
            let blurred = convolve(&image, &psf).unwrap();
            let restored = deconvolve(&blurred, &psf, &config).unwrap();
            assert_eq!(restored.dim(), image.dim());
            for (a, b) in restored.iter().zip(image.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-4);
            }
        }
    }
}

#[test]
fn test_constant_image_with_centered_delta() {
    let image = Image::from_elem((4, 4), 1.0);
    let psf = delta_psf(3, 3).unwrap();
    let blurred = convolve(&image, &psf).unwrap();
    let restored = deconvolve(&blurred, &psf, &DeconvolutionConfig::default()).unwrap();
    assert_eq!(restored.dim(), (4, 4));
    for &v in restored.iter() {
        assert!((v - 1.0).abs() < 0.01, "pixel {v}");
    }
}

#[test]
fn test_image_and_psf_share_padded_size() {
    for (image_shape, psf_shape) in [((4, 4), (3, 3)), ((7, 10), (1, 4)), ((16, 9), (6, 5))] {
        let image = Image::zeros(image_shape);
        let psf = Image::zeros(psf_shape);
        let target = target_size(&image, &psf).unwrap();
        assert_eq!(
            pad(&image, target, false).unwrap().dim(),
            pad(&psf, target, true).unwrap().dim()
        );
    }
}

#[test]
fn test_round_trip_pipeline() {
    let sharp = blob(12, 14, 2.5);
    let mut store = ImageStore::new();
    store.insert(pipeline::INPUT.to_string(), sharp.clone());
    store.insert(
        pipeline::PSF.to_string(),
        gaussian_psf(3, 3, 0.8).unwrap(),
    );
    Pipeline::round_trip(DeconvolutionConfig::default())
        .run(&mut store)
        .unwrap();

    let restored = &store[pipeline::DECONVOLVED];
    assert_eq!(restored.dim(), sharp.dim());
    assert!(mean_absolute_error(&sharp, restored).unwrap() < 0.05);
}
