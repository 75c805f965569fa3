use clap::{Args, Parser, Subcommand, ValueHint};
use flexi_logger::Logger;
use psf_deconvolve::config::{DeconvolutionConfig, DenominatorGuard, PostProcessing};
use psf_deconvolve::data_container::Image;
use psf_deconvolve::filters::convolution::convolve;
use psf_deconvolve::filters::deconvolution::deconvolve;
use psf_deconvolve::filters::psf::PsfSpec;
use psf_deconvolve::io::{read_image, write_image, write_spectrum_visualization};
use psf_deconvolve::pipeline::{self, ImageStore, Pipeline};
use psf_deconvolve::{fft, math_tools};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

type Result<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Restores images blurred by a known point-spread function"
)]
struct Cli {
    /// JSON file with deconvolution settings; explicit flags take precedence
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Log level or flexi_logger spec, e.g. `debug` or `info, psf_deconvolve=debug`
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Blur an image with a point-spread function
    Convolve(ConvolveArgs),

    /// Restore a blurred image
    Deconvolve(DeconvolveArgs),

    /// Blur an image and restore it again
    RoundTrip(RoundTripArgs),
}

#[derive(Args)]
struct ConvolveArgs {
    /// Sharp input image (.npy, .png, .tif)
    #[arg(long, value_hint = ValueHint::FilePath)]
    image: PathBuf,

    /// PSF image path, or `delta:SIZE` / `gaussian:SIZE:SIGMA`
    #[arg(long)]
    psf: String,

    /// Destination of the blurred image
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Args)]
struct DeconvolveArgs {
    /// Blurred input image (.npy, .png, .tif)
    #[arg(long, value_hint = ValueHint::FilePath)]
    blurred: PathBuf,

    /// PSF image path, or `delta:SIZE` / `gaussian:SIZE:SIGMA`
    #[arg(long)]
    psf: String,

    /// Destination of the restored image
    #[arg(long, value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Also write the log-magnitude spectrum of the restored image
    #[arg(long, value_hint = ValueHint::FilePath)]
    spectrum: Option<PathBuf>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args)]
struct RoundTripArgs {
    /// Sharp input image (.npy, .png, .tif)
    #[arg(long, value_hint = ValueHint::FilePath)]
    image: PathBuf,

    /// PSF image path, or `delta:SIZE` / `gaussian:SIZE:SIGMA`
    #[arg(long)]
    psf: String,

    /// Directory receiving `convolved.npy` and `deconvolved.npy`
    #[arg(long, value_hint = ValueHint::DirPath)]
    output_dir: PathBuf,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args)]
struct FilterArgs {
    /// Regularization weight (default 0.001)
    #[arg(long)]
    lambda: Option<f32>,

    /// Replace filter denominators smaller than this magnitude
    #[arg(long)]
    guard_epsilon: Option<f32>,

    /// Clamp the restored image to [0, 1]
    #[arg(long, conflicts_with = "normalize")]
    clamp: bool,

    /// Min-max normalize the restored image to [0, 1]
    #[arg(long)]
    normalize: bool,
}

/// Defaults, then the config file, then explicit flags.
fn deconvolution_config(file: Option<&Path>, args: &FilterArgs) -> Result<DeconvolutionConfig> {
    let mut config = match file {
        Some(path) => DeconvolutionConfig::load(path)?,
        None => DeconvolutionConfig::default(),
    };
    if let Some(lambda) = args.lambda {
        config.lambda = lambda;
    }
    if let Some(epsilon) = args.guard_epsilon {
        config.denominator_guard = DenominatorGuard::Floor { epsilon };
    }
    if args.clamp {
        config.post_processing = PostProcessing::Clamp;
    } else if args.normalize {
        config.post_processing = PostProcessing::Normalize;
    }
    config.validate()?;
    log::debug!("deconvolution settings: {:?}", config);
    Ok(config)
}

/// A generated kernel if `source` describes one, the image at `source` otherwise.
fn load_psf(source: &str) -> Result<Image> {
    match source.parse::<PsfSpec>() {
        Ok(spec) => {
            log::info!("using generated psf {spec}");
            Ok(spec.render()?)
        }
        Err(_) => Ok(read_image(Path::new(source))?),
    }
}

fn run_convolve(args: &ConvolveArgs) -> Result<()> {
    let image = read_image(&args.image)?;
    let psf = load_psf(&args.psf)?;
    write_image(&args.output, &convolve(&image, &psf)?)?;
    Ok(())
}

fn run_deconvolve(cli: &Cli, args: &DeconvolveArgs) -> Result<()> {
    let config = deconvolution_config(cli.config.as_deref(), &args.filter)?;
    let blurred = read_image(&args.blurred)?;
    let psf = load_psf(&args.psf)?;

    let restored = deconvolve(&blurred, &psf, &config)?;
    write_image(&args.output, &restored)?;

    if let Some(path) = &args.spectrum {
        write_spectrum_visualization(path, &fft::forward(&restored)?)?;
    }
    Ok(())
}

fn run_round_trip(cli: &Cli, args: &RoundTripArgs) -> Result<()> {
    let config = deconvolution_config(cli.config.as_deref(), &args.filter)?;
    let image = read_image(&args.image)?;
    let psf = load_psf(&args.psf)?;

    let mut store = ImageStore::new();
    store.insert(pipeline::INPUT.to_string(), image.clone());
    store.insert(pipeline::PSF.to_string(), psf);
    Pipeline::round_trip(config).run(&mut store)?;

    fs::create_dir_all(&args.output_dir)?;
    for handle in [pipeline::CONVOLVED, pipeline::DECONVOLVED] {
        let path = args.output_dir.join(format!("{handle}.npy"));
        write_image(&path, &store[handle])?;
    }

    if let Some(error) = math_tools::mean_absolute_error(&image, &store[pipeline::DECONVOLVED]) {
        log::info!("mean absolute reconstruction error: {error}");
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Convolve(args) => run_convolve(args),
        Command::Deconvolve(args) => run_deconvolve(cli, args),
        Command::RoundTrip(args) => run_round_trip(cli, args),
    }
}

fn main() {
    let cli = Cli::parse();

    let _logger = match Logger::try_with_str(&cli.log_level).and_then(|l| l.log_to_stderr().start())
    {
        Ok(handle) => handle,
        Err(err) => {
            eprintln!("logger initialization failed: {err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(&cli) {
        log::error!("{err}");
        std::process::exit(1);
    }
}
