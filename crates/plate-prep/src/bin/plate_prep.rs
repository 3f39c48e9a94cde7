use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use plate_prep::gray::{binary_to_gray_image, gray_view, preprocess_image};
use plate_prep::io::{PrepConfig, PrepReport};
use plate_prep::pipeline::{PipelineParams, PlatePreprocessor};
use plate_prep::{LabelingMode, ThresholdMethod};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "plate-prep",
    version,
    about = "Binarize license-plate images and label their connected components."
)]
struct Cli {
    /// Log level for the stderr logger.
    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,
    /// Emit JSON log lines (requires the `tracing` feature).
    #[arg(long, global = true)]
    json_log: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and write a JSON report.
    Run(RunArgs),
    /// Print the threshold chosen by each selector as JSON.
    Thresholds(ThresholdsArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Input image. Optional when `--config` names one.
    image: Option<PathBuf>,
    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report path (overrides the config).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Threshold methods to vote on; repeat for several.
    #[arg(long = "method")]
    methods: Vec<ThresholdMethod>,
    /// Merge labels with union-find instead of forward propagation.
    #[arg(long)]
    union_find: bool,
    /// Store foreground pixel lists in the report.
    #[arg(long)]
    points: bool,
    /// Also save the voted binary image (format from the extension).
    #[arg(long)]
    binary_out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ThresholdsArgs {
    image: PathBuf,
    /// Methods to evaluate (default: all).
    #[arg(long = "method")]
    methods: Vec<ThresholdMethod>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match cli.command {
        Command::Run(args) => run(args),
        Command::Thresholds(args) => thresholds(args),
    }
}

fn parse_level(s: &str) -> Result<LevelFilter, String> {
    s.parse()
        .map_err(|_| format!("unknown log level `{s}` (off, error, warn, info, debug, trace)"))
}

fn init_logging(cli: &Cli) -> CliResult<()> {
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        log::set_max_level(cli.log_level);
        plate_prep::core::init_tracing(cli.json_log);
        Ok(())
    }
    #[cfg(not(feature = "tracing"))]
    {
        plate_prep::core::init_with_level(cli.log_level)?;
        if cli.json_log {
            log::warn!("--json-log needs the `tracing` feature; using plain logs");
        }
        Ok(())
    }
}

fn load_gray(path: &Path) -> CliResult<::image::GrayImage> {
    Ok(::image::ImageReader::open(path)?.decode()?.to_luma8())
}

fn run(args: RunArgs) -> CliResult<()> {
    let mut config = match (&args.config, &args.image) {
        (Some(path), _) => PrepConfig::load_json(path)?,
        (None, Some(image)) => PrepConfig::for_image(image.to_string_lossy()),
        (None, None) => return Err("either an image path or --config is required".into()),
    };
    if let Some(image) = &args.image {
        config.image_path = image.to_string_lossy().into_owned();
    }
    if !args.methods.is_empty() {
        config.methods = Some(args.methods.clone());
    }
    if args.union_find {
        config.labeling = Some(LabelingMode::UnionFind);
    }
    config.include_points |= args.points;

    let params = config.build_params();
    let img = load_gray(Path::new(&config.image_path))?;
    let mut report = PrepReport::new(
        config.image_path.clone(),
        img.width() as usize,
        img.height() as usize,
        params.clone(),
    );
    report.config_path = args
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().into_owned());

    match preprocess_image(&img, params) {
        Ok(result) => {
            report.set_result(&result, config.include_points);
            if let Some(path) = &args.binary_out {
                binary_to_gray_image(&result.binary)?.save(path)?;
                println!("wrote binary image to {}", path.display());
            }
        }
        Err(err) => {
            log::error!("preprocessing failed: {err}");
            report.set_error(err);
        }
    }

    let output_path = args.out.unwrap_or_else(|| config.output_path());
    report.write_json(&output_path)?;
    println!("wrote report JSON to {}", output_path.display());
    Ok(())
}

fn thresholds(args: ThresholdsArgs) -> CliResult<()> {
    let methods = if args.methods.is_empty() {
        ThresholdMethod::ALL.to_vec()
    } else {
        args.methods
    };
    let img = load_gray(&args.image)?;
    let pre = PlatePreprocessor::new(PipelineParams {
        methods,
        ..PipelineParams::default()
    });
    let report = pre.thresholds(&gray_view(&img))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
