use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use libaugment::{OcclusionParams, OriginBound, RunConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Augment a directory of images with flips, rotations, contrast, resizing
/// and random rectangle occlusions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of source images
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Directory the trial directory is created in
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// JSON run configuration; flags given on the command line override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Name of the trial directory
    #[arg(long, value_name = "NAME")]
    trial: Option<String>,

    /// Index of the first written file
    #[arg(long, value_name = "INT")]
    start_index: Option<u32>,

    /// Expand every image into its six flips and rotations
    #[arg(long)]
    geometric: bool,

    /// Median filter radius in pixels
    #[arg(long, value_name = "RADIUS")]
    denoise: Option<u32>,

    /// Contrast factor (1.0 = unchanged)
    #[arg(long, value_name = "FLOAT")]
    contrast: Option<f64>,

    /// Resize every image to SIZE x SIZE
    #[arg(long, value_name = "SIZE")]
    resize: Option<u32>,

    /// Write the transformed images without occlusion
    #[arg(long, conflicts_with = "occlusions")]
    no_occlusion: bool,

    #[command(flatten)]
    occlusion: OcclusionArgs,

    /// Random seed
    #[arg(long, value_name = "INT")]
    seed: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::Args, Debug)]
struct OcclusionArgs {
    /// Occluded copies per image
    #[arg(long, value_name = "INT")]
    occlusions: Option<u32>,

    /// Minimum rectangle width in pixels
    #[arg(long, value_name = "PX")]
    min_width: Option<u32>,

    /// Minimum rectangle height in pixels
    #[arg(long, value_name = "PX")]
    min_height: Option<u32>,

    /// Maximum rectangle width as a proportion of the image width
    #[arg(long, value_name = "FLOAT")]
    max_width_prop: Option<f64>,

    /// Maximum rectangle height as a proportion of the image height
    #[arg(long, value_name = "FLOAT")]
    max_height_prop: Option<f64>,

    /// Fraction of each dimension skipped before the earliest rectangle origin
    #[arg(long, value_name = "FLOAT")]
    center_bias: Option<f64>,

    /// Fill luminance (0-255)
    #[arg(long, value_name = "INT")]
    fill: Option<u8>,

    /// Upper bound of the rectangle origin (edge or midpoint)
    #[arg(long)]
    origin_bound: Option<OriginBoundArg>,
}

impl OcclusionArgs {
    fn any(&self) -> bool {
        self.occlusions.is_some()
            || self.min_width.is_some()
            || self.min_height.is_some()
            || self.max_width_prop.is_some()
            || self.max_height_prop.is_some()
            || self.center_bias.is_some()
            || self.fill.is_some()
            || self.origin_bound.is_some()
    }

    fn apply(&self, params: &mut OcclusionParams) {
        if let Some(v) = self.occlusions {
            params.aug_factor = v;
        }
        if let Some(v) = self.min_width {
            params.min_width = v;
        }
        if let Some(v) = self.min_height {
            params.min_height = v;
        }
        if let Some(v) = self.max_width_prop {
            params.max_width_prop = v;
        }
        if let Some(v) = self.max_height_prop {
            params.max_height_prop = v;
        }
        if let Some(v) = self.center_bias {
            params.center_bias = v;
        }
        if let Some(v) = self.fill {
            params.fill = v;
        }
        if let Some(v) = self.origin_bound {
            params.origin_bound = v.into();
        }
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OriginBoundArg {
    Edge,
    Midpoint,
}

impl From<OriginBoundArg> for OriginBound {
    fn from(val: OriginBoundArg) -> Self {
        match val {
            OriginBoundArg::Edge => OriginBound::Edge,
            OriginBoundArg::Midpoint => OriginBound::Midpoint,
        }
    }
}

fn build_config(args: &Args) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => RunConfig::default(),
    };

    config.input_dir = args.input.clone();
    config.output_dir = args.output.clone();
    if let Some(trial) = &args.trial {
        config.trial_name = trial.clone();
    }
    if let Some(start_index) = args.start_index {
        config.start_index = start_index;
    }
    if args.geometric {
        config.geometric = true;
    }
    if args.denoise.is_some() {
        config.denoise_radius = args.denoise;
    }
    if args.contrast.is_some() {
        config.contrast = args.contrast;
    }
    if args.resize.is_some() {
        config.resize = args.resize;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    if args.no_occlusion {
        config.occlusion = None;
    } else if config.occlusion.is_some() || args.occlusion.any() {
        let mut params = config.occlusion.unwrap_or_default();
        args.occlusion.apply(&mut params);
        config.occlusion = Some(params);
    }

    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("augment_cli={log_level},libaugment={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    if !args.input.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", args.input.display());
    }

    let config = build_config(args)?;
    let summary = libaugment::run(&config).context("Failed to run augmentation")?;

    let json = serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["augment-cli", "in", "out"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_keep_occlusion_on() {
        let config = build_config(&parse(&[])).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.occlusion, Some(OcclusionParams::default()));
    }

    #[test]
    fn occlusion_flags_override_defaults() {
        let config = build_config(&parse(&[
            "--occlusions",
            "3",
            "--min-width",
            "10",
            "--max-width-prop",
            "0.5",
            "--origin-bound",
            "midpoint",
            "--geometric",
            "--resize",
            "128",
        ]))
        .unwrap();

        let params = config.occlusion.unwrap();
        assert_eq!(params.aug_factor, 3);
        assert_eq!(params.min_width, 10);
        assert_eq!(params.max_width_prop, 0.5);
        assert_eq!(params.origin_bound, OriginBound::Midpoint);
        assert!(config.geometric);
        assert_eq!(config.resize, Some(128));
    }

    #[test]
    fn no_occlusion_disables_generator() {
        let config = build_config(&parse(&["--no-occlusion"])).unwrap();
        assert!(config.occlusion.is_none());
    }

    #[test]
    fn no_occlusion_conflicts_with_count() {
        let argv = ["augment-cli", "in", "out", "--no-occlusion", "--occlusions", "2"];
        assert!(Args::try_parse_from(argv).is_err());
    }
}
