use std::path::PathBuf;

use image::DynamicImage;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RunConfig;
use crate::dataset::{load_image_dir, SequentialWriter};
use crate::error::{Error, Result};
use crate::geometric::{expand_geometric, GEOMETRIC_VARIANTS};
use crate::occlusion::occlusion_batches;
use crate::processing::{adjust_contrast, reduce_noise, resize_square};
use crate::record::{write_config_file, TrialRecord, DEFAULT_CONFIG_FILE};

/// Outputs produced per source image, or `None` when no augmentation that
/// multiplies images is enabled.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] when the count does not fit in a `u32`.
pub fn copies_per_image(occlusion_factor: Option<u32>, geometric: bool) -> Result<Option<u32>> {
    Ok(match (occlusion_factor, geometric) {
        (None, false) => None,
        (None, true) => Some(GEOMETRIC_VARIANTS),
        (Some(k), false) => Some(k),
        (Some(k), true) => Some(k.checked_mul(GEOMETRIC_VARIANTS).ok_or_else(|| {
            Error::invalid_parameter(
                "aug_factor",
                format!("{k} copies times {GEOMETRIC_VARIANTS} variants overflows"),
            )
        })?),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub trial_dir: PathBuf,
    pub config_file: PathBuf,
    /// Images read from the input directory.
    pub sources: usize,
    /// Images written to the trial directory.
    pub written: u32,
    pub next_index: u32,
    pub copies_per_image: Option<u32>,
}

/// Geometric expansion, noise reduction, contrast and resize, each only when
/// configured.
pub fn prepare(images: Vec<DynamicImage>, config: &RunConfig) -> Result<Vec<DynamicImage>> {
    let mut images = images;

    if config.geometric {
        images = expand_geometric(&images);
        info!(count = images.len(), "expanded geometric variants");
    }
    if let Some(radius) = config.denoise_radius {
        images = reduce_noise(images, radius);
        info!(radius, "reduced noise");
    }
    if let Some(factor) = config.contrast {
        images = adjust_contrast(images, factor)?;
        info!(factor, "adjusted contrast");
    }
    if let Some(size) = config.resize {
        images = resize_square(images, size)?;
        info!(size, "resized");
    }
    Ok(images)
}

/// Runs one trial with a generator seeded from `config.seed`, or from the OS
/// when no seed is given.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_with_rng(config, rng)
}

/// Writes the trial record, loads and transforms the sources, and writes
/// every output into the trial directory under one running index.
pub fn run_with_rng<R: Rng>(config: &RunConfig, rng: R) -> Result<RunSummary> {
    let copies = copies_per_image(config.occlusion.map(|p| p.aug_factor), config.geometric)?;
    let trial_dir = config.trial_dir();
    let record = TrialRecord::from_serialize(config)?;
    let config_file = write_config_file(&trial_dir, &record, DEFAULT_CONFIG_FILE)?;

    let sources = load_image_dir(&config.input_dir)?;
    let source_count = sources.len();
    if source_count == 0 {
        warn!(dir = %config.input_dir.display(), "input directory has no images");
    }
    let images = prepare(sources, config)?;

    let mut writer = SequentialWriter::new(&trial_dir, config.start_index);
    match &config.occlusion {
        Some(params) => {
            for batch in occlusion_batches(Some(images.as_slice()), params, rng)? {
                writer.write_batch(&batch?)?;
            }
        }
        None => {
            for image in &images {
                writer.write_batch(std::slice::from_ref(image))?;
            }
        }
    }

    let summary = RunSummary {
        trial_dir,
        config_file,
        sources: source_count,
        written: writer.next_index() - config.start_index,
        next_index: writer.next_index(),
        copies_per_image: copies,
    };
    info!(
        sources = summary.sources,
        written = summary.written,
        "trial finished"
    );
    Ok(summary)
}
