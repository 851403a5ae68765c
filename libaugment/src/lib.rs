//! # libaugment
//!
//! Image augmentation for building training sets: every source image in a
//! directory is expanded into flipped and rotated variants, optionally
//! denoised, contrast-adjusted and resized, and then copied several times
//! with a random solid rectangle painted over part of it. Outputs are
//! written as sequentially numbered PNG files next to a `config.txt` record
//! of the settings used.
//!
//! ## Example
//!
//! ```no_run
//! use libaugment::{run, RunConfig};
//!
//! # fn main() -> libaugment::Result<()> {
//! let config = RunConfig {
//!     input_dir: "images".into(),
//!     trial_name: "trial_1".into(),
//!     geometric: true,
//!     ..RunConfig::default()
//! };
//! let summary = run(&config)?;
//! println!("wrote {} images", summary.written);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod geometric;
pub mod occlusion;
pub mod pipeline;
pub mod processing;
pub mod record;

pub use config::{OcclusionParams, OriginBound, RunConfig};
pub use error::{Error, Result};
pub use occlusion::{occlusion_batches, OcclusionBatches, OcclusionRect};
pub use pipeline::{copies_per_image, run, run_with_rng, RunSummary};
