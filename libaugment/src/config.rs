use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound used when sampling the origin of an occlusion rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginBound {
    /// The origin may fall anywhere the minimum rectangle still fits.
    Edge,
    /// The origin is additionally capped at the image midpoint, which skews
    /// occlusions toward the upper-left quadrant.
    Midpoint,
}

/// Parameters of the rectangle occlusion generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcclusionParams {
    /// Occluded copies produced per source image.
    pub aug_factor: u32,
    /// Largest rectangle width as a proportion of the image width, in (0, 1].
    pub max_width_prop: f64,
    /// Largest rectangle height as a proportion of the image height, in (0, 1].
    pub max_height_prop: f64,
    /// Smallest rectangle width in pixels.
    pub min_width: u32,
    /// Smallest rectangle height in pixels.
    pub min_height: u32,
    /// Fraction of each dimension skipped before the earliest origin, in [0, 1).
    pub center_bias: f64,
    /// Luminance written over the occluded region.
    pub fill: u8,
    pub origin_bound: OriginBound,
}

impl Default for OcclusionParams {
    fn default() -> Self {
        Self {
            aug_factor: 1,
            max_width_prop: 1.0,
            max_height_prop: 1.0,
            min_width: 50,
            min_height: 50,
            center_bias: 0.0,
            fill: 255,
            origin_bound: OriginBound::Edge,
        }
    }
}

impl OcclusionParams {
    /// Checks the image-independent constraints.
    ///
    /// Bounds that depend on the image size are checked per image by the
    /// generator.
    pub fn validate(&self) -> Result<()> {
        check_proportion("max_width_prop", self.max_width_prop)?;
        check_proportion("max_height_prop", self.max_height_prop)?;
        if !(0.0..1.0).contains(&self.center_bias) {
            return Err(Error::invalid_parameter(
                "center_bias",
                format!("{} is outside [0, 1)", self.center_bias),
            ));
        }
        Ok(())
    }
}

fn check_proportion(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameter(
            name,
            format!("{value} is outside (0, 1]"),
        ))
    }
}

/// Everything one augmentation run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    /// Parent directory of the trial directory.
    pub output_dir: PathBuf,
    pub trial_name: String,
    /// Index of the first written file.
    pub start_index: u32,
    /// Expand every image into its six flips and rotations.
    pub geometric: bool,
    /// Median filter radius in pixels.
    pub denoise_radius: Option<u32>,
    /// Contrast factor, 1.0 leaves images unchanged.
    pub contrast: Option<f64>,
    /// Side length of the square every image is resized to.
    pub resize: Option<u32>,
    pub occlusion: Option<OcclusionParams>,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("augmented"),
            trial_name: String::from("trial"),
            start_index: 0,
            geometric: false,
            denoise_radius: None,
            contrast: None,
            resize: None,
            occlusion: Some(OcclusionParams::default()),
            seed: None,
        }
    }
}

impl RunConfig {
    /// Reads a run configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Directory the trial record and the augmented images are written to.
    pub fn trial_dir(&self) -> PathBuf {
        self.output_dir.join(&self.trial_name)
    }
}
