use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::info;

use crate::error::{Error, Result};

/// Decodes a single image file.
///
/// # Errors
///
/// Returns [`Error::ImageLoad`] if the file cannot be read or decoded.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })
}

/// Decodes every file in `dir`, in file-name order.
///
/// Entries are not filtered by extension: a file that is not an image aborts
/// the whole load. Subdirectories are skipped.
pub fn load_image_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<DynamicImage>> {
    let dir = dir.as_ref();

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let images = paths
        .iter()
        .map(load_image)
        .collect::<Result<Vec<_>>>()?;
    info!(count = images.len(), dir = %dir.display(), "loaded source images");
    Ok(images)
}
