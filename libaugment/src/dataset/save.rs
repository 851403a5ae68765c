use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::info;

use crate::error::{Error, Result};

/// File name for the output at `index`: four-digit zero-padded PNG.
pub fn output_file_name(index: u32) -> String {
    format!("{index:04}.png")
}

/// Writes `batch` into `dir` as PNG files numbered from `start_index`.
///
/// `dir` is created if it does not exist. Returns the next free index so
/// further batches continue the numbering.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] before writing anything when the batch
/// would run the index past `u32::MAX`.
pub fn save_outputs<P: AsRef<Path>>(
    dir: P,
    batch: &[DynamicImage],
    start_index: u32,
) -> Result<u32> {
    let dir = dir.as_ref();
    let end_index = u32::try_from(batch.len())
        .ok()
        .and_then(|len| start_index.checked_add(len))
        .ok_or_else(|| {
            Error::invalid_parameter(
                "start_index",
                format!("{} images from index {start_index} overflow the file index", batch.len()),
            )
        })?;
    fs::create_dir_all(dir)?;

    let mut index = start_index;
    for image in batch {
        let path = dir.join(output_file_name(index));
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|source| Error::ImageSave {
                path: path.clone(),
                source,
            })?;
        index += 1;
    }

    debug_assert_eq!(index, end_index);
    if index > start_index {
        info!(
            first = %output_file_name(start_index),
            last = %output_file_name(index - 1),
            dir = %dir.display(),
            "saved batch"
        );
    }
    Ok(index)
}

/// Keeps the running file index across successive batches written to one
/// directory.
#[derive(Debug, Clone)]
pub struct SequentialWriter {
    dir: PathBuf,
    next_index: u32,
}

impl SequentialWriter {
    pub fn new(dir: impl Into<PathBuf>, start_index: u32) -> Self {
        Self {
            dir: dir.into(),
            next_index: start_index,
        }
    }

    /// Writes one batch and returns the index the next batch will start at.
    pub fn write_batch(&mut self, batch: &[DynamicImage]) -> Result<u32> {
        self.next_index = save_outputs(&self.dir, batch, self.next_index)?;
        Ok(self.next_index)
    }

    pub fn next_index(&self) -> u32 {
        self.next_index
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn batch(len: usize) -> Vec<DynamicImage> {
        (0..len)
            .map(|i| DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([i as u8]))))
            .collect()
    }

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn pads_index_to_four_digits() {
        assert_eq!(output_file_name(0), "0000.png");
        assert_eq!(output_file_name(42), "0042.png");
        assert_eq!(output_file_name(12345), "12345.png");
    }

    #[test]
    fn consecutive_batches_continue_numbering() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("trial").join("images");

        let next = save_outputs(&out, &batch(2), 5).unwrap();
        assert_eq!(next, 7);
        let next = save_outputs(&out, &batch(3), next).unwrap();
        assert_eq!(next, 10);

        assert_eq!(
            file_names(&out),
            vec!["0005.png", "0006.png", "0007.png", "0008.png", "0009.png"]
        );
    }

    #[test]
    fn index_overflow_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("never");

        let result = save_outputs(&out, &batch(2), u32::MAX);
        assert!(matches!(
            result,
            Err(Error::InvalidParameter { ref name, .. }) if name == "start_index"
        ));
        assert!(!out.exists());

        assert_eq!(save_outputs(&out, &batch(1), u32::MAX - 1).unwrap(), u32::MAX);
    }

    #[test]
    fn writer_tracks_index() {
        let root = tempfile::tempdir().unwrap();
        let mut writer = SequentialWriter::new(root.path(), 0);

        assert_eq!(writer.write_batch(&batch(3)).unwrap(), 3);
        assert_eq!(writer.write_batch(&[]).unwrap(), 3);
        assert_eq!(writer.write_batch(&batch(1)).unwrap(), 4);
        assert_eq!(writer.next_index(), 4);
        assert_eq!(file_names(writer.dir()).len(), 4);
    }

    #[test]
    fn written_files_are_png() {
        let root = tempfile::tempdir().unwrap();
        save_outputs(root.path(), &batch(1), 0).unwrap();
        let format = image::ImageFormat::from_path(root.path().join("0000.png")).unwrap();
        assert_eq!(format, ImageFormat::Png);
        let decoded = image::open(root.path().join("0000.png")).unwrap();
        assert_eq!(decoded.to_luma8().get_pixel(0, 0)[0], 0);
    }
}
