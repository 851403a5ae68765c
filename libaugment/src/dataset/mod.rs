//! Reading source images from disk and writing numbered outputs.

mod load;
mod save;

pub use load::{load_image, load_image_dir};
pub use save::{output_file_name, save_outputs, SequentialWriter};
