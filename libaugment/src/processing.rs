use image::imageops::FilterType;
use image::DynamicImage;
use imageproc::filter::median_filter;
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Maps a multiplicative contrast factor onto the percentage taken by
/// `DynamicImage::adjust_contrast`, which scales the distance from mid-gray
/// by `((100 + c) / 100)^2`.
fn contrast_percent(factor: f64) -> f32 {
    (100.0 * (factor.sqrt() - 1.0)) as f32
}

/// Scales the contrast of every image around mid-gray.
///
/// A factor of `1.0` leaves images unchanged, `0.0` flattens them to a
/// uniform gray and larger values push channels away from the middle.
pub fn adjust_contrast(images: Vec<DynamicImage>, factor: f64) -> Result<Vec<DynamicImage>> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(Error::invalid_parameter(
            "contrast",
            format!("{factor} is not a non-negative factor"),
        ));
    }
    if factor == 1.0 {
        return Ok(images);
    }
    let percent = contrast_percent(factor);
    Ok(images
        .into_par_iter()
        .map(|image| image.adjust_contrast(percent))
        .collect())
}

/// Resizes every image to exactly `size` x `size`, ignoring aspect ratio.
pub fn resize_square(images: Vec<DynamicImage>, size: u32) -> Result<Vec<DynamicImage>> {
    if size == 0 {
        return Err(Error::invalid_parameter("resize", "size must be at least 1"));
    }
    Ok(images
        .into_par_iter()
        .map(|image| image.resize_exact(size, size, FilterType::Lanczos3))
        .collect())
}

fn denoise_image(image: DynamicImage, radius: u32) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(median_filter(&buf, radius, radius))
        }
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(median_filter(&buf, radius, radius)),
        other => DynamicImage::ImageRgba8(median_filter(&other.to_rgba8(), radius, radius)),
    }
}

/// Applies a median filter with the given pixel radius to every image.
/// A radius of zero returns the images untouched.
pub fn reduce_noise(images: Vec<DynamicImage>, radius: u32) -> Vec<DynamicImage> {
    if radius == 0 {
        return images;
    }
    images
        .into_par_iter()
        .map(|image| denoise_image(image, radius))
        .collect()
}
