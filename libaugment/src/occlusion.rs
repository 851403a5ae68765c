//! Randomized rectangle occlusion.
//!
//! Every source image yields a batch of copies, each with one solid
//! rectangle painted over it. Batches are produced lazily, one per source
//! image, so they can be written out before the next image is touched.

use std::iter::FusedIterator;

use image::{DynamicImage, Luma, Rgb, Rgba};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::{OcclusionParams, OriginBound};
use crate::error::{Axis, Error, Result};

/// Rectangle with exclusive right and bottom edges.
///
/// Always satisfies `x1 < x2 <= width` and `y1 < y2 <= height` for the image
/// it was sampled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcclusionRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl OcclusionRect {
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn to_rect(&self) -> Rect {
        Rect::at(self.x1 as i32, self.y1 as i32).of_size(self.width(), self.height())
    }
}

/// Sampling bounds along one axis of one image.
#[derive(Debug, Clone, Copy)]
struct AxisRange {
    extent: u32,
    origin_low: u32,
    origin_high: u32,
    min_len: u32,
    span: u32,
}

impl AxisRange {
    fn new(
        axis: Axis,
        image: usize,
        extent: u32,
        min_len: u32,
        max_prop: f64,
        center_bias: f64,
        origin_bound: OriginBound,
    ) -> Result<Self> {
        let min_len = min_len.max(1);
        let span = (max_prop * extent as f64).floor() as u32;
        if min_len > span {
            return Err(Error::InvalidBounds {
                axis,
                image,
                low: min_len,
                high: span,
            });
        }

        // min_len <= span <= extent
        let mut origin_high = extent - min_len;
        if origin_bound == OriginBound::Midpoint {
            origin_high = origin_high.min(extent / 2);
        }
        // a bias past the last origin pins the rectangle to the far edge
        let origin_low = ((center_bias * extent as f64).floor() as u32).min(origin_high);

        Ok(Self {
            extent,
            origin_low,
            origin_high,
            min_len,
            span,
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (u32, u32) {
        let start = rng.gen_range(self.origin_low..=self.origin_high);
        let end_high = start.saturating_add(self.span).min(self.extent);
        let end = rng.gen_range(start + self.min_len..=end_high);
        (start, end)
    }
}

#[derive(Debug, Clone, Copy)]
struct RectSampler {
    x: AxisRange,
    y: AxisRange,
}

impl RectSampler {
    fn new(width: u32, height: u32, params: &OcclusionParams, image: usize) -> Result<Self> {
        Ok(Self {
            x: AxisRange::new(
                Axis::X,
                image,
                width,
                params.min_width,
                params.max_width_prop,
                params.center_bias,
                params.origin_bound,
            )?,
            y: AxisRange::new(
                Axis::Y,
                image,
                height,
                params.min_height,
                params.max_height_prop,
                params.center_bias,
                params.origin_bound,
            )?,
        })
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> OcclusionRect {
        let (x1, x2) = self.x.sample(rng);
        let (y1, y2) = self.y.sample(rng);
        OcclusionRect { x1, y1, x2, y2 }
    }
}

/// Draws one occlusion rectangle for an image of the given size.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] for out-of-range proportions or bias
/// and [`Error::InvalidBounds`] when the parameters leave nothing to sample
/// for this size.
pub fn sample_rect<R: Rng + ?Sized>(
    width: u32,
    height: u32,
    params: &OcclusionParams,
    rng: &mut R,
) -> Result<OcclusionRect> {
    params.validate()?;
    Ok(RectSampler::new(width, height, params, 0)?.sample(rng))
}

/// Returns a copy of `image` with `rect` filled with the `fill` luminance.
///
/// Gray and RGB images keep their pixel type; anything else comes back as
/// RGBA with an opaque fill.
pub fn occlude(image: &DynamicImage, rect: OcclusionRect, fill: u8) -> DynamicImage {
    let area = rect.to_rect();
    match image {
        DynamicImage::ImageLuma8(buf) => {
            let mut copy = buf.clone();
            draw_filled_rect_mut(&mut copy, area, Luma([fill]));
            DynamicImage::ImageLuma8(copy)
        }
        DynamicImage::ImageRgb8(buf) => {
            let mut copy = buf.clone();
            draw_filled_rect_mut(&mut copy, area, Rgb([fill; 3]));
            DynamicImage::ImageRgb8(copy)
        }
        other => {
            let mut copy = other.to_rgba8();
            draw_filled_rect_mut(&mut copy, area, Rgba([fill, fill, fill, 255]));
            DynamicImage::ImageRgba8(copy)
        }
    }
}

/// Lazy sequence of occlusion batches, one per source image, in input order.
///
/// The sequence is single-pass and yields exactly one item per source image.
/// An image whose size leaves no room for a rectangle yields an error in its
/// place; callers stop at the first one.
pub struct OcclusionBatches<'a, R> {
    images: &'a [DynamicImage],
    params: OcclusionParams,
    rng: R,
    position: usize,
}

impl<'a, R: Rng> OcclusionBatches<'a, R> {
    fn occlude_image(&mut self, index: usize, image: &DynamicImage) -> Result<Vec<DynamicImage>> {
        let count = self.params.aug_factor as usize;
        if count == 0 {
            return Ok(Vec::new());
        }

        let sampler = RectSampler::new(image.width(), image.height(), &self.params, index)?;
        let mut batch = Vec::with_capacity(count);
        for _ in 0..count {
            let rect = sampler.sample(&mut self.rng);
            debug!(
                image = index,
                x1 = rect.x1,
                y1 = rect.y1,
                x2 = rect.x2,
                y2 = rect.y2,
                "occluded copy"
            );
            batch.push(occlude(image, rect, self.params.fill));
        }
        Ok(batch)
    }
}

impl<'a, R: Rng> Iterator for OcclusionBatches<'a, R> {
    type Item = Result<Vec<DynamicImage>>;

    fn next(&mut self) -> Option<Self::Item> {
        let images = self.images;
        let index = self.position;
        let image = images.get(index)?;
        self.position += 1;

        Some(self.occlude_image(index, image))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.images.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl<'a, R: Rng> ExactSizeIterator for OcclusionBatches<'a, R> {}

impl<'a, R: Rng> FusedIterator for OcclusionBatches<'a, R> {}

/// Starts the occlusion generator over `images`.
///
/// # Errors
///
/// Returns [`Error::NoImages`] when `images` is `None`; no batches are
/// produced in that case. Out-of-range proportions or bias are reported
/// before the first batch.
pub fn occlusion_batches<'a, R: Rng>(
    images: Option<&'a [DynamicImage]>,
    params: &OcclusionParams,
    rng: R,
) -> Result<OcclusionBatches<'a, R>> {
    let Some(images) = images else {
        warn!("no images to occlude");
        return Err(Error::NoImages);
    };
    params.validate()?;

    Ok(OcclusionBatches {
        images,
        params: *params,
        rng,
        position: 0,
    })
}
