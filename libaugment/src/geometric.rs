use image::DynamicImage;
use rayon::prelude::*;

/// Number of images [`expand_geometric`] produces per source image.
pub const GEOMETRIC_VARIANTS: u32 = 6;

/// Identity, horizontal flip, vertical flip, and clockwise rotations by 90,
/// 180 and 270 degrees, in that order.
fn variants(image: &DynamicImage) -> [DynamicImage; 6] {
    [
        image.clone(),
        image.fliph(),
        image.flipv(),
        image.rotate90(),
        image.rotate180(),
        image.rotate270(),
    ]
}

/// Expands every image into its six flips and rotations.
///
/// The output keeps input order, with the variants of one source image
/// contiguous: identity, flip-H, flip-V, rot90, rot180, rot270.
pub fn expand_geometric(images: &[DynamicImage]) -> Vec<DynamicImage> {
    let groups: Vec<[DynamicImage; 6]> = images.par_iter().map(variants).collect();

    groups.into_iter().flatten().collect()
}
