use image::DynamicImage;
use std::path::Path;

use crate::error::{Result, ViewerError};

/// Shrink an image to fit a `max`×`max` box, preserving aspect ratio
///
/// Images already inside the box are returned unchanged; thumbnails never
/// enlarge.
pub fn thumbnail(image: &DynamicImage, max: u32) -> DynamicImage {
    if image.width() <= max && image.height() <= max {
        return image.clone();
    }
    image.thumbnail(max, max)
}

/// Load a result image from disk and shrink it
pub fn load_thumbnail(path: &Path, max: u32) -> Result<DynamicImage> {
    let image = super::loader::load_image_blocking(path).map_err(|e| match e {
        ViewerError::Decode { path, reason } => ViewerError::Thumbnail { path, reason },
        other => other,
    })?;
    Ok(thumbnail(&image, max))
}
