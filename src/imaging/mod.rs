/// Image processing module
///
/// This module handles:
/// - Decoding image files chosen by the user (loader.rs)
/// - The Gaussian blur filter (filter.rs)
/// - Bounded thumbnails for query results (thumbnail.rs)
/// - JPEG encoding of the query body (encode.rs)
/// - Deciding how an image is presented on screen (this file)

pub mod encode;
pub mod filter;
pub mod loader;
pub mod thumbnail;

use image::DynamicImage;

/// How an image is presented on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMode {
    /// Two-level single-channel image, drawn white on the black backdrop
    Bitmap,
    /// Anything else, drawn in full color
    Photo,
}

impl ImageMode {
    /// Resolve the presentation mode of a decoded image
    pub fn of(image: &DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(buffer)
                if buffer.pixels().all(|p| p.0[0] == 0 || p.0[0] == u8::MAX) =>
            {
                ImageMode::Bitmap
            }
            _ => ImageMode::Photo,
        }
    }
}

/// Convert an image to RGBA8 bytes for the renderer
///
/// Bitmaps become white where set and fully transparent elsewhere, so the
/// black backdrop behind the image widget shows through.
pub fn to_rgba_pixels(image: &DynamicImage, mode: ImageMode) -> Vec<u8> {
    match mode {
        ImageMode::Bitmap => image
            .to_luma8()
            .pixels()
            .flat_map(|p| {
                if p.0[0] == 0 {
                    [0, 0, 0, 0]
                } else {
                    [u8::MAX; 4]
                }
            })
            .collect(),
        ImageMode::Photo => image.to_rgba8().into_raw(),
    }
}
