use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::error::{Result, ViewerError};

/// Quality used for the query body, the usual libjpeg default
const JPEG_QUALITY: u8 = 75;

/// Encode an image as JPEG for upload
///
/// JPEG has no alpha channel: grayscale images are sent as 8-bit gray,
/// everything else as 8-bit RGB.
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let flattened = if image.color().has_color() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        DynamicImage::ImageLuma8(image.to_luma8())
    };

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    flattened
        .write_with_encoder(encoder)
        .map_err(|e| ViewerError::Encode(e.to_string()))?;

    log::debug!("Encoded {}x{} image as {} byte JPEG", image.width(), image.height(), buffer.len());
    Ok(buffer)
}
