use image::DynamicImage;

/// Apply a Gaussian blur with the given standard deviation
///
/// The result keeps the input's dimensions and color type.
pub fn blur(image: &DynamicImage, sigma: f32) -> DynamicImage {
    image.blur(sigma)
}

/// Blur on a blocking worker
pub async fn blur_async(image: DynamicImage, sigma: f32) -> Option<DynamicImage> {
    match tokio::task::spawn_blocking(move || blur(&image, sigma)).await {
        Ok(blurred) => Some(blurred),
        Err(e) => {
            log::error!("❌ Blur task failed: {}", e);
            None
        }
    }
}
