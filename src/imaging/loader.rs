/// Image file loader
///
/// Decodes whatever format the `image` crate recognises. The format is
/// guessed from the file contents rather than trusted from the extension.
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use tokio::task;

use crate::error::{Result, ViewerError};

/// Load and decode an image file off the UI thread
pub async fn load_image(path: PathBuf) -> Result<DynamicImage> {
    // Spawn blocking because decoding is CPU-intensive
    let display = path.display().to_string();
    task::spawn_blocking(move || load_image_blocking(&path))
        .await
        .map_err(|e| ViewerError::Decode {
            path: display,
            reason: format!("Task join error: {}", e),
        })?
}

/// Blocking implementation of image loading
pub fn load_image_blocking(path: &Path) -> Result<DynamicImage> {
    let decode_error = |reason: String| ViewerError::Decode {
        path: path.display().to_string(),
        reason,
    };

    let image = ImageReader::open(path)
        .map_err(|e| decode_error(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))?;

    log::info!(
        "📷 Loaded {}: {}x{} ({:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    Ok(image)
}
