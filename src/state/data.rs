/// Shared data structures for the viewer state
///
/// These structs are what the UI layer renders. They are built from
/// decoded images but hold renderer handles, not the images themselves.
use iced::widget::image::Handle;
use image::DynamicImage;

use crate::error::ViewerError;
use crate::imaging::{self, ImageMode};

/// The renderer-side projection of the current image
#[derive(Debug, Clone)]
pub struct DisplayHandle {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
    pub mode: ImageMode,
}

impl DisplayHandle {
    /// Build a fresh handle, resolving the presentation mode now
    pub fn from_image(image: &DynamicImage) -> Self {
        let mode = ImageMode::of(image);
        let pixels = imaging::to_rgba_pixels(image, mode);
        Self {
            handle: Handle::from_rgba(image.width(), image.height(), pixels),
            width: image.width(),
            height: image.height(),
            mode,
        }
    }
}

/// A rendered query result thumbnail
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub handle: Handle,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    pub fn from_image(image: &DynamicImage) -> Self {
        Self {
            handle: Handle::from_rgba(image.width(), image.height(), image.to_rgba8().into_raw()),
            width: image.width(),
            height: image.height(),
        }
    }
}

/// One entry of the result set
#[derive(Debug, Clone)]
pub struct ResultEntry {
    /// Path returned by the similarity service
    pub path: String,
    pub score: f64,
    /// Thumbnail, or why the path could not be loaded
    pub thumbnail: Result<Thumbnail, ViewerError>,
}

impl ResultEntry {
    /// The score as shown under the thumbnail
    pub fn label(&self) -> String {
        format!("{:.2}", self.score)
    }
}

/// Whether a query is currently running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    /// Waiting for the answer to query number `generation`
    InFlight { generation: u64 },
}
