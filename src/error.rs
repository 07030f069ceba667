/// Error types for the viewer
///
/// Every failure a user action can run into is one of these variants.
/// They are surfaced as notifications, never as panics, so they carry
/// owned strings and stay `Clone` to travel inside iced messages.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewerError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    /// The chosen file could not be read or decoded as an image
    #[error("Could not open {path}: {reason}")]
    Decode { path: String, reason: String },

    /// Blur or Query was requested before any image was opened
    #[error("No image loaded")]
    NoImage,

    /// The current image could not be encoded for upload
    #[error("Could not encode image: {0}")]
    Encode(String),

    /// Connection failure, timeout or non-success HTTP status
    #[error("Similarity service unreachable: {0}")]
    Network(String),

    /// The service answered with something other than `[[path, score], ...]`
    #[error("Unexpected response from similarity service: {0}")]
    Protocol(String),

    /// A result path returned by the service could not be loaded
    #[error("Could not load result {path}: {reason}")]
    Thumbnail { path: String, reason: String },

    /// A background worker panicked or was cancelled
    #[error("Background task failed: {0}")]
    Worker(String),
}

impl ViewerError {
    /// Short label used in log lines and notification titles
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::Decode { .. } => "decode",
            ViewerError::NoImage => "no-image",
            ViewerError::Encode(_) => "encode",
            ViewerError::Network(_) => "network",
            ViewerError::Protocol(_) => "protocol",
            ViewerError::Thumbnail { .. } => "thumbnail",
            ViewerError::Worker(_) => "worker",
        }
    }
}

impl From<reqwest::Error> for ViewerError {
    fn from(err: reqwest::Error) -> Self {
        ViewerError::Network(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ViewerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ViewerError::Worker(err.to_string())
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Protocol(err.to_string())
    }
}
