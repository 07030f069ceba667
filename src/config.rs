//! User settings loaded from `settings.toml`.
//!
//! The file lives in the platform config directory
//! (`~/.config/pilview/settings.toml` on Linux). It is optional and only
//! ever read: a missing or unparsable file means defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "pilview";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1080";
pub const DEFAULT_BLUR_SIGMA: f32 = 3.0;
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the similarity-search service
    pub endpoint: String,
    /// Standard deviation of the Gaussian blur
    pub blur_sigma: f32,
    /// Bounding box (square) for result thumbnails
    pub thumbnail_size: u32,
    /// Give up on the service after this many seconds; unset waits forever
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            blur_sigma: DEFAULT_BLUR_SIGMA,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            request_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

/// Load settings from the default location, falling back to defaults
pub fn load() -> Config {
    match get_default_config_path() {
        Some(path) if path.exists() => load_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_from_path(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("⚠️  Could not read {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match toml::from_str::<Config>(&content) {
        Ok(config) => {
            log::info!("⚙️  Loaded settings from {}", path.display());
            config.sanitized()
        }
        Err(e) => {
            log::warn!("⚠️  Ignoring invalid settings in {}: {}", path.display(), e);
            Config::default()
        }
    }
}

impl Config {
    /// Replace nonsensical values with their defaults
    fn sanitized(mut self) -> Self {
        if !self.blur_sigma.is_finite() || self.blur_sigma <= 0.0 {
            self.blur_sigma = DEFAULT_BLUR_SIGMA;
        }
        if self.thumbnail_size == 0 {
            self.thumbnail_size = DEFAULT_THUMBNAIL_SIZE;
        }
        self
    }
}
