/// Similarity-search client
///
/// This module handles:
/// - The HTTP round trip to the similarity service (client.rs)
/// - Turning the `[[path, score], ...]` answer into displayable results

pub mod client;

use std::path::Path;

use image::DynamicImage;

use crate::error::{Result, ViewerError};
use crate::imaging::{encode, thumbnail};
pub use client::{Match, QueryClient};

/// One row of a query answer with its thumbnail already loaded
#[derive(Debug, Clone)]
pub struct FetchedResult {
    pub path: String,
    pub score: f64,
    /// The shrunk image, or why it could not be loaded
    pub thumbnail: std::result::Result<DynamicImage, ViewerError>,
}

/// Run a full query: encode, send, then load every returned thumbnail
///
/// Network and protocol failures abort the query. A result whose path
/// cannot be loaded is kept, carrying its `ThumbnailError`, so the
/// remaining results still render.
pub async fn fetch_results(
    client: QueryClient,
    image: DynamicImage,
    thumbnail_size: u32,
) -> Result<Vec<FetchedResult>> {
    let body = tokio::task::spawn_blocking(move || encode::encode_jpeg(&image)).await??;

    let matches = client.send(body).await?;
    log::info!("🔍 Similarity service returned {} matches", matches.len());

    let results = tokio::task::spawn_blocking(move || load_thumbnails(matches, thumbnail_size)).await?;
    Ok(results)
}

/// Load thumbnails for every match, preserving order
fn load_thumbnails(matches: Vec<Match>, thumbnail_size: u32) -> Vec<FetchedResult> {
    matches
        .into_iter()
        .map(|Match { path, score }| {
            let thumbnail = thumbnail::load_thumbnail(Path::new(&path), thumbnail_size);
            if let Err(e) = &thumbnail {
                log::warn!("⚠️  {}", e);
            }
            FetchedResult {
                path,
                score,
                thumbnail,
            }
        })
        .collect()
}
