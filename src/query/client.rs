use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, ViewerError};

/// One `[path, score]` pair returned by the similarity service
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(String, f64)")]
pub struct Match {
    pub path: String,
    pub score: f64,
}

impl From<(String, f64)> for Match {
    fn from((path, score): (String, f64)) -> Self {
        Self { path, score }
    }
}

/// HTTP client for the similarity service
///
/// Cheap to clone: the underlying `reqwest::Client` shares its
/// connection pool.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    endpoint: String,
}

impl QueryClient {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST an encoded image and parse the ranked matches
    pub async fn send(&self, body: Vec<u8>) -> Result<Vec<Match>> {
        log::debug!("POST {} ({} bytes)", self.endpoint, body.len());

        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::Network(format!(
                "{} answered with status {}",
                self.endpoint, status
            )));
        }

        let text = response.text().await?;
        parse_matches(&text)
    }
}

/// Parse a `[[path, score], ...]` response body
pub fn parse_matches(text: &str) -> Result<Vec<Match>> {
    Ok(serde_json::from_str(text)?)
}
