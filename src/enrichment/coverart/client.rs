//! Cover Art Archive HTTP client
//!
//! Lists and downloads album artwork from the Cover Art Archive.
//! No API key required, but please respect their rate limits.
//!
//! API: https://coverartarchive.org

use super::dto;
use crate::enrichment::domain::{CoverArt, CoverImage, LookupError};

/// Default archive root
pub const DEFAULT_BASE_URL: &str = "https://coverartarchive.org";

/// MIME type assumed when the server does not send one.
const FALLBACK_MIME_TYPE: &str = "image/jpeg";

/// Cover Art Archive client
pub struct CoverArtClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CoverArtClient {
    /// Create a client against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// List all cover art for a release, in archive order.
    pub async fn cover_images(&self, release_id: &str) -> Result<Vec<CoverImage>, LookupError> {
        let listing = self.list_cover_art(release_id).await?;
        Ok(listing
            .images
            .into_iter()
            .map(|image| CoverImage { url: image.image })
            .collect())
    }

    async fn list_cover_art(&self, release_id: &str) -> Result<dto::CoverArtResponse, LookupError> {
        let url = format!("{}/release/{}", self.base_url, release_id);

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();

        // The archive answers 404 for releases that have no artwork at all
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NoMatches);
        }

        if !status.is_success() {
            return Err(LookupError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::CoverArtResponse>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }

    /// Download an image from a URL
    pub async fn fetch_image(&self, url: &str) -> Result<CoverArt, LookupError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NoMatches);
        }

        if !status.is_success() {
            return Err(LookupError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| v.starts_with("image/"))
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();

        let data = response
            .bytes()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?
            .to_vec();

        Ok(CoverArt {
            data,
            mime_type,
            url: url.to_string(),
        })
    }
}

impl Default for CoverArtClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CoverArtClient::default();
        assert_eq!(client.base_url, "https://coverartarchive.org");
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = CoverArtClient::new("http://localhost:9000/");
        assert_eq!(client.base_url, "http://localhost:9000");
    }
}
