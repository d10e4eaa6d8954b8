//! MusicBrainz HTTP client
//!
//! Handles communication with the MusicBrainz web service.
//! See: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! IMPORTANT: MusicBrainz requires a User-Agent header and rate limits to 1 req/sec.

use super::{adapter, dto};
use crate::enrichment::domain::{LookupError, RecordingMatch};

/// Default web service root
pub const DEFAULT_BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// MusicBrainz API client
pub struct MusicBrainzClient {
    http_client: reqwest::Client,
    base_url: String,
}

/// Build the User-Agent MusicBrainz asks every application to send.
pub fn user_agent(contact: &str) -> String {
    format!(
        "{}/{} ( {} )",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        contact
    )
}

impl MusicBrainzClient {
    /// Create a client against `base_url`, identifying with `contact`.
    pub fn new(base_url: impl Into<String>, contact: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent(contact))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "enrichment::musicbrainz", "Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Search recordings by artist and title, optionally restricted to a
    /// release-group primary type such as "Single".
    pub async fn search_recordings(
        &self,
        artist: &str,
        title: &str,
        release_type: Option<&str>,
    ) -> Result<Vec<RecordingMatch>, LookupError> {
        let response = self.send_search_request(artist, title, release_type).await?;
        Ok(adapter::to_matches(response))
    }

    fn search_url(&self, artist: &str, title: &str, release_type: Option<&str>) -> String {
        let query = adapter::build_query(artist, title, release_type);
        format!(
            "{}/recording?query={}&fmt=json&limit=5",
            self.base_url,
            urlencoding::encode(&query)
        )
    }

    /// Send the HTTP request and parse the response
    async fn send_search_request(
        &self,
        artist: &str,
        title: &str,
        release_type: Option<&str>,
    ) -> Result<dto::RecordingSearchResponse, LookupError> {
        let url = self.search_url(artist, title, release_type);

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NoMatches);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        {
            return Err(LookupError::RateLimited);
        }

        if !status.is_success() {
            // Try to parse error response
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(LookupError::ApiError(error.error));
            }
            return Err(LookupError::Network(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::RecordingSearchResponse>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }
}

impl Default for MusicBrainzClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, crate::config::DEFAULT_CONTACT)
    }
}
