//! Internal domain models for remote artwork lookups.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All external API responses get converted into these types via adapters.

/// A recording returned by a metadata search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordingMatch {
    /// MusicBrainz recording ID
    pub recording_id: String,
    /// Recording title as known to the service
    pub title: String,
    /// Releases this recording appears on, in service order
    pub release_ids: Vec<String>,
}

/// One image listed for a release in the artwork archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// Full-size image URL
    pub url: String,
}

/// Downloaded image bytes
#[derive(Debug, Clone)]
pub struct CoverArt {
    /// Image data (JPEG or PNG)
    pub data: Vec<u8>,
    /// MIME type (image/jpeg or image/png)
    pub mime_type: String,
    /// Source URL
    pub url: String,
}

/// Errors that can occur during a remote or database lookup
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("No matches found")]
    NoMatches,

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Device database query failed: {0}")]
    Database(String),
}

impl LookupError {
    /// Whether this is an expected "nothing found" outcome rather than a
    /// failure of the service.
    pub fn is_soft_miss(&self) -> bool {
        matches!(self, LookupError::NoMatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_miss_classification() {
        assert!(LookupError::NoMatches.is_soft_miss());
        assert!(!LookupError::Network("reset".to_string()).is_soft_miss());
        assert!(!LookupError::RateLimited.is_soft_miss());
    }

    #[test]
    fn test_error_display() {
        let err = LookupError::Database("timeout".to_string());
        assert!(err.to_string().contains("timeout"));
    }
}
