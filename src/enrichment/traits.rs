//! Trait definitions for external API clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementations, while tests
//! can substitute mock implementations.

use async_trait::async_trait;

use super::domain::{CoverArt, CoverImage, LookupError, RecordingMatch};

/// Trait for the remote music-metadata search.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait RecordingSearch: Send + Sync {
    /// Search recordings by artist and title, optionally restricted to a
    /// release type.
    async fn search_recordings(
        &self,
        artist: &str,
        title: &str,
        release_type: Option<&str>,
    ) -> Result<Vec<RecordingMatch>, LookupError>;
}

/// Trait for the companion artwork archive.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait CoverArchive: Send + Sync {
    /// List images for a release, in archive order.
    async fn cover_images(&self, release_id: &str) -> Result<Vec<CoverImage>, LookupError>;

    /// Download one image by URL.
    async fn fetch_image(&self, url: &str) -> Result<CoverArt, LookupError>;
}

// Implement traits for real clients

#[async_trait]
impl RecordingSearch for super::musicbrainz::MusicBrainzClient {
    async fn search_recordings(
        &self,
        artist: &str,
        title: &str,
        release_type: Option<&str>,
    ) -> Result<Vec<RecordingMatch>, LookupError> {
        self.search_recordings(artist, title, release_type).await
    }
}

#[async_trait]
impl CoverArchive for super::coverart::CoverArtClient {
    async fn cover_images(&self, release_id: &str) -> Result<Vec<CoverImage>, LookupError> {
        self.cover_images(release_id).await
    }

    async fn fetch_image(&self, url: &str) -> Result<CoverArt, LookupError> {
        self.fetch_image(url).await
    }
}
