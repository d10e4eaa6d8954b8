//! MusicBrainz API Data Transfer Objects
//!
//! These types match EXACTLY what the MusicBrainz API returns.
//! DO NOT add fields that aren't in the API response.
//! DO NOT use these types outside the musicbrainz module - convert to domain types.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API
//!
//! We use the /recording search endpoint to find a release for an
//! (artist, title) pair announced by a player.

use serde::{Deserialize, Serialize};

/// Recording search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordingSearchResponse {
    /// Total number of hits
    #[serde(default)]
    pub count: u32,
    /// Offset of the first hit in this page
    #[serde(default)]
    pub offset: u32,
    /// Matching recordings, best first
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// A recording hit
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Recording {
    /// MusicBrainz recording ID
    pub id: String,
    /// Search relevance (0-100)
    pub score: Option<u32>,
    /// Track title
    pub title: String,
    /// Duration in milliseconds
    pub length: Option<u64>,
    /// Artist credits
    #[serde(default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Releases this recording appears on
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Artist credit (can be multiple for collaborations)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtistCredit {
    /// How this artist is credited (may differ from official name)
    pub name: Option<String>,
    /// The artist
    pub artist: Artist,
    /// Join phrase (e.g., " & ", " feat. ")
    pub joinphrase: Option<String>,
}

/// Artist info
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Artist {
    /// MusicBrainz artist ID
    pub id: String,
    /// Official artist name
    pub name: String,
    /// Sort name (e.g., "Beatles, The")
    pub sort_name: Option<String>,
}

/// Release (album/single/EP)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    /// Release title
    pub title: Option<String>,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
    /// Release date (YYYY, YYYY-MM, or YYYY-MM-DD)
    pub date: Option<String>,
    /// Release group (groups same album across editions)
    pub release_group: Option<ReleaseGroup>,
}

/// Release group
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseGroup {
    /// MusicBrainz release group ID
    pub id: String,
    /// Primary type (Album, Single, EP, etc.)
    pub primary_type: Option<String>,
}

/// Error response from MusicBrainz API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: String,
    pub help: Option<String>,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_parse_empty_search() {
        let json = r#"{
            "created": "2024-03-01T10:00:00.000Z",
            "count": 0,
            "offset": 0,
            "recordings": []
        }"#;

        let response: RecordingSearchResponse =
            serde_json::from_str(json).expect("Should parse empty search");

        assert_eq!(response.count, 0);
        assert!(response.recordings.is_empty());
    }

    #[test]
    fn test_parse_search_hit() {
        let json = r#"{
            "count": 1,
            "offset": 0,
            "recordings": [{
                "id": "rec-123",
                "score": 100,
                "title": "Windowlicker",
                "length": 366000,
                "artist-credit": [{
                    "name": "Aphex Twin",
                    "artist": {
                        "id": "art-123",
                        "name": "Aphex Twin",
                        "sort-name": "Aphex Twin"
                    }
                }],
                "releases": [{
                    "id": "rel-123",
                    "title": "Windowlicker",
                    "status": "Official",
                    "date": "1999-03-22",
                    "release-group": {
                        "id": "rg-123",
                        "primary-type": "Single"
                    }
                }]
            }]
        }"#;

        let response: RecordingSearchResponse =
            serde_json::from_str(json).expect("Should parse search hit");

        let recording = &response.recordings[0];
        assert_eq!(recording.score, Some(100));
        assert_eq!(recording.artist_credit[0].artist.name, "Aphex Twin");
        assert_eq!(recording.releases[0].id, "rel-123");
        let group = recording.releases[0].release_group.as_ref().unwrap();
        assert_eq!(group.primary_type.as_deref(), Some("Single"));
    }

    #[test]
    fn test_parse_recording_without_releases() {
        let json = r#"{
            "recordings": [{"id": "rec-1", "title": "Standalone"}]
        }"#;

        let response: RecordingSearchResponse =
            serde_json::from_str(json).expect("Should parse recording without releases");

        assert!(response.recordings[0].releases.is_empty());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{
            "error": "Invalid query",
            "help": "For usage, please see: https://musicbrainz.org/doc/MusicBrainz_API"
        }"#;

        let error: ApiError = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(error.error, "Invalid query");
        assert!(error.help.is_some());
    }
}
