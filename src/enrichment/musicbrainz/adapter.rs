//! Adapter layer: Convert MusicBrainz DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.
//! This isolates API changes - if MusicBrainz changes their response format,
//! only this file and dto.rs need to change.

use super::dto;
use crate::enrichment::domain::RecordingMatch;

/// Convert a recording search response into matches, keeping service order.
pub fn to_matches(response: dto::RecordingSearchResponse) -> Vec<RecordingMatch> {
    response
        .recordings
        .into_iter()
        .map(|recording| RecordingMatch {
            recording_id: recording.id,
            title: recording.title,
            release_ids: recording.releases.into_iter().map(|r| r.id).collect(),
        })
        .collect()
}

/// Build a Lucene search query for a recording.
///
/// Terms are quoted so that spaces and punctuation in titles stay part of
/// the phrase; an empty `release_type` means no type restriction.
pub fn build_query(artist: &str, title: &str, release_type: Option<&str>) -> String {
    let mut query = format!(
        "artist:\"{}\" AND recording:\"{}\"",
        escape_phrase(artist),
        escape_phrase(title)
    );
    if let Some(kind) = release_type.filter(|k| !k.is_empty()) {
        query.push_str(&format!(" AND primarytype:\"{}\"", escape_phrase(kind)));
    }
    query
}

/// Escape characters that would terminate a quoted Lucene phrase.
fn escape_phrase(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
