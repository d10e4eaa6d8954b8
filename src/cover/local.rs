//! Artwork from the player's own database.
//!
//! Players store a small thumbnail and a larger variant whose file name
//! carries a marker (`_m`) before the extension. We always ask for the
//! larger one.

use std::sync::Arc;

use super::TrackContext;
use crate::model::{ArtworkRef, InlineImage};
use crate::network::TrackDatabase;

/// Insert `marker` before the file extension of an artwork path.
///
/// Paths without an extension, or already carrying the marker, are
/// returned unchanged.
pub fn high_res_path(path: &str, marker: &str) -> String {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    let Some(dot) = path[file_start..].rfind('.').map(|i| file_start + i) else {
        return path.to_string();
    };
    let stem = &path[..dot];
    if dot == file_start || marker.is_empty() || stem.ends_with(marker) {
        return path.to_string();
    }
    format!("{}{}{}", stem, marker, &path[dot..])
}

/// Fetches artwork bytes from the device holding the track.
pub struct LocalArtworkFetcher {
    database: Arc<dyn TrackDatabase>,
    marker: String,
}

impl LocalArtworkFetcher {
    pub fn new(database: Arc<dyn TrackDatabase>, marker: impl Into<String>) -> Self {
        Self {
            database,
            marker: marker.into(),
        }
    }

    /// Fetch and encode the high-resolution artwork, `None` if the device
    /// has none or the query fails.
    pub async fn fetch(&self, ctx: &TrackContext<'_>) -> Option<InlineImage> {
        let artwork = ArtworkRef {
            id: ctx.metadata.artwork.id,
            path: high_res_path(&ctx.metadata.artwork.path, &self.marker),
        };

        match self.database.artwork_bytes(ctx.identity, &artwork).await {
            Ok(Some(bytes)) if !bytes.is_empty() => Some(InlineImage::sniff(&bytes)),
            Ok(_) => {
                tracing::debug!(
                    target: "cover::local",
                    slot = %ctx.slot,
                    track_id = ctx.identity.track_id,
                    path = %artwork.path,
                    "No artwork on device"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    target: "cover::local",
                    slot = %ctx.slot,
                    track_id = ctx.identity.track_id,
                    "Device artwork query failed: {}",
                    e
                );
                None
            }
        }
    }
}
