//! Remote artwork resolver.
//!
//! Two stages, each a single best-effort attempt:
//! 1. Search MusicBrainz for a recording by (artist, title), restricted to
//!    the configured release type, and take the first recording's first
//!    release.
//! 2. List that release's images on the Cover Art Archive, download the
//!    first one and encode it as an inline image.
//!
//! Any miss or failure at either stage is logged and yields `None`.

use std::sync::Arc;

use super::TrackContext;
use crate::enrichment::{CoverArchive, LookupError, RecordingSearch};
use crate::model::InlineImage;

/// Resolves artwork for a track from MusicBrainz and the Cover Art Archive.
pub struct RemoteArtworkResolver {
    search: Arc<dyn RecordingSearch>,
    archive: Arc<dyn CoverArchive>,
    release_type: Option<String>,
}

impl RemoteArtworkResolver {
    pub fn new(
        search: Arc<dyn RecordingSearch>,
        archive: Arc<dyn CoverArchive>,
        release_type: Option<String>,
    ) -> Self {
        Self {
            search,
            archive,
            release_type,
        }
    }

    /// Find artwork for the track, `None` if either stage comes up empty.
    pub async fn resolve(&self, ctx: &TrackContext<'_>) -> Option<InlineImage> {
        let release_id = self.find_release(ctx).await?;
        self.find_artwork(ctx, &release_id).await
    }

    /// Stage 1: first release of the first matching recording.
    async fn find_release(&self, ctx: &TrackContext<'_>) -> Option<String> {
        tracing::info!(
            target: "cover::remote",
            slot = %ctx.slot,
            track_id = ctx.identity.track_id,
            "Looking for MusicBrainz recording for {} - {}",
            ctx.artist(),
            ctx.title()
        );

        let recordings = match self
            .search
            .search_recordings(ctx.artist(), ctx.title(), self.release_type.as_deref())
            .await
        {
            Ok(recordings) => recordings,
            Err(e) => {
                log_failure(ctx, "MusicBrainz search", &e);
                return None;
            }
        };

        let release_id = recordings
            .into_iter()
            .next()
            .and_then(|recording| recording.release_ids.into_iter().next());

        match release_id {
            Some(id) => {
                tracing::info!(
                    target: "cover::remote",
                    slot = %ctx.slot,
                    track_id = ctx.identity.track_id,
                    release = %id,
                    "Using best guess release"
                );
                Some(id)
            }
            None => {
                tracing::info!(
                    target: "cover::remote",
                    slot = %ctx.slot,
                    track_id = ctx.identity.track_id,
                    "No MusicBrainz entry found"
                );
                None
            }
        }
    }

    /// Stage 2: first archived image for the release.
    async fn find_artwork(&self, ctx: &TrackContext<'_>, release_id: &str) -> Option<InlineImage> {
        let images = match self.archive.cover_images(release_id).await {
            Ok(images) => images,
            Err(e) => {
                log_failure(ctx, "Cover Art Archive listing", &e);
                return None;
            }
        };

        let Some(first) = images.into_iter().next() else {
            tracing::info!(
                target: "cover::remote",
                slot = %ctx.slot,
                track_id = ctx.identity.track_id,
                release = %release_id,
                "No artwork found for release"
            );
            return None;
        };

        match self.archive.fetch_image(&first.url).await {
            Ok(art) => {
                tracing::info!(
                    target: "cover::remote",
                    slot = %ctx.slot,
                    track_id = ctx.identity.track_id,
                    bytes = art.data.len(),
                    "Artwork found"
                );
                Some(InlineImage::encode(&art.data, &art.mime_type))
            }
            Err(e) => {
                log_failure(ctx, "Artwork download", &e);
                None
            }
        }
    }
}

fn log_failure(ctx: &TrackContext<'_>, stage: &str, error: &LookupError) {
    if error.is_soft_miss() {
        tracing::info!(
            target: "cover::remote",
            slot = %ctx.slot,
            track_id = ctx.identity.track_id,
            "{} found nothing",
            stage
        );
    } else {
        tracing::warn!(
            target: "cover::remote",
            slot = %ctx.slot,
            track_id = ctx.identity.track_id,
            "{} failed: {}",
            stage,
            error
        );
    }
}
