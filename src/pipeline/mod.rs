//! Metadata resolution pipeline.
//!
//! Turns a (slot, track) pair into metadata plus artwork:
//! 1. Read metadata from the player's database (always fresh)
//! 2. Race the device-local and remote artwork sources, waiting for both
//! 3. Keep remote artwork if found, otherwise whatever the device had
//! 4. Cache the chosen artwork against the track it was resolved for
//!
//! Nothing here propagates an error: failures are logged and the pipeline
//! carries on with what it has.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinSet;

use crate::config::ArtworkConfig;
use crate::cover::{self, ArtworkSource, LocalArtworkFetcher, RemoteArtworkResolver, TrackContext};
use crate::decision::NowPlaying;
use crate::devices::DeviceStateStore;
use crate::enrichment::{CoverArchive, LookupError, RecordingSearch};
use crate::events::Subscriber;
use crate::model::{DeviceSlot, InlineImage, TrackIdentity, TrackMetadata};
use crate::network::TrackDatabase;
use crate::publisher::MetadataSink;

/// Resolves tracks and publishes now-playing updates.
pub struct MetadataPipeline {
    database: Arc<dyn TrackDatabase>,
    local: LocalArtworkFetcher,
    remote: RemoteArtworkResolver,
    store: Arc<DeviceStateStore>,
    sink: Arc<dyn MetadataSink>,
}

impl MetadataPipeline {
    pub fn new(
        database: Arc<dyn TrackDatabase>,
        search: Arc<dyn RecordingSearch>,
        archive: Arc<dyn CoverArchive>,
        store: Arc<DeviceStateStore>,
        sink: Arc<dyn MetadataSink>,
        config: &ArtworkConfig,
    ) -> Self {
        Self {
            local: LocalArtworkFetcher::new(Arc::clone(&database), config.high_res_marker.clone()),
            remote: RemoteArtworkResolver::new(
                search,
                archive,
                config.release_type_filter().map(str::to_string),
            ),
            database,
            store,
            sink,
        }
    }

    /// Read metadata for a track. Never cached.
    pub async fn resolve_track(
        &self,
        slot: DeviceSlot,
        identity: &TrackIdentity,
    ) -> Result<TrackMetadata, LookupError> {
        let mut track = self.database.metadata(identity).await?;
        track.normalize_label();
        tracing::info!(
            target: "pipeline",
            slot = %slot,
            track_id = identity.track_id,
            label = %track.label_name(),
            "New track metadata received: {}",
            track.display_name()
        );
        Ok(track)
    }

    /// Query both artwork sources concurrently and pick the winner.
    ///
    /// Both sources run to completion before the decision; the slower one is
    /// never cancelled.
    pub async fn resolve_artwork(
        &self,
        slot: DeviceSlot,
        identity: &TrackIdentity,
        track: &TrackMetadata,
    ) -> Option<InlineImage> {
        let ctx = TrackContext::new(slot, identity, track);
        let (local, remote) = tokio::join!(self.local.fetch(&ctx), self.remote.resolve(&ctx));

        let (artwork, source) = cover::choose(remote, local);
        match source {
            ArtworkSource::Remote => {
                tracing::info!(target: "pipeline", slot = %slot, track_id = identity.track_id, "Using MusicBrainz artwork")
            }
            ArtworkSource::Local => {
                tracing::info!(target: "pipeline", slot = %slot, track_id = identity.track_id, "Using local artwork")
            }
            ArtworkSource::None => {
                tracing::info!(target: "pipeline", slot = %slot, track_id = identity.track_id, "No artwork available")
            }
        }
        artwork
    }

    /// Resolve a freshly loaded track ahead of it being played and cache
    /// its artwork.
    pub async fn prefetch(&self, slot: DeviceSlot, identity: TrackIdentity) {
        let track = match self.resolve_track(slot, &identity).await {
            Ok(track) => track,
            Err(e) => {
                log_metadata_failure(slot, &identity, &e);
                return;
            }
        };
        let artwork = self.resolve_artwork(slot, &identity, &track).await;
        self.cache_artwork(slot, identity, artwork);
    }

    /// Publish the track a now-playing decision names.
    pub async fn on_now_playing(&self, event: NowPlaying) {
        if let Some((track, artwork)) = self.resolve_now_playing(event).await {
            self.publish(&track, artwork.as_ref());
        }
    }

    /// Resolve the track a now-playing decision names, without publishing.
    ///
    /// Artwork cached for that exact track is reused; otherwise it is
    /// resolved and cached now. Metadata is always re-read. `None` when the
    /// metadata could not be read.
    pub async fn resolve_now_playing(&self, event: NowPlaying) -> Option<(TrackMetadata, Option<InlineImage>)> {
        let NowPlaying { slot, identity } = event;

        let track = match self.resolve_track(slot, &identity).await {
            Ok(track) => track,
            Err(e) => {
                log_metadata_failure(slot, &identity, &e);
                return None;
            }
        };

        let artwork = match self.store.trusted_artwork(slot, &identity) {
            Some(cached) => {
                tracing::debug!(target: "pipeline", slot = %slot, track_id = identity.track_id, "Reusing cached artwork");
                Some(cached)
            }
            None => {
                let artwork = self.resolve_artwork(slot, &identity, &track).await;
                self.cache_artwork(slot, identity, artwork.clone());
                artwork
            }
        };

        Some((track, artwork))
    }

    pub fn publish(&self, track: &TrackMetadata, artwork: Option<&InlineImage>) {
        self.sink.publish(track, artwork);
    }

    fn cache_artwork(&self, slot: DeviceSlot, identity: TrackIdentity, artwork: Option<InlineImage>) {
        if !self.store.store_artwork(slot, identity, artwork) {
            tracing::debug!(
                target: "pipeline",
                slot = %slot,
                track_id = identity.track_id,
                "Track changed during resolution, artwork not cached"
            );
        }
    }
}

fn log_metadata_failure(slot: DeviceSlot, identity: &TrackIdentity, error: &LookupError) {
    tracing::warn!(
        target: "pipeline",
        slot = %slot,
        track_id = identity.track_id,
        "Failed to read track metadata: {}",
        error
    );
}

/// Runs the pipeline for every now-playing decision.
///
/// Decisions resolve concurrently, but only the most recent one publishes:
/// a resolution that finishes after a newer decision arrived is discarded.
pub struct NowPlayingHandler {
    pipeline: Arc<MetadataPipeline>,
    latest: Arc<AtomicU64>,
    tasks: JoinSet<()>,
}

impl NowPlayingHandler {
    pub fn new(pipeline: Arc<MetadataPipeline>) -> Self {
        Self {
            pipeline,
            latest: Arc::new(AtomicU64::new(0)),
            tasks: JoinSet::new(),
        }
    }
}

#[async_trait::async_trait]
impl Subscriber<NowPlaying> for NowPlayingHandler {
    fn notify(&mut self, event: &NowPlaying) {
        while self.tasks.try_join_next().is_some() {}
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.latest);
        let pipeline = Arc::clone(&self.pipeline);
        let event = *event;
        self.tasks.spawn(async move {
            let Some((track, artwork)) = pipeline.resolve_now_playing(event).await else {
                return;
            };
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(
                    target: "pipeline",
                    slot = %event.slot,
                    track_id = event.identity.track_id,
                    "Superseded by a newer decision, not publishing"
                );
                return;
            }
            pipeline.publish(&track, artwork.as_ref());
        });
    }

    async fn settle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }
}
