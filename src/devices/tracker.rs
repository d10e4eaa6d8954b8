//! Status and device subscribers.
//!
//! [`DeviceTracker`] watches every status broadcast for a change of loaded
//! track and prefetches the new track's metadata and artwork. Broadcasts
//! repeating the same identity, which is most of them, do nothing.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::task::JoinSet;

use super::{DeviceStateStore, TrackChange};
use crate::events::Subscriber;
use crate::model::{Device, DeviceId, StatusBroadcast};
use crate::pipeline::MetadataPipeline;

/// Detects track changes on player slots.
pub struct DeviceTracker {
    store: Arc<DeviceStateStore>,
    pipeline: Arc<MetadataPipeline>,
    tasks: JoinSet<()>,
}

impl DeviceTracker {
    pub fn new(store: Arc<DeviceStateStore>, pipeline: Arc<MetadataPipeline>) -> Self {
        Self {
            store,
            pipeline,
            tasks: JoinSet::new(),
        }
    }
}

#[async_trait::async_trait]
impl Subscriber<StatusBroadcast> for DeviceTracker {
    fn notify(&mut self, status: &StatusBroadcast) {
        while self.tasks.try_join_next().is_some() {}

        let Some(slot) = status.slot() else {
            return;
        };
        let identity = status.identity();

        match self.store.observe(slot, identity) {
            TrackChange::Unchanged => {}
            TrackChange::Emptied => {
                tracing::debug!(target: "devices", slot = %slot, "Slot emptied");
            }
            TrackChange::Loaded => {
                tracing::info!(
                    target: "devices",
                    slot = %slot,
                    track_device = %identity.device,
                    track_id = identity.track_id,
                    "New track loaded"
                );
                let pipeline = Arc::clone(&self.pipeline);
                self.tasks.spawn(async move { pipeline.prefetch(slot, identity).await });
            }
        }
    }

    async fn settle(&mut self) {
        while self.tasks.join_next().await.is_some() {}
    }
}

/// Logs each device the first time it joins.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    seen: HashSet<DeviceId>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Subscriber<Device> for DeviceRegistry {
    fn notify(&mut self, device: &Device) {
        if self.seen.insert(device.id) {
            tracing::info!(
                target: "devices",
                device = %device.id,
                name = %device.name,
                "Device connected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArtworkConfig;
    use crate::enrichment::traits::mocks::{MockArchive, MockSearch};
    use crate::model::InlineImage;
    use crate::test_utils::{
        MockDatabase, RecordingSink, device, mock_identity, mock_metadata, slot, status,
    };

    struct Fixture {
        database: Arc<MockDatabase>,
        store: Arc<DeviceStateStore>,
        tracker: DeviceTracker,
    }

    fn fixture() -> Fixture {
        let database = Arc::new(
            MockDatabase::new()
                .with_metadata(mock_metadata("X", "Y"))
                .with_artwork(5, b"B")
                .with_artwork(6, b"D"),
        );
        let store = Arc::new(DeviceStateStore::new());
        let pipeline = Arc::new(MetadataPipeline::new(
            database.clone(),
            Arc::new(MockSearch::no_matches()),
            Arc::new(MockArchive::empty()),
            store.clone(),
            Arc::new(RecordingSink::default()),
            &ArtworkConfig::default(),
        ));
        Fixture {
            database,
            tracker: DeviceTracker::new(store.clone(), pipeline),
            store,
        }
    }

    #[tokio::test]
    async fn test_repeated_identity_prefetches_once() {
        let mut f = fixture();
        for _ in 0..3 {
            f.tracker.notify(&status(1, 5));
        }
        f.tracker.settle().await;

        assert_eq!(f.database.metadata_calls(), 1);
        assert_eq!(f.database.artwork_calls(), 1);
        let cached = f.store.snapshot(slot(1)).cached_artwork.unwrap();
        assert_eq!(cached.identity, mock_identity(5));
        assert_eq!(cached.image, Some(InlineImage::encode(b"B", "image/jpeg")));
    }

    #[tokio::test]
    async fn test_track_change_prefetches_new_track() {
        let mut f = fixture();
        f.tracker.notify(&status(1, 5));
        f.tracker.settle().await;
        f.tracker.notify(&status(1, 6));
        f.tracker.settle().await;

        assert_eq!(f.database.metadata_calls(), 2);
        assert_eq!(
            f.store.trusted_artwork(slot(1), &mock_identity(6)),
            Some(InlineImage::encode(b"D", "image/jpeg"))
        );
    }

    #[tokio::test]
    async fn test_empty_slot_does_not_prefetch() {
        let mut f = fixture();
        f.tracker.notify(&status(2, 0));
        f.tracker.settle().await;

        assert_eq!(f.database.metadata_calls(), 0);
        assert!(f.store.snapshot(slot(2)).last_identity.is_some());
    }

    #[tokio::test]
    async fn test_non_player_devices_are_ignored() {
        let mut f = fixture();
        f.tracker.notify(&status(33, 5));
        f.tracker.settle().await;

        assert_eq!(f.database.metadata_calls(), 0);
        for s in crate::model::DeviceSlot::ALL {
            assert!(f.store.snapshot(s).last_identity.is_none());
        }
    }

    #[test]
    fn test_registry_remembers_devices() {
        let mut registry = DeviceRegistry::new();
        registry.notify(&device(1, "CDJ-3000"));
        registry.notify(&device(1, "CDJ-3000"));
        registry.notify(&device(2, "DJM-900"));
        assert_eq!(registry.seen.len(), 2);
        assert!(registry.seen.contains(&DeviceId(1)));
        assert!(!registry.seen.contains(&DeviceId(3)));
    }
}
