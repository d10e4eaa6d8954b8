//! Test utilities and fixtures for now-playing tests.
//!
//! This module provides fixture builders for broadcasts and metadata, plus
//! mock implementations of the network traits and the UI sink.
//!
//! # Example
//!
//! ```ignore
//! use now_playing::test_utils::{MockDatabase, mock_identity, mock_metadata, slot};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let database = MockDatabase::new().with_metadata(mock_metadata("X", "Y"));
//!     let track = database.metadata(&mock_identity(5)).await.unwrap();
//!     // ... test logic
//! }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::enrichment::LookupError;
use crate::model::{
    ArtistRef, ArtworkRef, Device, DeviceId, DeviceSlot, InlineImage, MediaSlot, PlayState,
    StatusBroadcast, TrackIdentity, TrackMetadata, TrackType,
};
use crate::network::{NetworkError, NetworkEvent, NetworkSession, TrackDatabase, TrackLocator};
use crate::publisher::MetadataSink;

/// Player slot by number. Panics outside 1..=4.
pub fn slot(number: u8) -> DeviceSlot {
    DeviceSlot::new(number).expect("slot number out of range")
}

/// Identity of a rekordbox track on device 1's USB stick.
///
/// Equal to `status(1, track_id).identity()`.
pub fn mock_identity(track_id: u32) -> TrackIdentity {
    TrackIdentity {
        device: DeviceId(1),
        slot: MediaSlot::Usb,
        track_type: TrackType::Rekordbox,
        track_id,
    }
}

/// A non-master broadcast from `device` announcing a track from its own
/// USB stick, not yet playing.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let playing = StatusBroadcast {
///     is_master: true,
///     play_state: PlayState::Playing,
///     ..status(1, 5)
/// };
/// ```
pub fn status(device: u8, track_id: u32) -> StatusBroadcast {
    StatusBroadcast {
        sequence: 0,
        device_id: DeviceId(device),
        track_device_id: DeviceId(device),
        track_slot: MediaSlot::Usb,
        track_type: TrackType::Rekordbox,
        track_id,
        play_state: PlayState::Empty,
        is_master: false,
        is_on_air: false,
    }
}

/// A master broadcast with the deck audibly playing.
pub fn playing(device: u8, track_id: u32) -> StatusBroadcast {
    StatusBroadcast {
        is_master: true,
        play_state: PlayState::Playing,
        ..status(device, track_id)
    }
}

pub fn device(id: u8, name: &str) -> Device {
    Device {
        id: DeviceId(id),
        name: name.to_string(),
    }
}

/// Metadata for track 5, artwork at `/art/5.jpg`, no label.
pub fn mock_metadata(artist: &str, title: &str) -> TrackMetadata {
    TrackMetadata {
        id: 5,
        title: title.to_string(),
        artist: ArtistRef {
            id: 1,
            name: artist.to_string(),
        },
        album: None,
        genre: None,
        tempo: Some(128.0),
        duration: Some(300),
        label: None,
        artwork: ArtworkRef {
            id: 5,
            path: "/art/5.jpg".to_string(),
        },
    }
}

/// Mock player database.
///
/// Metadata is served from one template whose ids and artwork path are
/// rewritten to the requested track id, so track N has artwork N at
/// `/art/N.jpg`. Artwork bytes are keyed by artwork id.
#[derive(Default)]
pub struct MockDatabase {
    metadata: Option<TrackMetadata>,
    metadata_error: Option<LookupError>,
    metadata_delays: HashMap<u32, Duration>,
    artwork: HashMap<u32, Vec<u8>>,
    artwork_error: Option<LookupError>,
    metadata_calls: AtomicUsize,
    artwork_paths: Mutex<Vec<String>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, template: TrackMetadata) -> Self {
        self.metadata = Some(template);
        self
    }

    pub fn with_metadata_error(mut self, error: LookupError) -> Self {
        self.metadata_error = Some(error);
        self
    }

    /// Answer metadata for `track_id` only after `delay`.
    pub fn with_metadata_delay(mut self, track_id: u32, delay: Duration) -> Self {
        self.metadata_delays.insert(track_id, delay);
        self
    }

    pub fn with_artwork(mut self, artwork_id: u32, data: &[u8]) -> Self {
        self.artwork.insert(artwork_id, data.to_vec());
        self
    }

    pub fn with_artwork_error(mut self, error: LookupError) -> Self {
        self.artwork_error = Some(error);
        self
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn artwork_calls(&self) -> usize {
        self.artwork_paths.lock().len()
    }

    /// Artwork paths requested, in call order.
    pub fn artwork_paths(&self) -> Vec<String> {
        self.artwork_paths.lock().clone()
    }
}

#[async_trait]
impl TrackDatabase for MockDatabase {
    async fn metadata(&self, locator: &TrackLocator) -> Result<TrackMetadata, LookupError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.metadata_delays.get(&locator.track_id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(ref err) = self.metadata_error {
            return Err(err.clone());
        }
        let template = self
            .metadata
            .clone()
            .ok_or_else(|| LookupError::Database(format!("no record for track {}", locator.track_id)))?;
        let id = locator.track_id;
        Ok(TrackMetadata {
            id,
            artwork: ArtworkRef {
                id,
                path: format!("/art/{}.jpg", id),
            },
            ..template
        })
    }

    async fn artwork_bytes(
        &self,
        _locator: &TrackLocator,
        artwork: &ArtworkRef,
    ) -> Result<Option<Vec<u8>>, LookupError> {
        self.artwork_paths.lock().push(artwork.path.clone());
        if let Some(ref err) = self.artwork_error {
            return Err(err.clone());
        }
        Ok(self.artwork.get(&artwork.id).cloned())
    }
}

/// Mock network session.
///
/// Records each lifecycle step, can be told to fail any of them, and can
/// take a configurable time to disconnect. Events pushed through
/// [`MockSession::sender`] reach whoever took the stream; the stream ends
/// once the session disconnects and every test sender is dropped.
pub struct MockSession {
    database: MockDatabase,
    online_error: Option<NetworkError>,
    autoconfigure_error: Option<NetworkError>,
    /// `connect` silently does nothing
    refuse_connect: bool,
    disconnect_delay: Duration,
    disconnect_error: Option<NetworkError>,
    connected: AtomicBool,
    steps: Mutex<Vec<&'static str>>,
    disconnect_finished: AtomicBool,
    sender: Mutex<Option<mpsc::UnboundedSender<NetworkEvent>>>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<NetworkEvent>>>,
}

impl Default for MockSession {
    fn default() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            database: MockDatabase::default(),
            online_error: None,
            autoconfigure_error: None,
            refuse_connect: false,
            disconnect_delay: Duration::ZERO,
            disconnect_error: None,
            connected: AtomicBool::new(false),
            steps: Mutex::new(Vec::new()),
            disconnect_finished: AtomicBool::new(false),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
        }
    }
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, database: MockDatabase) -> Self {
        self.database = database;
        self
    }

    pub fn with_online_error(mut self, error: NetworkError) -> Self {
        self.online_error = Some(error);
        self
    }

    pub fn with_autoconfigure_error(mut self, error: NetworkError) -> Self {
        self.autoconfigure_error = Some(error);
        self
    }

    /// Session whose `connect` never takes effect.
    pub fn refusing_connect(mut self) -> Self {
        self.refuse_connect = true;
        self
    }

    pub fn with_disconnect_delay(mut self, delay: Duration) -> Self {
        self.disconnect_delay = delay;
        self
    }

    pub fn with_disconnect_error(mut self, error: NetworkError) -> Self {
        self.disconnect_error = Some(error);
        self
    }

    pub fn database(&self) -> &MockDatabase {
        &self.database
    }

    /// Sender feeding the session's event stream.
    pub fn sender(&self) -> mpsc::UnboundedSender<NetworkEvent> {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.clone(),
            None => mpsc::unbounded_channel().0,
        }
    }

    /// Lifecycle steps invoked so far, in order.
    pub fn steps(&self) -> Vec<&'static str> {
        self.steps.lock().clone()
    }

    /// Whether a disconnect ran to completion.
    pub fn disconnect_finished(&self) -> bool {
        self.disconnect_finished.load(Ordering::SeqCst)
    }

    fn step(&self, name: &'static str) {
        self.steps.lock().push(name);
    }
}

#[async_trait]
impl TrackDatabase for MockSession {
    async fn metadata(&self, locator: &TrackLocator) -> Result<TrackMetadata, LookupError> {
        self.database.metadata(locator).await
    }

    async fn artwork_bytes(
        &self,
        locator: &TrackLocator,
        artwork: &ArtworkRef,
    ) -> Result<Option<Vec<u8>>, LookupError> {
        self.database.artwork_bytes(locator, artwork).await
    }
}

#[async_trait]
impl NetworkSession for MockSession {
    async fn bring_online(&self) -> Result<(), NetworkError> {
        self.step("bring_online");
        self.online_error.clone().map_or(Ok(()), Err)
    }

    async fn autoconfigure_from_peers(&self) -> Result<(), NetworkError> {
        self.step("autoconfigure_from_peers");
        self.autoconfigure_error.clone().map_or(Ok(()), Err)
    }

    fn connect(&self) {
        self.step("connect");
        if !self.refuse_connect {
            self.connected.store(true, Ordering::SeqCst);
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) -> Result<(), NetworkError> {
        self.step("disconnect");
        tokio::time::sleep(self.disconnect_delay).await;
        self.sender.lock().take();
        self.connected.store(false, Ordering::SeqCst);
        self.disconnect_finished.store(true, Ordering::SeqCst);
        self.disconnect_error.clone().map_or(Ok(()), Err)
    }

    fn take_events(&self) -> Result<mpsc::UnboundedReceiver<NetworkEvent>, NetworkError> {
        self.receiver.lock().take().ok_or(NetworkError::EventsTaken)
    }
}

/// Sink recording everything published to it.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<(TrackMetadata, Option<InlineImage>)>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(TrackMetadata, Option<InlineImage>)> {
        self.messages.lock().clone()
    }
}

impl MetadataSink for RecordingSink {
    fn publish(&self, track: &TrackMetadata, artwork: Option<&InlineImage>) {
        self.messages.lock().push((track.clone(), artwork.cloned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_identity_matches_status() {
        assert_eq!(mock_identity(5), status(1, 5).identity());
        assert_eq!(status(1, 5).slot(), Some(slot(1)));
    }

    #[tokio::test]
    async fn test_mock_database_rewrites_ids() {
        let database = MockDatabase::new().with_metadata(mock_metadata("X", "Y"));
        let track = database.metadata(&mock_identity(6)).await.unwrap();
        assert_eq!(track.id, 6);
        assert_eq!(track.artwork.path, "/art/6.jpg");
        assert_eq!(track.title, "Y");
        assert_eq!(database.metadata_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_session_records_steps() {
        let session = MockSession::new();
        session.bring_online().await.unwrap();
        session.connect();
        assert!(session.is_connected());
        session.disconnect().await.unwrap();
        assert_eq!(session.steps(), vec!["bring_online", "connect", "disconnect"]);
        assert!(session.disconnect_finished());
    }
}
