//! Replay of a captured network session.
//!
//! A capture is a JSON document holding the devices seen on a network, the
//! database records of the tracks they loaded, and the status broadcasts
//! they sent. [`ReplaySession`] plays the broadcasts back at a fixed
//! interval once connected and answers database queries from the records.
//!
//! ```json
//! {
//!   "interval_ms": 200,
//!   "devices": [{ "id": 1, "name": "CDJ-3000" }],
//!   "tracks": [{
//!     "locator": { "device": 1, "slot": "usb", "track_type": "rekordbox", "track_id": 5 },
//!     "metadata": { "id": 5, "title": "Y", "artist": { "id": 1, "name": "X" } },
//!     "artwork_file": "art/5.jpg"
//!   }],
//!   "statuses": [{ "device_id": 1, "track_device_id": 1, "track_slot": "usb",
//!                  "track_type": "rekordbox", "track_id": 5, "play_state": "playing",
//!                  "is_master": true }]
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{NetworkError, NetworkEvent, NetworkSession, TrackDatabase, TrackLocator};
use crate::enrichment::LookupError;
use crate::error::{Result, ResultExt};
use crate::model::{ArtworkRef, Device, StatusBroadcast, TrackMetadata};

fn default_interval_ms() -> u64 {
    200
}

/// A recorded network session.
#[derive(Debug, Clone, Deserialize)]
pub struct Capture {
    /// Delay between replayed events
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub tracks: Vec<CapturedTrack>,
    #[serde(default)]
    pub statuses: Vec<StatusBroadcast>,
}

/// Database record for one track.
#[derive(Debug, Clone, Deserialize)]
pub struct CapturedTrack {
    pub locator: TrackLocator,
    pub metadata: TrackMetadata,
    /// Artwork image, relative to the capture file
    #[serde(default)]
    pub artwork_file: Option<PathBuf>,
}

impl Capture {
    /// Parse a capture from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a capture file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(format!("reading capture {}", path.display()))?;
        Self::from_json(&text)
    }
}

/// Network session backed by a [`Capture`].
pub struct ReplaySession {
    capture: Capture,
    artwork: HashMap<TrackLocator, Vec<u8>>,
    online: AtomicBool,
    connected: AtomicBool,
    sender: mpsc::UnboundedSender<NetworkEvent>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<NetworkEvent>>>,
    feed: Mutex<Option<JoinHandle<()>>>,
}

impl ReplaySession {
    /// Build a session from a capture, reading artwork files relative to
    /// `base_dir`. Unreadable artwork is logged and treated as absent.
    pub fn new(capture: Capture, base_dir: &Path) -> Self {
        let mut artwork = HashMap::new();
        for track in &capture.tracks {
            let Some(ref file) = track.artwork_file else {
                continue;
            };
            let path = base_dir.join(file);
            match std::fs::read(&path) {
                Ok(bytes) => {
                    artwork.insert(track.locator, bytes);
                }
                Err(e) => {
                    tracing::warn!(target: "network::replay", path = %path.display(), "Skipping artwork: {}", e);
                }
            }
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            capture,
            artwork,
            online: AtomicBool::new(false),
            connected: AtomicBool::new(false),
            sender,
            receiver: Mutex::new(Some(receiver)),
            feed: Mutex::new(None),
        }
    }

    /// Load a capture file and build a session from it.
    pub fn open(path: &Path) -> Result<Self> {
        let capture = Capture::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(capture, base_dir))
    }

    fn record(&self, locator: &TrackLocator) -> Option<&CapturedTrack> {
        self.capture.tracks.iter().find(|t| &t.locator == locator)
    }
}

#[async_trait]
impl TrackDatabase for ReplaySession {
    async fn metadata(&self, locator: &TrackLocator) -> std::result::Result<TrackMetadata, LookupError> {
        self.record(locator)
            .map(|t| t.metadata.clone())
            .ok_or_else(|| LookupError::Database(format!("no record for track {}", locator.track_id)))
    }

    async fn artwork_bytes(
        &self,
        locator: &TrackLocator,
        _artwork: &ArtworkRef,
    ) -> std::result::Result<Option<Vec<u8>>, LookupError> {
        Ok(self.artwork.get(locator).cloned())
    }
}

#[async_trait]
impl NetworkSession for ReplaySession {
    async fn bring_online(&self) -> std::result::Result<(), NetworkError> {
        self.online.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn autoconfigure_from_peers(&self) -> std::result::Result<(), NetworkError> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(NetworkError::Autoconfigure("network is offline".to_string()));
        }
        Ok(())
    }

    fn connect(&self) {
        if !self.online.load(Ordering::SeqCst) || self.connected.swap(true, Ordering::SeqCst) {
            return;
        }

        let sender = self.sender.clone();
        let devices = self.capture.devices.clone();
        let statuses = self.capture.statuses.clone();
        let interval = Duration::from_millis(self.capture.interval_ms);

        let handle = tokio::spawn(async move {
            let events = devices
                .into_iter()
                .map(NetworkEvent::DeviceConnected)
                .chain(statuses.into_iter().map(NetworkEvent::Status));
            for event in events {
                if sender.send(event).is_err() {
                    return;
                }
                tokio::time::sleep(interval).await;
            }
            tracing::info!(target: "network::replay", "Capture fully replayed");
        });
        *self.feed.lock() = Some(handle);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) -> std::result::Result<(), NetworkError> {
        if let Some(handle) = self.feed.lock().take() {
            handle.abort();
        }
        self.connected.store(false, Ordering::SeqCst);
        self.online.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn take_events(&self) -> std::result::Result<mpsc::UnboundedReceiver<NetworkEvent>, NetworkError> {
        self.receiver.lock().take().ok_or(NetworkError::EventsTaken)
    }
}
