//! Interfaces to the player network.
//!
//! The network join protocol, the status packet decoder and the on-device
//! database protocol all live behind these traits. The pipeline only needs
//! to bring a session up and down, receive its events in arrival order, and
//! query track metadata and artwork bytes.
//!
//! [`replay::ReplaySession`] is the implementation shipped with the binary.

pub mod replay;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::model::{ArtworkRef, Device, StatusBroadcast, TrackIdentity, TrackMetadata};

/// Events emitted by a network session, in arrival order.
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// A device announced itself on the network
    DeviceConnected(Device),
    /// A device sent a status packet
    Status(StatusBroadcast),
}

/// Address of a track in a device's database.
pub type TrackLocator = TrackIdentity;

/// Errors raised while managing a session.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("Failed to bring the network online: {0}")]
    Online(String),

    #[error("Peer auto-configuration failed: {0}")]
    Autoconfigure(String),

    #[error("Disconnect failed: {0}")]
    Disconnect(String),

    #[error("Event stream already taken")]
    EventsTaken,
}

/// Queries against the databases of devices on the network.
#[async_trait]
pub trait TrackDatabase: Send + Sync {
    /// Read the metadata for a track.
    async fn metadata(
        &self,
        locator: &TrackLocator,
    ) -> Result<TrackMetadata, crate::enrichment::LookupError>;

    /// Read raw artwork bytes, `None` if the device has no such image.
    async fn artwork_bytes(
        &self,
        locator: &TrackLocator,
        artwork: &ArtworkRef,
    ) -> Result<Option<Vec<u8>>, crate::enrichment::LookupError>;
}

/// A joined player network.
#[async_trait]
pub trait NetworkSession: TrackDatabase {
    /// Open the network interface.
    async fn bring_online(&self) -> Result<(), NetworkError>;

    /// Pick an interface and device number by watching peers.
    async fn autoconfigure_from_peers(&self) -> Result<(), NetworkError>;

    /// Start announcing ourselves and receiving statuses.
    fn connect(&self);

    fn is_connected(&self) -> bool;

    async fn disconnect(&self) -> Result<(), NetworkError>;

    /// Take the event stream. Only one consumer may exist.
    fn take_events(&self) -> Result<mpsc::UnboundedReceiver<NetworkEvent>, NetworkError>;
}
