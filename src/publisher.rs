//! Pushes resolved tracks to the presentation layer.
//!
//! The pipeline publishes through a [`MetadataSink`] without knowing whether
//! a UI is attached. Messages are JSON `{ "track": ..., "artwork": ... }`,
//! sent fire-and-forget: with no open connection they are dropped, never
//! queued.

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::model::{InlineImage, TrackMetadata};

/// Message sent to the UI.
#[derive(Debug, Serialize)]
pub struct UiMessage<'a> {
    pub track: &'a TrackMetadata,
    pub artwork: Option<&'a InlineImage>,
}

/// Destination for resolved tracks.
pub trait MetadataSink: Send + Sync {
    fn publish(&self, track: &TrackMetadata, artwork: Option<&InlineImage>);
}

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetadataSink for NoopSink {
    fn publish(&self, _track: &TrackMetadata, _artwork: Option<&InlineImage>) {}
}

/// Sink writing serialized messages to a single optional connection.
#[derive(Debug, Default)]
pub struct ChannelSink {
    connection: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl ChannelSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a connection, replacing any previous one.
    pub fn attach(&self, connection: mpsc::UnboundedSender<String>) {
        *self.connection.lock() = Some(connection);
    }

    pub fn detach(&self) {
        *self.connection.lock() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.connection
            .lock()
            .as_ref()
            .is_some_and(|connection| !connection.is_closed())
    }
}

impl MetadataSink for ChannelSink {
    fn publish(&self, track: &TrackMetadata, artwork: Option<&InlineImage>) {
        let mut connection = self.connection.lock();
        let Some(sender) = connection.as_ref() else {
            return;
        };
        if sender.is_closed() {
            *connection = None;
            return;
        }

        let message = match serde_json::to_string(&UiMessage { track, artwork }) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(target: "publisher", "Failed to serialize UI message: {}", e);
                return;
            }
        };

        if sender.send(message).is_err() {
            *connection = None;
        }
    }
}
