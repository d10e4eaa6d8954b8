//! Now-playing decisions.
//!
//! Which loaded track is actually audible is decided by a state machine
//! that must see every status broadcast, in the order they arrived. The
//! [`NowPlayingAdapter`] wraps such an engine: it forwards broadcasts
//! unfiltered, refuses any that arrive out of order, and hands each decision
//! to a single callback. It makes no judgment of its own.

mod follows_master;

pub use follows_master::FollowsMasterEngine;

use crate::events::Subscriber;
use crate::model::{DeviceSlot, StatusBroadcast, TrackIdentity};

/// Authoritative signal that a slot's track is audible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NowPlaying {
    pub slot: DeviceSlot,
    /// Track loaded on the slot when the decision was made
    pub identity: TrackIdentity,
}

/// How an engine decides what is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// The track on the tempo master deck is the one playing
    #[default]
    FollowsMaster,
}

/// A now-playing state machine.
pub trait NowPlayingEngine: Send {
    /// Feed one broadcast; returns a decision when one is reached.
    fn ingest(&mut self, status: &StatusBroadcast) -> Option<NowPlaying>;
}

/// Broadcast delivered out of arrival order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("broadcast #{received} delivered after #{last}")]
    OutOfOrder { last: u64, received: u64 },
}

/// Forwards every broadcast to an engine, in order.
pub struct NowPlayingAdapter<E> {
    engine: E,
    last_sequence: Option<u64>,
    on_now_playing: Box<dyn FnMut(NowPlaying) + Send>,
}

impl<E: NowPlayingEngine> NowPlayingAdapter<E> {
    pub fn new(engine: E, on_now_playing: impl FnMut(NowPlaying) + Send + 'static) -> Self {
        Self {
            engine,
            last_sequence: None,
            on_now_playing: Box::new(on_now_playing),
        }
    }

    /// Forward one broadcast.
    ///
    /// Rejects a broadcast whose sequence number is not strictly greater
    /// than the last one forwarded; the engine never sees it.
    pub fn ingest(&mut self, status: &StatusBroadcast) -> Result<(), OrderingError> {
        if let Some(last) = self.last_sequence
            && status.sequence <= last
        {
            return Err(OrderingError::OutOfOrder {
                last,
                received: status.sequence,
            });
        }
        self.last_sequence = Some(status.sequence);

        if let Some(decision) = self.engine.ingest(status) {
            tracing::info!(
                target: "decision",
                slot = %decision.slot,
                track_id = decision.identity.track_id,
                "Now playing"
            );
            (self.on_now_playing)(decision);
        }
        Ok(())
    }
}

impl<E: NowPlayingEngine> Subscriber<StatusBroadcast> for NowPlayingAdapter<E> {
    fn notify(&mut self, status: &StatusBroadcast) {
        if let Err(e) = self.ingest(status) {
            tracing::error!(target: "decision", "Dropped broadcast: {}", e);
        }
    }
}
