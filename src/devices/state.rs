//! Per-slot device state.
//!
//! One [`DeviceState`] per player slot, living for the whole process. The
//! table is owned by the lifecycle and shared by `Arc` with the tracker and
//! the pipeline. Every operation is a short synchronous section; the lock
//! is never held across an `.await`.

use parking_lot::Mutex;

use crate::model::{DeviceSlot, InlineImage, SLOT_COUNT, TrackIdentity};

/// Artwork resolved for one specific track.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedArtwork {
    /// Track the artwork was resolved for
    pub identity: TrackIdentity,
    /// Resolved image; `None` when neither source had one
    pub image: Option<InlineImage>,
}

/// What a player slot last announced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceState {
    /// Identity of the last announced track
    pub last_identity: Option<TrackIdentity>,
    /// Last resolved artwork. Not cleared on track change; see
    /// [`DeviceStateStore::trusted_artwork`].
    pub cached_artwork: Option<CachedArtwork>,
}

/// Outcome of comparing a broadcast against the slot's last identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackChange {
    /// Same track as before
    Unchanged,
    /// The slot was emptied
    Emptied,
    /// A different track is now loaded
    Loaded,
}

/// State table keyed by player slot.
#[derive(Debug, Default)]
pub struct DeviceStateStore {
    slots: Mutex<[DeviceState; SLOT_COUNT]>,
}

impl DeviceStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the slot's current state.
    pub fn snapshot(&self, slot: DeviceSlot) -> DeviceState {
        self.slots.lock()[slot.index()].clone()
    }

    /// Record the identity from a broadcast and report what changed.
    pub fn observe(&self, slot: DeviceSlot, identity: TrackIdentity) -> TrackChange {
        let mut slots = self.slots.lock();
        let state = &mut slots[slot.index()];
        if state.last_identity == Some(identity) {
            return TrackChange::Unchanged;
        }
        state.last_identity = Some(identity);
        if identity.is_empty() {
            TrackChange::Emptied
        } else {
            TrackChange::Loaded
        }
    }

    /// Cache artwork resolved for `identity`.
    ///
    /// Dropped, returning `false`, when the slot has since moved on to
    /// another track: a late resolution must not replace artwork already
    /// cached for the loaded one.
    pub fn store_artwork(&self, slot: DeviceSlot, identity: TrackIdentity, image: Option<InlineImage>) -> bool {
        let mut slots = self.slots.lock();
        let state = &mut slots[slot.index()];
        if state.last_identity != Some(identity) {
            return false;
        }
        state.cached_artwork = Some(CachedArtwork { identity, image });
        true
    }

    /// Cached artwork for `identity`, if it can be trusted.
    ///
    /// Trusted only when the slot still has `identity` loaded, the cache was
    /// filled for that same identity, and it holds an image.
    pub fn trusted_artwork(&self, slot: DeviceSlot, identity: &TrackIdentity) -> Option<InlineImage> {
        let slots = self.slots.lock();
        let state = &slots[slot.index()];
        if state.last_identity.as_ref() != Some(identity) {
            return None;
        }
        state
            .cached_artwork
            .as_ref()
            .filter(|cached| &cached.identity == identity)
            .and_then(|cached| cached.image.clone())
    }
}
