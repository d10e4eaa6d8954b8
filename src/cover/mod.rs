//! Artwork resolution from two independent sources.
//!
//! 1. **Remote** - MusicBrainz release search, then the Cover Art Archive
//! 2. **Local** - the artwork stored in the player's own database
//!
//! # Design Principles
//!
//! - **Graceful degradation**: every failure is logged and becomes `None`
//! - **No retries**: one attempt per source per track change
//! - **Fixed priority**: remote artwork wins whenever it exists

mod local;
mod remote;

pub use local::{LocalArtworkFetcher, high_res_path};
pub use remote::RemoteArtworkResolver;

use crate::model::{DeviceSlot, InlineImage, TrackIdentity, TrackMetadata};

/// Which source supplied the chosen artwork (for logging only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtworkSource {
    Remote,
    Local,
    None,
}

/// Track being resolved, carried through every log line.
#[derive(Debug, Clone, Copy)]
pub struct TrackContext<'a> {
    pub slot: DeviceSlot,
    pub identity: &'a TrackIdentity,
    pub metadata: &'a TrackMetadata,
}

impl<'a> TrackContext<'a> {
    pub fn new(slot: DeviceSlot, identity: &'a TrackIdentity, metadata: &'a TrackMetadata) -> Self {
        Self {
            slot,
            identity,
            metadata,
        }
    }

    pub fn artist(&self) -> &str {
        &self.metadata.artist.name
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }
}

/// Pick the artwork to show: remote if present, otherwise local (which may
/// itself be absent).
pub fn choose(
    remote: Option<InlineImage>,
    local: Option<InlineImage>,
) -> (Option<InlineImage>, ArtworkSource) {
    match (remote, local) {
        (Some(image), _) => (Some(image), ArtworkSource::Remote),
        (None, Some(image)) => (Some(image), ArtworkSource::Local),
        (None, None) => (None, ArtworkSource::None),
    }
}
