//! Devices on the player network and what each player slot has loaded.

mod state;
mod tracker;

pub use state::{CachedArtwork, DeviceState, DeviceStateStore, TrackChange};
pub use tracker::{DeviceRegistry, DeviceTracker};
