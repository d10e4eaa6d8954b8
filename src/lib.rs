//! Now Playing - live track metadata for a network of media players.
//!
//! Listens to status broadcasts from the players on a network, works out
//! which track is actually playing, resolves its metadata and artwork, and
//! pushes the result to a presentation layer.

pub mod cli;
pub mod config;
pub mod cover;
pub mod decision;
pub mod devices;
pub mod enrichment;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod model;
pub mod network;
pub mod pipeline;
pub mod publisher;
#[cfg(test)]
pub mod test_utils;
