//! MusicBrainz API integration
//!
//! Finds a release for a track announced by a player by searching
//! recordings on artist and title.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use client::{DEFAULT_BASE_URL, MusicBrainzClient};
