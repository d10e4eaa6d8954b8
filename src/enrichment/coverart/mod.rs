//! Cover Art Archive integration
//!
//! Lists and downloads artwork from coverartarchive.org using MusicBrainz
//! release IDs. No API key required.

pub mod dto;
mod client;

pub use client::{CoverArtClient, DEFAULT_BASE_URL};
