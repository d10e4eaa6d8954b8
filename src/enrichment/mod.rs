//! Remote metadata services - MusicBrainz search and the Cover Art Archive.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`musicbrainz/dto.rs`, `coverart/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Traits** (`traits.rs`) - Seams the artwork resolver is written against
//!
//! This decoupling means API changes don't ripple through the pipeline, and
//! the resolver can be tested without a network.

pub mod domain;
pub mod musicbrainz;
pub mod coverart;
pub mod traits;

pub use coverart::CoverArtClient;
pub use domain::{CoverArt, CoverImage, LookupError, RecordingMatch};
pub use musicbrainz::MusicBrainzClient;
pub use traits::{CoverArchive, RecordingSearch};
