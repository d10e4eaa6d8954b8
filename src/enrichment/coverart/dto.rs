//! Cover Art Archive listing shapes.
//!
//! Only the fields the client reads are modelled; everything else in the
//! listing (thumbnails, approval, image types) is ignored on parse.
//!
//! API Reference: https://wiki.musicbrainz.org/Cover_Art_Archive/API

use serde::Deserialize;

/// Images listed for one release, in archive order.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverArtResponse {
    #[serde(default)]
    pub images: Vec<Image>,
}

/// One listed image.
#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    /// Full-size image URL
    pub image: String,
}
