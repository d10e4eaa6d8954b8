//! Core data models for the player network.
//!
//! Defines the entities that flow through the pipeline: [`StatusBroadcast`]
//! as announced by a player, the [`TrackIdentity`] used to detect real track
//! changes, the [`TrackMetadata`] read from a player's database, and the
//! [`InlineImage`] payload sent to the UI.

use std::fmt;

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

/// Track id announced by a player with nothing loaded.
pub const EMPTY_TRACK_ID: u32 = 0;

/// Number of player positions on the network.
pub const SLOT_COUNT: usize = 4;

/// Raw device number on the network (players, mixers, rekordbox hosts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u8);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A physical player position (1..=4).
///
/// Only devices numbered 1 through 4 are players whose loaded track we
/// track. Anything else (mixer, laptop) has no slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceSlot(u8);

impl DeviceSlot {
    /// All player slots in ascending order.
    pub const ALL: [DeviceSlot; SLOT_COUNT] =
        [DeviceSlot(1), DeviceSlot(2), DeviceSlot(3), DeviceSlot(4)];

    /// Build a slot, returning `None` outside 1..=4.
    pub fn new(number: u8) -> Option<Self> {
        (1..=SLOT_COUNT as u8).contains(&number).then_some(Self(number))
    }

    /// Slot for a device, if that device is a player.
    pub fn from_device(device: DeviceId) -> Option<Self> {
        Self::new(device.0)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based table index.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for DeviceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storage slot on the device the track was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaSlot {
    #[default]
    Empty,
    Cd,
    Sd,
    Usb,
    Rekordbox,
}

/// Kind of track as reported by the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    #[default]
    None,
    Rekordbox,
    Unanalyzed,
    Cdda,
}

/// Playback state reported in a status broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayState {
    #[default]
    Empty,
    Loading,
    Playing,
    Looping,
    Paused,
    Cued,
    Cuing,
    PlatterHeld,
    Searching,
    SpunDown,
    Ended,
}

impl PlayState {
    /// Whether audio is coming out of the player in this state.
    pub fn is_audible(self) -> bool {
        matches!(self, PlayState::Playing | PlayState::Looping)
    }
}

/// Identifies which physical track is loaded on a player.
///
/// Two broadcasts describe the same loaded track iff their identities are
/// equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackIdentity {
    /// Device whose media holds the track (may differ from the player)
    pub device: DeviceId,
    /// Storage slot on that device
    pub slot: MediaSlot,
    /// Track kind
    pub track_type: TrackType,
    /// Database id of the track; [`EMPTY_TRACK_ID`] when nothing is loaded
    pub track_id: u32,
}

impl TrackIdentity {
    pub fn is_empty(&self) -> bool {
        self.track_id == EMPTY_TRACK_ID
    }
}

/// One status packet from a device, as decoded by the network layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusBroadcast {
    /// Position of this broadcast in network-arrival order.
    ///
    /// Assigned by the dispatcher on receipt; zero until then.
    #[serde(default)]
    pub sequence: u64,
    /// Device that sent the broadcast
    pub device_id: DeviceId,
    /// Device the loaded track lives on
    pub track_device_id: DeviceId,
    #[serde(default)]
    pub track_slot: MediaSlot,
    #[serde(default)]
    pub track_type: TrackType,
    #[serde(default)]
    pub track_id: u32,
    #[serde(default)]
    pub play_state: PlayState,
    #[serde(default)]
    pub is_master: bool,
    #[serde(default)]
    pub is_on_air: bool,
}

impl StatusBroadcast {
    pub fn identity(&self) -> TrackIdentity {
        TrackIdentity {
            device: self.track_device_id,
            slot: self.track_slot,
            track_type: self.track_type,
            track_id: self.track_id,
        }
    }

    /// Player slot of the sender, if the sender is a player.
    pub fn slot(&self) -> Option<DeviceSlot> {
        DeviceSlot::from_device(self.device_id)
    }
}

/// A device seen on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
}

/// Artist credit on a track.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArtistRef {
    pub id: u32,
    pub name: String,
}

/// Record label on a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRef {
    pub name: String,
}

/// Pointer to a track's artwork in the player's database.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArtworkRef {
    pub id: u32,
    pub path: String,
}

/// Track metadata read from a player's database.
///
/// Always fetched fresh, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub id: u32,
    pub title: String,
    pub artist: ArtistRef,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    /// Tempo in BPM
    #[serde(default)]
    pub tempo: Option<f32>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<u32>,
    /// Absent when the database has no label for the track
    #[serde(default)]
    pub label: Option<LabelRef>,
    #[serde(default)]
    pub artwork: ArtworkRef,
}

/// Label name used when the database has none.
pub const UNKNOWN_LABEL: &str = "unknown label";

impl TrackMetadata {
    /// Normalise the label for display.
    ///
    /// rekordbox writes `[no label]` for tracks without one; missing labels
    /// become [`UNKNOWN_LABEL`].
    pub fn normalize_label(&mut self) {
        match self.label.as_mut() {
            Some(label) if !label.name.is_empty() => {
                label.name = label.name.replace("[no label]", "no label");
            }
            _ => {
                self.label = Some(LabelRef {
                    name: UNKNOWN_LABEL.to_string(),
                });
            }
        }
    }

    pub fn label_name(&self) -> &str {
        self.label.as_ref().map_or(UNKNOWN_LABEL, |l| l.name.as_str())
    }

    /// "Artist - Title" for log lines.
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.artist.name, self.title)
    }
}

/// A self-describing image payload (`data:<mime>;base64,<bytes>`),
/// embeddable directly in a UI document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineImage(String);

impl InlineImage {
    /// Encode raw image bytes with an explicit MIME type.
    pub fn encode(data: &[u8], mime_type: &str) -> Self {
        let encoded = general_purpose::STANDARD.encode(data);
        Self(format!("data:{mime_type};base64,{encoded}"))
    }

    /// Encode raw image bytes, detecting PNG by its magic number and
    /// assuming JPEG otherwise.
    pub fn sniff(data: &[u8]) -> Self {
        Self::encode(data, sniff_mime_type(data))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> &str {
        self.0
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .unwrap_or_default()
    }
}

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn sniff_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(PNG_MAGIC) {
        "image/png"
    } else {
        "image/jpeg"
    }
}
