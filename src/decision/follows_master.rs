//! Follows-master decision engine.
//!
//! The deck holding the tempo master role is the one the audience hears.
//! A track is reported once the master deck is audibly playing it; it is
//! reported again only after a different (slot, track) pair has been.

use super::{EngineMode, NowPlaying, NowPlayingEngine};
use crate::model::StatusBroadcast;

/// Engine reporting the master deck's track once it starts playing.
#[derive(Debug, Default)]
pub struct FollowsMasterEngine {
    mode: EngineMode,
    reported: Option<NowPlaying>,
}

impl FollowsMasterEngine {
    pub fn new(mode: EngineMode) -> Self {
        Self {
            mode,
            reported: None,
        }
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }
}

impl NowPlayingEngine for FollowsMasterEngine {
    fn ingest(&mut self, status: &StatusBroadcast) -> Option<NowPlaying> {
        let slot = status.slot()?;
        let identity = status.identity();

        if !status.is_master || identity.is_empty() || !status.play_state.is_audible() {
            return None;
        }

        let decision = NowPlaying { slot, identity };
        if self.reported == Some(decision) {
            return None;
        }
        self.reported = Some(decision);
        Some(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlayState;
    use crate::test_utils::{slot, status};

    fn master(device: u8, track_id: u32, play_state: PlayState) -> StatusBroadcast {
        StatusBroadcast {
            is_master: true,
            play_state,
            ..status(device, track_id)
        }
    }

    #[test]
    fn test_loaded_is_not_playing() {
        let mut engine = FollowsMasterEngine::new(EngineMode::FollowsMaster);
        assert!(engine.ingest(&master(1, 5, PlayState::Cued)).is_none());
        assert!(engine.ingest(&status(1, 5)).is_none());
    }

    #[test]
    fn test_master_playing_reports_once() {
        let mut engine = FollowsMasterEngine::new(EngineMode::FollowsMaster);
        let decision = engine.ingest(&master(1, 5, PlayState::Playing)).unwrap();
        assert_eq!(decision.slot, slot(1));
        assert_eq!(decision.identity.track_id, 5);

        assert!(engine.ingest(&master(1, 5, PlayState::Playing)).is_none());
        assert!(engine.ingest(&master(1, 5, PlayState::Looping)).is_none());
    }

    #[test]
    fn test_non_master_is_ignored() {
        let mut engine = FollowsMasterEngine::new(EngineMode::FollowsMaster);
        let playing = StatusBroadcast {
            play_state: PlayState::Playing,
            ..status(2, 6)
        };
        assert!(engine.ingest(&playing).is_none());
    }

    #[test]
    fn test_master_handoff_reports_new_deck() {
        let mut engine = FollowsMasterEngine::default();
        engine.ingest(&master(1, 5, PlayState::Playing));

        let decision = engine.ingest(&master(2, 6, PlayState::Playing)).unwrap();
        assert_eq!(decision.slot, slot(2));

        // Back to the first deck with the same track is a new decision
        assert!(engine.ingest(&master(1, 5, PlayState::Playing)).is_some());
    }

    #[test]
    fn test_mixer_broadcasts_are_ignored() {
        let mut engine = FollowsMasterEngine::default();
        assert!(engine.ingest(&master(33, 5, PlayState::Playing)).is_none());
        assert_eq!(engine.mode(), EngineMode::FollowsMaster);
    }
}
