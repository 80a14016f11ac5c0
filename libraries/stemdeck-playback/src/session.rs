//! Playback session state
//!
//! The session is the single record of what is loaded and whether it plays.
//! Only the controller mutates it; everything else gets a shared reference.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};
use stemdeck_core::{StemKind, NUM_STEMS};

/// Per-stem mute and disabled flags of the active stem track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemMix {
    muted: [bool; NUM_STEMS],
    disabled: [bool; NUM_STEMS],
}

impl StemMix {
    /// Check if a stem is muted
    pub fn is_muted(&self, kind: StemKind) -> bool {
        self.muted[kind.index()]
    }

    /// Check if a stem failed to load
    pub fn is_disabled(&self, kind: StemKind) -> bool {
        self.disabled[kind.index()]
    }

    pub(crate) fn set_muted(&mut self, kind: StemKind, muted: bool) {
        self.muted[kind.index()] = muted;
    }

    pub(crate) fn set_disabled(&mut self, kind: StemKind, disabled: bool) {
        self.disabled[kind.index()] = disabled;
    }

    /// Stems currently heard
    pub fn audible(&self) -> Vec<StemKind> {
        StemKind::ALL
            .into_iter()
            .filter(|kind| !self.is_muted(*kind) && !self.is_disabled(*kind))
            .collect()
    }
}

/// Process-wide playback state, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackSession {
    current_index: Option<usize>,
    state: PlaybackState,
    active_stems: Option<StemMix>,
}

impl PlaybackSession {
    /// Idle session with nothing loaded
    pub fn new() -> Self {
        Self {
            current_index: None,
            state: PlaybackState::Idle,
            active_stems: None,
        }
    }

    /// Playlist index of the loaded track
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Transport state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Check if audio is playing
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Mix of the loaded stem track, `None` for single tracks
    pub fn active_stems(&self) -> Option<&StemMix> {
        self.active_stems.as_ref()
    }

    pub(crate) fn set_current_index(&mut self, index: Option<usize>) {
        self.current_index = index;
    }

    pub(crate) fn set_state(&mut self, state: PlaybackState) {
        self.state = state;
    }

    pub(crate) fn set_active_stems(&mut self, mix: Option<StemMix>) {
        self.active_stems = mix;
    }

    pub(crate) fn active_stems_mut(&mut self) -> Option<&mut StemMix> {
        self.active_stems.as_mut()
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = PlaybackSession::new();
        assert_eq!(session.state(), PlaybackState::Idle);
        assert_eq!(session.current_index(), None);
        assert!(!session.is_playing());
        assert!(session.active_stems().is_none());
    }

    #[test]
    fn audible_excludes_muted_and_disabled() {
        let mut mix = StemMix::default();
        mix.set_muted(StemKind::Bass, true);
        mix.set_disabled(StemKind::Other, true);

        assert_eq!(mix.audible(), vec![StemKind::Vocals, StemKind::Drums]);
    }
}
