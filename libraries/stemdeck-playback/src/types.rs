//! Core types for playback control

use serde::{Deserialize, Serialize};
use stemdeck_core::StemKind;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    Idle,

    /// Track selected, media buffering
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

impl PlaybackState {
    /// Lowercase name for UI bindings
    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
        }
    }
}

/// Which media unit of the active track a signal belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitSlot {
    /// The only unit of a single-stream track
    Main,

    /// One unit of a stem group
    Stem(StemKind),
}

/// Subscription tag handed to a media element on load
///
/// Elements echo the tag back with every signal. The controller bumps its
/// generation whenever it tears media down, so signals from a discarded
/// track carry an old generation and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitTag {
    pub generation: u64,
    pub slot: UnitSlot,
}

impl UnitTag {
    /// Tag for the main unit of a single-stream track
    pub fn main(generation: u64) -> Self {
        Self {
            generation,
            slot: UnitSlot::Main,
        }
    }

    /// Tag for one stem unit
    pub fn stem(generation: u64, kind: StemKind) -> Self {
        Self {
            generation,
            slot: UnitSlot::Stem(kind),
        }
    }
}
