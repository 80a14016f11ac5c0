//! Playback Events
//!
//! Event-based communication for UI synchronization. The controller queues
//! events as it changes state; the UI drains them after each intent and on
//! every tick.

use crate::types::PlaybackState;
use serde::{Deserialize, Serialize};
use stemdeck_core::{StemKind, Track, TrackId};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Controller state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// Audio started or stopped being produced
    PlayStateChanged { is_playing: bool },

    /// A different track was loaded
    TrackChanged {
        /// The new (current) track
        track: Track,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Position update (emitted on every tick while playing and after seeks)
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Track duration, zero until known
        duration_ms: u64,
    },

    /// A stem was muted or unmuted
    StemMuteChanged { stem: StemKind, muted: bool },

    /// A stem failed and playback continues without it
    StemDisabled { stem: StemKind, reason: String },

    /// Drift correction snapped followers to the leader
    DriftCorrected { corrections: usize },

    /// Track finished playing naturally (reached end)
    TrackFinished { track_id: TrackId },

    /// Track removed from the catalog
    TrackRemoved { track_id: TrackId },

    /// Error occurred during playback
    Error {
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_variant_name() {
        let event = PlaybackEvent::StemMuteChanged {
            stem: StemKind::Bass,
            muted: true,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["StemMuteChanged"]["stem"], "bass");
        assert_eq!(json["StemMuteChanged"]["muted"], true);
    }
}
