//! Track types

use super::{CoverRef, MediaAddress, StemRefs, TrackId};
use serde::{Deserialize, Serialize};

/// How a track's audio is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TrackMode {
    /// One mixed-down audio stream
    Single { audio: MediaAddress },

    /// Four separated stems played in parallel
    Stems { stems: StemRefs },
}

/// A playable track
///
/// Tracks are immutable once created by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover: CoverRef,
    pub mode: TrackMode,
}

impl Track {
    /// Check if this track plays as four stems
    pub fn is_stems(&self) -> bool {
        matches!(self.mode, TrackMode::Stems { .. })
    }

    /// `(artist, album)` key used for album grouping
    pub fn album_key(&self) -> (&str, &str) {
        (&self.artist, &self.album)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StemKind;

    fn stems() -> StemRefs {
        StemRefs {
            vocals: MediaAddress::new("v.mp3"),
            bass: MediaAddress::new("b.mp3"),
            drums: MediaAddress::new("d.mp3"),
            other: MediaAddress::new("o.mp3"),
        }
    }

    #[test]
    fn stems_track_is_detected() {
        let track = Track {
            id: TrackId::new("1"),
            title: "Song".to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            cover: CoverRef::placeholder(),
            mode: TrackMode::Stems { stems: stems() },
        };

        assert!(track.is_stems());
        assert_eq!(track.album_key(), ("Artist", "Album"));
        if let TrackMode::Stems { stems } = &track.mode {
            assert_eq!(stems.get(StemKind::Bass).as_str(), "b.mp3");
        }
    }

    #[test]
    fn mode_serializes_as_tagged_variant() {
        let mode = TrackMode::Single {
            audio: MediaAddress::new("song.mp3"),
        };
        let json = serde_json::to_value(&mode).unwrap();
        assert_eq!(json["kind"], "single");
        assert_eq!(json["audio"], "song.mp3");
    }
}
