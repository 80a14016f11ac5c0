//! Import records
//!
//! A `TrackDraft` is what an import form collects before the catalog turns it
//! into a `Track`. Every field is optional; validation happens once, here, so
//! playback never sees a half-formed track.

use super::{CoverRef, MediaAddress, PartialStems, Track, TrackId, TrackMode};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Title used when the import form leaves it empty
pub const UNKNOWN_TITLE: &str = "Unknown Title";
/// Artist used when the import form leaves it empty
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Album used when the import form leaves it empty
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Track import record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackDraft {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub cover: Option<CoverRef>,

    /// Import as four stems instead of one stream
    pub stem_mode: bool,

    /// Mixed-down audio (single mode)
    pub main_audio: Option<MediaAddress>,

    /// Stem audio (stem mode)
    pub stems: PartialStems,
}

impl TrackDraft {
    /// Draft for a single-stream track
    pub fn single(audio: MediaAddress) -> Self {
        Self {
            main_audio: Some(audio),
            ..Self::default()
        }
    }

    /// Draft for a stem track
    pub fn stems(stems: PartialStems) -> Self {
        Self {
            stem_mode: true,
            stems,
            ..Self::default()
        }
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the cover art
    #[must_use]
    pub fn with_cover(mut self, cover: CoverRef) -> Self {
        self.cover = Some(cover);
        self
    }

    /// Validate the draft and build a track with the given id
    ///
    /// Stem mode requires all four stems; a partial set aborts the import
    /// rather than producing a track that can only play some of its parts.
    pub fn into_track(self, id: TrackId) -> Result<Track> {
        let mode = if self.stem_mode {
            TrackMode::Stems {
                stems: self.stems.complete()?,
            }
        } else {
            match self.main_audio {
                Some(audio) if !audio.is_missing() => TrackMode::Single { audio },
                _ => return Err(CoreError::MissingAudio),
            }
        };

        Ok(Track {
            id,
            title: or_placeholder(self.title, UNKNOWN_TITLE),
            artist: or_placeholder(self.artist, UNKNOWN_ARTIST),
            album: or_placeholder(self.album, UNKNOWN_ALBUM),
            cover: self.cover.unwrap_or_default(),
            mode,
        })
    }
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StemKind;

    #[test]
    fn empty_fields_get_placeholders() {
        let track = TrackDraft::single(MediaAddress::new("song.mp3"))
            .with_title("  ")
            .into_track(TrackId::new("1"))
            .unwrap();

        assert_eq!(track.title, UNKNOWN_TITLE);
        assert_eq!(track.artist, UNKNOWN_ARTIST);
        assert_eq!(track.album, UNKNOWN_ALBUM);
        assert!(track.cover.is_placeholder());
    }

    #[test]
    fn single_without_audio_is_rejected() {
        let err = TrackDraft::default()
            .with_title("No audio")
            .into_track(TrackId::new("1"))
            .unwrap_err();
        assert_eq!(err, CoreError::MissingAudio);

        let err = TrackDraft::single(MediaAddress::new(""))
            .into_track(TrackId::new("1"))
            .unwrap_err();
        assert_eq!(err, CoreError::MissingAudio);
    }

    #[test]
    fn partial_stems_abort_import() {
        let stems = PartialStems::new()
            .with(StemKind::Vocals, MediaAddress::new("v.mp3"))
            .with(StemKind::Drums, MediaAddress::new("d.mp3"));

        let err = TrackDraft::stems(stems)
            .into_track(TrackId::new("1"))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::IncompleteStems(vec![StemKind::Bass, StemKind::Other])
        );
    }

    #[test]
    fn stem_mode_ignores_main_audio() {
        let stems = StemKind::ALL.into_iter().fold(PartialStems::new(), |s, kind| {
            s.with(kind, MediaAddress::new(format!("{}.mp3", kind)))
        });
        let mut draft = TrackDraft::stems(stems);
        draft.main_audio = Some(MediaAddress::new("mix.mp3"));

        let track = draft.into_track(TrackId::new("1")).unwrap();
        assert!(track.is_stems());
    }
}
