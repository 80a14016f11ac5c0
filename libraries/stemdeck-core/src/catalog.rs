//! Track catalog
//!
//! The catalog owns track records; playback only reads them. `MemoryCatalog`
//! is a session library that lives as long as the process and is lost on
//! restart.

use crate::error::{CoreError, Result};
use crate::types::{group_albums, AlbumGroup, Track, TrackDraft, TrackId};
use tracing::{debug, info};

/// Source of track records for playback
///
/// Implementations decide storage and durability. Playback relies only on
/// `list_tracks` returning tracks in a stable, insertion-based order.
pub trait TrackCatalog {
    /// All tracks, in playlist order
    fn list_tracks(&self) -> Vec<Track>;

    /// Validate and store a new track
    fn add_track(&mut self, draft: TrackDraft) -> Result<TrackId>;

    /// Remove a track
    ///
    /// # Errors
    /// Returns `CoreError::TrackNotFound` if no track has this id
    fn delete_track(&mut self, id: &TrackId) -> Result<()>;

    /// Number of tracks
    fn len(&self) -> usize {
        self.list_tracks().len()
    }

    /// Check if the catalog is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Playlist index of a track
    fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.list_tracks().iter().position(|track| &track.id == id)
    }

    /// Track at a playlist index
    fn track_at(&self, index: usize) -> Option<Track> {
        self.list_tracks().into_iter().nth(index)
    }

    /// Tracks grouped by `(artist, album)`
    fn albums(&self) -> Vec<AlbumGroup> {
        group_albums(&self.list_tracks())
    }
}

/// In-memory session catalog
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tracks: Vec<Track>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from existing tracks
    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Borrow the tracks without cloning
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl TrackCatalog for MemoryCatalog {
    fn list_tracks(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    fn add_track(&mut self, draft: TrackDraft) -> Result<TrackId> {
        let track = draft.into_track(TrackId::generate())?;
        let id = track.id.clone();

        info!(
            "Added track '{}' by {} ({})",
            track.title,
            track.artist,
            if track.is_stems() { "stems" } else { "single" }
        );
        self.tracks.push(track);

        Ok(id)
    }

    fn delete_track(&mut self, id: &TrackId) -> Result<()> {
        let index = self
            .tracks
            .iter()
            .position(|track| &track.id == id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))?;

        let track = self.tracks.remove(index);
        debug!("Removed track '{}' at index {}", track.title, index);

        Ok(())
    }

    fn len(&self) -> usize {
        self.tracks.len()
    }

    fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|track| &track.id == id)
    }

    fn track_at(&self, index: usize) -> Option<Track> {
        self.tracks.get(index).cloned()
    }

    fn albums(&self) -> Vec<AlbumGroup> {
        group_albums(&self.tracks)
    }
}
