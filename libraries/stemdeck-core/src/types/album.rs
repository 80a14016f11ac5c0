//! Album grouping
//!
//! Albums are not stored; they are derived from the playlist by grouping
//! tracks on their `(artist, album)` pair, in the order each pair first
//! appears.

use super::{CoverRef, Track, TrackId};
use serde::{Deserialize, Serialize};

/// A group of tracks sharing artist and album
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumGroup {
    pub artist: String,
    pub album: String,
    /// Cover of the first track in the group
    pub cover: CoverRef,
    /// Member tracks in playlist order
    pub track_ids: Vec<TrackId>,
}

impl AlbumGroup {
    /// Check if a track belongs to this group
    pub fn contains(&self, track: &Track) -> bool {
        track.album_key() == (self.artist.as_str(), self.album.as_str())
    }
}

/// Group a playlist into albums, first-seen order
pub fn group_albums(tracks: &[Track]) -> Vec<AlbumGroup> {
    let mut groups: Vec<AlbumGroup> = Vec::new();

    for track in tracks {
        match groups.iter_mut().find(|group| group.contains(track)) {
            Some(group) => group.track_ids.push(track.id.clone()),
            None => groups.push(AlbumGroup {
                artist: track.artist.clone(),
                album: track.album.clone(),
                cover: track.cover.clone(),
                track_ids: vec![track.id.clone()],
            }),
        }
    }

    groups
}

/// Tracks of one album, in playlist order
pub fn tracks_in_album<'a>(tracks: &'a [Track], artist: &str, album: &str) -> Vec<&'a Track> {
    tracks
        .iter()
        .filter(|track| track.album_key() == (artist, album))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MediaAddress, TrackMode};

    fn track(id: &str, artist: &str, album: &str) -> Track {
        Track {
            id: TrackId::new(id),
            title: format!("Track {}", id),
            artist: artist.to_string(),
            album: album.to_string(),
            cover: CoverRef::new(format!("{}.png", id)),
            mode: TrackMode::Single {
                audio: MediaAddress::new(format!("{}.mp3", id)),
            },
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let tracks = vec![
            track("1", "A", "First"),
            track("2", "B", "Second"),
            track("3", "A", "First"),
        ];

        let albums = group_albums(&tracks);
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].album, "First");
        assert_eq!(
            albums[0].track_ids,
            vec![TrackId::new("1"), TrackId::new("3")]
        );
        assert_eq!(albums[0].cover.as_str(), "1.png");
        assert_eq!(albums[1].artist, "B");
    }

    #[test]
    fn same_album_name_different_artist_is_separate() {
        let tracks = vec![track("1", "A", "Greatest Hits"), track("2", "B", "Greatest Hits")];
        assert_eq!(group_albums(&tracks).len(), 2);
    }

    #[test]
    fn filter_by_album() {
        let tracks = vec![
            track("1", "A", "First"),
            track("2", "B", "Second"),
            track("3", "A", "First"),
        ];

        let ids: Vec<_> = tracks_in_album(&tracks, "A", "First")
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(tracks_in_album(&tracks, "C", "First").is_empty());
    }
}
