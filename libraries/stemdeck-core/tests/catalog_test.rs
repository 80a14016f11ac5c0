//! Catalog and album grouping tests

use proptest::prelude::*;
use stemdeck_core::{
    tracks_in_album, CoreError, MediaAddress, MemoryCatalog, PartialStems, StemKind,
    TrackCatalog, TrackDraft, TrackId, TrackMode,
};

fn single(title: &str, artist: &str, album: &str) -> TrackDraft {
    TrackDraft::single(MediaAddress::new(format!("{}.mp3", title)))
        .with_title(title)
        .with_artist(artist)
        .with_album(album)
}

#[test]
fn import_keeps_insertion_order() {
    let mut catalog = MemoryCatalog::new();
    let first = catalog.add_track(single("a", "X", "One")).unwrap();
    let second = catalog.add_track(single("b", "X", "One")).unwrap();

    assert_ne!(first, second);
    assert_eq!(catalog.position_of(&first), Some(0));
    assert_eq!(catalog.position_of(&second), Some(1));
    assert_eq!(catalog.track_at(1).unwrap().title, "b");
    assert!(catalog.track_at(2).is_none());
}

#[test]
fn full_stem_set_imports_as_stem_track() {
    let mut partial = PartialStems::new();
    for kind in StemKind::ALL {
        partial = partial.with(kind, MediaAddress::new(format!("{}.ogg", kind)));
    }

    let mut catalog = MemoryCatalog::new();
    let id = catalog.add_track(TrackDraft::stems(partial)).unwrap();

    let track = &catalog.tracks()[0];
    assert_eq!(track.id, id);
    assert_eq!(track.title, "Unknown Title");
    match &track.mode {
        TrackMode::Stems { stems } => {
            assert_eq!(stems.get(StemKind::Vocals).as_str(), "vocals.ogg");
            assert_eq!(stems.get(StemKind::Other).as_str(), "other.ogg");
        }
        TrackMode::Single { .. } => panic!("expected stem track"),
    }
}

#[test]
fn partial_stem_set_is_rejected_without_side_effects() {
    let mut catalog = MemoryCatalog::new();
    let partial = PartialStems::new()
        .with(StemKind::Vocals, MediaAddress::new("v.mp3"))
        .with(StemKind::Bass, MediaAddress::new(""));

    let err = catalog.add_track(TrackDraft::stems(partial)).unwrap_err();

    assert_eq!(
        err,
        CoreError::IncompleteStems(vec![StemKind::Bass, StemKind::Drums, StemKind::Other])
    );
    assert!(catalog.is_empty());
}

#[test]
fn delete_unknown_track_fails() {
    let mut catalog = MemoryCatalog::new();
    catalog.add_track(single("a", "X", "One")).unwrap();

    let missing = TrackId::new("nope");
    assert_eq!(
        catalog.delete_track(&missing),
        Err(CoreError::TrackNotFound(missing.clone()))
    );
    assert_eq!(catalog.len(), 1);
}

#[test]
fn albums_are_derived_from_remaining_tracks() {
    let mut catalog = MemoryCatalog::new();
    let a = catalog.add_track(single("a", "X", "One")).unwrap();
    catalog.add_track(single("b", "Y", "Two")).unwrap();
    catalog.add_track(single("c", "X", "One")).unwrap();

    assert_eq!(catalog.albums().len(), 2);

    catalog.delete_track(&a).unwrap();
    let albums = catalog.albums();
    assert_eq!(albums.len(), 2);
    assert_eq!(albums[0].artist, "Y");
    assert_eq!(albums[1].track_ids.len(), 1);

    let tracks = catalog.list_tracks();
    let x_one = tracks_in_album(&tracks, "X", "One");
    assert_eq!(x_one.len(), 1);
    assert_eq!(x_one[0].title, "c");
}

proptest! {
    /// Property: Every track lands in exactly one album, in playlist order
    #[test]
    fn grouping_partitions_playlist(
        entries in prop::collection::vec((0u8..3, 0u8..3), 0..40)
    ) {
        let mut catalog = MemoryCatalog::new();
        for (i, (artist, album)) in entries.iter().enumerate() {
            catalog
                .add_track(single(
                    &format!("t{}", i),
                    &format!("artist{}", artist),
                    &format!("album{}", album),
                ))
                .unwrap();
        }

        let tracks = catalog.list_tracks();
        let albums = catalog.albums();

        let total: usize = albums.iter().map(|group| group.track_ids.len()).sum();
        prop_assert_eq!(total, tracks.len());

        for group in &albums {
            let positions: Vec<usize> = group
                .track_ids
                .iter()
                .map(|id| catalog.position_of(id).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
            for id in &group.track_ids {
                let track = &tracks[catalog.position_of(id).unwrap()];
                prop_assert!(group.contains(track));
            }
        }

        for pair in albums.windows(2) {
            prop_assert!(
                (pair[0].artist.as_str(), pair[0].album.as_str())
                    != (pair[1].artist.as_str(), pair[1].album.as_str())
            );
        }
    }
}
