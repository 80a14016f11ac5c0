//! Domain types for Stemdeck

mod album;
mod draft;
mod ids;
mod stem;
mod track;

pub use album::{group_albums, tracks_in_album, AlbumGroup};
pub use draft::TrackDraft;
pub use ids::{CoverRef, MediaAddress, TrackId};
pub use stem::{PartialStems, StemKind, StemRefs, NUM_STEMS};
pub use track::{Track, TrackMode};
