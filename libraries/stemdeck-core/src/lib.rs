//! Stemdeck Core
//!
//! Platform-agnostic domain types and catalog traits for Stemdeck.
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `TrackMode`, `StemKind`, `StemRefs`, `TrackDraft`
//! - **Catalog**: the `TrackCatalog` trait and the in-memory `MemoryCatalog`
//! - **Album grouping**: `AlbumGroup` keyed by `(artist, album)`
//! - **Error Handling**: unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use stemdeck_core::{MemoryCatalog, TrackCatalog, TrackDraft, MediaAddress};
//!
//! let mut catalog = MemoryCatalog::new();
//! let draft = TrackDraft::single(MediaAddress::new("blob:song.mp3")).with_title("Song");
//! let id = catalog.add_track(draft).unwrap();
//!
//! assert_eq!(catalog.position_of(&id), Some(0));
//! assert_eq!(catalog.list_tracks()[0].artist, "Unknown Artist");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::{MemoryCatalog, TrackCatalog};
pub use error::{CoreError, Result};
pub use types::{
    group_albums, tracks_in_album, AlbumGroup, CoverRef, MediaAddress, PartialStems, StemKind,
    StemRefs, Track, TrackDraft, TrackId, TrackMode, NUM_STEMS,
};
