//! Error types for playback control

use stemdeck_core::{CoreError, StemKind};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Playlist index out of range
    #[error("Index out of bounds: {index} (playlist has {len} tracks)")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A media unit was asked to load an empty address
    #[error("Missing media address")]
    MissingAddress,

    /// The leader stem could not be loaded, so the stem track cannot play
    #[error("Leader stem unavailable: {0}")]
    LeaderUnavailable(String),

    /// A stem operation on a track that is not in stem mode
    #[error("Current track is not a stem track")]
    NotStemTrack,

    /// A stem that failed to load was asked to become audible
    #[error("Stem {0} is disabled")]
    StemDisabled(StemKind),

    /// Media element error
    #[error("Media error: {0}")]
    Media(String),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CoreError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
