/// Core error types for Stemdeck
use crate::types::{StemKind, TrackId};
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Stemdeck
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A stem-mode import is missing one or more of the four stems
    #[error("All four stem files are required, missing: {}", format_stems(.0))]
    IncompleteStems(Vec<StemKind>),

    /// A single-stream import has no audio address
    #[error("Main audio file is required")]
    MissingAudio,

    /// Track not found in the catalog
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Stem name that does not match vocals/bass/drums/other
    #[error("Unknown stem: {0}")]
    UnknownStem(String),
}

fn format_stems(stems: &[StemKind]) -> String {
    stems
        .iter()
        .map(|stem| stem.name())
        .collect::<Vec<_>>()
        .join(", ")
}
