/// ID and reference types for Stemdeck entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Track identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    /// Create a new track ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random track ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a playable media resource
///
/// Whatever the host's media element accepts as a source: a file URL,
/// an object URL or a data URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaAddress(String);

impl MediaAddress {
    /// Create a new media address
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty or whitespace-only address cannot be loaded
    pub fn is_missing(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for MediaAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Data URLs can be megabytes long
        const MAX_SHOWN: usize = 64;
        if self.0.len() > MAX_SHOWN {
            let mut end = MAX_SHOWN;
            while !self.0.is_char_boundary(end) {
                end -= 1;
            }
            write!(f, "{}...", &self.0[..end])
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Reference to cover art
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverRef(String);

impl CoverRef {
    /// Image used when a track is imported without cover art
    pub const PLACEHOLDER: &'static str = "placeholder.png";

    /// Create a new cover reference
    pub fn new(cover: impl Into<String>) -> Self {
        Self(cover.into())
    }

    /// The placeholder cover
    pub fn placeholder() -> Self {
        Self(Self::PLACEHOLDER.to_string())
    }

    /// Check if this is the placeholder cover
    pub fn is_placeholder(&self) -> bool {
        self.0 == Self::PLACEHOLDER
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CoverRef {
    fn default() -> Self {
        Self::placeholder()
    }
}
