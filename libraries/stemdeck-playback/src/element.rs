//! Platform-agnostic media element traits
//!
//! Abstracts the playback hardware for different hosts (browser audio
//! elements, native decoders, test fakes).

use crate::error::Result;
use crate::types::UnitTag;
use stemdeck_core::MediaAddress;
use std::time::Duration;

/// One platform media element
///
/// Implementors wrap whatever actually produces sound. Loading is
/// asynchronous: `load` only starts buffering, and the host later reports
/// readiness, end of stream or failure by passing a `MediaEvent` carrying the
/// same `tag` to `PlaybackController::handle_media_event`.
///
/// Only `MediaUnit` talks to an element; nothing else in the crate reads or
/// writes one directly.
pub trait MediaElement {
    /// Start buffering `address`, replacing any previous resource
    fn load(&mut self, address: &MediaAddress, tag: UnitTag) -> Result<()>;

    /// Start or resume output
    fn play(&mut self) -> Result<()>;

    /// Pause output, keeping the position
    fn pause(&mut self);

    /// Current playback position
    fn position(&self) -> Duration;

    /// Move the playback position
    ///
    /// Callers clamp to the known duration before calling.
    fn set_position(&mut self, position: Duration);

    /// Silence or restore output without affecting the clock
    fn set_muted(&mut self, muted: bool);

    /// Release the resource and stop reporting signals
    fn unload(&mut self) {}
}

/// Factory for media elements
pub trait MediaBackend {
    /// Create a fresh, unloaded element
    fn create_element(&mut self) -> Box<dyn MediaElement>;
}

/// Asynchronous notification from a media element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSignal {
    /// Enough is buffered to report position and duration
    Ready { duration: Duration },

    /// Playback reached the end of the resource
    Ended,

    /// The resource could not be loaded or decoded
    Failed { reason: String },
}

/// A signal tagged with the subscription it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEvent {
    pub tag: UnitTag,
    pub signal: MediaSignal,
}

impl MediaEvent {
    /// Ready signal
    pub fn ready(tag: UnitTag, duration: Duration) -> Self {
        Self {
            tag,
            signal: MediaSignal::Ready { duration },
        }
    }

    /// End-of-stream signal
    pub fn ended(tag: UnitTag) -> Self {
        Self {
            tag,
            signal: MediaSignal::Ended,
        }
    }

    /// Failure signal
    pub fn failed(tag: UnitTag, reason: impl Into<String>) -> Self {
        Self {
            tag,
            signal: MediaSignal::Failed {
                reason: reason.into(),
            },
        }
    }
}
