//! Stemdeck - Playback Control
//!
//! Platform-agnostic playback control for Stemdeck.
//!
//! This crate provides:
//! - A looping playlist transport (play/pause/next/previous/seek)
//! - Stem playback: four units on one transport with a leader clock
//! - Per-stem mute that never touches the clock
//! - Drift correction ticks that snap followers back to the leader
//! - Degraded playback when a follower stem cannot load
//! - Cancellation of stale load signals by generation
//!
//! # Architecture
//!
//! `stemdeck-playback` owns no audio hardware. Hosts provide a
//! `MediaBackend` that creates `MediaElement`s (browser audio elements,
//! native decoders, test fakes) and feed their asynchronous signals back
//! through `PlaybackController::handle_media_event`. Everything runs on one
//! thread; the host also calls `tick` every `drift_interval()`.
//!
//! # Example: Stem Playback
//!
//! ```rust
//! use stemdeck_core::{MediaAddress, MemoryCatalog, PartialStems, StemKind, TrackCatalog, TrackDraft};
//! use stemdeck_playback::{
//!     MediaBackend, MediaElement, MediaEvent, PlaybackConfig, PlaybackController, PlaybackState,
//!     Result, UnitTag,
//! };
//! use std::time::Duration;
//!
//! struct Silent(Duration);
//!
//! impl MediaElement for Silent {
//!     fn load(&mut self, _address: &MediaAddress, _tag: UnitTag) -> Result<()> {
//!         Ok(())
//!     }
//!     fn play(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn position(&self) -> Duration {
//!         self.0
//!     }
//!     fn set_position(&mut self, position: Duration) {
//!         self.0 = position;
//!     }
//!     fn set_muted(&mut self, _muted: bool) {}
//! }
//!
//! struct SilentBackend;
//!
//! impl MediaBackend for SilentBackend {
//!     fn create_element(&mut self) -> Box<dyn MediaElement> {
//!         Box::new(Silent(Duration::ZERO))
//!     }
//! }
//!
//! let mut stems = PartialStems::new();
//! for kind in StemKind::ALL {
//!     stems = stems.with(kind, MediaAddress::new(format!("{}.mp3", kind)));
//! }
//!
//! let mut catalog = MemoryCatalog::new();
//! catalog.add_track(TrackDraft::stems(stems).with_title("Song")).unwrap();
//!
//! let mut controller = PlaybackController::new(catalog, SilentBackend, PlaybackConfig::default());
//! controller.load_track(0).unwrap();
//!
//! // The host reports readiness as elements finish buffering
//! let generation = controller.generation();
//! for kind in StemKind::ALL {
//!     controller.handle_media_event(MediaEvent::ready(
//!         UnitTag::stem(generation, kind),
//!         Duration::from_secs(180),
//!     ));
//! }
//! assert_eq!(controller.state(), PlaybackState::Playing);
//!
//! // Muting a stem leaves the transport running
//! controller.set_stem_muted(StemKind::Vocals, true).unwrap();
//! assert!(controller.is_playing());
//! ```

mod config;
mod controller;
mod drift;
mod element;
mod error;
mod events;
mod session;
mod stems;
pub mod types;
mod unit;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use drift::DriftCorrector;
pub use element::{MediaBackend, MediaElement, MediaEvent, MediaSignal};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use session::{PlaybackSession, StemMix};
pub use stems::StemGroup;
pub use types::{PlaybackState, UnitSlot, UnitTag};
pub use unit::{MediaUnit, UnitState};
