//! Media unit - one playable resource
//!
//! Wraps a single `MediaElement` and owns everything the element itself
//! does not track reliably: the transport state machine, the known duration,
//! the mute flag and position clamping.
//!
//! ```text
//! Idle -> Loading -> Ready -> Playing <-> Paused -> Ended
//!            \                                       |
//!             `-> Failed          (play rewinds) <---'
//! ```

use crate::element::MediaElement;
use crate::error::{PlaybackError, Result};
use crate::types::UnitTag;
use stemdeck_core::MediaAddress;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport state of a media unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitState {
    /// Nothing loaded
    Idle,

    /// Buffering; play may already have been requested
    Loading,

    /// Buffered and stopped
    Ready,

    /// Producing output
    Playing,

    /// Paused mid-resource
    Paused,

    /// Reached the end of the resource
    Ended,

    /// Load failed or the unit was disabled; ignores transport commands
    Failed,
}

/// One playable media resource
pub struct MediaUnit {
    element: Box<dyn MediaElement>,
    address: Option<MediaAddress>,
    tag: Option<UnitTag>,
    state: UnitState,
    /// Known once the element reports ready
    duration: Option<Duration>,
    muted: bool,
}

impl MediaUnit {
    /// Wrap an unloaded element
    pub fn new(element: Box<dyn MediaElement>) -> Self {
        Self {
            element,
            address: None,
            tag: None,
            state: UnitState::Idle,
            duration: None,
            muted: false,
        }
    }

    /// Replace the current resource
    ///
    /// Position resets to zero and the unit waits for `on_ready`. A missing
    /// address fails synchronously and leaves the unit `Failed`.
    pub fn load(&mut self, address: &MediaAddress, tag: UnitTag) -> Result<()> {
        if self.state == UnitState::Playing {
            self.element.pause();
        }

        self.duration = None;
        self.tag = Some(tag);

        if address.is_missing() {
            self.address = None;
            self.state = UnitState::Failed;
            return Err(PlaybackError::MissingAddress);
        }

        if let Err(e) = self.element.load(address, tag) {
            self.address = None;
            self.state = UnitState::Failed;
            return Err(e);
        }

        self.element.set_position(Duration::ZERO);
        self.element.set_muted(self.muted);
        self.address = Some(address.clone());
        self.state = UnitState::Loading;
        debug!("Unit {:?} loading {}", tag.slot, address);

        Ok(())
    }

    /// Element reported it is buffered
    ///
    /// Returns false if the signal was ignored (unit idle or failed).
    pub fn on_ready(&mut self, duration: Duration) -> bool {
        match self.state {
            UnitState::Idle | UnitState::Failed => false,
            UnitState::Loading => {
                self.duration = Some(duration);
                self.state = UnitState::Ready;
                true
            }
            // Play or pause was requested while buffering
            _ => {
                self.duration = Some(duration);
                true
            }
        }
    }

    /// Element reported end of stream
    pub fn on_ended(&mut self) {
        if matches!(
            self.state,
            UnitState::Playing | UnitState::Paused | UnitState::Ready
        ) {
            self.state = UnitState::Ended;
        }
    }

    /// Start or resume output
    ///
    /// No-op if already playing. Without a loaded resource this logs and
    /// returns without error.
    pub fn play(&mut self) {
        match self.state {
            UnitState::Playing => return,
            UnitState::Idle | UnitState::Failed => {
                warn!("Ignoring play on unit {:?}: no media loaded", self.slot());
                return;
            }
            UnitState::Ended => self.element.set_position(Duration::ZERO),
            UnitState::Loading | UnitState::Ready | UnitState::Paused => {}
        }

        match self.element.play() {
            Ok(()) => self.state = UnitState::Playing,
            Err(e) => warn!("Unit {:?} failed to start: {}", self.slot(), e),
        }
    }

    /// Pause output
    pub fn pause(&mut self) {
        if self.state == UnitState::Playing {
            self.element.pause();
            self.state = if self.is_ready() {
                UnitState::Paused
            } else {
                UnitState::Loading
            };
        }
    }

    /// Pause and rewind to zero
    pub fn stop(&mut self) {
        if matches!(self.state, UnitState::Idle | UnitState::Failed) {
            return;
        }

        self.element.pause();
        self.element.set_position(Duration::ZERO);
        self.state = if self.is_ready() {
            UnitState::Ready
        } else {
            UnitState::Loading
        };
    }

    /// Mute, pause and stop reacting to transport commands until the next load
    pub fn disable(&mut self) {
        self.element.pause();
        self.set_muted(true);
        self.state = UnitState::Failed;
    }

    /// Release the resource
    pub fn unload(&mut self) {
        self.element.pause();
        self.element.unload();
        self.address = None;
        self.tag = None;
        self.duration = None;
        self.state = UnitState::Idle;
    }

    /// Current position (zero when nothing is loaded)
    pub fn position(&self) -> Duration {
        match self.state {
            UnitState::Idle | UnitState::Failed => Duration::ZERO,
            _ => self.element.position(),
        }
    }

    /// Move to `position`, clamped to `[0, duration]`
    ///
    /// Returns the position actually applied.
    pub fn set_position(&mut self, position: Duration) -> Duration {
        if matches!(self.state, UnitState::Idle | UnitState::Failed) {
            return Duration::ZERO;
        }

        let clamped = match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        };
        self.element.set_position(clamped);

        if self.state == UnitState::Ended && self.duration.map_or(false, |d| clamped < d) {
            self.state = UnitState::Paused;
        }

        clamped
    }

    /// Move by a signed number of seconds, clamped to `[0, duration]`
    pub fn seek_by(&mut self, delta_secs: f64) -> Duration {
        let target = self.position().as_secs_f64() + delta_secs;
        let target = match self.duration {
            Some(duration) => target.min(duration.as_secs_f64()),
            None => target,
        };
        let target = Duration::try_from_secs_f64(target.max(0.0)).unwrap_or(Duration::ZERO);

        self.set_position(target)
    }

    /// Silence or restore output; never touches position or transport
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.element.set_muted(muted);
    }

    /// Check if output is muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Duration, once ready
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Current transport state
    pub fn state(&self) -> UnitState {
        self.state
    }

    /// Check if producing output
    pub fn is_playing(&self) -> bool {
        self.state == UnitState::Playing
    }

    /// Check if buffered and usable
    pub fn is_ready(&self) -> bool {
        self.duration.is_some() && self.state != UnitState::Failed
    }

    /// Check if failed or disabled
    pub fn is_failed(&self) -> bool {
        self.state == UnitState::Failed
    }

    /// Loaded resource address
    pub fn address(&self) -> Option<&MediaAddress> {
        self.address.as_ref()
    }

    /// Subscription tag of the current load
    pub fn tag(&self) -> Option<UnitTag> {
        self.tag
    }

    fn slot(&self) -> Option<crate::types::UnitSlot> {
        self.tag.map(|tag| tag.slot)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Minimal in-crate element for unit tests

    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    pub struct ElementState {
        pub loaded: Option<String>,
        pub playing: bool,
        pub position: Duration,
        pub muted: bool,
        pub play_calls: usize,
        pub fail_play: bool,
    }

    pub struct TestElement(pub Rc<RefCell<ElementState>>);

    impl MediaElement for TestElement {
        fn load(&mut self, address: &MediaAddress, _tag: UnitTag) -> Result<()> {
            self.0.borrow_mut().loaded = Some(address.as_str().to_string());
            Ok(())
        }

        fn play(&mut self) -> Result<()> {
            let mut state = self.0.borrow_mut();
            state.play_calls += 1;
            if state.fail_play {
                return Err(PlaybackError::Media("autoplay blocked".to_string()));
            }
            state.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.0.borrow_mut().playing = false;
        }

        fn position(&self) -> Duration {
            self.0.borrow().position
        }

        fn set_position(&mut self, position: Duration) {
            self.0.borrow_mut().position = position;
        }

        fn set_muted(&mut self, muted: bool) {
            self.0.borrow_mut().muted = muted;
        }

        fn unload(&mut self) {
            self.0.borrow_mut().loaded = None;
        }
    }

    pub fn unit() -> (MediaUnit, Rc<RefCell<ElementState>>) {
        let state = Rc::new(RefCell::new(ElementState::default()));
        (
            MediaUnit::new(Box::new(TestElement(Rc::clone(&state)))),
            state,
        )
    }
}
