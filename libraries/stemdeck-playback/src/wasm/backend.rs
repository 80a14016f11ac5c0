//! Browser media backend
//!
//! Each media unit gets its own `HtmlAudioElement`. The element's
//! `loadeddata`, `ended` and `error` handlers push tagged `MediaEvent`s onto
//! a shared queue; the player drains the queue into the controller. Handlers
//! are detached on every reload and on drop, so a discarded element can no
//! longer report anything.

use crate::element::{MediaBackend, MediaElement, MediaEvent};
use crate::error::{PlaybackError, Result};
use crate::types::UnitTag;
use stemdeck_core::MediaAddress;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlAudioElement;

/// Signals reported by audio elements, waiting to be handled
#[derive(Debug, Clone, Default)]
pub struct MediaEventQueue(Rc<RefCell<VecDeque<MediaEvent>>>);

impl MediaEventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: MediaEvent) {
        self.0.borrow_mut().push_back(event);
    }

    /// Take all queued signals in arrival order
    pub fn drain(&self) -> Vec<MediaEvent> {
        self.0.borrow_mut().drain(..).collect()
    }

    /// Check if no signals are waiting
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Creates one `HtmlAudioElement` per media unit
#[derive(Debug, Clone, Default)]
pub struct HtmlMediaBackend {
    queue: MediaEventQueue,
}

impl HtmlMediaBackend {
    /// Create a backend reporting into `queue`
    pub fn new(queue: MediaEventQueue) -> Self {
        Self { queue }
    }

    /// The queue elements report into
    pub fn queue(&self) -> &MediaEventQueue {
        &self.queue
    }
}

impl MediaBackend for HtmlMediaBackend {
    fn create_element(&mut self) -> Box<dyn MediaElement> {
        let audio = match HtmlAudioElement::new() {
            Ok(audio) => {
                audio.set_preload("auto");
                Some(audio)
            }
            Err(e) => {
                warn!("Failed to create audio element: {:?}", e);
                None
            }
        };

        Box::new(HtmlAudioUnit {
            audio,
            queue: self.queue.clone(),
            listeners: None,
        })
    }
}

/// Event handlers attached to one load
struct Listeners {
    _loaded: Closure<dyn FnMut()>,
    _ended: Closure<dyn FnMut()>,
    _error: Closure<dyn FnMut()>,
}

impl Listeners {
    fn attach(audio: &HtmlAudioElement, queue: &MediaEventQueue, tag: UnitTag) -> Self {
        let loaded = {
            let audio = audio.clone();
            let queue = queue.clone();
            Closure::<dyn FnMut()>::new(move || {
                queue.push(MediaEvent::ready(tag, media_duration(audio.duration())));
            })
        };

        let ended = {
            let queue = queue.clone();
            Closure::<dyn FnMut()>::new(move || {
                queue.push(MediaEvent::ended(tag));
            })
        };

        let error = {
            let audio = audio.clone();
            let queue = queue.clone();
            Closure::<dyn FnMut()>::new(move || {
                let reason = audio.error().map_or_else(
                    || "unknown media error".to_string(),
                    |e| format!("media error code {}", e.code()),
                );
                queue.push(MediaEvent::failed(tag, reason));
            })
        };

        audio.set_onloadeddata(Some(loaded.as_ref().unchecked_ref()));
        audio.set_onended(Some(ended.as_ref().unchecked_ref()));
        audio.set_onerror(Some(error.as_ref().unchecked_ref()));

        Self {
            _loaded: loaded,
            _ended: ended,
            _error: error,
        }
    }
}

/// Element duration as reported by the browser
///
/// Streams of unknown length report NaN or infinity and are treated as
/// unbounded.
fn media_duration(secs: f64) -> Duration {
    if secs.is_finite() && secs >= 0.0 {
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    } else {
        Duration::MAX
    }
}

/// One `<audio>` element driven as a `MediaElement`
struct HtmlAudioUnit {
    audio: Option<HtmlAudioElement>,
    queue: MediaEventQueue,
    listeners: Option<Listeners>,
}

impl HtmlAudioUnit {
    fn audio(&self) -> Result<&HtmlAudioElement> {
        self.audio
            .as_ref()
            .ok_or_else(|| PlaybackError::Media("audio element unavailable".to_string()))
    }

    fn detach(&mut self) {
        if let Some(audio) = &self.audio {
            audio.set_onloadeddata(None);
            audio.set_onended(None);
            audio.set_onerror(None);
        }
        self.listeners = None;
    }
}

impl MediaElement for HtmlAudioUnit {
    fn load(&mut self, address: &MediaAddress, tag: UnitTag) -> Result<()> {
        let audio = self.audio()?.clone();
        self.detach();

        self.listeners = Some(Listeners::attach(&audio, &self.queue, tag));
        audio.set_src(address.as_str());
        audio.load();
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        // Autoplay rejections arrive later through the returned promise
        self.audio()?
            .play()
            .map(|_promise| ())
            .map_err(|e| PlaybackError::Media(format!("{:?}", e)))
    }

    fn pause(&mut self) {
        if let Some(audio) = &self.audio {
            audio.pause().ok();
        }
    }

    fn position(&self) -> Duration {
        self.audio.as_ref().map_or(Duration::ZERO, |audio| {
            Duration::try_from_secs_f64(audio.current_time()).unwrap_or(Duration::ZERO)
        })
    }

    fn set_position(&mut self, position: Duration) {
        if let Some(audio) = &self.audio {
            audio.set_current_time(position.as_secs_f64());
        }
    }

    fn set_muted(&mut self, muted: bool) {
        if let Some(audio) = &self.audio {
            audio.set_muted(muted);
        }
    }

    fn unload(&mut self) {
        self.detach();
        if let Some(audio) = &self.audio {
            audio.pause().ok();
            audio.remove_attribute("src").ok();
            audio.load();
        }
    }
}

impl Drop for HtmlAudioUnit {
    fn drop(&mut self) {
        self.detach();
    }
}
