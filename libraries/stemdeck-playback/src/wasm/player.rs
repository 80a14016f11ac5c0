//! WASM-compatible stem player wrapper

use super::backend::{HtmlMediaBackend, MediaEventQueue};
use crate::{PlaybackConfig, PlaybackController, PlaybackError, PlaybackEvent};
use js_sys::Function;
use stemdeck_core::{MemoryCatalog, StemKind, TrackDraft, TrackId};
use std::time::Duration;
use wasm_bindgen::prelude::*;

/// WASM-compatible stem player
///
/// Wraps `PlaybackController` with a JavaScript-friendly API. The page calls
/// `tick()` every `driftIntervalMs()`; every intent also handles whatever the
/// audio elements reported since the last call.
#[wasm_bindgen]
pub struct WasmStemPlayer {
    inner: PlaybackController<MemoryCatalog, HtmlMediaBackend>,
    queue: MediaEventQueue,

    // Event callbacks
    on_state_change: Option<Function>,
    on_track_changed: Option<Function>,
    on_play_state_changed: Option<Function>,
    on_position_tick: Option<Function>,
    on_stem_changed: Option<Function>,
    on_error: Option<Function>,
}

#[wasm_bindgen]
impl WasmStemPlayer {
    /// Create a player with default settings
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_config(PlaybackConfig::default())
    }

    /// Create a player from a settings object
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<WasmStemPlayer, JsValue> {
        let config: PlaybackConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?;
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: PlaybackConfig) -> Self {
        // Enable panic hooks for better error messages in console
        console_error_panic_hook::set_once();

        let queue = MediaEventQueue::new();
        let backend = HtmlMediaBackend::new(queue.clone());

        Self {
            inner: PlaybackController::new(MemoryCatalog::new(), backend, config),
            queue,
            on_state_change: None,
            on_track_changed: None,
            on_play_state_changed: None,
            on_position_tick: None,
            on_stem_changed: None,
            on_error: None,
        }
    }

    // ===== Library =====

    /// Add a track from an upload form object; returns the new track id
    #[wasm_bindgen(js_name = importTrack)]
    pub fn import_track(&mut self, draft: JsValue) -> Result<String, JsValue> {
        let draft: TrackDraft = serde_wasm_bindgen::from_value(draft)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse track: {}", e)))?;

        let result = self.inner.import_track(draft);
        self.flush();
        result
            .map(|id| id.as_str().to_string())
            .map_err(|e| self.handle_error(e))
    }

    /// Remove a track from the playlist
    #[wasm_bindgen(js_name = deleteTrack)]
    pub fn delete_track(&mut self, id: &str) -> Result<(), JsValue> {
        let result = self.inner.delete_track(&TrackId::new(id));
        self.flush();
        result.map_err(|e| self.handle_error(e))
    }

    /// Get the playlist
    pub fn tracks(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.playlist()).unwrap_or(JsValue::NULL)
    }

    /// Get the playlist grouped by artist and album
    pub fn albums(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.albums()).unwrap_or(JsValue::NULL)
    }

    // ===== Playback Control =====

    /// Load and start the track at a playlist index
    #[wasm_bindgen(js_name = playTrack)]
    pub fn play_track(&mut self, index: usize) -> Result<(), JsValue> {
        let result = self.inner.load_track(index);
        self.flush();
        result.map_err(|e| self.handle_error(e))
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        self.inner.play();
        self.flush();
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.inner.pause();
        self.flush();
    }

    /// Toggle between playing and paused
    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&mut self) {
        self.inner.toggle_play_pause();
        self.flush();
    }

    /// Stop playback and unload the current track
    pub fn stop(&mut self) {
        self.inner.stop();
        self.flush();
    }

    /// Skip to next track
    pub fn next(&mut self) -> Result<(), JsValue> {
        let result = self.inner.play_next();
        self.flush();
        result.map_err(|e| self.handle_error(e))
    }

    /// Go to previous track
    pub fn previous(&mut self) -> Result<(), JsValue> {
        let result = self.inner.play_previous();
        self.flush();
        result.map_err(|e| self.handle_error(e))
    }

    // ===== Seeking =====

    /// Move by a signed number of seconds; returns the new position
    #[wasm_bindgen(js_name = seekBy)]
    pub fn seek_by(&mut self, delta_secs: f64) -> Result<f64, JsValue> {
        let result = self.inner.seek_by(delta_secs);
        self.seek_result(result)
    }

    /// Seek to position in seconds; returns the applied position
    #[wasm_bindgen(js_name = seekTo)]
    pub fn seek_to(&mut self, position_secs: f64) -> Result<f64, JsValue> {
        let position =
            Duration::try_from_secs_f64(position_secs.max(0.0)).unwrap_or(Duration::ZERO);
        let result = self.inner.seek_to(position);
        self.seek_result(result)
    }

    /// Skip forward by the configured step
    #[wasm_bindgen(js_name = seekForward)]
    pub fn seek_forward(&mut self) -> Result<f64, JsValue> {
        let result = self.inner.seek_forward();
        self.seek_result(result)
    }

    /// Skip backward by the configured step
    #[wasm_bindgen(js_name = seekBackward)]
    pub fn seek_backward(&mut self) -> Result<f64, JsValue> {
        let result = self.inner.seek_backward();
        self.seek_result(result)
    }

    fn seek_result(&mut self, result: crate::Result<Duration>) -> Result<f64, JsValue> {
        self.flush();
        result
            .map(|position| position.as_secs_f64())
            .map_err(|e| self.handle_error(e))
    }

    // ===== Stems =====

    /// Mute or unmute a stem ("vocals" | "bass" | "drums" | "other")
    #[wasm_bindgen(js_name = setStemMuted)]
    pub fn set_stem_muted(&mut self, stem: &str, muted: bool) -> Result<(), JsValue> {
        let result = self.inner.set_stem_muted_by_name(stem, muted);
        self.flush();
        result.map_err(|e| self.handle_error(e))
    }

    /// Check if a stem is muted; undefined when no stem track is loaded
    #[wasm_bindgen(js_name = isStemMuted)]
    pub fn is_stem_muted(&self, stem: &str) -> Option<bool> {
        let stem: StemKind = stem.parse().ok()?;
        self.inner.stem_muted(stem)
    }

    // ===== Periodic Work =====

    /// Handle pending media signals, correct drift and report position
    ///
    /// Returns the number of drift corrections made.
    pub fn tick(&mut self) -> usize {
        self.pump_media_events();
        let corrections = self.inner.tick();
        self.dispatch_events();
        corrections
    }

    /// Interval at which `tick` should be called
    #[wasm_bindgen(js_name = driftIntervalMs)]
    pub fn drift_interval_ms(&self) -> u32 {
        u32::try_from(self.inner.drift_interval().as_millis()).unwrap_or(u32::MAX)
    }

    // ===== State Queries =====

    /// Get current playback state as string
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        self.inner.state().as_str().to_string()
    }

    /// Check if audio is playing
    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.inner.is_playing()
    }

    /// Get current position in seconds
    #[wasm_bindgen(js_name = getPosition)]
    pub fn get_position(&self) -> f64 {
        self.inner.position().as_secs_f64()
    }

    /// Get duration of current track in seconds
    #[wasm_bindgen(js_name = getDuration)]
    pub fn get_duration(&self) -> Option<f64> {
        self.inner.duration().map(|d| d.as_secs_f64())
    }

    /// Get playlist index of the loaded track
    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<u32> {
        self.inner
            .current_index()
            .and_then(|index| u32::try_from(index).ok())
    }

    /// Get the loaded track
    #[wasm_bindgen(js_name = currentTrack)]
    pub fn current_track(&self) -> JsValue {
        self.inner
            .current_track()
            .and_then(|track| serde_wasm_bindgen::to_value(track).ok())
            .unwrap_or(JsValue::NULL)
    }

    // ===== Event Listeners =====

    /// Register state change callback (receives the state name)
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&mut self, callback: Function) {
        self.on_state_change = Some(callback);
    }

    /// Register track change callback (receives the track)
    #[wasm_bindgen(js_name = onTrackChanged)]
    pub fn on_track_changed(&mut self, callback: Function) {
        self.on_track_changed = Some(callback);
    }

    /// Register play/pause callback (receives a boolean)
    #[wasm_bindgen(js_name = onPlayStateChanged)]
    pub fn on_play_state_changed(&mut self, callback: Function) {
        self.on_play_state_changed = Some(callback);
    }

    /// Register position callback (receives position and duration in seconds)
    #[wasm_bindgen(js_name = onPositionTick)]
    pub fn on_position_tick(&mut self, callback: Function) {
        self.on_position_tick = Some(callback);
    }

    /// Register stem callback (receives stem name, muted and disabled flags)
    #[wasm_bindgen(js_name = onStemChanged)]
    pub fn on_stem_changed(&mut self, callback: Function) {
        self.on_stem_changed = Some(callback);
    }

    /// Register error callback
    #[wasm_bindgen(js_name = onError)]
    pub fn on_error(&mut self, callback: Function) {
        self.on_error = Some(callback);
    }

    // ===== Internal Event Emitters =====

    fn flush(&mut self) {
        self.pump_media_events();
        self.dispatch_events();
    }

    fn pump_media_events(&mut self) {
        for event in self.queue.drain() {
            self.inner.handle_media_event(event);
        }
    }

    fn dispatch_events(&mut self) {
        for event in self.inner.drain_events() {
            self.emit(&event);
        }
    }

    fn emit(&self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::StateChanged { state } => {
                if let Some(ref cb) = self.on_state_change {
                    cb.call1(&JsValue::NULL, &JsValue::from_str(state.as_str()))
                        .ok();
                }
            }
            PlaybackEvent::TrackChanged { track, .. } => {
                if let Some(ref cb) = self.on_track_changed {
                    if let Ok(js_track) = serde_wasm_bindgen::to_value(track) {
                        cb.call1(&JsValue::NULL, &js_track).ok();
                    }
                }
            }
            PlaybackEvent::PlayStateChanged { is_playing } => {
                if let Some(ref cb) = self.on_play_state_changed {
                    cb.call1(&JsValue::NULL, &JsValue::from_bool(*is_playing))
                        .ok();
                }
            }
            PlaybackEvent::PositionUpdate {
                position_ms,
                duration_ms,
            } => {
                if let Some(ref cb) = self.on_position_tick {
                    cb.call2(
                        &JsValue::NULL,
                        &JsValue::from_f64(*position_ms as f64 / 1000.0),
                        &JsValue::from_f64(*duration_ms as f64 / 1000.0),
                    )
                    .ok();
                }
            }
            PlaybackEvent::StemMuteChanged { stem, muted } => {
                self.emit_stem(*stem, *muted, false);
            }
            PlaybackEvent::StemDisabled { stem, reason } => {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "Stem {} disabled: {}",
                    stem, reason
                )));
                self.emit_stem(*stem, true, true);
            }
            PlaybackEvent::Error { message } => {
                if let Some(ref cb) = self.on_error {
                    cb.call1(&JsValue::NULL, &JsValue::from_str(message)).ok();
                }
            }
            PlaybackEvent::DriftCorrected { .. }
            | PlaybackEvent::TrackFinished { .. }
            | PlaybackEvent::TrackRemoved { .. } => {}
        }
    }

    fn emit_stem(&self, stem: StemKind, muted: bool, disabled: bool) {
        if let Some(ref cb) = self.on_stem_changed {
            cb.call3(
                &JsValue::NULL,
                &JsValue::from_str(stem.name()),
                &JsValue::from_bool(muted),
                &JsValue::from_bool(disabled),
            )
            .ok();
        }
    }

    fn handle_error(&self, error: PlaybackError) -> JsValue {
        let err_msg = error.to_string();

        // Emit error event
        if let Some(ref cb) = self.on_error {
            cb.call1(&JsValue::NULL, &JsValue::from_str(&err_msg))
                .ok();
        }

        JsValue::from_str(&err_msg)
    }
}

/// Default implementation
impl Default for WasmStemPlayer {
    fn default() -> Self {
        Self::new()
    }
}
