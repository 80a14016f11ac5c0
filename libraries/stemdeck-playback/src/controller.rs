//! Playback controller - core orchestration
//!
//! Owns the session and the active media, and turns UI intents and media
//! signals into transport operations.
//!
//! ```text
//! Idle --load_track--> Loading --leader/main ready--> Playing <--> Paused
//!                         ^                              |
//!                         `------- end of track ---------'
//! ```
//!
//! The playlist always loops, so the end of the last track loads the first.

use crate::config::PlaybackConfig;
use crate::drift::DriftCorrector;
use crate::element::{MediaBackend, MediaEvent, MediaSignal};
use crate::error::{PlaybackError, Result};
use crate::events::PlaybackEvent;
use crate::session::{PlaybackSession, StemMix};
use crate::stems::StemGroup;
use crate::types::{PlaybackState, UnitSlot, UnitTag};
use crate::unit::MediaUnit;
use stemdeck_core::{
    AlbumGroup, CoreError, StemKind, Track, TrackCatalog, TrackDraft, TrackId, TrackMode,
};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Media of the loaded track; the controller holds at most one
enum ActiveMedia {
    Single(MediaUnit),
    Stems {
        group: StemGroup,
        /// Lives and dies with its group
        drift: DriftCorrector,
    },
}

/// What a media signal asks the controller to do next
enum SignalOutcome {
    Nothing,
    Ready,
    Ended,
    TrackFailed(String),
    StemDisabled(StemKind, String),
}

/// Central playback control
///
/// Orchestrates:
/// - Track loading (single stream or four stems)
/// - Transport (play/pause/seek/next/previous, always looping)
/// - Stem mute and degraded playback
/// - Drift correction ticks
/// - Deletion of the loaded track
pub struct PlaybackController<C: TrackCatalog, B: MediaBackend> {
    catalog: C,
    backend: B,
    config: PlaybackConfig,

    session: PlaybackSession,
    current_track: Option<Track>,
    media: Option<ActiveMedia>,

    /// Bumped on every teardown; signals tagged with an older value are stale
    generation: u64,

    /// Whether a track that is still loading should start when ready
    play_on_ready: bool,

    pending_events: Vec<PlaybackEvent>,
}

impl<C: TrackCatalog, B: MediaBackend> PlaybackController<C, B> {
    /// Create an idle controller
    pub fn new(catalog: C, backend: B, config: PlaybackConfig) -> Self {
        Self {
            catalog,
            backend,
            play_on_ready: config.autoplay,
            config,
            session: PlaybackSession::new(),
            current_track: None,
            media: None,
            generation: 0,
            pending_events: Vec::new(),
        }
    }

    // ===== Track loading =====

    /// Load the track at `index` and start it once ready
    ///
    /// An out-of-range index is rejected without touching the current track.
    pub fn load_track(&mut self, index: usize) -> Result<()> {
        let Some(track) = self.catalog.track_at(index) else {
            let len = self.catalog.len();
            warn!("Ignoring load of index {} (playlist has {} tracks)", index, len);
            return Err(PlaybackError::IndexOutOfBounds { index, len });
        };

        let previous_track_id = self.current_track.as_ref().map(|t| t.id.clone());
        self.teardown();

        info!(
            "Loading track {} '{}' ({})",
            index,
            track.title,
            if track.is_stems() { "stems" } else { "single" }
        );

        let (media, disabled) = match self.open_media(&track) {
            Ok(opened) => opened,
            Err(e) => {
                error!("Track '{}' cannot play: {}", track.title, e);
                self.current_track = None;
                self.session.set_current_index(None);
                self.set_state(PlaybackState::Idle);
                self.emit_error(e.to_string());
                return Err(e);
            }
        };

        let mix = match &media {
            ActiveMedia::Stems { group, .. } => Some(group.mix()),
            ActiveMedia::Single(_) => None,
        };

        self.media = Some(media);
        self.session.set_current_index(Some(index));
        self.session.set_active_stems(mix);
        self.current_track = Some(track.clone());
        self.play_on_ready = self.config.autoplay;

        self.pending_events.push(PlaybackEvent::TrackChanged {
            track,
            previous_track_id,
        });
        self.set_state(PlaybackState::Loading);

        for stem in disabled {
            self.pending_events.push(PlaybackEvent::StemDisabled {
                stem,
                reason: "missing media address".to_string(),
            });
        }

        Ok(())
    }

    /// Create and load units for `track`
    fn open_media(&mut self, track: &Track) -> Result<(ActiveMedia, Vec<StemKind>)> {
        match &track.mode {
            TrackMode::Single { audio } => {
                let mut unit = MediaUnit::new(self.backend.create_element());
                unit.load(audio, UnitTag::main(self.generation))?;
                Ok((ActiveMedia::Single(unit), Vec::new()))
            }
            TrackMode::Stems { stems } => {
                let mut group = StemGroup::new(&mut self.backend);
                match group.load_stems(stems, self.generation) {
                    Ok(disabled) => Ok((
                        ActiveMedia::Stems {
                            group,
                            drift: DriftCorrector::from_config(&self.config),
                        },
                        disabled,
                    )),
                    Err(e) => {
                        group.unload_all();
                        Err(e)
                    }
                }
            }
        }
    }

    /// Stop, rewind and release the active media, and cancel its signals
    fn teardown(&mut self) {
        if let Some(media) = self.media.take() {
            match media {
                ActiveMedia::Single(mut unit) => {
                    unit.stop();
                    unit.unload();
                }
                ActiveMedia::Stems {
                    mut group,
                    mut drift,
                } => {
                    drift.stop();
                    group.stop_all();
                    group.unload_all();
                }
            }
            debug!("Tore down media of generation {}", self.generation);
        }

        self.generation += 1;
        self.session.set_active_stems(None);
    }

    // ===== Media signals =====

    /// Feed an asynchronous media signal into the controller
    ///
    /// Signals from a previous load are ignored.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if event.tag.generation != self.generation {
            debug!(
                "Ignoring stale {:?} from generation {} (current {})",
                event.signal, event.tag.generation, self.generation
            );
            return;
        }

        let outcome = match (&mut self.media, event.tag.slot, event.signal) {
            (Some(ActiveMedia::Single(unit)), UnitSlot::Main, signal) => match signal {
                MediaSignal::Ready { duration } => {
                    if unit.on_ready(duration) {
                        SignalOutcome::Ready
                    } else {
                        SignalOutcome::Nothing
                    }
                }
                MediaSignal::Ended => {
                    unit.on_ended();
                    SignalOutcome::Ended
                }
                MediaSignal::Failed { reason } => SignalOutcome::TrackFailed(reason),
            },
            (Some(ActiveMedia::Stems { group, drift }), UnitSlot::Stem(kind), signal) => {
                match signal {
                    MediaSignal::Ready { duration } => {
                        group.on_unit_ready(kind, duration);
                        if kind.is_leader() {
                            SignalOutcome::Ready
                        } else {
                            SignalOutcome::Nothing
                        }
                    }
                    MediaSignal::Ended => {
                        group.on_unit_ended(kind);
                        if kind.is_leader() {
                            drift.stop();
                            SignalOutcome::Ended
                        } else {
                            SignalOutcome::Nothing
                        }
                    }
                    MediaSignal::Failed { reason } => match group.on_unit_failed(kind, &reason) {
                        Ok(()) => SignalOutcome::StemDisabled(kind, reason),
                        Err(_) => SignalOutcome::TrackFailed(reason),
                    },
                }
            }
            (_, slot, signal) => {
                debug!("Ignoring {:?} for slot {:?} with no matching unit", signal, slot);
                SignalOutcome::Nothing
            }
        };

        match outcome {
            SignalOutcome::Nothing => {}
            SignalOutcome::Ready => self.on_media_ready(),
            SignalOutcome::Ended => self.on_track_ended(),
            SignalOutcome::TrackFailed(reason) => self.fail_current(&reason),
            SignalOutcome::StemDisabled(stem, reason) => {
                if let Some(mix) = self.session.active_stems_mut() {
                    mix.set_disabled(stem, true);
                    mix.set_muted(stem, true);
                }
                self.pending_events
                    .push(PlaybackEvent::StemDisabled { stem, reason });
            }
        }
    }

    fn on_media_ready(&mut self) {
        if self.session.state() != PlaybackState::Loading {
            return;
        }

        if self.play_on_ready && self.start_media() {
            self.set_state(PlaybackState::Playing);
        } else {
            self.set_state(PlaybackState::Paused);
        }
    }

    fn on_track_ended(&mut self) {
        if let Some(track) = &self.current_track {
            info!("Track '{}' finished", track.title);
            self.pending_events.push(PlaybackEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }

        if let Err(e) = self.play_next() {
            error!("Failed to advance after track end: {}", e);
        }
    }

    fn fail_current(&mut self, reason: &str) {
        let title = self
            .current_track
            .as_ref()
            .map_or_else(String::new, |t| t.title.clone());
        error!("Track '{}' failed to load: {}", title, reason);

        self.teardown();
        self.current_track = None;
        self.session.set_current_index(None);
        self.set_state(PlaybackState::Idle);
        self.emit_error(format!("Cannot play '{}': {}", title, reason));
    }

    // ===== Transport =====

    /// Start or resume playback
    ///
    /// While loading this only records that playback should start once ready.
    pub fn play(&mut self) {
        match self.session.state() {
            PlaybackState::Idle | PlaybackState::Playing => {}
            PlaybackState::Loading => self.play_on_ready = true,
            PlaybackState::Paused => {
                if self.start_media() {
                    self.set_state(PlaybackState::Playing);
                } else {
                    warn!("Resume failed: media did not start");
                }
            }
        }
    }

    /// Pause playback
    pub fn pause(&mut self) {
        match self.session.state() {
            PlaybackState::Idle | PlaybackState::Paused => {}
            PlaybackState::Loading => self.play_on_ready = false,
            PlaybackState::Playing => {
                match self.media.as_mut() {
                    Some(ActiveMedia::Single(unit)) => unit.pause(),
                    Some(ActiveMedia::Stems { group, drift }) => {
                        drift.stop();
                        group.pause_all();
                    }
                    None => {}
                }
                self.set_state(PlaybackState::Paused);
            }
        }
    }

    /// Flip between playing and paused; no-op when idle
    pub fn toggle_play_pause(&mut self) {
        match self.session.state() {
            PlaybackState::Idle => debug!("Ignoring toggle: nothing loaded"),
            PlaybackState::Loading => self.play_on_ready = !self.play_on_ready,
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.play(),
        }
    }

    /// Stop playback and unload the current track
    pub fn stop(&mut self) {
        self.teardown();
        self.current_track = None;
        self.session.set_current_index(None);
        self.set_state(PlaybackState::Idle);
    }

    fn start_media(&mut self) -> bool {
        match self.media.as_mut() {
            Some(ActiveMedia::Single(unit)) => {
                unit.play();
                unit.is_playing()
            }
            Some(ActiveMedia::Stems { group, drift }) => {
                if group.play_all() {
                    drift.start(group.generation());
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// Load the next track, wrapping from the last to the first
    pub fn play_next(&mut self) -> Result<()> {
        let len = self.catalog.len();
        if len == 0 {
            debug!("Ignoring next: playlist is empty");
            return Ok(());
        }

        let next = match self.session.current_index() {
            Some(index) => (index + 1) % len,
            None => 0,
        };
        self.load_track(next)
    }

    /// Load the previous track, wrapping from the first to the last
    pub fn play_previous(&mut self) -> Result<()> {
        let len = self.catalog.len();
        if len == 0 {
            debug!("Ignoring previous: playlist is empty");
            return Ok(());
        }

        let previous = match self.session.current_index() {
            Some(index) if index > 0 => (index - 1).min(len - 1),
            _ => len - 1,
        };
        self.load_track(previous)
    }

    // ===== Seeking =====

    /// Move by a signed number of seconds, clamped to the track bounds
    pub fn seek_by(&mut self, delta_secs: f64) -> Result<Duration> {
        let position = match self.media.as_mut() {
            Some(ActiveMedia::Single(unit)) if unit.is_ready() => unit.seek_by(delta_secs),
            Some(ActiveMedia::Stems { group, drift }) if group.leader().is_ready() => {
                drift.suspend();
                let position = group.seek_by(delta_secs);
                drift.resume();
                position
            }
            _ => return Err(PlaybackError::NoTrackLoaded),
        };

        self.emit_position();
        Ok(position)
    }

    /// Move to an absolute position, clamped to the track bounds
    pub fn seek_to(&mut self, position: Duration) -> Result<Duration> {
        let position = match self.media.as_mut() {
            Some(ActiveMedia::Single(unit)) if unit.is_ready() => unit.set_position(position),
            Some(ActiveMedia::Stems { group, drift }) if group.leader().is_ready() => {
                drift.suspend();
                let position = group.seek_to(position);
                drift.resume();
                position
            }
            _ => return Err(PlaybackError::NoTrackLoaded),
        };

        self.emit_position();
        Ok(position)
    }

    /// Skip forward by the configured seek step
    pub fn seek_forward(&mut self) -> Result<Duration> {
        self.seek_by(self.config.seek_step_secs)
    }

    /// Skip backward by the configured seek step
    pub fn seek_backward(&mut self) -> Result<Duration> {
        self.seek_by(-self.config.seek_step_secs)
    }

    // ===== Stems =====

    /// Mute or unmute one stem of the loaded stem track
    pub fn set_stem_muted(&mut self, stem: StemKind, muted: bool) -> Result<()> {
        let Some(ActiveMedia::Stems { group, .. }) = self.media.as_mut() else {
            return Err(PlaybackError::NotStemTrack);
        };

        group.set_stem_muted(stem, muted)?;
        if let Some(mix) = self.session.active_stems_mut() {
            mix.set_muted(stem, muted);
        }

        debug!("Stem {} {}", stem, if muted { "muted" } else { "unmuted" });
        self.pending_events
            .push(PlaybackEvent::StemMuteChanged { stem, muted });
        Ok(())
    }

    /// Mute or unmute a stem by its UI name (`"vocals"`, `"bass"`, ...)
    pub fn set_stem_muted_by_name(&mut self, name: &str, muted: bool) -> Result<()> {
        let stem: StemKind = name.parse()?;
        self.set_stem_muted(stem, muted)
    }

    /// Check if a stem of the loaded track is muted
    pub fn stem_muted(&self, stem: StemKind) -> Option<bool> {
        self.session.active_stems().map(|mix| mix.is_muted(stem))
    }

    // ===== Drift correction =====

    /// Periodic work: drift correction and position updates
    ///
    /// The host calls this every `drift_interval()`. Returns the number of
    /// follower corrections made.
    pub fn tick(&mut self) -> usize {
        let corrections = match self.media.as_mut() {
            Some(ActiveMedia::Stems { group, drift }) => drift.tick(group),
            _ => 0,
        };

        if corrections > 0 {
            self.pending_events
                .push(PlaybackEvent::DriftCorrected { corrections });
        }
        if self.session.is_playing() {
            self.emit_position();
        }

        corrections
    }

    /// How often `tick` should run
    pub fn drift_interval(&self) -> Duration {
        self.config.drift_interval()
    }

    // ===== Catalog =====

    /// Validate and add a track to the catalog
    pub fn import_track(&mut self, draft: TrackDraft) -> Result<TrackId> {
        Ok(self.catalog.add_track(draft)?)
    }

    /// Delete a track, stopping it first if it is loaded
    ///
    /// When the loaded track is deleted, the track that takes its index is
    /// loaded; if it was last, the new last track is; if the playlist is now
    /// empty the controller goes idle.
    pub fn delete_track(&mut self, id: &TrackId) -> Result<()> {
        let index = self
            .catalog
            .position_of(id)
            .ok_or_else(|| CoreError::TrackNotFound(id.clone()))?;
        let is_current = self.current_track.as_ref().map_or(false, |t| &t.id == id);

        if is_current {
            info!("Deleting loaded track at index {}, stopping playback", index);
            self.stop();
        }

        self.catalog.delete_track(id)?;
        self.pending_events.push(PlaybackEvent::TrackRemoved {
            track_id: id.clone(),
        });

        if is_current {
            let len = self.catalog.len();
            if len > 0 {
                return self.load_track(index.min(len - 1));
            }
        } else if let Some(current) = self.session.current_index() {
            if index < current {
                self.session.set_current_index(Some(current - 1));
            }
        }

        Ok(())
    }

    /// The catalog
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Current playlist
    pub fn playlist(&self) -> Vec<Track> {
        self.catalog.list_tracks()
    }

    /// Playlist grouped by `(artist, album)`
    pub fn albums(&self) -> Vec<AlbumGroup> {
        self.catalog.albums()
    }

    // ===== State queries =====

    /// Session state
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Controller state
    pub fn state(&self) -> PlaybackState {
        self.session.state()
    }

    /// Check if audio is playing
    pub fn is_playing(&self) -> bool {
        self.session.is_playing()
    }

    /// Playlist index of the loaded track
    pub fn current_index(&self) -> Option<usize> {
        self.session.current_index()
    }

    /// The loaded track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Position of the loaded track (the leader's for stems)
    pub fn position(&self) -> Duration {
        match &self.media {
            Some(ActiveMedia::Single(unit)) => unit.position(),
            Some(ActiveMedia::Stems { group, .. }) => group.position(),
            None => Duration::ZERO,
        }
    }

    /// Duration of the loaded track, once known
    pub fn duration(&self) -> Option<Duration> {
        match &self.media {
            Some(ActiveMedia::Single(unit)) => unit.duration(),
            Some(ActiveMedia::Stems { group, .. }) => group.duration(),
            None => None,
        }
    }

    /// Stem mix of the loaded track
    pub fn stem_mix(&self) -> Option<StemMix> {
        self.session.active_stems().copied()
    }

    /// The loaded stem group, if the track is in stem mode
    pub fn stem_group(&self) -> Option<&StemGroup> {
        match &self.media {
            Some(ActiveMedia::Stems { group, .. }) => Some(group),
            _ => None,
        }
    }

    /// The loaded unit, if the track is a single stream
    pub fn single_unit(&self) -> Option<&MediaUnit> {
        match &self.media {
            Some(ActiveMedia::Single(unit)) => Some(unit),
            _ => None,
        }
    }

    /// Check if drift correction is currently armed
    pub fn is_drift_correcting(&self) -> bool {
        matches!(&self.media, Some(ActiveMedia::Stems { drift, .. }) if drift.is_active())
    }

    /// Current load generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ===== Events =====

    /// Drain all pending events
    ///
    /// Returns all events that have been emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn set_state(&mut self, state: PlaybackState) {
        let old = self.session.state();
        if old == state {
            return;
        }

        debug!("Playback state {:?} -> {:?}", old, state);
        self.session.set_state(state);
        self.pending_events
            .push(PlaybackEvent::StateChanged { state });

        if old == PlaybackState::Playing || state == PlaybackState::Playing {
            self.pending_events.push(PlaybackEvent::PlayStateChanged {
                is_playing: state == PlaybackState::Playing,
            });
        }
    }

    fn emit_position(&mut self) {
        self.pending_events.push(PlaybackEvent::PositionUpdate {
            position_ms: u64::try_from(self.position().as_millis()).unwrap_or(u64::MAX),
            // Unbounded streams report zero, like an unknown duration
            duration_ms: self
                .duration()
                .and_then(|d| u64::try_from(d.as_millis()).ok())
                .unwrap_or(0),
        });
    }

    fn emit_error(&mut self, message: String) {
        self.pending_events.push(PlaybackEvent::Error { message });
    }
}
