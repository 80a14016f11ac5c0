//! Stem group - four media units played as one transport
//!
//! The vocals unit is the leader: its clock is the group's clock, its
//! readiness gates playback and its end of stream ends the track. Followers
//! (bass, drums, other) never seek on their own; every position change is
//! applied to the leader first and then copied from it.

use crate::element::MediaBackend;
use crate::error::{PlaybackError, Result};
use crate::session::StemMix;
use crate::types::UnitTag;
use crate::unit::{MediaUnit, UnitState};
use stemdeck_core::{StemKind, StemRefs, NUM_STEMS};
use std::time::Duration;
use tracing::{debug, warn};

/// Four stem units sharing one transport
pub struct StemGroup {
    /// Indexed by `StemKind::index()`, leader first
    units: [MediaUnit; NUM_STEMS],
    generation: u64,
    playing: bool,
}

impl StemGroup {
    /// Create a group with fresh elements from `backend`
    pub fn new(backend: &mut dyn MediaBackend) -> Self {
        Self {
            units: std::array::from_fn(|_| MediaUnit::new(backend.create_element())),
            generation: 0,
            playing: false,
        }
    }

    /// Load all four stems
    ///
    /// All loads are issued before this returns; none waits for another.
    /// A follower that fails to load is disabled and reported in the returned
    /// list while the others carry on. A leader failure fails the whole group.
    pub fn load_stems(&mut self, refs: &StemRefs, generation: u64) -> Result<Vec<StemKind>> {
        self.generation = generation;
        self.playing = false;

        let mut disabled = Vec::new();
        let mut leader_error = None;

        for (kind, address) in refs.iter() {
            let unit = &mut self.units[kind.index()];
            if let Err(e) = unit.load(address, UnitTag::stem(generation, kind)) {
                if kind.is_leader() {
                    leader_error = Some(e);
                } else {
                    warn!("Stem {} failed to load, continuing without it: {}", kind, e);
                    unit.disable();
                    disabled.push(kind);
                }
            }
        }

        match leader_error {
            Some(e) => Err(PlaybackError::LeaderUnavailable(e.to_string())),
            None => Ok(disabled),
        }
    }

    /// Align followers to the leader and start all units
    ///
    /// Requires the leader to be ready. The leader starts first so followers
    /// join a clock that is already running. Returns false if the leader did
    /// not start.
    pub fn play_all(&mut self) -> bool {
        if !self.leader().is_ready() {
            debug!("play_all deferred: leader not ready");
            return false;
        }

        let [leader, followers @ ..] = &mut self.units;
        let position = leader.position();
        for follower in followers.iter_mut().filter(|unit| !unit.is_failed()) {
            follower.set_position(position);
        }

        leader.play();
        if !leader.is_playing() {
            return false;
        }

        for follower in followers.iter_mut() {
            if Self::can_join(follower, position) {
                follower.play();
            }
        }

        self.playing = true;
        true
    }

    /// Check if an aligned follower still has audio at `position`
    ///
    /// A stem shorter than the leader stays parked at its end instead of
    /// restarting from zero.
    fn can_join(follower: &MediaUnit, position: Duration) -> bool {
        !follower.is_failed()
            && follower.state() != UnitState::Ended
            && follower.duration().map_or(true, |duration| position < duration)
    }

    /// Pause all units
    pub fn pause_all(&mut self) {
        for unit in &mut self.units {
            unit.pause();
        }
        self.playing = false;
    }

    /// Pause all units and rewind them to zero
    pub fn stop_all(&mut self) {
        for unit in &mut self.units {
            unit.stop();
        }
        self.playing = false;
    }

    /// Release all resources
    pub fn unload_all(&mut self) {
        for unit in &mut self.units {
            unit.unload();
        }
        self.playing = false;
    }

    /// Seek the leader to `position` and copy the result to followers
    pub fn seek_to(&mut self, position: Duration) -> Duration {
        let playing = self.playing;
        let [leader, followers @ ..] = &mut self.units;
        let applied = leader.set_position(position);
        Self::copy_position(followers, applied, playing);
        applied
    }

    /// Seek the leader by `delta_secs` and copy the result to followers
    pub fn seek_by(&mut self, delta_secs: f64) -> Duration {
        let playing = self.playing;
        let [leader, followers @ ..] = &mut self.units;
        let applied = leader.seek_by(delta_secs);
        Self::copy_position(followers, applied, playing);
        applied
    }

    /// While the group plays, a follower that had ended and was moved back
    /// into its audio rejoins playback.
    fn copy_position(followers: &mut [MediaUnit], position: Duration, playing: bool) {
        for follower in followers.iter_mut().filter(|unit| !unit.is_failed()) {
            follower.set_position(position);
            if playing && !follower.is_playing() && Self::can_join(follower, position) {
                follower.play();
                debug!("Follower rejoined playback at {:?}", position);
            }
        }
    }

    /// Mute or unmute one stem
    ///
    /// Muted stems keep playing silently so unmuting needs no re-sync.
    /// A disabled stem stays muted.
    pub fn set_stem_muted(&mut self, kind: StemKind, muted: bool) -> Result<()> {
        let unit = &mut self.units[kind.index()];
        if unit.is_failed() && !muted {
            return Err(PlaybackError::StemDisabled(kind));
        }

        unit.set_muted(muted);
        Ok(())
    }

    /// A unit reported it is buffered
    ///
    /// A follower that becomes ready after the group started is aligned to
    /// the leader and joins playback.
    pub fn on_unit_ready(&mut self, kind: StemKind, duration: Duration) {
        if !self.units[kind.index()].on_ready(duration) {
            return;
        }

        if kind.is_leader() || !self.playing {
            return;
        }

        let position = self.leader().position();
        let unit = &mut self.units[kind.index()];
        unit.set_position(position);
        if Self::can_join(unit, position) {
            unit.play();
            debug!("Stem {} joined playback at {:?}", kind, position);
        }
    }

    /// A unit reported end of stream
    ///
    /// Only the leader's end stops the group.
    pub fn on_unit_ended(&mut self, kind: StemKind) {
        self.units[kind.index()].on_ended();
        if kind.is_leader() {
            self.playing = false;
        }
    }

    /// A unit reported a load or decode failure
    ///
    /// Followers are disabled; a leader failure is returned to the caller.
    pub fn on_unit_failed(&mut self, kind: StemKind, reason: &str) -> Result<()> {
        self.units[kind.index()].disable();

        if kind.is_leader() {
            self.playing = false;
            return Err(PlaybackError::LeaderUnavailable(reason.to_string()));
        }

        warn!("Stem {} disabled: {}", kind, reason);
        Ok(())
    }

    /// Leader unit and the follower slice, for drift correction
    pub(crate) fn split_leader_mut(&mut self) -> (&MediaUnit, &mut [MediaUnit]) {
        let [leader, followers @ ..] = &mut self.units;
        (leader, followers)
    }

    /// The timing reference
    pub fn leader(&self) -> &MediaUnit {
        &self.units[StemKind::LEADER.index()]
    }

    /// One stem unit
    pub fn unit(&self, kind: StemKind) -> &MediaUnit {
        &self.units[kind.index()]
    }

    /// Group position (the leader's clock)
    pub fn position(&self) -> Duration {
        self.leader().position()
    }

    /// Group duration (the leader's)
    pub fn duration(&self) -> Option<Duration> {
        self.leader().duration()
    }

    /// Check if the group transport is running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Load generation this group belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Followers that are not disabled
    pub fn live_followers(&self) -> usize {
        self.units[1..].iter().filter(|unit| !unit.is_failed()).count()
    }

    /// Per-stem mute and disabled flags
    pub fn mix(&self) -> StemMix {
        let mut mix = StemMix::default();
        for kind in StemKind::ALL {
            let unit = self.unit(kind);
            mix.set_muted(kind, unit.is_muted());
            mix.set_disabled(kind, unit.is_failed());
        }
        mix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MediaElement;
    use crate::unit::testing::{ElementState, TestElement};
    use stemdeck_core::MediaAddress;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct TestBackend {
        elements: Vec<Rc<RefCell<ElementState>>>,
    }

    impl MediaBackend for TestBackend {
        fn create_element(&mut self) -> Box<dyn MediaElement> {
            let state = Rc::new(RefCell::new(ElementState::default()));
            self.elements.push(Rc::clone(&state));
            Box::new(TestElement(state))
        }
    }

    fn refs() -> StemRefs {
        StemRefs {
            vocals: MediaAddress::new("v.mp3"),
            bass: MediaAddress::new("b.mp3"),
            drums: MediaAddress::new("d.mp3"),
            other: MediaAddress::new("o.mp3"),
        }
    }

    fn ready_group() -> (StemGroup, TestBackend) {
        let mut backend = TestBackend::default();
        let mut group = StemGroup::new(&mut backend);
        group.load_stems(&refs(), 7).unwrap();
        for kind in StemKind::ALL {
            group.on_unit_ready(kind, Duration::from_secs(200));
        }
        (group, backend)
    }

    #[test]
    fn load_issues_all_four_loads() {
        let mut backend = TestBackend::default();
        let mut group = StemGroup::new(&mut backend);
        let disabled = group.load_stems(&refs(), 3).unwrap();

        assert!(disabled.is_empty());
        assert_eq!(group.generation(), 3);
        let loaded: Vec<_> = backend
            .elements
            .iter()
            .map(|e| e.borrow().loaded.clone().unwrap())
            .collect();
        assert_eq!(loaded, vec!["v.mp3", "b.mp3", "d.mp3", "o.mp3"]);
    }

    #[test]
    fn play_all_waits_for_leader() {
        let mut backend = TestBackend::default();
        let mut group = StemGroup::new(&mut backend);
        group.load_stems(&refs(), 1).unwrap();

        assert!(!group.play_all());
        assert!(!group.is_playing());
    }

    #[test]
    fn play_all_aligns_followers_first() {
        let (mut group, backend) = ready_group();
        backend.elements[0].borrow_mut().position = Duration::from_secs(5);
        backend.elements[2].borrow_mut().position = Duration::from_millis(5300);

        assert!(group.play_all());

        for element in &backend.elements {
            let element = element.borrow();
            assert!(element.playing);
            assert_eq!(element.position, Duration::from_secs(5));
        }
    }

    #[test]
    fn missing_follower_is_disabled_not_fatal() {
        let mut backend = TestBackend::default();
        let mut group = StemGroup::new(&mut backend);
        let mut stems = refs();
        stems.drums = MediaAddress::new("");

        let disabled = group.load_stems(&stems, 1).unwrap();
        assert_eq!(disabled, vec![StemKind::Drums]);
        assert!(group.unit(StemKind::Drums).is_muted());
        assert_eq!(group.live_followers(), 2);

        group.on_unit_ready(StemKind::Vocals, Duration::from_secs(10));
        assert!(group.play_all());
        assert!(!backend.elements[StemKind::Drums.index()].borrow().playing);
        assert!(backend.elements[StemKind::Bass.index()].borrow().playing);
    }

    #[test]
    fn missing_leader_fails_load() {
        let mut backend = TestBackend::default();
        let mut group = StemGroup::new(&mut backend);
        let mut stems = refs();
        stems.vocals = MediaAddress::new(" ");

        let result = group.load_stems(&stems, 1);
        assert!(matches!(result, Err(PlaybackError::LeaderUnavailable(_))));
        // Followers were still issued
        assert!(backend.elements[3].borrow().loaded.is_some());
    }

    #[test]
    fn seek_copies_leader_position() {
        let (mut group, backend) = ready_group();
        group.play_all();

        assert_eq!(group.seek_by(30.0), Duration::from_secs(30));
        for element in &backend.elements {
            assert_eq!(element.borrow().position, Duration::from_secs(30));
        }

        assert_eq!(group.seek_to(Duration::from_secs(999)), Duration::from_secs(200));
        for element in &backend.elements {
            assert_eq!(element.borrow().position, Duration::from_secs(200));
        }
    }

    #[test]
    fn stop_all_rewinds_everything() {
        let (mut group, backend) = ready_group();
        group.play_all();
        group.seek_to(Duration::from_secs(40));

        group.stop_all();

        assert!(!group.is_playing());
        for element in &backend.elements {
            let element = element.borrow();
            assert!(!element.playing);
            assert_eq!(element.position, Duration::ZERO);
        }
    }

    #[test]
    fn disabled_stem_cannot_be_unmuted() {
        let (mut group, _backend) = ready_group();
        group.on_unit_failed(StemKind::Other, "decode error").unwrap();

        assert!(matches!(
            group.set_stem_muted(StemKind::Other, false),
            Err(PlaybackError::StemDisabled(StemKind::Other))
        ));
        assert!(group.set_stem_muted(StemKind::Other, true).is_ok());
        assert!(group.mix().is_disabled(StemKind::Other));
    }

    #[test]
    fn late_follower_joins_at_leader_position() {
        let mut backend = TestBackend::default();
        let mut group = StemGroup::new(&mut backend);
        group.load_stems(&refs(), 1).unwrap();
        group.on_unit_ready(StemKind::Vocals, Duration::from_secs(100));
        group.play_all();

        backend.elements[0].borrow_mut().position = Duration::from_secs(2);
        group.on_unit_ready(StemKind::Bass, Duration::from_secs(100));

        let bass = backend.elements[StemKind::Bass.index()].borrow();
        assert_eq!(bass.position, Duration::from_secs(2));
        assert!(bass.playing);
    }

    /// Bass is 100 s long, the other stems 120 s; everything sits at 110 s
    /// with bass already at its end.
    fn group_with_ended_bass() -> (StemGroup, TestBackend) {
        let mut backend = TestBackend::default();
        let mut group = StemGroup::new(&mut backend);
        group.load_stems(&refs(), 1).unwrap();
        for kind in StemKind::ALL {
            let secs = if kind == StemKind::Bass { 100 } else { 120 };
            group.on_unit_ready(kind, Duration::from_secs(secs));
        }
        assert!(group.play_all());

        group.seek_to(Duration::from_secs(110));
        group.on_unit_ended(StemKind::Bass);
        backend.elements[StemKind::Bass.index()].borrow_mut().playing = false;
        (group, backend)
    }

    #[test]
    fn resume_keeps_ended_follower_parked() {
        let (mut group, backend) = group_with_ended_bass();

        group.pause_all();
        assert!(group.play_all());

        let bass = backend.elements[StemKind::Bass.index()].borrow();
        assert_eq!(bass.position, Duration::from_secs(100));
        assert!(!bass.playing);
        assert_eq!(group.unit(StemKind::Bass).state(), UnitState::Ended);
        assert_eq!(group.position(), Duration::from_secs(110));
        assert!(backend.elements[StemKind::Drums.index()].borrow().playing);
    }

    #[test]
    fn seek_back_restarts_ended_follower() {
        let (mut group, backend) = group_with_ended_bass();

        group.seek_to(Duration::from_secs(10));

        let bass = backend.elements[StemKind::Bass.index()].borrow();
        assert_eq!(bass.position, Duration::from_secs(10));
        assert!(bass.playing);
        assert!(group.unit(StemKind::Bass).is_playing());
    }

    #[test]
    fn seek_back_while_paused_leaves_follower_paused() {
        let (mut group, backend) = group_with_ended_bass();
        group.pause_all();

        group.seek_by(-100.0);

        let bass = backend.elements[StemKind::Bass.index()].borrow();
        assert_eq!(bass.position, Duration::from_secs(10));
        assert!(!bass.playing);
        assert_eq!(group.unit(StemKind::Bass).state(), UnitState::Paused);
    }

    #[test]
    fn seek_within_shorter_stem_end_keeps_it_silent() {
        let (mut group, backend) = group_with_ended_bass();

        group.seek_to(Duration::from_secs(105));

        assert!(!backend.elements[StemKind::Bass.index()].borrow().playing);
        assert_eq!(group.unit(StemKind::Bass).state(), UnitState::Ended);
    }

    #[test]
    fn leader_end_stops_group() {
        let (mut group, _backend) = ready_group();
        group.play_all();

        group.on_unit_ended(StemKind::Bass);
        assert!(group.is_playing());

        group.on_unit_ended(StemKind::Vocals);
        assert!(!group.is_playing());
    }
}
