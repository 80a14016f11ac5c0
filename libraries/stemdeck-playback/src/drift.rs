//! Drift correction for stem groups
//!
//! Each stem is an independent media resource with its own clock, so four
//! stems started together slowly walk apart. While a group plays, the
//! corrector periodically compares every follower with the leader and snaps
//! any follower that is further away than the threshold.
//!
//! The corrector is armed with the generation of the group it belongs to and
//! refuses to touch a group from any other generation.

use crate::config::PlaybackConfig;
use crate::stems::StemGroup;
use stemdeck_core::StemKind;
use std::time::Duration;
use tracing::debug;

/// Periodic follower re-alignment
#[derive(Debug, Clone)]
pub struct DriftCorrector {
    interval: Duration,
    threshold: Duration,
    /// Generation of the group this corrector is armed for
    armed: Option<u64>,
    suspended: bool,
    total_corrections: u64,
}

impl DriftCorrector {
    /// Create a disarmed corrector
    pub fn new(interval: Duration, threshold: Duration) -> Self {
        Self {
            interval,
            threshold,
            armed: None,
            suspended: false,
            total_corrections: 0,
        }
    }

    /// Create a corrector using the configured interval and threshold
    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.drift_interval(), config.drift_threshold())
    }

    /// Arm for the group with `generation`
    pub fn start(&mut self, generation: u64) {
        self.armed = Some(generation);
        self.suspended = false;
    }

    /// Disarm
    pub fn stop(&mut self) {
        self.armed = None;
        self.suspended = false;
    }

    /// Hold off ticks while the transport is being mutated
    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Allow ticks again after `suspend`
    pub fn resume(&mut self) {
        self.suspended = false;
    }

    /// Check if ticks will correct anything
    pub fn is_active(&self) -> bool {
        self.armed.is_some() && !self.suspended
    }

    /// How often the host should call `tick`
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offset above which a follower is snapped
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Corrections applied since creation
    pub fn total_corrections(&self) -> u64 {
        self.total_corrections
    }

    /// Run one correction pass
    ///
    /// Returns the number of followers snapped to the leader. The leader is
    /// never moved. Disarms itself if the leader is no longer playing.
    pub fn tick(&mut self, group: &mut StemGroup) -> usize {
        let Some(generation) = self.armed else {
            return 0;
        };
        if self.suspended {
            return 0;
        }
        if generation != group.generation() {
            debug!(
                "Drift corrector armed for generation {} but group is {}; disarming",
                generation,
                group.generation()
            );
            self.stop();
            return 0;
        }

        let (leader, followers) = group.split_leader_mut();
        if !leader.is_playing() {
            self.stop();
            return 0;
        }

        let reference = leader.position();
        let mut corrections = 0;

        for (kind, follower) in StemKind::ALL[1..].iter().zip(followers.iter_mut()) {
            if !follower.is_playing() || !follower.is_ready() {
                continue;
            }

            let position = follower.position();
            let drift = if position > reference {
                position - reference
            } else {
                reference - position
            };

            if drift > self.threshold {
                debug!("Stem {} drifted {:?}, snapping to {:?}", kind, drift, reference);
                follower.set_position(reference);
                corrections += 1;
            }
        }

        self.total_corrections += corrections as u64;
        corrections
    }
}

impl Default for DriftCorrector {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}
