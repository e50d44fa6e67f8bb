//! Beat-synchronous automatic shape cycling.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::params::ScheduleConfig;
use crate::shape::ShapeKind;

/// Scheduler state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleState {
    /// Nothing armed (never armed, or a shape is pinned)
    Idle,
    /// Next change is due at `next_change_at`
    Armed { next_change_at: f64, bar_seconds: f64 },
}

/// Decides when the form changes shape and which shape comes next
pub struct ShapeCycleScheduler {
    config: ScheduleConfig,
    state: ScheduleState,
    pinned: Option<ShapeKind>,
    rng: StdRng,
}

impl Default for ShapeCycleScheduler {
    fn default() -> Self {
        Self::new(ScheduleConfig::default())
    }
}

impl ShapeCycleScheduler {
    /// Invalid timing falls back to the defaults (the seed is kept)
    pub fn new(config: ScheduleConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(reason) => {
                warn!(%reason, "invalid schedule config, using default timing");
                ScheduleConfig {
                    seed: config.seed,
                    ..ScheduleConfig::default()
                }
            }
        };
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            state: ScheduleState::Idle,
            pinned: None,
            rng,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn next_change_at(&self) -> Option<f64> {
        match self.state {
            ScheduleState::Armed { next_change_at, .. } => Some(next_change_at),
            ScheduleState::Idle => None,
        }
    }

    pub fn pinned(&self) -> Option<ShapeKind> {
        self.pinned
    }

    pub fn is_cycling(&self) -> bool {
        self.pinned.is_none()
    }

    /// Schedule the next change one phrase from `current_time`
    ///
    /// A missing or unusable bar length falls back to the configured default.
    /// Does nothing while a shape is pinned.
    pub fn arm(&mut self, current_time: f64, bar_seconds: Option<f64>) {
        if self.pinned.is_some() {
            return;
        }
        let bar_seconds = bar_seconds
            .filter(|b| b.is_finite() && *b > 0.0)
            .unwrap_or(self.config.fallback_bar_s);
        let now = if current_time.is_finite() {
            current_time
        } else {
            0.0
        };
        let next_change_at = now + self.config.phrase_bars * bar_seconds;
        debug!(next_change_at, bar_seconds, "shape cycle armed");
        self.state = ScheduleState::Armed {
            next_change_at,
            bar_seconds,
        };
    }

    /// Per-frame check; returns the new shape when a change is due
    ///
    /// Fires at most once per call and re-arms from `current_time` with the
    /// same bar length.
    pub fn tick(&mut self, current_time: f64) -> Option<ShapeKind> {
        let ScheduleState::Armed {
            next_change_at,
            bar_seconds,
        } = self.state
        else {
            return None;
        };
        if self.pinned.is_some() || !(current_time >= next_change_at) {
            return None;
        }

        let shape = ShapeKind::ALL[self.rng.gen_range(0..ShapeKind::ALL.len())];
        self.arm(current_time, Some(bar_seconds));
        Some(shape)
    }

    /// Fix the shape and stop cycling
    pub fn pin(&mut self, shape: ShapeKind) {
        self.pinned = Some(shape);
        self.state = ScheduleState::Idle;
    }

    /// Resume cycling, armed from `current_time`
    pub fn enable_cycling(&mut self, current_time: f64, bar_seconds: Option<f64>) {
        self.pinned = None;
        self.arm(current_time, bar_seconds);
    }

    /// Return to idle without changing the pin
    pub fn disarm(&mut self) {
        self.state = ScheduleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_never_fires() {
        let mut scheduler = ShapeCycleScheduler::default();
        assert_eq!(scheduler.tick(1e9), None);
    }

    #[test]
    fn test_arm_uses_sixteen_bars() {
        let mut scheduler = ShapeCycleScheduler::default();
        scheduler.arm(10.0, Some(2.0));
        assert_eq!(scheduler.next_change_at(), Some(42.0));

        scheduler.arm(0.0, None);
        assert_eq!(scheduler.next_change_at(), Some(120.0));

        scheduler.arm(0.0, Some(f64::NAN));
        assert_eq!(scheduler.next_change_at(), Some(120.0));
    }

    #[test]
    fn test_fires_exactly_once_per_crossing() {
        let mut scheduler = ShapeCycleScheduler::default();
        scheduler.arm(0.0, Some(0.5));

        let dt = 1.0 / 60.0;
        let mut fired_at = Vec::new();
        for frame in 0..(60 * 30) {
            let t = frame as f64 * dt;
            let due = scheduler.next_change_at().unwrap();
            if scheduler.tick(t).is_some() {
                assert!(t >= due, "fired at {} before {}", t, due);
                fired_at.push(t);
            }
        }

        // 8 s phrases over 30 s of frames
        assert_eq!(fired_at.len(), 3);
        for pair in fired_at.windows(2) {
            assert!((pair[1] - pair[0] - 8.0).abs() <= dt + 1e-9);
        }
    }

    #[test]
    fn test_large_step_fires_once() {
        let mut scheduler = ShapeCycleScheduler::default();
        scheduler.arm(0.0, Some(1.0));
        assert!(scheduler.tick(50.0).is_some());
        assert!(scheduler.tick(50.0).is_none());
        assert_eq!(scheduler.next_change_at(), Some(66.0));
    }

    #[test]
    fn test_pin_disables_until_reenabled() {
        let mut scheduler = ShapeCycleScheduler::default();
        scheduler.arm(0.0, Some(1.0));
        scheduler.pin(ShapeKind::Box);

        assert_eq!(scheduler.pinned(), Some(ShapeKind::Box));
        assert_eq!(scheduler.tick(100.0), None);
        scheduler.arm(100.0, Some(1.0));
        assert_eq!(scheduler.state(), ScheduleState::Idle);

        scheduler.enable_cycling(100.0, Some(1.0));
        assert!(scheduler.is_cycling());
        assert_eq!(scheduler.tick(115.0), None);
        assert!(scheduler.tick(116.0).is_some());
    }

    #[test]
    fn test_invalid_config_uses_default_timing() {
        let mut scheduler = ShapeCycleScheduler::new(ScheduleConfig {
            phrase_bars: -1.0,
            ..ScheduleConfig::default()
        });
        scheduler.arm(0.0, Some(1.0));
        assert_eq!(scheduler.next_change_at(), Some(16.0));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let run = |seed| {
            let mut scheduler = ShapeCycleScheduler::new(ScheduleConfig {
                seed,
                ..ScheduleConfig::default()
            });
            scheduler.arm(0.0, Some(1.0));
            (1..=20)
                .filter_map(|i| scheduler.tick(i as f64 * 16.0))
                .collect::<Vec<_>>()
        };

        let a = run(7);
        assert_eq!(a.len(), 20);
        assert_eq!(a, run(7));
        // Uniform over the set: twenty draws should reach more than one shape
        assert!(a.iter().any(|&s| s != a[0]));
    }
}
