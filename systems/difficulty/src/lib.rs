#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Difficulty ramp that shrinks the popup interval round after round.

use std::{ops::RangeInclusive, time::Duration};

use rand::Rng;
use whack_core::{duration_from_secs, SessionConfig};

/// Pure mapping from round progression to popup durations and delays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyRamp {
    base_interval: f64,
    decay_factor: f64,
    floor: Option<f64>,
}

impl DifficultyRamp {
    /// Creates a ramp with an explicit base interval, decay and optional floor.
    #[must_use]
    pub const fn new(base_interval: f64, decay_factor: f64, floor: Option<f64>) -> Self {
        Self {
            base_interval,
            decay_factor,
            floor,
        }
    }

    /// Creates the ramp described by a session configuration.
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            config.base_interval_secs,
            config.decay_factor,
            config.min_interval_secs,
        )
    }

    /// Interval in force at the start of the game.
    #[must_use]
    pub const fn base_interval(&self) -> f64 {
        self.base_interval
    }

    /// Applies one round of decay to `current`.
    #[must_use]
    pub fn next_interval(&self, current: f64) -> f64 {
        self.clamp(current * self.decay_factor)
    }

    /// Interval in force at the start of `round`, before that round decays it.
    ///
    /// Round one starts at the base interval; every later round has seen one
    /// more decay step.
    #[must_use]
    pub fn interval_at_round(&self, round: u32) -> f64 {
        let steps = i32::try_from(round.saturating_sub(1)).unwrap_or(i32::MAX);
        self.clamp(self.base_interval * self.decay_factor.powi(steps))
    }

    /// Range the delay before the next round is drawn from: half to double
    /// the interval.
    #[must_use]
    pub fn delay_range(&self, interval: f64) -> RangeInclusive<f64> {
        (interval / 2.0)..=(interval * 2.0)
    }

    /// Draws the delay before the next round uniformly from [`Self::delay_range`].
    pub fn draw_delay<R: Rng + ?Sized>(&self, interval: f64, rng: &mut R) -> Duration {
        let range = self.delay_range(interval);
        if range.start() >= range.end() {
            return duration_from_secs(*range.start());
        }
        duration_from_secs(rng.gen_range(range))
    }

    fn clamp(&self, interval: f64) -> f64 {
        match self.floor {
            Some(floor) => interval.max(floor),
            None => interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPSILON: f64 = 1e-12;

    fn reference() -> DifficultyRamp {
        DifficultyRamp::from_config(&SessionConfig::default())
    }

    #[test]
    fn interval_follows_geometric_decay() {
        let ramp = reference();
        let mut interval = ramp.base_interval();
        for round in 1..=200 {
            let expected = 0.85 * 0.991_f64.powi(round as i32 - 1);
            assert!((ramp.interval_at_round(round) - expected).abs() < EPSILON);
            assert!((interval - expected).abs() < 1e-9, "round {round}");
            let next = ramp.next_interval(interval);
            assert!(next < interval, "interval must strictly decrease");
            interval = next;
        }
    }

    #[test]
    fn decay_has_no_floor_by_default() {
        let ramp = reference();
        assert!(ramp.interval_at_round(5_000) < 1e-15);
    }

    #[test]
    fn configured_floor_bounds_decay() {
        let ramp = DifficultyRamp::new(0.85, 0.5, Some(0.2));
        assert!((ramp.next_interval(0.3) - 0.2).abs() < EPSILON);
        assert!((ramp.interval_at_round(40) - 0.2).abs() < EPSILON);
        assert!((ramp.interval_at_round(1) - 0.85).abs() < EPSILON);
    }

    #[test]
    fn delay_range_spans_half_to_double() {
        let ramp = reference();
        let range = ramp.delay_range(0.8);
        assert!((range.start() - 0.4).abs() < EPSILON);
        assert!((range.end() - 1.6).abs() < EPSILON);
    }

    #[test]
    fn drawn_delays_stay_within_range() {
        let ramp = reference();
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        for _ in 0..1_000 {
            let delay = ramp.draw_delay(0.8, &mut rng).as_secs_f64();
            assert!((0.4 - 1e-9..=1.6 + 1e-9).contains(&delay), "delay {delay}");
        }
        assert_eq!(ramp.draw_delay(0.0, &mut rng), Duration::ZERO);
    }
}
