use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_SLOT_COUNT: u32 = 18;
const LEADING_THRESHOLDS: [u32; 4] = [4, 8, 10, 11];
const DEFAULT_DRAW_RANGE_MAX: u32 = 12;
const DEFAULT_MAX_ROUNDS: u32 = 30;
const DEFAULT_BASE_INTERVAL_SECS: f64 = 0.85;
const DEFAULT_DECAY_FACTOR: f64 = 0.991;
const DEFAULT_OPENING_DELAY_SECS: f64 = 1.0;
const DEFAULT_FRIENDLY_CHANCE: f64 = 1.0 / 3.0;
const DEFAULT_HIT_RETRACT_SECS: f64 = 0.25;
const DEFAULT_FRIENDLY_POINTS: i64 = 1;
const DEFAULT_HOSTILE_POINTS: i64 = -5;

/// Tuning surface for a single game session.
///
/// Every field has a default matching the classic arcade tuning, so partial
/// TOML documents deserialize cleanly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of slots in the pool.
    pub slot_count: u32,
    /// Per-rank inclusion thresholds for ranks `1..slot_count`.
    ///
    /// `None` derives the default table for the configured pool size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<u32>>,
    /// Inclusive upper bound of the uniform draw compared against thresholds.
    pub draw_range_max: u32,
    /// Last playable round; the session ends once the round counter exceeds it.
    pub max_rounds: u32,
    /// Popup interval in force at the start of round one, in seconds.
    pub base_interval_secs: f64,
    /// Multiplicative decay applied to the popup interval every round.
    pub decay_factor: f64,
    /// Optional lower bound for the popup interval, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_interval_secs: Option<f64>,
    /// Delay between session start and the first round, in seconds.
    pub opening_delay_secs: f64,
    /// Probability that an activation hosts a friendly target.
    pub friendly_chance: f64,
    /// Upper bound on how long a struck target stays visible, in seconds.
    pub hit_retract_secs: f64,
    /// Score delta for striking a friendly target.
    pub friendly_points: i64,
    /// Score delta for striking a hostile target.
    pub hostile_points: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            thresholds: None,
            draw_range_max: DEFAULT_DRAW_RANGE_MAX,
            max_rounds: DEFAULT_MAX_ROUNDS,
            base_interval_secs: DEFAULT_BASE_INTERVAL_SECS,
            decay_factor: DEFAULT_DECAY_FACTOR,
            min_interval_secs: None,
            opening_delay_secs: DEFAULT_OPENING_DELAY_SECS,
            friendly_chance: DEFAULT_FRIENDLY_CHANCE,
            hit_retract_secs: DEFAULT_HIT_RETRACT_SECS,
            friendly_points: DEFAULT_FRIENDLY_POINTS,
            hostile_points: DEFAULT_HOSTILE_POINTS,
        }
    }
}

impl SessionConfig {
    /// Threshold table in force for the configured pool.
    ///
    /// When no explicit table is configured, the leading thresholds are
    /// padded with `draw_range_max`, a value no draw can exceed, so later ranks
    /// never spawn.
    #[must_use]
    pub fn resolved_thresholds(&self) -> Vec<u32> {
        if let Some(thresholds) = &self.thresholds {
            return thresholds.clone();
        }

        let ranks = self.slot_count.saturating_sub(1) as usize;
        LEADING_THRESHOLDS
            .iter()
            .copied()
            .chain(std::iter::repeat(self.draw_range_max))
            .take(ranks)
            .collect()
    }

    /// Checks every invariant the session relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_thresholds(&self.resolved_thresholds(), self.slot_count)?;

        if self.max_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        if !(self.decay_factor > 0.0 && self.decay_factor < 1.0) {
            return Err(ConfigError::InvalidDecay(self.decay_factor));
        }
        if !(0.0..=1.0).contains(&self.friendly_chance) {
            return Err(ConfigError::InvalidChance(self.friendly_chance));
        }

        require_positive("base_interval_secs", self.base_interval_secs)?;
        require_positive("hit_retract_secs", self.hit_retract_secs)?;
        if let Some(floor) = self.min_interval_secs {
            require_positive("min_interval_secs", floor)?;
        }
        if !self.opening_delay_secs.is_finite() || self.opening_delay_secs < 0.0 {
            return Err(ConfigError::InvalidSeconds {
                field: "opening_delay_secs",
                value: self.opening_delay_secs,
            });
        }

        Ok(())
    }
}

/// Verifies that a threshold table fits a pool of `slot_count` slots.
///
/// The table must hold one entry per rank after the guaranteed pick and must
/// never decrease, so later ranks are never more likely than earlier ones.
pub fn validate_thresholds(thresholds: &[u32], slot_count: u32) -> Result<(), ConfigError> {
    if slot_count == 0 {
        return Err(ConfigError::EmptyPool);
    }

    let expected = slot_count as usize - 1;
    if thresholds.len() != expected {
        return Err(ConfigError::ThresholdCount {
            expected,
            actual: thresholds.len(),
        });
    }

    if let Some(position) = thresholds
        .windows(2)
        .position(|pair| pair[1] < pair[0])
    {
        return Err(ConfigError::ThresholdsDecrease {
            rank: position + 2,
        });
    }

    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSeconds { field, value })
    }
}

/// Construction-time configuration failures.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The pool must contain at least one slot.
    #[error("slot pool must contain at least one slot")]
    EmptyPool,
    /// The threshold table does not have one entry per non-guaranteed rank.
    #[error("threshold table needs {expected} entries for the pool, found {actual}")]
    ThresholdCount {
        /// Entries required by the pool size.
        expected: usize,
        /// Entries present in the table.
        actual: usize,
    },
    /// A later rank has a lower threshold than the rank before it.
    #[error("threshold for rank {rank} is lower than the one before it")]
    ThresholdsDecrease {
        /// Rank whose threshold breaks the ordering.
        rank: usize,
    },
    /// The decay factor must lie strictly between zero and one.
    #[error("decay factor {0} must lie strictly between 0 and 1")]
    InvalidDecay(f64),
    /// The friendly chance must be a probability.
    #[error("friendly chance {0} must lie within 0..=1")]
    InvalidChance(f64),
    /// A duration field holds a value the clock cannot represent.
    #[error("{field} has invalid value {value}")]
    InvalidSeconds {
        /// Name of the offending field.
        field: &'static str,
        /// Value that was rejected.
        value: f64,
    },
    /// The session must contain at least one round.
    #[error("max_rounds must be at least 1")]
    NoRounds,
}
