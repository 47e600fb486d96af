#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted selection of the slots that show a target each round.
//!
//! Every round the pool is shuffled into a fresh rank order. Rank zero is
//! always shown, which guarantees at least one target. Each later rank draws
//! an integer uniformly from `0..=draw_range_max` and is shown when the draw
//! exceeds that rank's threshold, so early ranks appear far more often than
//! late ones.

use rand::{seq::SliceRandom, Rng};
use whack_core::{validate_thresholds, Activation, ConfigError, Occupant, SessionConfig, SlotId};

/// Per-rank inclusion thresholds sized for a specific pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThresholdTable {
    thresholds: Vec<u32>,
    draw_range_max: u32,
}

impl ThresholdTable {
    /// Creates a table for a pool of `slot_count` slots.
    ///
    /// Fails unless the table holds exactly `slot_count - 1` non-decreasing
    /// entries.
    pub fn new(
        thresholds: Vec<u32>,
        slot_count: u32,
        draw_range_max: u32,
    ) -> Result<Self, ConfigError> {
        validate_thresholds(&thresholds, slot_count)?;
        Ok(Self {
            thresholds,
            draw_range_max,
        })
    }

    /// Creates the table described by a session configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.resolved_thresholds(),
            config.slot_count,
            config.draw_range_max,
        )
    }

    /// Number of slots in the pool the table was sized for.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.thresholds.len() + 1
    }

    /// Thresholds for ranks `1..slot_count`.
    #[must_use]
    pub fn thresholds(&self) -> &[u32] {
        &self.thresholds
    }

    /// Probability that the slot at `rank` is shown in a round.
    #[must_use]
    pub fn inclusion_probability(&self, rank: usize) -> f64 {
        if rank == 0 {
            return 1.0;
        }
        let Some(&threshold) = self.thresholds.get(rank - 1) else {
            return 0.0;
        };
        let outcomes = f64::from(self.draw_range_max) + 1.0;
        let winning = f64::from(self.draw_range_max.saturating_sub(threshold));
        winning / outcomes
    }
}

/// Picks the targets of a round: which slots are shown and what they host.
#[derive(Clone, Debug)]
pub struct ActivationPicker {
    table: ThresholdTable,
    friendly_chance: f64,
    order: Vec<SlotId>,
}

impl ActivationPicker {
    /// Creates a picker over the pool described by `table`.
    #[must_use]
    pub fn new(table: ThresholdTable, friendly_chance: f64) -> Self {
        let order = (0..table.slot_count())
            .map(|index| SlotId::new(index as u32))
            .collect();
        Self {
            table,
            friendly_chance: friendly_chance.clamp(0.0, 1.0),
            order,
        }
    }

    /// Creates the picker described by a session configuration.
    pub fn from_config(config: &SessionConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            ThresholdTable::from_config(config)?,
            config.friendly_chance,
        ))
    }

    /// Threshold table driving the picker.
    #[must_use]
    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Draws the ranks shown this round in ascending order; rank zero is
    /// always present.
    pub fn draw_ranks<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut ranks = vec![0];
        for (index, &threshold) in self.table.thresholds.iter().enumerate() {
            if rng.gen_range(0..=self.table.draw_range_max) > threshold {
                ranks.push(index + 1);
            }
        }
        ranks
    }

    /// Selects the slots shown this round, in rank order.
    ///
    /// The first entry is drawn uniformly from the whole pool; the result is
    /// never empty and never repeats a slot.
    pub fn select_activation_set<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<SlotId> {
        self.order.shuffle(rng);
        self.draw_ranks(rng)
            .into_iter()
            .map(|rank| self.order[rank])
            .collect()
    }

    /// Draws the target hosted by a freshly shown slot.
    pub fn draw_occupant<R: Rng + ?Sized>(&self, rng: &mut R) -> Occupant {
        if rng.gen_bool(self.friendly_chance) {
            Occupant::Friendly
        } else {
            Occupant::Hostile
        }
    }

    /// Selects this round's slots and assigns each a fresh occupant.
    pub fn pick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Activation> {
        let slots = self.select_activation_set(rng);
        slots
            .into_iter()
            .map(|slot| Activation {
                slot,
                occupant: self.draw_occupant(rng),
            })
            .collect()
    }
}
