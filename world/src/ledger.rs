//! Running score of a session.

use whack_core::Occupant;

/// Accumulates score deltas from accepted hits. No clamping is applied.
#[derive(Clone, Debug)]
pub(crate) struct ScoringLedger {
    score: i64,
    friendly_points: i64,
    hostile_points: i64,
    friendly_hits: u32,
    hostile_hits: u32,
}

impl ScoringLedger {
    pub(crate) fn new(friendly_points: i64, hostile_points: i64) -> Self {
        Self {
            score: 0,
            friendly_points,
            hostile_points,
            friendly_hits: 0,
            hostile_hits: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.score = 0;
        self.friendly_hits = 0;
        self.hostile_hits = 0;
    }

    /// Applies the delta for a struck target and returns the new score.
    pub(crate) fn apply_hit(&mut self, occupant: Occupant) -> i64 {
        let delta = match occupant {
            Occupant::Friendly => {
                self.friendly_hits += 1;
                self.friendly_points
            }
            Occupant::Hostile => {
                self.hostile_hits += 1;
                self.hostile_points
            }
        };
        self.score = self.score.saturating_add(delta);
        self.score
    }

    pub(crate) fn score(&self) -> i64 {
        self.score
    }

    pub(crate) fn hits(&self, occupant: Occupant) -> u32 {
        match occupant {
            Occupant::Friendly => self.friendly_hits,
            Occupant::Hostile => self.hostile_hits,
        }
    }
}
