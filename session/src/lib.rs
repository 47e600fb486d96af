#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session that wires the authoritative world to the round scheduler.
//!
//! The session is the boundary handed to presentation layers. Hosts drive it
//! with [`GameSession::advance`] from their event loop, forward resolved hits
//! through [`GameSession::submit_hit`], and render the notifications appended
//! to the event buffer (see [`Event::is_notification`]). Every timer lives
//! inside the session, so dropping it tears down all pending callbacks.

use std::time::Duration;

use whack_core::{
    Command, ConfigError, Event, GameState, HitOutcome, Occupant, SessionConfig, SlotId,
    SlotView,
};
use whack_system_scheduler::RoundScheduler;
use whack_world::{self as world, query, World};

/// One playthrough: slot pool, scoring ledger, timers and scheduler.
#[derive(Debug)]
pub struct GameSession {
    world: World,
    scheduler: RoundScheduler,
    seed: u64,
}

impl GameSession {
    /// Builds a session, failing fast on an inconsistent configuration.
    ///
    /// The seed drives every random draw, so equal seeds and inputs replay the
    /// same game.
    pub fn new(config: SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        let scheduler = RoundScheduler::new(&config, seed)?;
        let world = World::new(config)?;
        Ok(Self {
            world,
            scheduler,
            seed,
        })
    }

    /// Starts the round loop. Has no effect on a session that already started.
    pub fn start(&mut self, out: &mut Vec<Event>) {
        self.submit(Command::Start, out);
    }

    /// Lets `dt` of host time elapse, firing every timer that comes due.
    ///
    /// The clock is stepped from one deadline to the next and the scheduler
    /// runs after each step, so rounds begin at the deadline that fired
    /// regardless of how coarsely the host slices time.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) {
        let target = self.clock().saturating_add(dt);

        while let Some(deadline) = query::next_deadline(&self.world) {
            if deadline > target {
                break;
            }
            let step = deadline.saturating_sub(self.clock());
            self.submit(Command::Tick { dt: step }, out);
        }

        let rest = target.saturating_sub(self.clock());
        if !rest.is_zero() || dt.is_zero() {
            self.submit(Command::Tick { dt: rest }, out);
        }
    }

    /// Resolves a hit reported by the input layer.
    ///
    /// Returns the scored outcome, or `None` when the slot was not
    /// interactable; such hits leave the session untouched apart from an
    /// [`Event::HitIgnored`] record.
    pub fn submit_hit(&mut self, slot: SlotId, out: &mut Vec<Event>) -> Option<HitOutcome> {
        let first = out.len();
        self.submit(Command::Hit { slot }, out);
        out[first..].iter().find_map(|event| match event {
            Event::SlotHit { outcome } => Some(*outcome),
            _ => None,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> GameState {
        query::state(&self.world)
    }

    /// Reports whether [`GameSession::start`] was called.
    #[must_use]
    pub fn is_started(&self) -> bool {
        query::is_started(&self.world)
    }

    /// Current round number.
    #[must_use]
    pub fn round(&self) -> u32 {
        query::round(&self.world)
    }

    /// Running score.
    #[must_use]
    pub fn score(&self) -> i64 {
        query::score(&self.world)
    }

    /// Accepted hits on targets of the given kind.
    #[must_use]
    pub fn hits(&self, occupant: Occupant) -> u32 {
        query::hits(&self.world, occupant)
    }

    /// Popup interval currently in force, in seconds.
    #[must_use]
    pub fn popup_interval(&self) -> f64 {
        query::popup_interval(&self.world)
    }

    /// Snapshot of every slot.
    #[must_use]
    pub fn slots(&self) -> SlotView {
        query::slot_view(&self.world)
    }

    /// Simulated time elapsed since the session was created.
    #[must_use]
    pub fn clock(&self) -> Duration {
        query::clock(&self.world)
    }

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        query::config(&self.world)
    }

    /// Seed driving the session's random draws.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn submit(&mut self, command: Command, out: &mut Vec<Event>) {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);

        while !events.is_empty() {
            let mut commands = Vec::new();
            self.scheduler.handle(&events, &mut commands);
            out.append(&mut events);

            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inconsistent_pool_fails_at_construction() {
        let config = SessionConfig {
            slot_count: 6,
            thresholds: Some(vec![4, 8, 10, 11]),
            ..SessionConfig::default()
        };
        assert_eq!(
            GameSession::new(config, 1).err(),
            Some(ConfigError::ThresholdCount {
                expected: 5,
                actual: 4
            })
        );
    }

    #[test]
    fn new_session_waits_for_start() {
        let mut session = GameSession::new(SessionConfig::default(), 1).expect("valid config");
        let mut events = Vec::new();
        session.advance(Duration::from_secs(5), &mut events);

        assert!(!session.is_started());
        assert_eq!(events, vec![Event::TimeAdvanced {
            dt: Duration::from_secs(5)
        }]);
        assert_eq!(session.slots().visible().count(), 0);
    }

    #[test]
    fn advance_steps_through_every_deadline() {
        let mut session = GameSession::new(SessionConfig::default(), 3).expect("valid config");
        let mut events = Vec::new();
        session.start(&mut events);
        session.advance(Duration::from_secs(4), &mut events);

        let elapsed: Duration = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .sum();
        assert_eq!(elapsed, Duration::from_secs(4));
        assert_eq!(session.clock(), Duration::from_secs(4));
        assert!(session.round() > 1, "more than one round fits in the step");
    }
}
