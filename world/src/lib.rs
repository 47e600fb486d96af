#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for the Whack arcade game.
//!
//! The world owns the slot pool, the scoring ledger and every pending timer.
//! All mutation flows through [`apply`]; timers are measured on a simulated
//! clock advanced by [`Command::Tick`], which keeps the session deterministic
//! and lets the host event loop decide how real time maps onto ticks.

mod ledger;
mod slots;
mod timers;

use std::time::Duration;

use tracing::{debug, error, info, warn};
use whack_core::{
    duration_from_secs, Activation, Command, ConfigError, Event, GameState, SchedulerError,
    SessionConfig, SlotId,
};

use self::{
    ledger::ScoringLedger,
    slots::SlotPool,
    timers::{TimerHandle, TimerQueue},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    Opening,
    RoundTick,
    SlotExpiry(SlotId),
}

/// Represents the authoritative state of one game session.
#[derive(Debug)]
pub struct World {
    config: SessionConfig,
    slots: SlotPool,
    ledger: ScoringLedger,
    timers: TimerQueue<TimerKind>,
    round_timer: Option<TimerHandle>,
    round: u32,
    popup_interval: f64,
    state: GameState,
    started: bool,
}

impl World {
    /// Creates a session world after validating the configuration.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            slots: SlotPool::new(config.slot_count),
            ledger: ScoringLedger::new(config.friendly_points, config.hostile_points),
            timers: TimerQueue::new(),
            round_timer: None,
            round: 1,
            popup_interval: config.base_interval_secs,
            state: GameState::Active,
            started: false,
            config,
        })
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        if self.started {
            debug!("session already started; ignoring start request");
            return;
        }

        self.started = true;
        self.round = 1;
        self.popup_interval = self.config.base_interval_secs;
        self.state = GameState::Active;
        self.ledger.reset();

        let opening = duration_from_secs(self.config.opening_delay_secs);
        self.round_timer = Some(self.timers.arm(opening, TimerKind::Opening));

        info!(
            slots = self.config.slot_count,
            max_rounds = self.config.max_rounds,
            "session started"
        );
        out_events.push(Event::StateChanged {
            state: GameState::Active,
        });
        out_events.push(Event::ScoreChanged {
            score: self.ledger.score(),
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        out_events.push(Event::TimeAdvanced { dt });
        self.timers.advance(dt);

        while let Some((handle, kind)) = self.timers.pop_due() {
            match kind {
                TimerKind::Opening => {
                    self.round_timer = None;
                    debug!(round = self.round, "opening delay elapsed");
                    out_events.push(Event::RoundDue {
                        round: self.round,
                        popup_interval: self.popup_interval,
                    });
                }
                TimerKind::RoundTick => {
                    self.round_timer = None;
                    self.advance_round(out_events);
                }
                TimerKind::SlotExpiry(slot) => {
                    if self.slots.expiry(slot) != Some(handle) {
                        continue;
                    }
                    if self.slots.deactivate(slot) {
                        out_events.push(Event::SlotDeactivated { slot });
                    }
                }
            }
        }
    }

    fn begin_round(
        &mut self,
        popup_interval: f64,
        activations: Vec<Activation>,
        next_round_in: Duration,
        out_events: &mut Vec<Event>,
    ) {
        if !self.started || self.state == GameState::Over {
            let violation = SchedulerError::InvalidInvocation { round: self.round };
            if cfg!(debug_assertions) {
                panic!("{violation}");
            }
            error!(%violation, "dropping scheduler round");
            return;
        }

        self.popup_interval = popup_interval;
        let visible_for = duration_from_secs(popup_interval);

        for Activation { slot, occupant } in activations {
            if !self.slots.activate(slot, occupant) {
                warn!(slot = slot.get(), "activation targets an unknown slot");
                continue;
            }

            let handle = self.timers.arm(visible_for, TimerKind::SlotExpiry(slot));
            if let Some(stale) = self.slots.replace_expiry(slot, handle) {
                let _ = self.timers.cancel(stale);
            }
            out_events.push(Event::SlotActivated { slot, occupant });
        }

        if let Some(stale) = self.round_timer.take() {
            let _ = self.timers.cancel(stale);
        }
        self.round_timer = Some(self.timers.arm(next_round_in, TimerKind::RoundTick));
    }

    fn advance_round(&mut self, out_events: &mut Vec<Event>) {
        self.round = self.round.saturating_add(1);
        out_events.push(Event::RoundAdvanced { round: self.round });

        if self.round > self.config.max_rounds {
            self.end_game(out_events);
        } else {
            out_events.push(Event::RoundDue {
                round: self.round,
                popup_interval: self.popup_interval,
            });
        }
    }

    fn end_game(&mut self, out_events: &mut Vec<Event>) {
        self.timers.cancel_all();
        self.round_timer = None;
        self.state = GameState::Over;

        let ids: Vec<SlotId> = self.slots.ids().collect();
        for slot in ids {
            if self.slots.deactivate(slot) {
                out_events.push(Event::SlotDeactivated { slot });
            }
        }

        info!(
            score = self.ledger.score(),
            rounds = self.round.saturating_sub(1),
            "game over"
        );
        out_events.push(Event::StateChanged {
            state: GameState::Over,
        });
    }

    fn hit(&mut self, slot: SlotId, out_events: &mut Vec<Event>) {
        let outcome = match self.slots.resolve_hit(slot) {
            Ok(outcome) => outcome,
            Err(rejection) => {
                debug!(%rejection, "ignoring hit");
                out_events.push(Event::HitIgnored { slot });
                return;
            }
        };

        let score = self.ledger.apply_hit(outcome.occupant);
        out_events.push(Event::SlotHit { outcome });
        out_events.push(Event::ScoreChanged { score });
        self.retract_after_hit(slot);
    }

    fn retract_after_hit(&mut self, slot: SlotId) {
        let retract = duration_from_secs(self.config.hit_retract_secs);
        let Some(pending) = self.slots.expiry(slot) else {
            return;
        };
        let remaining = self.timers.remaining(pending).unwrap_or(Duration::ZERO);
        if remaining <= retract {
            return;
        }

        let _ = self.timers.cancel(pending);
        let handle = self.timers.arm(retract, TimerKind::SlotExpiry(slot));
        let _ = self.slots.replace_expiry(slot, handle);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Start => world.start(out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::BeginRound {
            popup_interval,
            activations,
            next_round_in,
        } => world.begin_round(popup_interval, activations, next_round_in, out_events),
        Command::Hit { slot } => world.hit(slot, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use whack_core::{GameState, Occupant, SessionConfig, SlotView};

    use super::World;

    /// Configuration the session was built with.
    #[must_use]
    pub fn config(world: &World) -> &SessionConfig {
        &world.config
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(world: &World) -> GameState {
        world.state
    }

    /// Reports whether the session received its start command.
    #[must_use]
    pub fn is_started(world: &World) -> bool {
        world.started
    }

    /// Current round number; exceeds `max_rounds` once the game is over.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.round
    }

    /// Popup interval currently in force, in seconds.
    #[must_use]
    pub fn popup_interval(world: &World) -> f64 {
        world.popup_interval
    }

    /// Running score.
    #[must_use]
    pub fn score(world: &World) -> i64 {
        world.ledger.score()
    }

    /// Number of accepted hits on targets of the given kind.
    #[must_use]
    pub fn hits(world: &World, occupant: Occupant) -> u32 {
        world.ledger.hits(occupant)
    }

    /// Snapshot of every slot in id order.
    #[must_use]
    pub fn slot_view(world: &World) -> SlotView {
        SlotView::from_snapshots(world.slots.snapshots())
    }

    /// Reading of the simulated session clock.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.timers.now()
    }

    /// Clock reading at which the earliest pending timer fires.
    #[must_use]
    pub fn next_deadline(world: &World) -> Option<Duration> {
        world.timers.next_deadline()
    }

    /// Number of timers that have neither fired nor been cancelled.
    #[must_use]
    pub fn pending_timers(world: &World) -> usize {
        world.timers.len()
    }
}

#[cfg(test)]
mod tests {
    use whack_core::Occupant;

    use super::*;

    fn started_world() -> (World, Vec<Event>) {
        let mut world = World::new(SessionConfig::default()).expect("default config is valid");
        let mut events = Vec::new();
        apply(&mut world, Command::Start, &mut events);
        (world, events)
    }

    #[test]
    fn start_announces_active_state_and_zero_score() {
        let (world, events) = started_world();
        assert_eq!(
            events,
            vec![
                Event::StateChanged {
                    state: GameState::Active
                },
                Event::ScoreChanged { score: 0 },
            ]
        );
        assert_eq!(query::round(&world), 1);
        assert_eq!(query::pending_timers(&world), 1);
    }

    #[test]
    fn second_start_is_ignored() {
        let (mut world, _) = started_world();
        let mut events = Vec::new();
        apply(&mut world, Command::Start, &mut events);
        assert!(events.is_empty());
        assert_eq!(query::pending_timers(&world), 1);
    }

    #[test]
    fn opening_timer_requests_first_round() {
        let (mut world, _) = started_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(
            events[1],
            Event::RoundDue {
                round: 1,
                popup_interval: 0.85
            }
        );
    }

    #[test]
    fn hit_retracts_target_early() {
        let (mut world, _) = started_world();
        let slot = SlotId::new(0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::BeginRound {
                popup_interval: 2.0,
                activations: vec![Activation {
                    slot,
                    occupant: Occupant::Friendly,
                }],
                next_round_in: Duration::from_secs(10),
            },
            &mut events,
        );
        apply(&mut world, Command::Hit { slot }, &mut events);
        events.clear();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );
        assert!(events.contains(&Event::SlotDeactivated { slot }));
        assert_eq!(query::score(&world), 1);
    }

    fn begin_round(world: &mut World, next_round_in: Duration, events: &mut Vec<Event>) {
        apply(
            world,
            Command::BeginRound {
                popup_interval: 0.8,
                activations: vec![Activation {
                    slot: SlotId::new(3),
                    occupant: Occupant::Hostile,
                }],
                next_round_in,
            },
            events,
        );
    }

    #[test]
    fn next_deadline_follows_the_round_timers() {
        let (mut world, _) = started_world();
        assert_eq!(query::next_deadline(&world), Some(Duration::from_secs(1)));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(query::next_deadline(&world), None);

        begin_round(&mut world, Duration::from_millis(500), &mut events);
        assert_eq!(
            query::next_deadline(&world),
            Some(Duration::from_millis(1_500))
        );
    }

    #[test]
    #[cfg_attr(
        debug_assertions,
        should_panic(expected = "requested while the session is over")
    )]
    fn round_after_game_over_is_dropped() {
        let config = SessionConfig {
            max_rounds: 1,
            ..SessionConfig::default()
        };
        let mut world = World::new(config).expect("valid config");
        let mut events = Vec::new();
        apply(&mut world, Command::Start, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        begin_round(&mut world, Duration::from_secs(1), &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(query::state(&world), GameState::Over);
        assert_eq!(query::round(&world), 2);

        events.clear();
        begin_round(&mut world, Duration::from_secs(1), &mut events);

        assert!(events.is_empty());
        assert_eq!(query::round(&world), 2);
        assert_eq!(query::pending_timers(&world), 0);
        assert!(query::slot_view(&world).visible().next().is_none());
    }

    #[test]
    #[cfg_attr(
        debug_assertions,
        should_panic(expected = "requested while the session is over")
    )]
    fn round_before_start_is_dropped() {
        let mut world = World::new(SessionConfig::default()).expect("valid config");
        let mut events = Vec::new();
        begin_round(&mut world, Duration::from_secs(1), &mut events);

        assert!(events.is_empty());
        assert_eq!(query::round(&world), 1);
        assert_eq!(query::pending_timers(&world), 0);
        assert!(query::slot_view(&world).visible().next().is_none());
    }
}
