#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round scheduler that keeps targets popping up until the session ends.
//!
//! The scheduler is a pure system: it watches the world's event stream and
//! answers every [`Event::RoundDue`] with a single [`Command::BeginRound`]
//! carrying the decayed popup interval, the targets to show and the delay
//! before the following round. The world arms that delay as a cancellable
//! timer, so the loop re-arms itself round after round with a wait that
//! depends on the current interval instead of a fixed period.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error};
use whack_core::{Command, ConfigError, Event, GameState, SchedulerError, SessionConfig};
use whack_system_difficulty::DifficultyRamp;
use whack_system_selection::ActivationPicker;

/// Pure system that turns round requests into round commands.
#[derive(Debug)]
pub struct RoundScheduler {
    ramp: DifficultyRamp,
    picker: ActivationPicker,
    rng: ChaCha8Rng,
    state: GameState,
    rounds_begun: u32,
}

impl RoundScheduler {
    /// Creates a scheduler for the configured pool, seeded for reproducible rounds.
    pub fn new(config: &SessionConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            ramp: DifficultyRamp::from_config(config),
            picker: ActivationPicker::from_config(config)?,
            rng: ChaCha8Rng::seed_from_u64(seed),
            state: GameState::Active,
            rounds_begun: 0,
        })
    }

    /// Lifecycle state last observed on the event stream.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Number of rounds the scheduler has started.
    #[must_use]
    pub fn rounds_begun(&self) -> u32 {
        self.rounds_begun
    }

    /// Difficulty ramp applied to every round.
    #[must_use]
    pub fn ramp(&self) -> &DifficultyRamp {
        &self.ramp
    }

    /// Consumes world events and emits a round command for every due round.
    ///
    /// A round request observed after the session ended indicates a timer that
    /// escaped cancellation. Debug builds panic; release builds log the
    /// violation and drop the request.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match *event {
                Event::StateChanged { state } => self.state = state,
                Event::RoundDue {
                    round,
                    popup_interval,
                } => match self.run_round(round, popup_interval) {
                    Ok(command) => out.push(command),
                    Err(violation) => {
                        if cfg!(debug_assertions) {
                            panic!("{violation}");
                        }
                        error!(%violation, "dropping round request");
                    }
                },
                _ => {}
            }
        }
    }

    /// Plans one round: decays the interval, picks targets and draws the wait
    /// before the next round.
    pub fn run_round(
        &mut self,
        round: u32,
        current_interval: f64,
    ) -> Result<Command, SchedulerError> {
        if self.state != GameState::Active {
            return Err(SchedulerError::InvalidInvocation { round });
        }

        let popup_interval = self.ramp.next_interval(current_interval);
        let activations = self.picker.pick(&mut self.rng);
        let next_round_in = self.ramp.draw_delay(popup_interval, &mut self.rng);
        self.rounds_begun = self.rounds_begun.saturating_add(1);

        debug!(
            round,
            popup_interval,
            targets = activations.len(),
            next_round_ms = next_round_in.as_millis() as u64,
            "round scheduled"
        );

        Ok(Command::BeginRound {
            popup_interval,
            activations,
            next_round_in,
        })
    }
}
