#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Whack arcade engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative session world, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. Systems consume event
//! streams and respond exclusively with new command batches.

mod config;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{validate_thresholds, ConfigError, SessionConfig};

/// Converts fractional seconds into a [`Duration`], saturating instead of
/// panicking on negative, non-finite or oversized values.
#[must_use]
pub fn duration_from_secs(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

/// Commands that express all permissible session mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Starts the session: resets counters and arms the opening timer.
    Start,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Runs one scheduler round: adopts the decayed interval, shows the
    /// selected targets and arms the timer for the next round.
    BeginRound {
        /// Popup interval in seconds after this round's decay was applied.
        popup_interval: f64,
        /// Targets to show, each for `popup_interval` seconds.
        activations: Vec<Activation>,
        /// Delay until the round counter advances.
        next_round_in: Duration,
    },
    /// Reports that the player struck the given slot.
    Hit {
        /// Slot resolved by the input layer.
        slot: SlotId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Requests that the scheduler run the next round.
    RoundDue {
        /// Round that is about to run.
        round: u32,
        /// Popup interval in seconds before this round's decay.
        popup_interval: f64,
    },
    /// Confirms that the round counter advanced.
    RoundAdvanced {
        /// Round number after the increment.
        round: u32,
    },
    /// A target appeared in a slot.
    SlotActivated {
        /// Slot that became visible.
        slot: SlotId,
        /// Target hosted by the slot.
        occupant: Occupant,
    },
    /// A slot was hidden and emptied.
    SlotDeactivated {
        /// Slot that became hidden.
        slot: SlotId,
    },
    /// A hit was accepted and scored.
    SlotHit {
        /// Resolved outcome of the hit.
        outcome: HitOutcome,
    },
    /// A hit was dropped because the slot was not interactable.
    HitIgnored {
        /// Slot reported by the input layer.
        slot: SlotId,
    },
    /// The running score changed.
    ScoreChanged {
        /// Score after the change.
        score: i64,
    },
    /// The session moved into a new lifecycle state.
    StateChanged {
        /// State that became active.
        state: GameState,
    },
}

impl Event {
    /// Reports whether the event belongs to the outbound notification surface
    /// consumed by presentation layers.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        matches!(
            self,
            Self::SlotActivated { .. }
                | Self::SlotDeactivated { .. }
                | Self::ScoreChanged { .. }
                | Self::StateChanged { .. }
        )
    }
}

/// Lifecycle of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Rounds are running and hits are accepted.
    Active,
    /// Terminal state reached once the last round elapsed.
    Over,
}

/// Kind of target hosted by a visible slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupant {
    /// Target the player is rewarded for hitting.
    Friendly,
    /// Target the player is penalised for hitting.
    Hostile,
}

/// Unique identifier of a slot; a stable index into the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(u32);

impl SlotId {
    /// Creates a new slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the slot within the pool.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Target the scheduler wants shown in a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Activation {
    /// Slot that should become visible.
    pub slot: SlotId,
    /// Target placed into the slot.
    pub occupant: Occupant,
}

/// Result of a hit that was accepted by the pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitOutcome {
    /// Slot that was struck.
    pub slot: SlotId,
    /// Target that occupied the slot when it was struck.
    pub occupant: Occupant,
}

/// Rejection returned when a hit lands on a hidden, resolved, empty or unknown slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("slot {} is not interactable", slot.get())]
pub struct NotInteractable {
    /// Slot reported by the input layer.
    pub slot: SlotId,
}

/// Invariant violations detected by the round scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// A round was requested after the session reached [`GameState::Over`].
    #[error("round {round} requested while the session is over")]
    InvalidInvocation {
        /// Round that was requested.
        round: u32,
    },
}

/// Immutable representation of a single slot's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotSnapshot {
    /// Identifier of the slot.
    pub id: SlotId,
    /// Target currently hosted by the slot, if any.
    pub occupant: Option<Occupant>,
    /// Whether the slot is inside an activation window.
    pub visible: bool,
    /// Whether the current activation has already been struck.
    pub hit: bool,
}

impl SlotSnapshot {
    /// Reports whether a hit on the slot would currently be accepted.
    #[must_use]
    pub const fn is_interactable(&self) -> bool {
        self.visible && !self.hit && self.occupant.is_some()
    }
}

/// Read-only snapshot describing every slot in the pool.
#[derive(Clone, Debug, Default)]
pub struct SlotView {
    snapshots: Vec<SlotSnapshot>,
}

impl SlotView {
    /// Creates a new slot view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SlotSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured slot snapshots in id order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided slot.
    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&SlotSnapshot> {
        self.snapshots.get(slot.index()).filter(|snapshot| snapshot.id == slot)
    }

    /// Iterator over the slots currently showing a target.
    pub fn visible(&self) -> impl Iterator<Item = &SlotSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.visible)
    }

    /// Number of slots in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SlotSnapshot> {
        self.snapshots
    }
}
