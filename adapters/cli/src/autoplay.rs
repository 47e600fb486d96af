//! Scripted player used to exercise a headless session.

use std::{collections::BTreeMap, fmt, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};
use whack_core::{Event, GameState, Occupant, SlotId};
use whack_session::GameSession;

/// Reaction planned for a target the player has spotted.
#[derive(Clone, Copy, Debug)]
struct Sighting {
    occupant: Occupant,
    react_at: Duration,
    swing: bool,
}

/// Player that swings at friendly targets after a fixed reaction delay.
///
/// Hostile targets are struck by mistake with probability `1 - accuracy`.
#[derive(Debug)]
pub(crate) struct Autoplayer {
    accuracy: f64,
    reaction: Duration,
    rng: ChaCha8Rng,
    sightings: BTreeMap<SlotId, Sighting>,
    friendly_shown: u32,
    hostile_shown: u32,
}

impl Autoplayer {
    pub(crate) fn new(accuracy: f64, reaction: Duration, seed: u64) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            reaction,
            rng: ChaCha8Rng::seed_from_u64(seed),
            sightings: BTreeMap::new(),
            friendly_shown: 0,
            hostile_shown: 0,
        }
    }

    /// Updates the player's view of the board from freshly emitted events.
    pub(crate) fn observe(&mut self, events: &[Event], now: Duration) {
        for event in events {
            match *event {
                Event::SlotActivated { slot, occupant } => {
                    let swing = match occupant {
                        Occupant::Friendly => {
                            self.friendly_shown += 1;
                            true
                        }
                        Occupant::Hostile => {
                            self.hostile_shown += 1;
                            self.rng.gen_bool(1.0 - self.accuracy)
                        }
                    };
                    let _ = self.sightings.insert(
                        slot,
                        Sighting {
                            occupant,
                            react_at: now + self.reaction,
                            swing,
                        },
                    );
                }
                Event::SlotDeactivated { slot } => {
                    let _ = self.sightings.remove(&slot);
                }
                _ => {}
            }
        }
    }

    /// Swings at every spotted target whose reaction delay has elapsed.
    pub(crate) fn act(&mut self, session: &mut GameSession, out: &mut Vec<Event>) {
        let now = session.clock();
        let ready: Vec<(SlotId, Sighting)> = self
            .sightings
            .iter()
            .filter(|(_, sighting)| sighting.react_at <= now)
            .map(|(slot, sighting)| (*slot, *sighting))
            .collect();

        for (slot, sighting) in ready {
            let _ = self.sightings.remove(&slot);
            if !sighting.swing {
                trace!(slot = slot.get(), "letting hostile target pass");
                continue;
            }
            match session.submit_hit(slot, out) {
                Some(outcome) => debug!(slot = slot.get(), occupant = ?outcome.occupant, "hit"),
                None => debug!(
                    slot = slot.get(),
                    expected = ?sighting.occupant,
                    "swing landed on an empty slot"
                ),
            }
        }
    }

    /// Plays the session to the end on a fixed-step clock.
    pub(crate) fn play(&mut self, session: &mut GameSession, frame: Duration) -> Summary {
        let mut events = Vec::new();
        session.start(&mut events);
        self.record(&events, session.clock());
        events.clear();

        while session.state() == GameState::Active {
            session.advance(frame, &mut events);
            self.record(&events, session.clock());
            events.clear();

            self.act(session, &mut events);
            self.record(&events, session.clock());
            events.clear();
        }

        self.summary(session)
    }

    fn record(&mut self, events: &[Event], now: Duration) {
        for event in events.iter().filter(|event| event.is_notification()) {
            debug!(?event, "notification");
        }
        self.observe(events, now);
    }

    pub(crate) fn summary(&self, session: &GameSession) -> Summary {
        let friendly_hits = session.hits(Occupant::Friendly);
        Summary {
            seed: session.seed(),
            rounds: session
                .round()
                .saturating_sub(1)
                .min(session.config().max_rounds),
            score: session.score(),
            friendly_hits,
            hostile_hits: session.hits(Occupant::Hostile),
            friendly_shown: self.friendly_shown,
            hostile_shown: self.hostile_shown,
            misses: self.friendly_shown.saturating_sub(friendly_hits),
            elapsed: session.clock(),
        }
    }
}

/// Outcome of an autoplayed session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) seed: u64,
    pub(crate) rounds: u32,
    pub(crate) score: i64,
    pub(crate) friendly_hits: u32,
    pub(crate) hostile_hits: u32,
    pub(crate) friendly_shown: u32,
    pub(crate) hostile_shown: u32,
    pub(crate) misses: u32,
    pub(crate) elapsed: Duration,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed:          {}", self.seed)?;
        writeln!(f, "rounds:        {}", self.rounds)?;
        writeln!(f, "score:         {}", self.score)?;
        writeln!(
            f,
            "friendly hits: {} of {}",
            self.friendly_hits, self.friendly_shown
        )?;
        writeln!(
            f,
            "hostile hits:  {} of {}",
            self.hostile_hits, self.hostile_shown
        )?;
        writeln!(f, "misses:        {}", self.misses)?;
        write!(f, "elapsed:       {:.2}s", self.elapsed.as_secs_f64())
    }
}
