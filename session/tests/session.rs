use std::time::Duration;

use whack_core::{Event, GameState, HitOutcome, Occupant, SessionConfig, SlotId};
use whack_session::GameSession;

const STEP: Duration = Duration::from_millis(5);

fn first_round(config: SessionConfig, seed: u64) -> (GameSession, Vec<Event>) {
    let mut session = GameSession::new(config, seed).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    session.advance(Duration::from_secs(1), &mut events);
    assert!(
        session.slots().visible().next().is_some(),
        "first round shows a target"
    );
    (session, events)
}

fn only(occupant: Occupant) -> SessionConfig {
    SessionConfig {
        friendly_chance: match occupant {
            Occupant::Friendly => 1.0,
            Occupant::Hostile => 0.0,
        },
        ..SessionConfig::default()
    }
}

fn visible_slot(session: &GameSession) -> SlotId {
    session
        .slots()
        .visible()
        .map(|snapshot| snapshot.id)
        .next()
        .expect("a visible slot")
}

#[test]
fn hitting_a_friendly_scores_one() {
    let (mut session, _) = first_round(only(Occupant::Friendly), 1);
    let slot = visible_slot(&session);
    let mut events = Vec::new();

    let outcome = session.submit_hit(slot, &mut events);
    assert_eq!(
        outcome,
        Some(HitOutcome {
            slot,
            occupant: Occupant::Friendly
        })
    );
    assert_eq!(session.score(), 1);
    assert!(events.contains(&Event::ScoreChanged { score: 1 }));
}

#[test]
fn hitting_a_hostile_costs_five() {
    let (mut session, _) = first_round(only(Occupant::Hostile), 2);
    let slot = visible_slot(&session);
    let mut events = Vec::new();

    let outcome = session.submit_hit(slot, &mut events);
    assert_eq!(outcome.map(|outcome| outcome.occupant), Some(Occupant::Hostile));
    assert_eq!(session.score(), -5);
    assert_eq!(session.hits(Occupant::Hostile), 1);
}

#[test]
fn second_hit_on_the_same_activation_is_ignored() {
    let (mut session, _) = first_round(only(Occupant::Friendly), 3);
    let slot = visible_slot(&session);
    let mut events = Vec::new();

    assert!(session.submit_hit(slot, &mut events).is_some());
    events.clear();
    assert_eq!(session.submit_hit(slot, &mut events), None);

    assert_eq!(session.score(), 1);
    assert_eq!(events, vec![Event::HitIgnored { slot }]);
}

#[test]
fn hit_after_expiry_is_not_interactable() {
    let (mut session, _) = first_round(only(Occupant::Friendly), 4);
    let slot = visible_slot(&session);
    let mut events = Vec::new();

    while session
        .slots()
        .get(slot)
        .is_some_and(|snapshot| snapshot.visible)
    {
        session.advance(STEP, &mut events);
    }
    assert!(events.contains(&Event::SlotDeactivated { slot }));

    events.clear();
    assert_eq!(session.submit_hit(slot, &mut events), None);
    assert_eq!(session.score(), 0);
    assert_eq!(events, vec![Event::HitIgnored { slot }]);
}

#[test]
fn hits_on_hidden_slots_never_change_the_score() {
    let mut session = GameSession::new(SessionConfig::default(), 5).expect("valid config");
    let mut events = Vec::new();

    assert_eq!(session.submit_hit(SlotId::new(0), &mut events), None);
    session.start(&mut events);
    assert_eq!(session.submit_hit(SlotId::new(0), &mut events), None);
    assert_eq!(session.submit_hit(SlotId::new(999), &mut events), None);

    assert_eq!(session.score(), 0);
}

#[test]
fn expiry_after_a_hit_only_hides_the_target() {
    let (mut session, _) = first_round(only(Occupant::Friendly), 6);
    let slot = visible_slot(&session);
    let mut events = Vec::new();

    assert!(session.submit_hit(slot, &mut events).is_some());
    assert!(session.slots().get(slot).is_some_and(|snapshot| snapshot.hit));

    events.clear();
    session.advance(Duration::from_millis(250), &mut events);
    assert!(events.contains(&Event::SlotDeactivated { slot }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ScoreChanged { .. })));
    assert_eq!(session.score(), 1);
}

#[test]
fn thirty_rounds_without_hits_end_at_zero() {
    let mut session = GameSession::new(SessionConfig::default(), 7).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);

    while session.state() == GameState::Active {
        session.advance(Duration::from_millis(16), &mut events);
    }

    assert_eq!(session.state(), GameState::Over);
    assert_eq!(session.score(), 0);
    assert_eq!(session.round(), 31);
    assert_eq!(session.slots().visible().count(), 0);
}

#[test]
fn game_over_is_terminal() {
    let config = SessionConfig {
        max_rounds: 2,
        ..only(Occupant::Friendly)
    };
    let mut session = GameSession::new(config, 8).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    while session.state() == GameState::Active {
        session.advance(Duration::from_millis(16), &mut events);
    }

    events.clear();
    for index in 0..18 {
        assert_eq!(session.submit_hit(SlotId::new(index), &mut events), None);
    }
    session.start(&mut events);
    session.advance(Duration::from_secs(30), &mut events);

    assert_eq!(session.state(), GameState::Over);
    assert_eq!(session.score(), 0);
    assert!(events.iter().all(|event| matches!(
        event,
        Event::HitIgnored { .. } | Event::TimeAdvanced { .. }
    )));
}

#[test]
fn notifications_describe_the_board() {
    let (session, events) = first_round(SessionConfig::default(), 9);
    let notifications: Vec<&Event> = events
        .iter()
        .filter(|event| event.is_notification())
        .collect();

    assert_eq!(
        notifications[0],
        &Event::StateChanged {
            state: GameState::Active
        }
    );
    assert_eq!(notifications[1], &Event::ScoreChanged { score: 0 });

    let shown: Vec<SlotId> = notifications
        .iter()
        .filter_map(|event| match event {
            Event::SlotActivated { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    let visible: Vec<SlotId> = session.slots().visible().map(|snapshot| snapshot.id).collect();
    let mut sorted = shown.clone();
    sorted.sort();
    assert_eq!(sorted, visible);
}

#[test]
fn equal_seeds_replay_identically() {
    let play = |seed: u64| {
        let mut session =
            GameSession::new(SessionConfig::default(), seed).expect("valid config");
        let mut events = Vec::new();
        session.start(&mut events);
        while session.state() == GameState::Active {
            session.advance(Duration::from_millis(20), &mut events);
            if let Some(target) = session
                .slots()
                .visible()
                .find(|snapshot| snapshot.is_interactable())
                .map(|snapshot| snapshot.id)
            {
                let _ = session.submit_hit(target, &mut events);
            }
        }
        (events, session.score())
    };

    assert_eq!(play(42), play(42));
}

fn schedule_with_frame(seed: u64, frame: Duration) -> (Vec<Event>, u32) {
    let mut session = GameSession::new(SessionConfig::default(), seed).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    while session.state() == GameState::Active {
        session.advance(frame, &mut events);
    }

    events.retain(|event| !matches!(event, Event::TimeAdvanced { .. }));
    (events, session.round())
}

#[test]
fn one_long_advance_plays_the_whole_game() {
    let mut session = GameSession::new(SessionConfig::default(), 7).expect("valid config");
    let mut events = Vec::new();
    session.start(&mut events);
    session.advance(Duration::from_secs(120), &mut events);

    assert_eq!(session.state(), GameState::Over);
    assert_eq!(session.round(), 31);
    let advances = events
        .iter()
        .filter(|event| matches!(event, Event::RoundAdvanced { .. }))
        .count();
    assert_eq!(advances, 30);
}

#[test]
fn schedule_does_not_depend_on_frame_length() {
    let fine = schedule_with_frame(42, Duration::from_millis(1));
    let coarse = schedule_with_frame(42, Duration::from_millis(250));
    let whole = schedule_with_frame(42, Duration::from_secs(120));

    assert_eq!(fine.1, 31);
    assert_eq!(fine, coarse);
    assert_eq!(fine, whole);
}
