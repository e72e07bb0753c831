//! Property-based tests for the state machine engine.
//!
//! These tests use proptest to verify cursor, history, and transition
//! invariants across many randomly generated call sequences.

use proptest::prelude::*;
use stance::{Machine, Snapshot, State, Transition};
use std::time::Duration;

const STATES: [&str; 4] = ["idle", "walk", "run", "rest"];
const EVENTS: [&str; 3] = ["update", "draw", "collide"];

fn vocab_machine() -> Machine {
    let mut machine: Machine = Machine::new("idle");
    for name in STATES {
        machine.add_state(name, State::new()).unwrap();
    }
    machine
}

prop_compose! {
    fn arbitrary_state_name()(index in 0..STATES.len()) -> &'static str {
        STATES[index]
    }
}

prop_compose! {
    fn arbitrary_event_name()(index in 0..EVENTS.len()) -> &'static str {
        EVENTS[index]
    }
}

proptest! {
    #[test]
    fn registered_states_exist_for_the_machine_lifetime(
        names in prop::collection::vec(arbitrary_state_name(), 0..12),
    ) {
        let mut machine: Machine = Machine::new("idle");
        let mut registered: Vec<&str> = Vec::new();

        for name in names.iter().copied() {
            machine.add_state(name, State::new()).unwrap();
            registered.push(name);
            for seen in &registered {
                prop_assert!(machine.state_exists(seen));
            }
        }
    }

    #[test]
    fn known_events_grow_monotonically(
        assignments in prop::collection::vec(
            (arbitrary_state_name(), arbitrary_event_name()),
            0..12,
        ),
    ) {
        let mut machine = vocab_machine();
        let mut installed: Vec<&str> = Vec::new();

        for (state, event) in assignments.iter().copied() {
            machine
                .add_state(state, State::new().on(event, |_, _| {}))
                .unwrap();
            installed.push(event);

            // Every event ever installed stays dispatchable, even when
            // the table that introduced it has been overwritten.
            for name in &installed {
                prop_assert!(machine.events().contains(name));
            }
            prop_assert!(machine.events().contains(&"enter"));
            prop_assert!(machine.events().contains(&"leave"));
        }
    }

    #[test]
    fn change_tracks_previous_and_current(
        walk in prop::collection::vec(arbitrary_state_name(), 1..16),
    ) {
        let mut machine = vocab_machine();

        for to in walk.iter().copied() {
            let before = machine.current_state().to_string();
            machine.change(to).unwrap();
            prop_assert_eq!(machine.current_state(), to);
            prop_assert_eq!(machine.previous_state(), Some(before.as_str()));
        }
    }

    #[test]
    fn history_holds_the_last_k_left_states(
        walk in prop::collection::vec(arbitrary_state_name(), 0..16),
        cap in 1usize..5,
    ) {
        let mut machine = vocab_machine();
        machine.history_enable();
        machine.history_set_max_size(cap).unwrap();

        let mut lefts: Vec<String> = Vec::new();
        for to in walk.iter().copied() {
            lefts.push(machine.current_state().to_string());
            machine.change(to).unwrap();
        }

        let start = lefts.len().saturating_sub(cap);
        let expected: Vec<&str> = lefts[start..].iter().map(String::as_str).collect();
        prop_assert_eq!(machine.history().names(), expected);
    }

    #[test]
    fn unmatched_trigger_is_identity(
        walk in prop::collection::vec(arbitrary_state_name(), 0..8),
    ) {
        let mut machine = vocab_machine();
        machine.history_enable();
        for to in walk.iter().copied() {
            machine.change(to).unwrap();
        }

        let current = machine.current_state().to_string();
        let previous = machine.previous_state().map(String::from);
        let names: Vec<String> =
            machine.history().names().iter().map(|s| s.to_string()).collect();

        machine.trigger("ghost").unwrap();

        prop_assert_eq!(machine.current_state(), current.as_str());
        prop_assert_eq!(machine.previous_state(), previous.as_deref());
        let after: Vec<String> =
            machine.history().names().iter().map(|s| s.to_string()).collect();
        prop_assert_eq!(after, names);
    }

    #[test]
    fn wildcard_reaches_idle_from_anywhere(
        walk in prop::collection::vec(arbitrary_state_name(), 0..16),
    ) {
        let mut machine = vocab_machine();
        machine
            .add_transition(Transition::wildcard("reset", "idle"))
            .unwrap();
        for to in walk.iter().copied() {
            machine.change(to).unwrap();
        }

        machine.trigger("reset").unwrap();
        prop_assert_eq!(machine.current_state(), "idle");
    }

    #[test]
    fn guarded_trigger_fires_iff_the_guard_holds(
        walk in prop::collection::vec(arbitrary_state_name(), 0..16),
    ) {
        let mut machine = vocab_machine();
        machine
            .add_transition(Transition::wildcard("sprint", "run").when(|m| m.state_is("walk")))
            .unwrap();
        for to in walk.iter().copied() {
            machine.change(to).unwrap();
        }

        let before = machine.current_state().to_string();
        let was_walking = machine.state_is("walk");
        machine.trigger("sprint").unwrap();

        if was_walking {
            prop_assert_eq!(machine.current_state(), "run");
        } else {
            prop_assert_eq!(machine.current_state(), before.as_str());
        }
    }

    #[test]
    fn reflexive_trigger_preserves_the_current_state(
        walk in prop::collection::vec(arbitrary_state_name(), 1..8),
        repeats in 1usize..4,
    ) {
        let mut machine = vocab_machine();
        for name in STATES {
            machine
                .add_transition(Transition::reflexive("steady", name))
                .unwrap();
        }
        for to in walk.iter().copied() {
            machine.change(to).unwrap();
        }

        let current = machine.current_state().to_string();
        for _ in 0..repeats {
            machine.trigger("steady").unwrap();
            prop_assert_eq!(machine.current_state(), current.as_str());
            prop_assert_eq!(machine.previous_state(), Some(current.as_str()));
        }
    }

    #[test]
    fn set_time_in_state_is_reflected_in_the_reading(secs in 0u64..3600) {
        let mut machine = vocab_machine();
        machine.set_time_in_state(Duration::from_secs(secs)).unwrap();

        let elapsed = machine.time_in_state();
        prop_assert!(elapsed >= Duration::from_secs(secs));
        prop_assert!(elapsed < Duration::from_secs(secs + 2));
    }

    #[test]
    fn snapshot_round_trip_revives_the_cursor(
        walk in prop::collection::vec(arbitrary_state_name(), 0..12),
    ) {
        let mut machine = vocab_machine();
        machine.history_enable();
        for to in walk.iter().copied() {
            machine.change(to).unwrap();
        }

        let json = machine.snapshot().to_json().unwrap();
        let snapshot = Snapshot::from_json(&json).unwrap();

        let mut revived = vocab_machine();
        revived.restore(&snapshot).unwrap();

        prop_assert_eq!(revived.current_state(), machine.current_state());
        prop_assert_eq!(revived.previous_state(), machine.previous_state());
        prop_assert_eq!(revived.history().names(), machine.history().names());
        prop_assert_eq!(revived.history_is_enabled(), machine.history_is_enabled());

        let bytes = machine.snapshot().to_binary().unwrap();
        let binary = Snapshot::from_binary(&bytes).unwrap();
        prop_assert_eq!(binary.current.as_str(), machine.current_state());
    }
}
