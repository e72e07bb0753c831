//! Patrolling Guard AI
//!
//! This example demonstrates wildcard transitions, history tracking,
//! and snapshotting a machine mid-run.
//!
//! Key concepts:
//! - Wildcard transitions usable from any state
//! - Reflexive transitions (full leave/enter on the same state)
//! - Bounded history of left states
//! - Saving and restoring the runtime cursor
//!
//! Run with: cargo run --example patrol

use stance::{state, Machine, Snapshot, Transition};

fn guard_brain() -> Machine {
    let mut ai: Machine = Machine::new("patrol");

    ai.add_state(
        "patrol",
        state! {
            enter: |_, _| println!("  [patrol] Walking the route."),
            "update": |machine, _| {
                println!("  [patrol] All quiet for {:?}.", machine.time_in_state());
            },
        },
    )
    .unwrap();
    ai.add_state(
        "chase",
        state! {
            enter: |_, _| println!("  [chase] After them!"),
        },
    )
    .unwrap();
    ai.add_state(
        "search",
        state! {
            enter: |_, _| println!("  [search] Hmm, where did they go?"),
        },
    )
    .unwrap();

    ai.add_transition(Transition::wildcard("spotted", "chase"))
        .unwrap();
    ai.add_transition(Transition::new("lost", "chase", "search"))
        .unwrap();
    ai.add_transition(Transition::new("give-up", "search", "patrol"))
        .unwrap();
    ai.add_transition(Transition::reflexive("look-around", "search"))
        .unwrap();

    ai.history_enable();
    ai.history_set_max_size(8).unwrap();
    ai
}

fn main() {
    println!("=== Patrolling Guard AI ===\n");

    let mut ai = guard_brain();

    println!("A quiet shift:");
    ai.dispatch("update");

    println!("\nAn intruder appears:");
    ai.trigger("spotted").unwrap();
    ai.trigger("lost").unwrap();
    ai.trigger("look-around").unwrap();
    ai.trigger("give-up").unwrap();

    println!("\nStates left so far: {:?}", ai.history().names());

    // Save the shift mid-run...
    let json = ai.snapshot().to_json().unwrap();
    println!("\nSnapshot taken ({} bytes of JSON).", json.len());

    // ...and hand it to the next process: same brain, revived cursor.
    let mut revived = guard_brain();
    revived
        .restore(&Snapshot::from_json(&json).unwrap())
        .unwrap();
    println!(
        "Revived in '{}' (previously '{}'), history {:?}.",
        revived.current_state(),
        revived.previous_state().unwrap_or("-"),
        revived.history().names(),
    );

    println!("\n=== Example Complete ===");
}
