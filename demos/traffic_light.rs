//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine.
//!
//! Key concepts:
//! - Named states with enter callbacks
//! - One transition name shared by every source state
//! - Cyclic transitions (the sequence repeats)
//!
//! Run with: cargo run --example traffic_light

use stance::{state, Machine, Transition};

fn main() {
    println!("=== Traffic Light State Machine ===\n");

    let mut light: Machine = Machine::new("red");

    light
        .add_state("red", state! { enter: |_, _| println!("  [red] Stop") })
        .unwrap();
    light
        .add_state("green", state! { enter: |_, _| println!("  [green] Go!") })
        .unwrap();
    light
        .add_state("yellow", state! { enter: |_, _| println!("  [yellow] Caution") })
        .unwrap();

    light
        .add_transition(Transition::new("advance", "red", "green"))
        .unwrap();
    light
        .add_transition(Transition::new("advance", "green", "yellow"))
        .unwrap();
    light
        .add_transition(Transition::new("advance", "yellow", "red"))
        .unwrap();

    println!("Initial state: {}\n", light.current_state());

    println!("Cycling twice around:");
    for _ in 0..6 {
        light.trigger("advance").unwrap();
    }

    println!("\nBack at: {}", light.current_state());
    println!("Previous: {}", light.previous_state().unwrap_or("-"));

    println!("\n=== Example Complete ===");
}
