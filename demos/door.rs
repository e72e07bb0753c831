//! Guarded Door
//!
//! This example demonstrates guarded transitions and event payloads.
//!
//! Key concepts:
//! - Guards deciding whether a transition fires
//! - Payload data forwarded to callbacks
//! - A machine-wide default event
//! - Change notifications
//!
//! Run with: cargo run --example door

use stance::{state, Machine, Transition};
use std::cell::Cell;
use std::rc::Rc;

fn main() {
    println!("=== Guarded Door ===\n");

    let has_key = Rc::new(Cell::new(false));

    let mut door: Machine<String> = Machine::new("closed");

    door.add_state(
        "closed",
        state! {
            enter: |_, _| println!("  The door clicks shut."),
        },
    )
    .unwrap();
    door.add_state(
        "open",
        state! {
            enter: |_, data: Option<&String>| match data {
                Some(name) => println!("  {name} pushes the door open."),
                None => println!("  The door swings open."),
            },
        },
    )
    .unwrap();

    door.set_default_event("knock", |machine, _| {
        println!("  Knock knock. (door is {})", machine.current_state());
    })
    .unwrap();

    let key = Rc::clone(&has_key);
    door.add_transition(Transition::new("open", "closed", "open").when(move |_| key.get()))
        .unwrap();
    door.add_transition(Transition::new("close", "open", "closed"))
        .unwrap();

    door.on_change(|_, change| {
        println!(
            "  [notify] {} -> {} (via {:?})",
            change.from, change.to, change.transition
        );
    });

    println!("Without the key:");
    door.dispatch("knock");
    door.trigger("open").unwrap();
    println!("  Door is still {}.\n", door.current_state());

    println!("Pick up the key:");
    has_key.set(true);
    door.trigger_with("open", &"Ada".to_string()).unwrap();
    println!("  Door is now {}.\n", door.current_state());

    println!("Heading back out:");
    door.trigger("close").unwrap();

    println!("\n=== Example Complete ===");
}
