//! Stance: a named-state machine for interactive applications.
//!
//! Stance drives the moment-to-moment modes of games, UI widgets, and
//! simulations. States are data (named tables of event callbacks),
//! and transitions between them are named, guarded rules resolved
//! first-match-wins, with specific-state rules always beating wildcard
//! ones. Everything runs synchronously on the caller's thread; a
//! callback may itself change state, and the engine follows along.
//!
//! # Core Concepts
//!
//! - **State**: a named mode carrying `enter`/`leave` lifecycle
//!   callbacks plus any custom events (`"update"`, `"draw"`, …)
//! - **Transition**: a named rule from one or more source states (or
//!   any state) to a destination, optionally gated by a guard
//! - **History**: a bounded, oldest-evicted log of the states the
//!   machine has left
//! - **Snapshot**: a serializable capture of the runtime cursor for
//!   saving and restoring across processes
//!
//! # Example
//!
//! ```rust
//! use stance::{state, Machine, Transition};
//!
//! let mut machine: Machine = Machine::new("idle");
//!
//! machine
//!     .add_state(
//!         "idle",
//!         state! {
//!             enter: |_, _| println!("taking a breath"),
//!             "update": |machine, _| {
//!                 println!("idle for {:?}", machine.time_in_state());
//!             },
//!         },
//!     )
//!     .unwrap();
//! machine
//!     .add_state(
//!         "walk",
//!         state! {
//!             enter: |_, _| println!("off we go"),
//!         },
//!     )
//!     .unwrap();
//!
//! machine
//!     .add_transition(Transition::new("go", "idle", "walk"))
//!     .unwrap();
//! machine
//!     .add_transition(Transition::wildcard("rest", "idle"))
//!     .unwrap();
//!
//! machine.dispatch("update");
//! machine.trigger("go").unwrap();
//! assert!(machine.state_is("walk"));
//!
//! machine.trigger("rest").unwrap();
//! assert_eq!(machine.previous_state(), Some("walk"));
//! ```

pub mod core;
pub mod error;
pub mod machine;
mod macros;
pub mod snapshot;

// Re-export commonly used types
pub use crate::core::{
    EventFn, EventPresence, GuardFn, History, HistoryEntry, Hooks, Source, State, Target,
    Transition,
};
pub use crate::error::FsmError;
pub use crate::machine::{ListenerFn, Machine, StateChange};
pub use crate::snapshot::{Snapshot, SnapshotError, SNAPSHOT_VERSION};
