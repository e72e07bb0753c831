//! Core state machine types.
//!
//! This module contains the data the engine is built from:
//! - Per-state event tables ([`State`])
//! - Transition declarations and guards ([`Transition`])
//! - The bounded history buffer ([`History`])
//!
//! Everything here is plain data; the runtime behavior lives in
//! [`crate::machine`].

mod history;
mod state;
mod transition;

pub use history::{History, HistoryEntry};
pub use state::{EventFn, EventPresence, State, ENTER, LEAVE};
pub use transition::{GuardFn, Hooks, Source, Target, Transition};

pub(crate) use transition::TransitionRecord;
