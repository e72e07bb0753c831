//! Snapshot and restore for a machine's runtime observables.
//!
//! A snapshot captures the cursor (initial/current/previous state,
//! elapsed time in state) and the history log. It never captures
//! states, transitions, or callbacks, which are code rather than
//! data. To revive a machine, re-register its definitions and restore
//! the snapshot on top.
//!
//! # Example
//!
//! ```rust
//! use stance::{Machine, Snapshot, State};
//!
//! let mut machine: Machine = Machine::new("idle");
//! machine.add_state("idle", State::new()).unwrap();
//! machine.add_state("walk", State::new()).unwrap();
//! machine.change("walk").unwrap();
//!
//! let json = machine.snapshot().to_json().unwrap();
//!
//! // Later, often in another process: same definitions, revived cursor.
//! let mut revived: Machine = Machine::new("idle");
//! revived.add_state("idle", State::new()).unwrap();
//! revived.add_state("walk", State::new()).unwrap();
//! revived.restore(&Snapshot::from_json(&json).unwrap()).unwrap();
//!
//! assert_eq!(revived.current_state(), "walk");
//! assert_eq!(revived.previous_state(), Some("idle"));
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::History;
use crate::error::FsmError;
use crate::machine::Machine;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable capture of a machine's runtime state.
/// Does NOT include event tables, transitions, or callbacks.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version.
    pub version: u32,

    /// Unique snapshot identifier.
    pub id: Uuid,

    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,

    /// State the machine was constructed in.
    pub initial: String,

    /// Current state at capture time.
    pub current: String,

    /// Most recently left state at capture time.
    pub previous: Option<String>,

    /// Time already spent in the current state.
    pub elapsed_in_state: Duration,

    /// The history log, entries and settings both.
    pub history: History,
}

impl Snapshot {
    /// Capture the runtime observables of `machine`.
    pub fn of<D>(machine: &Machine<D>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            initial: machine.initial_state().to_string(),
            current: machine.current_state().to_string(),
            previous: machine.previous_state().map(String::from),
            elapsed_in_state: machine.time_in_state(),
            history: machine.history().clone(),
        }
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode from JSON, checking the format version.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Encode as compact binary.
    pub fn to_binary(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Decode from binary, checking the format version.
    pub fn from_binary(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        if self.current.is_empty() {
            return Err(SnapshotError::ValidationFailed(
                "current state name is empty".to_string(),
            ));
        }
        if self.history.max_size() < 1 {
            return Err(SnapshotError::ValidationFailed(
                "history max size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl<D> Machine<D> {
    /// Capture the runtime observables of this machine.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(self)
    }

    /// Re-apply a snapshot's cursor and history onto this machine.
    ///
    /// Definitions are not part of a snapshot; the caller is expected
    /// to have re-registered them. The recorded state names are applied
    /// as-is, registered or not, exactly as construction accepts an
    /// unregistered initial state. The only failure is
    /// [`FsmError::InvalidArgument`], raised when the recorded elapsed
    /// time reaches past what the monotonic clock can represent; a
    /// failed restore leaves the machine untouched.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<&mut Self, FsmError> {
        self.restore_cursor(
            &snapshot.initial,
            &snapshot.current,
            snapshot.previous.as_deref(),
            snapshot.elapsed_in_state,
            snapshot.history.clone(),
        )?;
        Ok(self)
    }
}
