//! Bounded history of previously-left states.
//!
//! The machine appends an entry every time a state is left through a
//! change, provided tracking is enabled. The buffer keeps at most
//! `max_size` entries and evicts the oldest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FsmError;

/// One recorded departure from a state.
///
/// # Example
///
/// ```rust
/// use stance::{History, HistoryEntry};
/// use chrono::Utc;
///
/// let mut history = History::new();
/// history.enable();
/// history.record(HistoryEntry {
///     state: "idle".into(),
///     left_at: Utc::now(),
///     via: None,
/// });
///
/// assert_eq!(history.names(), vec!["idle"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Name of the state that was left.
    pub state: String,
    /// When the state was left.
    pub left_at: DateTime<Utc>,
    /// Name of the transition that caused the departure, if the change
    /// came from a trigger rather than a direct change.
    pub via: Option<String>,
}

/// Ordered, bounded log of left states.
///
/// Tracking is disabled by default; enabling and disabling never clears
/// recorded entries. The oldest entry is evicted once the buffer would
/// exceed its maximum size.
///
/// # Example
///
/// ```rust
/// use stance::{History, HistoryEntry};
/// use chrono::Utc;
///
/// let mut history = History::new();
/// history.enable();
/// history.set_max_size(2).unwrap();
///
/// for name in ["a", "b", "c"] {
///     history.record(HistoryEntry {
///         state: name.into(),
///         left_at: Utc::now(),
///         via: None,
///     });
/// }
///
/// // "a" was evicted when "c" arrived.
/// assert_eq!(history.names(), vec!["b", "c"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    enabled: bool,
    max_size: usize,
}

impl History {
    /// Default bound on the history buffer.
    pub const DEFAULT_MAX_SIZE: usize = 100;

    /// Create an empty, disabled history with the default bound.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            enabled: false,
            max_size: Self::DEFAULT_MAX_SIZE,
        }
    }

    /// Turn tracking on. Existing entries are kept.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Turn tracking off. Existing entries are kept.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Whether departures are currently recorded.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current bound on the buffer.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Set the bound. The buffer must hold at least one entry, so zero
    /// is rejected and leaves both the bound and the entries untouched.
    /// Shrinking below the current length drops the oldest entries.
    pub fn set_max_size(&mut self, max_size: usize) -> Result<(), FsmError> {
        if max_size < 1 {
            return Err(FsmError::InvalidArgument {
                message: "history max size must be at least 1".to_string(),
            });
        }
        self.max_size = max_size;
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
        Ok(())
    }

    /// Append an entry if tracking is enabled, evicting the oldest when
    /// the buffer is full.
    pub fn record(&mut self, entry: HistoryEntry) {
        if !self.enabled {
            return;
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.max_size {
            self.entries.pop_front();
        }
    }

    /// Recorded state names, oldest first.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.state.as_str()).collect()
    }

    /// Recorded entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
