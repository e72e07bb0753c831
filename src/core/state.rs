//! Per-state event tables.
//!
//! A state is a named mode of the machine carrying a table of event
//! callbacks. States are data (a mapping from event name to callback),
//! not types: the machine looks callbacks up by name at dispatch time.

use std::collections::HashMap;
use std::rc::Rc;

use crate::machine::Machine;

/// Name of the builtin lifecycle event fired when a state is entered.
pub const ENTER: &str = "enter";

/// Name of the builtin lifecycle event fired when a state is left.
pub const LEAVE: &str = "leave";

/// Shared event callback.
///
/// Every callback receives the machine mutably and the optional
/// payload forwarded by `change_with`/`trigger_with` (`None` when the
/// event was dispatched without one). A callback may itself dispatch
/// events or change state from inside the handler. Callbacks are
/// reference-counted and single-threaded; they do not need to be `Send`.
pub type EventFn<D> = Rc<dyn Fn(&mut Machine<D>, Option<&D>)>;

/// How an event name resolves against the current state.
///
/// Returned by [`Machine::event_exists`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPresence {
    /// Neither the current state nor the defaults know the event.
    NotDefined,
    /// The current state carries its own callback for the event.
    Defined,
    /// Only the machine-wide default callback applies.
    Default,
}

/// A state's event table, built fluently and registered under a name
/// with [`Machine::add_state`].
///
/// The table always admits the two builtin lifecycle events
/// ([`ENTER`]/[`LEAVE`]); any other name is a custom event the caller
/// can dispatch.
///
/// # Example
///
/// ```rust
/// use stance::{Machine, State};
///
/// let walk: State = State::new()
///     .on_enter(|_, _| println!("started walking"))
///     .on_leave(|_, _| println!("stopped walking"))
///     .on("update", |machine: &mut Machine, _| {
///         println!("still in '{}'", machine.current_state());
///     });
///
/// assert!(walk.handles("enter"));
/// assert!(walk.handles("update"));
/// assert!(!walk.handles("draw"));
/// ```
pub struct State<D = ()> {
    events: HashMap<String, EventFn<D>>,
}

impl<D> State<D> {
    /// Create an empty event table.
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
        }
    }

    /// Attach a callback for a named event, replacing any previous one.
    pub fn on<N, F>(mut self, event: N, callback: F) -> Self
    where
        N: Into<String>,
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        self.events.insert(event.into(), Rc::new(callback));
        self
    }

    /// Attach the builtin `enter` lifecycle callback.
    pub fn on_enter<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        self.on(ENTER, callback)
    }

    /// Attach the builtin `leave` lifecycle callback.
    pub fn on_leave<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        self.on(LEAVE, callback)
    }

    /// Whether this table carries its own callback for `event`.
    pub fn handles(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    pub(crate) fn get(&self, event: &str) -> Option<&EventFn<D>> {
        self.events.get(event)
    }

    pub(crate) fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }
}

impl<D> Default for State<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for State<D> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}
