//! The FSM engine.
//!
//! [`Machine`] owns the state registry, the transition table, and the
//! runtime cursor (current/previous state, entry instant, history). It
//! is driven synchronously: dispatching an event, changing state, or
//! triggering a transition runs every callback inline on the caller's
//! thread before returning.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::Utc;
use log::{debug, trace};

use crate::core::{
    EventFn, EventPresence, History, HistoryEntry, Hooks, Source, State, Target, Transition,
    TransitionRecord, ENTER, LEAVE,
};
use crate::error::FsmError;

/// Notification delivered to [`Machine::on_change`] listeners after a
/// completed state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateChange {
    /// The state that was left.
    pub from: String,
    /// The state that was entered.
    pub to: String,
    /// Name of the transition that caused the change; `None` when the
    /// change was requested directly.
    pub transition: Option<String>,
}

/// Shared state-change listener.
pub type ListenerFn<D> = Rc<dyn Fn(&mut Machine<D>, &StateChange)>;

/// Public method names of [`Machine`]. A state event or default event
/// may not shadow any of these; the two builtin lifecycle events are
/// exempt.
const RESERVED_METHODS: &[&str] = &[
    "new",
    "add_state",
    "set_default_event",
    "dispatch",
    "enter",
    "leave",
    "event_exists",
    "events",
    "add_transition",
    "transition_exists",
    "trigger",
    "trigger_with",
    "change",
    "change_with",
    "change_using",
    "state_is",
    "state_exists",
    "states",
    "current_state",
    "previous_state",
    "initial_state",
    "time_in_state",
    "set_time_in_state",
    "history",
    "history_enable",
    "history_disable",
    "history_is_enabled",
    "history_set_max_size",
    "history_max_size",
    "on_change",
    "snapshot",
    "restore",
];

fn check_event_name(name: &str) -> Result<(), FsmError> {
    if name == ENTER || name == LEAVE {
        return Ok(());
    }
    if RESERVED_METHODS.contains(&name) {
        return Err(FsmError::NameCollision {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn instant_before(elapsed: Duration) -> Result<Instant, FsmError> {
    Instant::now()
        .checked_sub(elapsed)
        .ok_or_else(|| FsmError::InvalidArgument {
            message: format!("elapsed time {elapsed:?} is beyond the clock's range"),
        })
}

/// A named-state machine.
///
/// `D` is the caller's payload type, forwarded by reference to event
/// callbacks via [`Machine::change_with`] and [`Machine::trigger_with`];
/// it defaults to `()` for machines that pass no payload.
///
/// The machine is single-threaded and reentrant: every callback receives
/// the machine mutably and may itself dispatch events or change state.
/// Panics raised inside user callbacks are never caught; they abort the
/// remaining steps of the operation that invoked them.
///
/// # Example
///
/// ```rust
/// use stance::{Machine, State, Transition};
///
/// let mut machine: Machine = Machine::new("idle");
/// machine
///     .add_state("idle", State::new().on_leave(|_, _| println!("leaving idle")))
///     .unwrap();
/// machine
///     .add_state("walk", State::new().on_enter(|_, _| println!("entering walk")))
///     .unwrap();
/// machine
///     .add_transition(Transition::new("go", "idle", "walk"))
///     .unwrap();
///
/// machine.trigger("go").unwrap();
/// assert_eq!(machine.current_state(), "walk");
/// assert_eq!(machine.previous_state(), Some("idle"));
/// ```
pub struct Machine<D = ()> {
    initial: String,
    current: String,
    previous: Option<String>,
    entered_at: Instant,
    states: HashMap<String, State<D>>,
    defaults: HashMap<String, EventFn<D>>,
    known_events: BTreeSet<String>,
    transitions: HashMap<String, HashMap<String, Vec<TransitionRecord<D>>>>,
    wildcards: HashMap<String, Vec<TransitionRecord<D>>>,
    listeners: Vec<ListenerFn<D>>,
    history: History,
}

impl<D> Machine<D> {
    /// Create a machine starting in `initial`.
    ///
    /// The initial state does not need to be registered; it only has to
    /// be registered before anything `change`s into it again.
    pub fn new<N: Into<String>>(initial: N) -> Self {
        let initial = initial.into();
        Self {
            current: initial.clone(),
            previous: None,
            entered_at: Instant::now(),
            states: HashMap::new(),
            defaults: HashMap::new(),
            known_events: [ENTER, LEAVE].iter().map(|s| s.to_string()).collect(),
            transitions: HashMap::new(),
            wildcards: HashMap::new(),
            listeners: Vec::new(),
            history: History::new(),
            initial,
        }
    }

    // ---- registry & dispatch ----

    /// Register (or overwrite) the event table for `name`.
    ///
    /// Every event in the table becomes dispatchable; installing an
    /// already-known event name is a no-op. Fails with
    /// [`FsmError::NameCollision`] if a custom event shadows a reserved
    /// engine method name; a rejected table leaves the machine untouched.
    pub fn add_state<N: Into<String>>(
        &mut self,
        name: N,
        state: State<D>,
    ) -> Result<&mut Self, FsmError> {
        let name = name.into();
        for event in state.event_names() {
            check_event_name(event)?;
        }
        for event in state.event_names() {
            self.install_event(event);
        }
        trace!("registered state '{name}'");
        self.states.insert(name, state);
        Ok(self)
    }

    /// Record the machine-wide fallback callback for `name`, used by
    /// states that lack their own. Same collision check as
    /// [`Machine::add_state`].
    pub fn set_default_event<N, F>(&mut self, name: N, callback: F) -> Result<&mut Self, FsmError>
    where
        N: Into<String>,
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        let name = name.into();
        check_event_name(&name)?;
        self.install_event(&name);
        self.defaults.insert(name, Rc::new(callback));
        Ok(self)
    }

    fn install_event(&mut self, name: &str) {
        if self.known_events.insert(name.to_string()) {
            trace!("installed event '{name}'");
        }
    }

    /// Invoke the current state's callback for `event`; fall back to
    /// the machine-wide default if the state has none; otherwise do
    /// nothing. The callback receives no payload.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stance::{Machine, State};
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let hits = Rc::new(Cell::new(0));
    /// let seen = Rc::clone(&hits);
    ///
    /// let mut machine: Machine = Machine::new("idle");
    /// machine
    ///     .add_state(
    ///         "idle",
    ///         State::new().on("update", move |_, _| seen.set(seen.get() + 1)),
    ///     )
    ///     .unwrap();
    ///
    /// machine.dispatch("update");
    /// machine.dispatch("update");
    /// assert_eq!(hits.get(), 2);
    /// ```
    pub fn dispatch(&mut self, event: &str) {
        let callback = self
            .state_callback(&self.current, event)
            .or_else(|| self.defaults.get(event).cloned());
        match callback {
            Some(callback) => {
                trace!("dispatching '{}' in state '{}'", event, self.current);
                callback(&mut *self, None);
            }
            None => trace!("no handler for '{}' in state '{}'", event, self.current),
        }
    }

    /// Dispatch the builtin `enter` event against the current state.
    pub fn enter(&mut self) {
        self.dispatch(ENTER);
    }

    /// Dispatch the builtin `leave` event against the current state.
    pub fn leave(&mut self) {
        self.dispatch(LEAVE);
    }

    /// How `event` would resolve right now: [`EventPresence::Defined`]
    /// if the current state has its own callback,
    /// [`EventPresence::Default`] if only the machine-wide default
    /// applies, [`EventPresence::NotDefined`] otherwise.
    pub fn event_exists(&self, event: &str) -> EventPresence {
        if self
            .states
            .get(&self.current)
            .is_some_and(|state| state.handles(event))
        {
            EventPresence::Defined
        } else if self.defaults.contains_key(event) {
            EventPresence::Default
        } else {
            EventPresence::NotDefined
        }
    }

    /// Every event name the machine knows, sorted. The builtin
    /// lifecycle events are always present.
    pub fn events(&self) -> Vec<&str> {
        self.known_events.iter().map(String::as_str).collect()
    }

    fn state_callback(&self, state: &str, event: &str) -> Option<EventFn<D>> {
        self.states.get(state).and_then(|s| s.get(event)).cloned()
    }

    // ---- transitions ----

    /// Register a transition declaration.
    ///
    /// For named sources, every source and the destination must already
    /// be registered ([`FsmError::UnknownState`]); validation of all of
    /// them precedes insertion of any record. Wildcard declarations are
    /// not validated here; an unregistered destination surfaces when
    /// the transition fires. An empty source list is rejected with
    /// [`FsmError::InvalidArgument`].
    pub fn add_transition(&mut self, transition: Transition<D>) -> Result<&mut Self, FsmError> {
        let Transition {
            name,
            source,
            target,
            guard,
            hooks,
        } = transition;
        trace!("registering transition '{name}'");
        match source {
            Source::Any => {
                let record = TransitionRecord {
                    target,
                    guard,
                    hooks,
                };
                self.wildcards.entry(name).or_default().push(record);
            }
            Source::States(sources) => {
                if sources.is_empty() {
                    return Err(FsmError::InvalidArgument {
                        message: format!("transition '{name}' needs at least one source state"),
                    });
                }
                for source in &sources {
                    if !self.states.contains_key(source) {
                        return Err(FsmError::UnknownState {
                            name: source.clone(),
                        });
                    }
                }
                if let Target::State(to) = &target {
                    if !self.states.contains_key(to) {
                        return Err(FsmError::UnknownState { name: to.clone() });
                    }
                }
                let record = TransitionRecord {
                    target,
                    guard,
                    hooks,
                };
                for source in sources {
                    self.transitions
                        .entry(source)
                        .or_default()
                        .entry(name.clone())
                        .or_default()
                        .push(record.clone());
                }
            }
        }
        Ok(self)
    }

    /// Whether a transition named `name` is registered for `source`,
    /// either specifically or through a wildcard. Guards are not
    /// evaluated; only registration is checked.
    pub fn transition_exists(&self, name: &str, source: &str) -> bool {
        let specific = self
            .transitions
            .get(source)
            .is_some_and(|by_name| by_name.contains_key(name));
        specific || self.wildcards.contains_key(name)
    }

    /// Fire the transition named `name` from the current state, if one
    /// matches.
    ///
    /// Resolution scans the current state's own records for `name` in
    /// registration order and fires the first whose guard passes; only
    /// if none does are the wildcard records scanned the same way. A
    /// specific record always beats a same-named wildcard, even when
    /// both guards pass. No match at all is a successful no-op.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stance::{Machine, State, Transition};
    ///
    /// let mut machine: Machine = Machine::new("idle");
    /// machine.add_state("idle", State::new()).unwrap();
    /// machine.add_state("walk", State::new()).unwrap();
    /// machine
    ///     .add_transition(Transition::new("go", "idle", "walk").when(|_| false))
    ///     .unwrap();
    ///
    /// // The only candidate's guard fails, so nothing happens.
    /// machine.trigger("go").unwrap();
    /// assert!(machine.state_is("idle"));
    /// ```
    pub fn trigger(&mut self, name: &str) -> Result<&mut Self, FsmError> {
        match self.resolve(name) {
            Some((to, hooks)) => self.change_inner(&to, &hooks, None, Some(name))?,
            None => trace!("trigger '{}' matched nothing in state '{}'", name, self.current),
        }
        Ok(self)
    }

    /// Like [`Machine::trigger`], forwarding `data` to every callback
    /// the resulting change invokes.
    pub fn trigger_with(&mut self, name: &str, data: &D) -> Result<&mut Self, FsmError> {
        match self.resolve(name) {
            Some((to, hooks)) => self.change_inner(&to, &hooks, Some(data), Some(name))?,
            None => trace!("trigger '{}' matched nothing in state '{}'", name, self.current),
        }
        Ok(self)
    }

    fn resolve(&self, name: &str) -> Option<(String, Hooks<D>)> {
        let specific = self
            .transitions
            .get(&self.current)
            .and_then(|by_name| by_name.get(name))
            .and_then(|records| records.iter().find(|record| record.passes(self)));
        let record = specific.or_else(|| {
            self.wildcards
                .get(name)
                .and_then(|records| records.iter().find(|record| record.passes(self)))
        })?;
        let to = match &record.target {
            Target::State(to) => to.clone(),
            Target::Reflexive => self.current.clone(),
        };
        Some((to, record.hooks.clone()))
    }

    // ---- the change protocol ----

    /// Change into the registered state `to`.
    ///
    /// The protocol, in order: validate the destination; run the leave
    /// callback (the current state's own, never a default-event
    /// fallback); record the left state (previous-state, history);
    /// commit the cursor and reset the entry instant; run the
    /// destination's enter callback; notify listeners. Guards play no
    /// part here; they gate only [`Machine::trigger`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use stance::{Machine, State};
    ///
    /// let mut machine: Machine = Machine::new("idle");
    /// machine.add_state("idle", State::new()).unwrap();
    /// machine.add_state("walk", State::new()).unwrap();
    ///
    /// machine.change("walk").unwrap();
    /// assert_eq!(machine.current_state(), "walk");
    /// assert_eq!(machine.previous_state(), Some("idle"));
    /// assert!(machine.time_in_state().as_secs() == 0);
    /// ```
    pub fn change(&mut self, to: &str) -> Result<&mut Self, FsmError> {
        self.change_inner(to, &Hooks::new(), None, None)?;
        Ok(self)
    }

    /// Like [`Machine::change`], forwarding `data` to the leave and
    /// enter callbacks.
    pub fn change_with(&mut self, to: &str, data: &D) -> Result<&mut Self, FsmError> {
        self.change_inner(to, &Hooks::new(), Some(data), None)?;
        Ok(self)
    }

    /// Like [`Machine::change`], with explicit override hooks: a
    /// non-empty hook replaces the corresponding state callback for
    /// this change only.
    pub fn change_using(
        &mut self,
        to: &str,
        hooks: &Hooks<D>,
        data: Option<&D>,
    ) -> Result<&mut Self, FsmError> {
        self.change_inner(to, hooks, data, None)?;
        Ok(self)
    }

    fn change_inner(
        &mut self,
        to: &str,
        hooks: &Hooks<D>,
        data: Option<&D>,
        via: Option<&str>,
    ) -> Result<(), FsmError> {
        if !self.states.contains_key(to) {
            return Err(FsmError::UnknownState {
                name: to.to_string(),
            });
        }

        // Leave phase. A panic here aborts the change with the cursor
        // untouched.
        let leave = hooks
            .leave
            .clone()
            .or_else(|| self.state_callback(&self.current, LEAVE));
        if let Some(callback) = leave {
            callback(&mut *self, data);
        }

        // The leave callback may itself have changed state; what gets
        // recorded as left is whatever is current once it returns.
        let from = self.current.clone();
        self.previous = Some(from.clone());
        self.history.record(HistoryEntry {
            state: from.clone(),
            left_at: Utc::now(),
            via: via.map(String::from),
        });

        self.current = to.to_string();
        self.entered_at = Instant::now();
        debug!("state changed '{}' -> '{}'", from, self.current);

        let enter = hooks
            .enter
            .clone()
            .or_else(|| self.state_callback(to, ENTER));
        if let Some(callback) = enter {
            callback(&mut *self, data);
        }

        let notice = StateChange {
            from,
            to: to.to_string(),
            transition: via.map(String::from),
        };
        // Listeners registered while notifying see only later changes.
        for listener in self.listeners.clone() {
            listener(&mut *self, &notice);
        }
        Ok(())
    }

    // ---- cursor ----

    /// Name of the current state.
    pub fn current_state(&self) -> &str {
        &self.current
    }

    /// Name of the most recently left state; `None` until the first
    /// change.
    pub fn previous_state(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Name the machine was constructed in.
    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    /// Whether the current state is `name`.
    pub fn state_is(&self, name: &str) -> bool {
        self.current == name
    }

    /// Whether a state named `name` has been registered.
    pub fn state_exists(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Registered state names, sorted.
    pub fn states(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.states.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // ---- timing ----

    /// Time elapsed since the current state was entered.
    pub fn time_in_state(&self) -> Duration {
        self.entered_at.elapsed()
    }

    /// Pretend the current state was entered `elapsed` ago.
    ///
    /// Fails with [`FsmError::InvalidArgument`] only when `elapsed`
    /// reaches past what the monotonic clock can represent.
    pub fn set_time_in_state(&mut self, elapsed: Duration) -> Result<&mut Self, FsmError> {
        self.entered_at = instant_before(elapsed)?;
        Ok(self)
    }

    // ---- history ----

    /// The history log.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Start recording left states. Existing entries are kept.
    pub fn history_enable(&mut self) -> &mut Self {
        self.history.enable();
        self
    }

    /// Stop recording left states. Existing entries are kept.
    pub fn history_disable(&mut self) -> &mut Self {
        self.history.disable();
        self
    }

    /// Whether departures are currently recorded.
    pub fn history_is_enabled(&self) -> bool {
        self.history.is_enabled()
    }

    /// Bound the history log to `max_size` entries (at least one),
    /// truncating oldest-first if it already holds more.
    pub fn history_set_max_size(&mut self, max_size: usize) -> Result<&mut Self, FsmError> {
        self.history.set_max_size(max_size)?;
        Ok(self)
    }

    /// Current bound on the history log.
    pub fn history_max_size(&self) -> usize {
        self.history.max_size()
    }

    // ---- observers ----

    /// Register a listener invoked synchronously after every completed
    /// change, in registration order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stance::{Machine, State};
    ///
    /// let mut machine: Machine = Machine::new("idle");
    /// machine.add_state("idle", State::new()).unwrap();
    /// machine.add_state("walk", State::new()).unwrap();
    /// machine.on_change(|_, change| {
    ///     println!("{} -> {}", change.from, change.to);
    /// });
    ///
    /// machine.change("walk").unwrap();
    /// ```
    pub fn on_change<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&mut Machine<D>, &StateChange) + 'static,
    {
        self.listeners.push(Rc::new(listener));
        self
    }

    // ---- snapshot & restore ----

    pub(crate) fn restore_cursor(
        &mut self,
        initial: &str,
        current: &str,
        previous: Option<&str>,
        elapsed: Duration,
        history: History,
    ) -> Result<(), FsmError> {
        let entered_at = instant_before(elapsed)?;
        self.initial = initial.to_string();
        self.current = current.to_string();
        self.previous = previous.map(String::from);
        self.history = history;
        self.entered_at = entered_at;
        debug!("restored cursor into state '{}'", self.current);
        Ok(())
    }
}

impl<D> fmt::Debug for Machine<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("states", &self.states())
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}
