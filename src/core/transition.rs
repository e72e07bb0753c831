//! Named, guarded transitions between states.
//!
//! A [`Transition`] is a declaration: a name, a source scope, a target,
//! and optionally a guard plus leave/enter overrides. The machine
//! validates the declaration on registration and stores one record per
//! named source (or one wildcard record), preserving insertion order
//! among same-named records.

use std::rc::Rc;

use crate::core::state::EventFn;
use crate::machine::Machine;

/// Guard predicate deciding whether a transition may fire.
///
/// Guards observe the machine but never mutate it; they are evaluated
/// only during [`Machine::trigger`] resolution, never inside a direct
/// [`Machine::change`].
pub type GuardFn<D> = Rc<dyn Fn(&Machine<D>) -> bool>;

/// Source scope of a transition declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// One or more named source states, in declaration order.
    States(Vec<String>),
    /// Usable from any current state.
    Any,
}

impl From<&str> for Source {
    fn from(name: &str) -> Self {
        Source::States(vec![name.to_string()])
    }
}

impl From<String> for Source {
    fn from(name: String) -> Self {
        Source::States(vec![name])
    }
}

impl From<Vec<String>> for Source {
    fn from(names: Vec<String>) -> Self {
        Source::States(names)
    }
}

impl From<Vec<&str>> for Source {
    fn from(names: Vec<&str>) -> Self {
        Source::States(names.into_iter().map(String::from).collect())
    }
}

impl From<&[&str]> for Source {
    fn from(names: &[&str]) -> Self {
        Source::States(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Source {
    fn from(names: [&str; N]) -> Self {
        Source::States(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Target of a transition declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A named destination state.
    State(String),
    /// Back to whichever state the transition fired from.
    Reflexive,
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::State(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::State(name)
    }
}

/// Optional leave/enter callbacks overriding the states' own.
///
/// Carried by a [`Transition`] or passed directly to
/// [`Machine::change_using`]. An empty set of hooks falls through to
/// the states' registered lifecycle callbacks.
pub struct Hooks<D = ()> {
    pub(crate) leave: Option<EventFn<D>>,
    pub(crate) enter: Option<EventFn<D>>,
}

impl<D> Hooks<D> {
    /// Hooks overriding nothing.
    pub fn new() -> Self {
        Self {
            leave: None,
            enter: None,
        }
    }

    /// Override the leave callback for this change.
    pub fn on_leave<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        self.leave = Some(Rc::new(callback));
        self
    }

    /// Override the enter callback for this change.
    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        self.enter = Some(Rc::new(callback));
        self
    }

    /// Whether neither phase is overridden.
    pub fn is_empty(&self) -> bool {
        self.leave.is_none() && self.enter.is_none()
    }
}

impl<D> Default for Hooks<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for Hooks<D> {
    fn clone(&self) -> Self {
        Self {
            leave: self.leave.clone(),
            enter: self.enter.clone(),
        }
    }
}

/// A transition declaration, registered with [`Machine::add_transition`].
///
/// Several transitions may share a name on the same source; they are
/// kept in registration order and the first whose guard passes fires.
/// A transition scoped to the current state always wins over a
/// same-named wildcard.
///
/// # Example
///
/// ```rust
/// use stance::{Machine, State, Transition};
///
/// let mut machine: Machine = Machine::new("idle");
/// machine.add_state("idle", State::new()).unwrap();
/// machine.add_state("walk", State::new()).unwrap();
///
/// machine
///     .add_transition(
///         Transition::new("go", "idle", "walk")
///             .when(|m: &Machine| m.time_in_state().as_secs() < 60),
///     )
///     .unwrap();
///
/// machine.trigger("go").unwrap();
/// assert!(machine.state_is("walk"));
/// ```
pub struct Transition<D = ()> {
    pub(crate) name: String,
    pub(crate) source: Source,
    pub(crate) target: Target,
    pub(crate) guard: Option<GuardFn<D>>,
    pub(crate) hooks: Hooks<D>,
}

impl<D> Transition<D> {
    /// Declare a transition from one or more named sources to `to`.
    pub fn new<N, S, T>(name: N, from: S, to: T) -> Self
    where
        N: Into<String>,
        S: Into<Source>,
        T: Into<String>,
    {
        Self::with(name, from.into(), Target::State(to.into()))
    }

    /// Declare a transition usable from any current state.
    pub fn wildcard<N, T>(name: N, to: T) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self::with(name, Source::Any, Target::State(to.into()))
    }

    /// Declare a transition that re-enters its own source state.
    pub fn reflexive<N, S>(name: N, from: S) -> Self
    where
        N: Into<String>,
        S: Into<Source>,
    {
        Self::with(name, from.into(), Target::Reflexive)
    }

    /// Declare a transition with an explicit source scope and target.
    pub fn with<N>(name: N, source: Source, target: Target) -> Self
    where
        N: Into<String>,
    {
        Self {
            name: name.into(),
            source,
            target,
            guard: None,
            hooks: Hooks::new(),
        }
    }

    /// Gate the transition on a predicate.
    pub fn when<F>(mut self, guard: F) -> Self
    where
        F: Fn(&Machine<D>) -> bool + 'static,
    {
        self.guard = Some(Rc::new(guard));
        self
    }

    /// Override the leave callback when this transition fires.
    pub fn on_leave<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        self.hooks = self.hooks.on_leave(callback);
        self
    }

    /// Override the enter callback when this transition fires.
    pub fn on_enter<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut Machine<D>, Option<&D>) + 'static,
    {
        self.hooks = self.hooks.on_enter(callback);
        self
    }

    /// The transition's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared source scope.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The declared target.
    pub fn target(&self) -> &Target {
        &self.target
    }
}

impl<D> Clone for Transition<D> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            guard: self.guard.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

/// One stored transition entry for a single source (or the wildcard).
pub(crate) struct TransitionRecord<D> {
    pub(crate) target: Target,
    pub(crate) guard: Option<GuardFn<D>>,
    pub(crate) hooks: Hooks<D>,
}

impl<D> TransitionRecord<D> {
    pub(crate) fn passes(&self, machine: &Machine<D>) -> bool {
        self.guard.as_ref().is_none_or(|guard| guard(machine))
    }
}

impl<D> Clone for TransitionRecord<D> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            guard: self.guard.clone(),
            hooks: self.hooks.clone(),
        }
    }
}
