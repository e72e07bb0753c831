//! Macros for ergonomic state construction.

/// Build a [`State`](crate::State) from a table literal.
///
/// Each entry is `event: callback`; the builtin lifecycle events can be
/// written as bare identifiers, custom events as string literals. The
/// macro expands to the equivalent [`State::new().on(..)`](crate::State::on)
/// chain.
///
/// # Example
///
/// ```rust
/// use stance::{state, Machine};
///
/// let mut machine: Machine = Machine::new("idle");
/// machine
///     .add_state(
///         "idle",
///         state! {
///             enter: |_, _| println!("idling"),
///             leave: |_, _| println!("done idling"),
///             "update": |machine, _| {
///                 println!("idle for {:?}", machine.time_in_state());
///             },
///         },
///     )
///     .unwrap();
///
/// machine.enter();
/// machine.dispatch("update");
/// ```
#[macro_export]
macro_rules! state {
    ( $( $event:tt : $callback:expr ),* $(,)? ) => {{
        $crate::State::new()$(.on($crate::__event_name!($event), $callback))*
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __event_name {
    ($name:ident) => {
        stringify!($name)
    };
    ($name:literal) => {
        $name
    };
}

#[cfg(test)]
mod tests {
    use crate::{Machine, State};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn macro_builds_an_event_table() {
        let state: State = state! {
            enter: |_, _| {},
            leave: |_, _| {},
            "update": |_, _| {},
        };

        assert!(state.handles("enter"));
        assert!(state.handles("leave"));
        assert!(state.handles("update"));
        assert!(!state.handles("draw"));
    }

    #[test]
    fn empty_macro_is_an_empty_state() {
        let state: State = state! {};
        assert!(!state.handles("enter"));
    }

    #[test]
    fn macro_built_states_dispatch_like_hand_built_ones() {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);

        let mut machine: Machine = Machine::new("idle");
        machine
            .add_state(
                "idle",
                state! {
                    "update": move |_, _| seen.set(seen.get() + 1),
                },
            )
            .unwrap();

        machine.dispatch("update");
        machine.dispatch("update");
        assert_eq!(hits.get(), 2);
    }
}
