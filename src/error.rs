//! Engine error types.

use thiserror::Error;

/// Errors raised by machine operations.
///
/// All failures are synchronous and surface directly from the offending
/// method; the engine never mutates state before raising one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError {
    /// A `change` or non-wildcard transition referenced a state that was
    /// never registered.
    #[error("state '{name}' is not registered")]
    UnknownState { name: String },

    /// A state event or default event tried to reuse a reserved engine
    /// method name.
    #[error("event name '{name}' collides with a reserved engine method")]
    NameCollision { name: String },

    /// An argument was out of range: a history cap of zero, an empty
    /// transition source list, or an elapsed time beyond the monotonic
    /// clock's range.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}
