//! Input error types

use thiserror::Error;

/// Hard failures surfaced to the caller.
///
/// Binding bookkeeping problems (removing from an unbound key, removing a
/// handle that was never added) are diagnostics, not errors: they are
/// reported on the tracing channel and the call returns without applying a
/// change. Only programmer errors end up here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// The reserved `Any` sentinel was used where a concrete key or button
    /// identity is required.
    #[error("the `Any` sentinel is not a concrete identity")]
    InvalidIdentity,

    /// A different window is already attached; detach it first.
    #[error("another window is already attached")]
    AlreadyAttached,
}
