//! Error types.
//!
//! There are no recoverable errors in the steady-state data path. Both kinds
//! abort the generation in flight: misuse of state slots during component
//! evaluation, and faults reported by the host adapter.

use thiserror::Error;

use crate::host::HostError;

/// Misuse of local state detected while evaluating a component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// The component declared a different number of state slots than in the
    /// previous generation (a declaration inside a conditional branch).
    #[error("component `{component}` declared {found} state slots, previous generation declared {expected}")]
    SlotCountChanged {
        component: String,
        expected: usize,
        found: usize,
    },

    /// The slot at `index` holds a value of another type.
    #[error("component `{component}` read state slot {index} as `{requested}`, but it holds another type")]
    TypeMismatch {
        component: String,
        index: usize,
        requested: &'static str,
    },
}

/// Errors returned by the work loop and commit phase.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Hook(#[from] HookError),

    #[error(transparent)]
    Host(#[from] HostError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
