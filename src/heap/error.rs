//! Errors raised when a handle is used outside the scope or thread it
//! belongs to.

use std::thread::ThreadId;
use thiserror::Error;

use super::handles::ScopeId;

/// Handle and scope misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    #[error("{scope} belongs to thread {owner:?}, used from {current:?}")]
    WrongThread {
        scope: ScopeId,
        owner: ThreadId,
        current: ThreadId,
    },

    #[error("handle issued by {handle_scope} resolved against {scope}")]
    ForeignHandle {
        handle_scope: ScopeId,
        scope: ScopeId,
    },

    #[error("slot {slot} is out of range for {scope}")]
    DanglingSlot { scope: ScopeId, slot: usize },
}
