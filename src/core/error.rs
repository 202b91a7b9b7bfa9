// This module defines error types for compilation jobs using the thiserror crate. JobError
// covers the ways a caller can misuse a job (touching a flag that is not valid for the job's
// code kind, attaching a second persistent handle bundle, publishing code twice, asking for
// OSR on a stub) and the runtime failures a job reports instead of crashing (an unavailable
// runtime while reopening handles, handles used from the wrong thread). Handle errors from
// the heap module convert automatically. JobResult<T> is the convenience alias used by every
// fallible job operation. Bailouts are not errors and never appear here.

//! Error types for compilation jobs.

use thiserror::Error;

use super::code_kind::CodeKind;
use super::flags::Flag;
use super::osr::BytecodeOffset;
use crate::heap::HeapError;

/// Whether a flag was read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagAccess {
    Get,
    Set,
}

/// Main error type for compilation job operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("{access:?} of flag {flag} is not valid for a {code_kind} job")]
    InvalidFlagAccess {
        flag: Flag,
        access: FlagAccess,
        code_kind: CodeKind,
    },

    #[error("operation requires a job optimizing a function, this job compiles {code_kind}")]
    NotOptimizing { code_kind: CodeKind },

    #[error("stub jobs cannot use code kind {code_kind}")]
    InvalidStubKind { code_kind: CodeKind },

    #[error("job is already specialized for OSR at {offset}")]
    OsrAlreadyMarked { offset: BytecodeOffset },

    #[error("OSR entry requires a bytecode offset")]
    InvalidOsrOffset,

    #[error("a persistent handle bundle is already attached")]
    BundleAlreadyAttached,

    #[error("no persistent handle bundle is attached")]
    NoBundleAttached,

    #[error("code has already been set")]
    CodeAlreadySet,

    #[error("a wasm compilation result is already held")]
    WasmResultAlreadySet,

    #[error("job has no closure")]
    NoClosure,

    #[error("runtime is unavailable")]
    RuntimeUnavailable,

    #[error(transparent)]
    Heap(#[from] HeapError),
}

/// Result type alias for job operations.
pub type JobResult<T> = Result<T, JobError>;
