// This module serves as the hub for the compilation job and everything it carries. It
// organizes the flag registry (the Flag enumeration, its bitset and validity rules), the
// code kind and frame type classification, the compiler configuration with its switch
// parser and tracing filter, bailout reasons and the derived outcome state, the inlining
// ledger, the OSR record, the wasm result holder, diagnostics, and the CompilationJob
// descriptor itself with the worker hand-off helper. Managed references are provided by the
// sibling heap module; this module only decides which of them a job holds and when.

//! Compilation job infrastructure.
//!
//! # Key Components
//!
//! ## Job descriptor (`job`)
//! - Function mode (optimizing a closure) and stub mode (builtins, stubs, wasm)
//! - Flags derived once from [`CompilerConfig`], then only added
//! - Inlining ledger, OSR entry, bailout state, produced code
//!
//! ## Flags (`flags`)
//! - One `u32` bitset per job
//! - Per-flag validity rules checked on every access
//!
//! ## Configuration (`config`, `filter`)
//! - V8 style switches, `OPTJOB_FLAGS` environment variable
//! - Tracing filter matching on the job's name
//!
//! ## Hand-off (`handoff`)
//! - Moving a job to a worker thread and back

pub mod bailout;
pub mod code_kind;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod flags;
pub mod handoff;
pub mod inlining;
pub mod job;
pub mod osr;
pub mod test_utils;
pub mod wasm_result;

pub use bailout::{BailoutReason, CompilationState};

pub use code_kind::{CodeKind, ParseCodeKindError, PoisoningMitigationLevel, StackFrameType};

pub use config::{CompilerConfig, ConfigError, FLAGS_ENV_VAR};

pub use diagnostics::{ProfilerDataId, TickCounter};

pub use error::{FlagAccess, JobError, JobResult};

pub use filter::passes_filter;

pub use flags::{Flag, FlagContext, FlagRule, FlagSet};

pub use handoff::compile_on_worker;

pub use inlining::{InlinedFunctionHolder, InliningLedger, InliningPosition, SourcePosition};

pub use job::{
    CompilationJob, FunctionTarget, ANONYMOUS_FUNCTION_NAME, NO_OPTIMIZATION_ID,
    UNKNOWN_STUB_NAME,
};

pub use osr::{BytecodeOffset, FrameId, OsrEntry};

pub use wasm_result::{ExecutionTier, WasmCompilationResult};
