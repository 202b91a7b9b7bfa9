//! optjob - the descriptor of one optimizing compilation.
//!
//! A [`CompilationJob`] carries everything a single compilation attempt needs
//! and produces: the flag set derived from [`CompilerConfig`], handles naming
//! the function being compiled, the inlining ledger, OSR data, bailout state
//! and the produced code. It moves between the requesting thread and a
//! background worker by value and re-establishes its handles on each side.
//!
//! # Primary Usage
//!
//! ```ignore
//! use bumpalo::Bump;
//! use optjob::core::{compile_on_worker, CompilationJob, CompilerConfig, FunctionTarget};
//! use optjob::heap::HandleScope;
//!
//! let mut zone = Bump::new();
//! let config = CompilerConfig::from_env()?;
//! let mut scope = HandleScope::open();
//! let target = FunctionTarget {
//!     shared: scope.handle(shared_id)?,
//!     closure: scope.handle(closure_id)?,
//!     native_context_independent: false,
//! };
//! let job = CompilationJob::for_function(&mut zone, &runtime, &config, &scope, target)?;
//! let (job, result) = compile_on_worker(job, &runtime, |job, _| run_pipeline(job));
//! ```
//!
//! # Architecture
//!
//! - [`core`] - The job descriptor, flags, configuration and bailout state
//! - [`heap`] - Handles, handle scopes, persistent bundles and the runtime contract

pub mod core;
pub mod heap;

pub use self::core::{
    // Descriptor
    CompilationJob, FunctionTarget, JobError, JobResult,
    // Flags and configuration
    CodeKind, CompilerConfig, Flag, FlagSet,
    // Outcome
    BailoutReason, CompilationState,
};
pub use self::heap::{Handle, HandleScope, ObjectId, PersistentHandles, Runtime};
