// This module implements CompilationJob, the descriptor a single optimization attempt carries
// from the thread that requested it, through a background worker, and back. It is built in
// one of two modes: optimizing a JavaScript function (handles to the function's shared info,
// bytecode and closure, a process-unique optimization id) or compiling a stub, builtin or
// wasm function (a debug name and a code kind). Flags are derived once from CompilerConfig
// during construction and are then only ever added. The job owns a HandleScope bound to the
// thread it currently runs on, plus an optional persistent handle bundle; moving the job to
// another thread requires reopen_handles_in_new_scope before any handle resolves there. The
// pipeline appends inlined functions, may specialize for OSR, and concludes either by
// publishing code (or a wasm result) or by recording a bailout. The arena the pipeline
// allocates from is borrowed mutably for the job's lifetime so the job stays Send.

//! The compilation job descriptor.
//!
//! # Example
//! ```ignore
//! use bumpalo::Bump;
//! use optjob::core::{CodeKind, CompilationJob, CompilerConfig};
//!
//! let mut zone = Bump::new();
//! let config = CompilerConfig::default();
//! let job = CompilationJob::for_stub(&mut zone, &config, "RecordWrite", CodeKind::Builtin)?;
//! assert_eq!(job.optimization_id(), -1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};

use bumpalo::Bump;

use super::bailout::{BailoutReason, CompilationState};
use super::code_kind::{CodeKind, PoisoningMitigationLevel, StackFrameType};
use super::config::CompilerConfig;
use super::diagnostics::{ProfilerDataId, TickCounter};
use super::error::{FlagAccess, JobError, JobResult};
use super::filter::passes_filter;
use super::flags::{Flag, FlagContext, FlagSet};
use super::inlining::{InliningLedger, SourcePosition};
use super::osr::{BytecodeOffset, FrameId, OsrEntry};
use super::wasm_result::WasmCompilationResult;
use crate::heap::{
    BytecodeArray, Code, Context, GlobalObject, Handle, HandleScope, HeapType, JsFunction,
    NativeContext, ObjectId, PersistentHandles, Runtime, SharedFunctionInfo,
};

/// Optimization id of jobs that do not optimize a function.
pub const NO_OPTIMIZATION_ID: i32 = -1;

/// Name reported for functions without a name.
pub const ANONYMOUS_FUNCTION_NAME: &str = "<anonymous>";

/// Name reported for stubs constructed with an empty name.
pub const UNKNOWN_STUB_NAME: &str = "unknown";

static NEXT_OPTIMIZATION_ID: AtomicI32 = AtomicI32::new(0);

fn next_optimization_id() -> i32 {
    NEXT_OPTIMIZATION_ID.fetch_add(1, Ordering::Relaxed) & i32::MAX
}

/// Function a job optimizes, as handles in the caller's scope.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTarget {
    pub shared: Handle<SharedFunctionInfo>,
    pub closure: Handle<JsFunction>,
    /// Generate code that does not embed the closure's native context.
    pub native_context_independent: bool,
}

#[derive(Debug, Clone)]
enum DebugName {
    /// Function name captured at construction, `None` if anonymous.
    Function(Option<String>),
    Stub(String),
}

/// Everything one compilation attempt needs and produces.
pub struct CompilationJob<'zone> {
    /// Arena pipeline-scoped structures are allocated from.
    zone: &'zone mut Bump,

    code_kind: CodeKind,
    flags: FlagSet,
    tracing_filter_evaluated: bool,
    passes_tracing_filter: bool,
    poisoning_level: PoisoningMitigationLevel,
    builtin_index: Option<i32>,

    /// Scope every handle below lives in, bound to the current thread.
    scope: HandleScope,
    shared_info: Option<Handle<SharedFunctionInfo>>,
    // Retained so the bytecode is not flushed while optimizing.
    bytecode_array: Option<Handle<BytecodeArray>>,
    closure: Option<Handle<JsFunction>>,

    /// Produced code, set once on success.
    code: Option<Handle<Code>>,
    /// Alternate backend result, not yet published.
    wasm_result: Option<Box<WasmCompilationResult>>,

    osr: Option<OsrEntry>,
    optimization_id: i32,

    inlined_functions: InliningLedger,
    inlined_bytecode_size: u32,

    bailout_reason: BailoutReason,
    aborted: bool,

    /// Bundle following the job across threads; one owner at a time.
    persistent_handles: Option<Box<PersistentHandles>>,

    debug_name: DebugName,
    profiler_data: Option<ProfilerDataId>,
    trace_turbo_filename: Option<String>,
    tick_counter: TickCounter,
}

impl<'zone> CompilationJob<'zone> {
    /// Create a job optimizing the function named by `target`.
    ///
    /// `target`'s handles must belong to `caller_scope` and be resolvable on
    /// the calling thread; they are copied into the job's own scope.
    pub fn for_function(
        zone: &'zone mut Bump,
        runtime: &dyn Runtime,
        config: &CompilerConfig,
        caller_scope: &HandleScope,
        target: FunctionTarget,
    ) -> JobResult<Self> {
        let shared_object = caller_scope.resolve(target.shared)?;
        let closure_object = caller_scope.resolve(target.closure)?;

        let mut scope = HandleScope::open();
        let shared_info = scope.handle(shared_object)?;
        let closure = scope.handle(closure_object)?;
        let bytecode_array = runtime
            .bytecode_array(shared_object)
            .map(|bytecode| scope.handle(bytecode))
            .transpose()?;
        let name = runtime.function_name(shared_object);

        let mut job = Self::new(
            zone,
            CodeKind::OptimizedFunction,
            scope,
            DebugName::Function(name),
            next_optimization_id(),
        );
        job.shared_info = Some(shared_info);
        job.closure = Some(closure);
        job.bytecode_array = bytecode_array;
        job.derive_flags(config, target.native_context_independent);

        log::debug!(
            "created optimization job #{} for {}",
            job.optimization_id,
            job.debug_name()
        );
        Ok(job)
    }

    /// Create a job compiling a stub, builtin or wasm function.
    pub fn for_stub(
        zone: &'zone mut Bump,
        config: &CompilerConfig,
        debug_name: &str,
        code_kind: CodeKind,
    ) -> JobResult<Self> {
        if code_kind == CodeKind::OptimizedFunction {
            return Err(JobError::InvalidStubKind { code_kind });
        }

        let mut job = Self::new(
            zone,
            code_kind,
            HandleScope::open(),
            DebugName::Stub(debug_name.to_string()),
            NO_OPTIMIZATION_ID,
        );
        job.derive_flags(config, false);

        log::debug!("created {} job for {}", code_kind, job.debug_name());
        Ok(job)
    }

    fn new(
        zone: &'zone mut Bump,
        code_kind: CodeKind,
        scope: HandleScope,
        debug_name: DebugName,
        optimization_id: i32,
    ) -> Self {
        Self {
            zone,
            code_kind,
            flags: FlagSet::empty(),
            tracing_filter_evaluated: false,
            passes_tracing_filter: false,
            poisoning_level: PoisoningMitigationLevel::DontPoison,
            builtin_index: None,
            scope,
            shared_info: None,
            bytecode_array: None,
            closure: None,
            code: None,
            wasm_result: None,
            osr: None,
            optimization_id,
            inlined_functions: InliningLedger::new(),
            inlined_bytecode_size: 0,
            bailout_reason: BailoutReason::NoReason,
            aborted: false,
            persistent_handles: None,
            debug_name,
            profiler_data: None,
            trace_turbo_filename: None,
            tick_counter: TickCounter::new(),
        }
    }

    // Runs once, from the constructors.
    fn derive_flags(&mut self, config: &CompilerConfig, native_context_independent: bool) {
        let filter_name = match &self.debug_name {
            DebugName::Function(name) => name.clone().unwrap_or_default(),
            DebugName::Stub(name) => name.clone(),
        };
        self.passes_tracing_filter = passes_filter(&filter_name, &config.trace_turbo_filter);
        self.tracing_filter_evaluated = true;

        if config.untrusted_code_mitigations {
            self.set_flag(Flag::UntrustedCodeMitigations);
            self.poisoning_level = PoisoningMitigationLevel::PoisonAll;
        }

        if self.is_optimizing() {
            if native_context_independent {
                self.set_flag(Flag::NativeContextIndependent);
            }
            // Inlining needs the bytecode of the function being optimized.
            if config.turbo_inlining && self.has_bytecode_array() {
                self.set_flag(Flag::Inlining);
            }
            if config.turbo_loop_peeling {
                self.set_flag(Flag::LoopPeeling);
            }
            if config.turbo_allocation_folding {
                self.set_flag(Flag::AllocationFolding);
            }
            if config.concurrent_inlining {
                self.set_flag(Flag::ConcurrentInlining);
            }
        }

        match self.code_kind {
            CodeKind::OptimizedFunction => {
                if config.function_context_specialization && !native_context_independent {
                    self.set_flag(Flag::FunctionContextSpecializing);
                }
                if config.untrusted_code_mitigations {
                    self.set_flag(Flag::BailoutOnUninitialized);
                }
                if config.analyze_environment_liveness {
                    self.set_flag(Flag::AnalyzeEnvironmentLiveness);
                }
                if config.turbo_splitting {
                    self.set_flag(Flag::Splitting);
                }
                self.set_flag(Flag::CalledWithCodeStartRegister);
                self.set_flag(Flag::SwitchJumpTable);
            }
            CodeKind::BytecodeHandler => {
                self.set_flag(Flag::CalledWithCodeStartRegister);
                if config.turbo_splitting {
                    self.set_flag(Flag::Splitting);
                }
            }
            CodeKind::Builtin | CodeKind::Stub => {
                if config.turbo_splitting {
                    self.set_flag(Flag::Splitting);
                }
            }
            CodeKind::WasmFunction | CodeKind::WasmToCapiFunction => {
                self.set_flag(Flag::SwitchJumpTable);
            }
            _ => {}
        }

        if config.untrusted_code_mitigations && self.flags.contains(Flag::CalledWithCodeStartRegister) {
            self.set_flag(Flag::PoisonRegisterArguments);
        }

        if config.turbo_control_flow_aware_allocation {
            self.set_flag(Flag::TurboControlFlowAwareAllocation);
        } else {
            self.set_flag(Flag::TurboPreprocessRanges);
        }

        if self.passes_tracing_filter {
            let tracing = [
                (config.trace_turbo, Flag::TraceTurboJson),
                (config.trace_turbo_graph, Flag::TraceTurboGraph),
                (config.trace_turbo_scheduled, Flag::TraceTurboScheduled),
                (config.trace_turbo_alloc, Flag::TraceTurboAllocation),
                (config.trace_heap_broker, Flag::TraceHeapBroker),
            ];
            for (enabled, flag) in tracing {
                if enabled {
                    self.set_flag(flag);
                }
            }
        }

        log::trace!(
            "{}: derived flags {:#08x} (tracing filter {:?} {})",
            filter_name,
            self.flags.bits(),
            config.trace_turbo_filter,
            if self.passes_tracing_filter { "passed" } else { "rejected" }
        );
    }

    // ---------------------------------------------------------------------
    // Flags
    // ---------------------------------------------------------------------

    fn flag_context(&self) -> FlagContext {
        FlagContext {
            code_kind: self.code_kind,
            flags: self.flags,
            tracing_filter_evaluated: self.tracing_filter_evaluated,
            passes_tracing_filter: self.passes_tracing_filter,
        }
    }

    pub fn flag_get_is_valid(&self, flag: Flag) -> bool {
        flag.rule().get_is_valid(flag, &self.flag_context())
    }

    pub fn flag_set_is_valid(&self, flag: Flag) -> bool {
        flag.rule().set_is_valid(flag, &self.flag_context())
    }

    /// Read a flag, failing if the flag is not meaningful for this job.
    pub fn try_flag(&self, flag: Flag) -> JobResult<bool> {
        if !self.flag_get_is_valid(flag) {
            return Err(self.invalid_flag_access(flag, FlagAccess::Get));
        }
        Ok(self.flags.contains(flag))
    }

    /// Set a flag, failing if the flag is not meaningful for this job.
    pub fn try_set_flag(&mut self, flag: Flag) -> JobResult<()> {
        if !self.flag_set_is_valid(flag) {
            return Err(self.invalid_flag_access(flag, FlagAccess::Set));
        }
        self.flags.insert(flag);
        Ok(())
    }

    /// Read a flag.
    ///
    /// # Panics
    ///
    /// If the flag is not valid for this job; that is a caller defect.
    pub fn flag(&self, flag: Flag) -> bool {
        match self.try_flag(flag) {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    /// Set a flag.
    ///
    /// # Panics
    ///
    /// If the flag is not valid for this job; that is a caller defect.
    pub fn set_flag(&mut self, flag: Flag) {
        if let Err(err) = self.try_set_flag(flag) {
            panic!("{}", err);
        }
    }

    /// Raw flag bits, without validity checks.
    pub fn flags(&self) -> FlagSet {
        self.flags
    }

    fn invalid_flag_access(&self, flag: Flag, access: FlagAccess) -> JobError {
        JobError::InvalidFlagAccess {
            flag,
            access,
            code_kind: self.code_kind,
        }
    }

    /// Whether the job's name passed the tracing filter.
    pub fn passes_tracing_filter(&self) -> bool {
        self.passes_tracing_filter
    }

    pub fn is_native_context_independent(&self) -> bool {
        self.flags.contains(Flag::NativeContextIndependent)
    }

    // ---------------------------------------------------------------------
    // Kind and identity
    // ---------------------------------------------------------------------

    pub fn zone(&self) -> &Bump {
        &*self.zone
    }

    pub fn zone_mut(&mut self) -> &mut Bump {
        &mut *self.zone
    }

    pub fn code_kind(&self) -> CodeKind {
        self.code_kind
    }

    pub fn is_optimizing(&self) -> bool {
        self.code_kind == CodeKind::OptimizedFunction
    }

    pub fn is_wasm(&self) -> bool {
        self.code_kind == CodeKind::WasmFunction
    }

    pub fn is_not_optimized_function_or_wasm_function(&self) -> bool {
        !self.is_optimizing() && !self.is_wasm()
    }

    /// Process-unique id of an optimizing job, [`NO_OPTIMIZATION_ID`]
    /// otherwise.
    pub fn optimization_id(&self) -> i32 {
        self.optimization_id
    }

    pub fn builtin_index(&self) -> Option<i32> {
        self.builtin_index
    }

    pub fn set_builtin_index(&mut self, index: Option<i32>) {
        self.builtin_index = index;
    }

    pub fn poisoning_level(&self) -> PoisoningMitigationLevel {
        self.poisoning_level
    }

    pub fn set_poisoning_level(&mut self, level: PoisoningMitigationLevel) {
        self.poisoning_level = level;
    }

    /// Human readable name of what is being compiled.
    pub fn debug_name(&self) -> &str {
        match &self.debug_name {
            DebugName::Function(Some(name)) if !name.is_empty() => name,
            DebugName::Function(_) => ANONYMOUS_FUNCTION_NAME,
            DebugName::Stub(name) if name.is_empty() => UNKNOWN_STUB_NAME,
            DebugName::Stub(name) => name,
        }
    }

    pub fn output_stack_frame_type(&self) -> StackFrameType {
        self.code_kind.output_stack_frame_type()
    }

    // ---------------------------------------------------------------------
    // Handles
    // ---------------------------------------------------------------------

    pub fn shared_info(&self) -> Option<Handle<SharedFunctionInfo>> {
        self.shared_info
    }

    pub fn has_shared_info(&self) -> bool {
        self.shared_info.is_some()
    }

    pub fn bytecode_array(&self) -> Option<Handle<BytecodeArray>> {
        self.bytecode_array
    }

    pub fn has_bytecode_array(&self) -> bool {
        self.bytecode_array.is_some()
    }

    pub fn closure(&self) -> Option<Handle<JsFunction>> {
        self.closure
    }

    /// Scope the job's handles currently live in.
    pub fn scope(&self) -> &HandleScope {
        &self.scope
    }

    /// Create a handle in the job's scope.
    pub fn make_handle<T: HeapType>(&mut self, object: ObjectId) -> JobResult<Handle<T>> {
        Ok(self.scope.handle(object)?)
    }

    /// Resolve a handle issued by the job's scope or its persistent bundle.
    pub fn resolve<T: HeapType>(&self, handle: Handle<T>) -> JobResult<ObjectId> {
        if let Some(bundle) = &self.persistent_handles {
            if handle.scope() == bundle.id() {
                return Ok(bundle.resolve(handle)?);
            }
        }
        Ok(self.scope.resolve(handle)?)
    }

    /// Let the collector visit every object the job keeps alive.
    pub fn visit_roots(&mut self, visitor: &mut dyn FnMut(&mut ObjectId)) {
        self.scope.visit_roots(visitor);
        if let Some(bundle) = self.persistent_handles.as_mut() {
            bundle.visit_roots(visitor);
        }
    }

    pub fn has_context(&self) -> bool {
        self.closure.is_some()
    }

    /// Context of the closure being optimized.
    pub fn context(&mut self, runtime: &dyn Runtime) -> JobResult<Option<Handle<Context>>> {
        let closure = self.resolve_closure()?;
        runtime
            .context(closure)
            .map(|context| self.make_handle(context))
            .transpose()
    }

    pub fn has_native_context(&self, runtime: &dyn Runtime) -> JobResult<bool> {
        match self.closure {
            Some(closure) => {
                let closure = self.scope.resolve(closure)?;
                Ok(runtime.native_context(closure).is_some())
            }
            None => Ok(false),
        }
    }

    pub fn native_context(&mut self, runtime: &dyn Runtime) -> JobResult<Option<Handle<NativeContext>>> {
        let closure = self.resolve_closure()?;
        runtime
            .native_context(closure)
            .map(|native| self.make_handle(native))
            .transpose()
    }

    pub fn has_global_object(&self, runtime: &dyn Runtime) -> JobResult<bool> {
        self.has_native_context(runtime)
    }

    pub fn global_object(&mut self, runtime: &dyn Runtime) -> JobResult<Option<Handle<GlobalObject>>> {
        let closure = self.resolve_closure()?;
        runtime
            .native_context(closure)
            .and_then(|native| runtime.global_object(native))
            .map(|global| self.make_handle(global))
            .transpose()
    }

    fn resolve_closure(&self) -> JobResult<ObjectId> {
        let closure = self.closure.ok_or(JobError::NoClosure)?;
        Ok(self.scope.resolve(closure)?)
    }

    // ---------------------------------------------------------------------
    // Persistent handles and thread hand-off
    // ---------------------------------------------------------------------

    /// Install the bundle the background stage will use.
    pub fn attach_persistent_handles(&mut self, mut bundle: Box<PersistentHandles>) -> JobResult<()> {
        if self.persistent_handles.is_some() {
            return Err(JobError::BundleAlreadyAttached);
        }
        bundle.bind_to_current_thread();
        log::trace!(
            "{}: attached {} with {} roots",
            self.debug_name(),
            bundle.id(),
            bundle.len()
        );
        self.persistent_handles = Some(bundle);
        Ok(())
    }

    /// Move the bundle out of the job.
    pub fn detach_persistent_handles(&mut self) -> JobResult<Box<PersistentHandles>> {
        let bundle = self
            .persistent_handles
            .take()
            .ok_or(JobError::NoBundleAttached)?;
        log::trace!("{}: detached {}", self.debug_name(), bundle.id());
        Ok(bundle)
    }

    pub fn has_persistent_handles(&self) -> bool {
        self.persistent_handles.is_some()
    }

    pub fn persistent_handles(&self) -> Option<&PersistentHandles> {
        self.persistent_handles.as_deref()
    }

    pub fn persistent_handles_mut(&mut self) -> Option<&mut PersistentHandles> {
        self.persistent_handles.as_deref_mut()
    }

    /// Re-establish every handle the job holds in a fresh scope on the
    /// calling thread.
    ///
    /// Must run once after the job moves to another thread and before any
    /// handle is resolved there. Handles created in the previous scope and
    /// not held by the job stop resolving. If the runtime is unavailable the
    /// attempt is marked for retry.
    pub fn reopen_handles_in_new_scope(&mut self, runtime: &dyn Runtime) -> JobResult<()> {
        if !runtime.is_available() {
            log::warn!("{}: runtime unavailable, cannot reopen handles", self.debug_name());
            self.retry_optimization(BailoutReason::RuntimeUnavailable);
            return Err(JobError::RuntimeUnavailable);
        }

        let old = std::mem::replace(&mut self.scope, HandleScope::open());
        let scope = &mut self.scope;

        self.shared_info = self.shared_info.map(|h| rehome(scope, &old, h)).transpose()?;
        self.bytecode_array = self.bytecode_array.map(|h| rehome(scope, &old, h)).transpose()?;
        self.closure = self.closure.map(|h| rehome(scope, &old, h)).transpose()?;
        self.code = self.code.map(|h| rehome(scope, &old, h)).transpose()?;
        for holder in self.inlined_functions.holders_mut() {
            holder.shared_info = rehome(scope, &old, holder.shared_info)?;
            holder.bytecode_array = rehome(scope, &old, holder.bytecode_array)?;
        }

        if let Some(bundle) = self.persistent_handles.as_mut() {
            bundle.bind_to_current_thread();
        }

        log::trace!(
            "{}: reopened {} handles from {} in {}",
            self.debug_name(),
            self.scope.len(),
            old.id(),
            self.scope.id()
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Inlining
    // ---------------------------------------------------------------------

    /// Record an inlined function and return its inlining id.
    ///
    /// Both handles must resolve through the job's scope or its persistent
    /// bundle; nothing is recorded otherwise.
    pub fn add_inlined_function(
        &mut self,
        shared_info: Handle<SharedFunctionInfo>,
        bytecode_array: Handle<BytecodeArray>,
        pos: SourcePosition,
    ) -> JobResult<usize> {
        self.resolve(shared_info)?;
        self.resolve(bytecode_array)?;
        let id = self.inlined_functions.add(shared_info, bytecode_array, pos);
        log::trace!("{}: inlined function #{}", self.debug_name(), id);
        Ok(id)
    }

    pub fn inlined_functions(&self) -> &InliningLedger {
        &self.inlined_functions
    }

    pub fn inlined_bytecode_size(&self) -> u32 {
        self.inlined_bytecode_size
    }

    pub fn set_inlined_bytecode_size(&mut self, size: u32) {
        self.inlined_bytecode_size = size;
    }

    // ---------------------------------------------------------------------
    // OSR
    // ---------------------------------------------------------------------

    /// Specialize the job to enter at `offset` of the running `frame`.
    pub fn mark_optimizing_for_osr(&mut self, offset: BytecodeOffset, frame: FrameId) -> JobResult<()> {
        if !self.is_optimizing() {
            return Err(JobError::NotOptimizing {
                code_kind: self.code_kind,
            });
        }
        if offset.is_none() {
            return Err(JobError::InvalidOsrOffset);
        }
        if let Some(entry) = self.osr {
            return Err(JobError::OsrAlreadyMarked {
                offset: entry.offset,
            });
        }
        self.osr = Some(OsrEntry { offset, frame });
        Ok(())
    }

    pub fn is_osr(&self) -> bool {
        !self.osr_offset().is_none()
    }

    pub fn osr_offset(&self) -> BytecodeOffset {
        self.osr.map_or(BytecodeOffset::NONE, |entry| entry.offset)
    }

    pub fn osr_frame(&self) -> Option<FrameId> {
        self.osr.map(|entry| entry.frame)
    }

    // ---------------------------------------------------------------------
    // Bailout
    // ---------------------------------------------------------------------

    /// Give up on this function for good.
    ///
    /// The first abort reason is kept. Jobs optimizing a function also
    /// disable future optimization of it.
    ///
    /// # Panics
    ///
    /// If `reason` is [`BailoutReason::NoReason`].
    pub fn abort_optimization(&mut self, reason: BailoutReason) {
        assert_ne!(reason, BailoutReason::NoReason, "abort needs a reason");
        if !self.aborted {
            log::debug!("{}: aborting optimization: {}", self.debug_name(), reason);
            self.bailout_reason = reason;
            self.aborted = true;
        }
        if self.is_optimizing() {
            self.set_flag(Flag::DisableFutureOptimization);
        }
    }

    /// Give up on this attempt but allow a later one.
    ///
    /// Never disables future optimization. An aborted attempt stays aborted
    /// with its abort reason; the retry is only logged. Whether a retry is
    /// appropriate at all is the caller's decision, see [`Self::can_retry`].
    ///
    /// # Panics
    ///
    /// If `reason` is [`BailoutReason::NoReason`].
    pub fn retry_optimization(&mut self, reason: BailoutReason) {
        assert_ne!(reason, BailoutReason::NoReason, "retry needs a reason");
        if self.aborted {
            log::debug!(
                "{}: ignoring retry ({}) of aborted attempt ({})",
                self.debug_name(),
                reason,
                self.bailout_reason
            );
            return;
        }
        log::debug!("{}: retrying optimization later: {}", self.debug_name(), reason);
        self.bailout_reason = reason;
    }

    /// Whether the function may still be optimized by a later attempt.
    pub fn can_retry(&self) -> bool {
        !self.aborted && !self.flags.contains(Flag::DisableFutureOptimization)
    }

    pub fn bailout_reason(&self) -> BailoutReason {
        self.bailout_reason
    }

    /// Whether a worker should stop at the next work unit boundary.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn state(&self) -> CompilationState {
        if self.aborted {
            CompilationState::Aborted(self.bailout_reason)
        } else if self.bailout_reason != BailoutReason::NoReason {
            CompilationState::Retrying(self.bailout_reason)
        } else {
            CompilationState::Running
        }
    }

    // ---------------------------------------------------------------------
    // Outputs
    // ---------------------------------------------------------------------

    /// Publish the produced code. Allowed once.
    pub fn set_code(&mut self, code: Handle<Code>) -> JobResult<()> {
        if self.code.is_some() {
            return Err(JobError::CodeAlreadySet);
        }
        self.resolve(code)?;
        if self.state().is_bailout() {
            log::warn!(
                "{}: code set after bailout ({})",
                self.debug_name(),
                self.bailout_reason
            );
        }
        log::debug!("{}: code published", self.debug_name());
        self.code = Some(code);
        Ok(())
    }

    pub fn code(&self) -> Option<Handle<Code>> {
        self.code
    }

    pub fn has_code(&self) -> bool {
        self.code.is_some()
    }

    /// Hold an alternate backend result until it is published.
    pub fn set_wasm_compilation_result(&mut self, result: Box<WasmCompilationResult>) -> JobResult<()> {
        if self.wasm_result.is_some() {
            return Err(JobError::WasmResultAlreadySet);
        }
        self.wasm_result = Some(result);
        Ok(())
    }

    /// Move the alternate backend result out of the job.
    pub fn release_wasm_compilation_result(&mut self) -> Option<Box<WasmCompilationResult>> {
        self.wasm_result.take()
    }

    pub fn has_wasm_compilation_result(&self) -> bool {
        self.wasm_result.is_some()
    }

    pub fn trace_turbo_filename(&self) -> Option<&str> {
        self.trace_turbo_filename.as_deref()
    }

    pub fn set_trace_turbo_filename(&mut self, filename: impl Into<String>) {
        self.trace_turbo_filename = Some(filename.into());
    }

    pub fn profiler_data(&self) -> Option<ProfilerDataId> {
        self.profiler_data
    }

    pub fn set_profiler_data(&mut self, data: ProfilerDataId) {
        self.profiler_data = Some(data);
    }

    pub fn tick_counter(&self) -> &TickCounter {
        &self.tick_counter
    }

    pub fn tick_counter_mut(&mut self) -> &mut TickCounter {
        &mut self.tick_counter
    }
}

// Handles outside the old scope (bundle handles) stay as they are.
fn rehome<T: HeapType>(
    scope: &mut HandleScope,
    old: &HandleScope,
    handle: Handle<T>,
) -> JobResult<Handle<T>> {
    if handle.scope() != old.id() {
        return Ok(handle);
    }
    Ok(scope.adopt(old, handle)?)
}

impl fmt::Debug for CompilationJob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationJob")
            .field("debug_name", &self.debug_name())
            .field("code_kind", &self.code_kind)
            .field("optimization_id", &self.optimization_id)
            .field("flags", &format_args!("{:#08x}", self.flags.bits()))
            .field("state", &self.state())
            .field("osr", &self.osr)
            .field("inlined_functions", &self.inlined_functions.len())
            .field("has_code", &self.has_code())
            .field("has_persistent_handles", &self.has_persistent_handles())
            .finish_non_exhaustive()
    }
}
