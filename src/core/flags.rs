// This module implements the flag registry of a compilation job. Flags are boolean switches
// that decide which optimizations the pipeline may run and which diagnostics it emits, plus a
// few properties of the produced code. They are stored as a single u32 bitset (FlagSet) so a
// job stays small and "did any of these change" is one mask comparison. Every flag carries a
// FlagRule describing when reading or writing it is meaningful: some flags only make sense
// when optimizing a JavaScript function, one only for wasm, the tracing flags only once the
// tracing filter has been evaluated, and register poisoning only under untrusted-code
// mitigations. The enum, the bit assignments and the rule table are generated by a single
// macro invocation so the three cannot drift apart.

//! Flag registry: the `Flag` enumeration, its bitset and validity rules.

use std::fmt;

use super::code_kind::CodeKind;

macro_rules! compilation_flags {
    ($($variant:ident => $name:literal, $bit:literal, $rule:ident;)*) => {
        /// Configuration flag of a compilation job.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Flag {
            $($variant,)*
        }

        impl Flag {
            /// Every flag in bit order.
            pub const ALL: &'static [Flag] = &[$(Flag::$variant,)*];

            /// Bit mask of the flag inside a [`FlagSet`].
            pub const fn mask(self) -> u32 {
                match self {
                    $(Flag::$variant => 1 << $bit,)*
                }
            }

            /// Snake-case name, as printed in traces.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Flag::$variant => $name,)*
                }
            }

            /// Rule deciding when the flag may be read or written.
            pub const fn rule(self) -> FlagRule {
                match self {
                    $(Flag::$variant => FlagRule::$rule,)*
                }
            }
        }
    };
}

compilation_flags! {
    FunctionContextSpecializing => "function_context_specializing", 0, ContextSpecializing;
    Inlining => "inlining", 1, OptimizingOnly;
    DisableFutureOptimization => "disable_future_optimization", 2, OptimizingOnly;
    Splitting => "splitting", 3, Always;
    SourcePositions => "source_positions", 4, Always;
    BailoutOnUninitialized => "bailout_on_uninitialized", 5, OptimizingOnly;
    LoopPeeling => "loop_peeling", 6, OptimizingOnly;
    UntrustedCodeMitigations => "untrusted_code_mitigations", 7, Always;
    SwitchJumpTable => "switch_jump_table", 8, Always;
    CalledWithCodeStartRegister => "called_with_code_start_register", 9, Always;
    PoisonRegisterArguments => "poison_register_arguments", 10, RegisterPoisoning;
    AllocationFolding => "allocation_folding", 11, OptimizingOnly;
    AnalyzeEnvironmentLiveness => "analyze_environment_liveness", 12, OptimizingOnly;
    TraceTurboJson => "trace_turbo_json", 13, Tracing;
    TraceTurboGraph => "trace_turbo_graph", 14, Tracing;
    TraceTurboScheduled => "trace_turbo_scheduled", 15, Tracing;
    TraceTurboAllocation => "trace_turbo_allocation", 16, Tracing;
    TraceHeapBroker => "trace_heap_broker", 17, Tracing;
    WasmRuntimeExceptionSupport => "wasm_runtime_exception_support", 18, WasmOnly;
    TurboControlFlowAwareAllocation => "turbo_control_flow_aware_allocation", 19, Always;
    TurboPreprocessRanges => "turbo_preprocess_ranges", 20, Always;
    ConcurrentInlining => "concurrent_inlining", 21, OptimizingOnly;
    NativeContextIndependent => "native_context_independent", 22, OptimizingOnly;
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compact set of [`Flag`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FlagSet {
    bits: u32,
}

impl FlagSet {
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub const fn bits(&self) -> u32 {
        self.bits
    }

    pub const fn contains(&self, flag: Flag) -> bool {
        (self.bits & flag.mask()) != 0
    }

    /// Set a flag. Flags are never cleared.
    pub fn insert(&mut self, flag: Flag) {
        self.bits |= flag.mask();
    }

    /// Whether any flag of `other` is set here.
    pub const fn intersects(&self, other: FlagSet) -> bool {
        (self.bits & other.bits) != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterate set flags in bit order.
    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        Flag::ALL.iter().copied().filter(move |flag| self.contains(*flag))
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        let mut set = FlagSet::empty();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

/// Facts about a job that flag validity depends on.
#[derive(Debug, Clone, Copy)]
pub struct FlagContext {
    pub code_kind: CodeKind,
    pub flags: FlagSet,
    /// The tracing filter has been evaluated for this job.
    pub tracing_filter_evaluated: bool,
    /// The job's name passed the tracing filter.
    pub passes_tracing_filter: bool,
}

impl FlagContext {
    fn is_optimizing(&self) -> bool {
        self.code_kind == CodeKind::OptimizedFunction
    }
}

/// When a flag may be read or written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRule {
    Always,
    /// Only for jobs optimizing a JavaScript function.
    OptimizingOnly,
    /// Only for wasm function jobs.
    WasmOnly,
    /// Optimizing only; cannot be set on native-context-independent code.
    ContextSpecializing,
    /// Readable once the tracing filter ran; settable only if it passed.
    Tracing,
    /// Settable under untrusted-code mitigations; readable once consistent
    /// with the code-start register convention.
    RegisterPoisoning,
}

impl FlagRule {
    pub fn get_is_valid(self, flag: Flag, cx: &FlagContext) -> bool {
        match self {
            FlagRule::Always => true,
            FlagRule::OptimizingOnly | FlagRule::ContextSpecializing => cx.is_optimizing(),
            FlagRule::WasmOnly => cx.code_kind == CodeKind::WasmFunction,
            FlagRule::Tracing => cx.tracing_filter_evaluated,
            FlagRule::RegisterPoisoning => {
                !cx.flags.contains(flag)
                    || (cx.flags.contains(Flag::UntrustedCodeMitigations)
                        && cx.flags.contains(Flag::CalledWithCodeStartRegister))
            }
        }
    }

    pub fn set_is_valid(self, _flag: Flag, cx: &FlagContext) -> bool {
        match self {
            FlagRule::Always => true,
            FlagRule::OptimizingOnly => cx.is_optimizing(),
            FlagRule::WasmOnly => cx.code_kind == CodeKind::WasmFunction,
            FlagRule::ContextSpecializing => {
                cx.is_optimizing() && !cx.flags.contains(Flag::NativeContextIndependent)
            }
            FlagRule::Tracing => cx.tracing_filter_evaluated && cx.passes_tracing_filter,
            FlagRule::RegisterPoisoning => cx.flags.contains(Flag::UntrustedCodeMitigations),
        }
    }
}
