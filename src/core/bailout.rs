// This module defines BailoutReason, the recorded cause of an optimization attempt that did
// not produce code, and CompilationState, the three-state view of a job's outcome derived
// from it. Bailouts are expected outcomes, not errors: the caller falls back to unoptimized
// code. An abort is permanent for the function (the job raises DisableFutureOptimization),
// a retry asks the caller to try again later. The transition rules themselves live on
// CompilationJob because the abort side effect needs the job's flags.

//! Bailout reasons and the per-attempt outcome state.

use std::fmt;

/// Why an optimization attempt did not produce code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BailoutReason {
    /// The attempt has not failed.
    #[default]
    NoReason,
    Unknown,
    BailedOutDueToDependencyChange,
    CodeGenerationFailed,
    CyclicObjectStateDetectedInEscapeAnalysis,
    FunctionBeingDebugged,
    FunctionTooBig,
    GraphBuildingFailed,
    LiveEdit,
    NativeFunctionLiteral,
    NeverOptimize,
    NotEnoughVirtualRegistersRegalloc,
    OptimizationDisabled,
    OptimizationDisabledForTest,
    /// Handles could not be reopened because the runtime was unavailable.
    RuntimeUnavailable,
}

impl BailoutReason {
    pub fn message(self) -> &'static str {
        match self {
            BailoutReason::NoReason => "no reason",
            BailoutReason::Unknown => "Unknown",
            BailoutReason::BailedOutDueToDependencyChange => "Bailed out due to dependency change",
            BailoutReason::CodeGenerationFailed => "Code generation failed",
            BailoutReason::CyclicObjectStateDetectedInEscapeAnalysis => {
                "Cyclic object state detected by escape analysis"
            }
            BailoutReason::FunctionBeingDebugged => "Function is being debugged",
            BailoutReason::FunctionTooBig => "Function is too big to be optimized",
            BailoutReason::GraphBuildingFailed => "Optimized graph construction failed",
            BailoutReason::LiveEdit => "LiveEdit",
            BailoutReason::NativeFunctionLiteral => "Native function literal",
            BailoutReason::NeverOptimize => "Optimization is always disabled",
            BailoutReason::NotEnoughVirtualRegistersRegalloc => {
                "Not enough virtual registers (regalloc)"
            }
            BailoutReason::OptimizationDisabled => "Optimization disabled",
            BailoutReason::OptimizationDisabledForTest => "Optimization disabled for test",
            BailoutReason::RuntimeUnavailable => "Runtime unavailable for handle reopening",
        }
    }
}

impl fmt::Display for BailoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilationState {
    /// No bailout recorded.
    Running,
    /// Permanently failed; future optimization of the function is disabled
    /// when the job optimizes a function.
    Aborted(BailoutReason),
    /// Failed for now; may be attempted again.
    Retrying(BailoutReason),
}

impl CompilationState {
    pub fn reason(self) -> BailoutReason {
        match self {
            CompilationState::Running => BailoutReason::NoReason,
            CompilationState::Aborted(reason) | CompilationState::Retrying(reason) => reason,
        }
    }

    /// Whether the attempt concluded without code.
    pub fn is_bailout(self) -> bool {
        !matches!(self, CompilationState::Running)
    }
}
