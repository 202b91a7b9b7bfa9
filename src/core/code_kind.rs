// This module defines CodeKind, the discriminator for what a compilation job produces, the
// StackFrameType that code of each kind runs under, and the speculative-execution poisoning
// level a job compiles with. The frame type is a fixed function of the code kind; nothing
// else about a job influences it. CodeKind implements FromStr so tools can take kinds on the
// command line using the same kebab-case spelling Display prints.

//! Code kinds and the frame types they map to.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Category of artifact a compilation job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    /// Optimized code for a JavaScript function.
    OptimizedFunction,
    BytecodeHandler,
    Stub,
    Builtin,
    RegExp,
    WasmFunction,
    WasmToCapiFunction,
    WasmToJsFunction,
    JsToWasmFunction,
    JsToJsFunction,
    WasmInterpreterEntry,
    CWasmEntry,
}

impl CodeKind {
    pub const ALL: [CodeKind; 12] = [
        CodeKind::OptimizedFunction,
        CodeKind::BytecodeHandler,
        CodeKind::Stub,
        CodeKind::Builtin,
        CodeKind::RegExp,
        CodeKind::WasmFunction,
        CodeKind::WasmToCapiFunction,
        CodeKind::WasmToJsFunction,
        CodeKind::JsToWasmFunction,
        CodeKind::JsToJsFunction,
        CodeKind::WasmInterpreterEntry,
        CodeKind::CWasmEntry,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CodeKind::OptimizedFunction => "optimized-function",
            CodeKind::BytecodeHandler => "bytecode-handler",
            CodeKind::Stub => "stub",
            CodeKind::Builtin => "builtin",
            CodeKind::RegExp => "regexp",
            CodeKind::WasmFunction => "wasm-function",
            CodeKind::WasmToCapiFunction => "wasm-to-capi-function",
            CodeKind::WasmToJsFunction => "wasm-to-js-function",
            CodeKind::JsToWasmFunction => "js-to-wasm-function",
            CodeKind::JsToJsFunction => "js-to-js-function",
            CodeKind::WasmInterpreterEntry => "wasm-interpreter-entry",
            CodeKind::CWasmEntry => "c-wasm-entry",
        }
    }

    /// Stack frame type that code of this kind executes under.
    pub fn output_stack_frame_type(self) -> StackFrameType {
        match self {
            CodeKind::OptimizedFunction => StackFrameType::Optimized,
            CodeKind::Stub | CodeKind::BytecodeHandler | CodeKind::Builtin => StackFrameType::Stub,
            CodeKind::WasmFunction => StackFrameType::Wasm,
            CodeKind::WasmToCapiFunction => StackFrameType::WasmExit,
            CodeKind::JsToWasmFunction => StackFrameType::JsToWasm,
            CodeKind::WasmToJsFunction => StackFrameType::WasmToJs,
            CodeKind::WasmInterpreterEntry => StackFrameType::WasmInterpreterEntry,
            CodeKind::CWasmEntry => StackFrameType::CWasmEntry,
            CodeKind::RegExp | CodeKind::JsToJsFunction => StackFrameType::None,
        }
    }
}

impl fmt::Display for CodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown code kind: {0}")]
pub struct ParseCodeKindError(pub String);

impl FromStr for CodeKind {
    type Err = ParseCodeKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CodeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| ParseCodeKindError(s.to_string()))
    }
}

/// Runtime stack frame discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackFrameType {
    /// No frame type is defined for the kind.
    None,
    Optimized,
    Stub,
    Wasm,
    WasmExit,
    WasmToJs,
    JsToWasm,
    WasmInterpreterEntry,
    CWasmEntry,
}

/// How aggressively generated code masks values against speculative
/// execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoisoningMitigationLevel {
    PoisonAll,
    #[default]
    DontPoison,
    PoisonCriticalOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_type_mapping() {
        assert_eq!(
            CodeKind::OptimizedFunction.output_stack_frame_type(),
            StackFrameType::Optimized
        );
        assert_eq!(CodeKind::Builtin.output_stack_frame_type(), StackFrameType::Stub);
        assert_eq!(
            CodeKind::BytecodeHandler.output_stack_frame_type(),
            StackFrameType::Stub
        );
        assert_eq!(CodeKind::WasmFunction.output_stack_frame_type(), StackFrameType::Wasm);
        assert_eq!(
            CodeKind::WasmToCapiFunction.output_stack_frame_type(),
            StackFrameType::WasmExit
        );
        assert_eq!(CodeKind::RegExp.output_stack_frame_type(), StackFrameType::None);
    }

    #[test]
    fn test_parse_roundtrips_every_kind() {
        for kind in CodeKind::ALL {
            assert_eq!(kind.to_string().parse::<CodeKind>(), Ok(kind));
        }
        assert!("interpreted".parse::<CodeKind>().is_err());
    }

    #[test]
    fn test_default_poisoning_level() {
        assert_eq!(
            PoisoningMitigationLevel::default(),
            PoisoningMitigationLevel::DontPoison
        );
    }
}
