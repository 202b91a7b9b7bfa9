//! Result of compiling a wasm function with an alternate backend.
//!
//! A job holds this exclusively until a later publication step moves it
//! into the module's code space; it is never shared.

use super::inlining::SourcePosition;

/// Tier that produced a wasm compilation result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionTier {
    Liftoff,
    TurboFan,
}

/// Output of a wasm function compilation, not yet published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasmCompilationResult {
    pub func_index: u32,
    pub tier: ExecutionTier,
    /// Machine code of the function body.
    pub code: Vec<u8>,
    pub frame_slot_count: u32,
    pub tagged_parameter_slots: u32,
    /// (pc offset, source position) pairs.
    pub source_positions: Vec<(u32, SourcePosition)>,
    /// Offsets of instructions that may trap on out-of-bounds memory access.
    pub protected_instructions: Vec<u32>,
}

impl WasmCompilationResult {
    pub fn new(func_index: u32, tier: ExecutionTier, code: Vec<u8>) -> Self {
        Self {
            func_index,
            tier,
            code,
            frame_slot_count: 0,
            tagged_parameter_slots: 0,
            source_positions: Vec::new(),
            protected_instructions: Vec::new(),
        }
    }

    /// A result with no code is a failed compilation.
    pub fn succeeded(&self) -> bool {
        !self.code.is_empty()
    }
}
