//! On-stack replacement entry record.
//!
//! An OSR compile specializes the generated code to resume at one bytecode
//! offset inside an interpreter activation that is already running. The
//! offset and the frame are always set together.

use std::fmt;

/// Offset into a function's bytecode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BytecodeOffset(i32);

impl BytecodeOffset {
    /// Not an OSR compile.
    pub const NONE: BytecodeOffset = BytecodeOffset(-1);

    pub const fn new(offset: i32) -> Self {
        BytecodeOffset(offset)
    }

    pub const fn to_int(self) -> i32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

impl fmt::Display for BytecodeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            f.write_str("none")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

/// Non-owning reference to an interpreter frame.
///
/// The frame lives on the requesting thread's stack; the id never keeps it
/// alive and is only meaningful to the runtime that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

/// Bytecode offset and frame an OSR compile enters at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsrEntry {
    pub offset: BytecodeOffset,
    pub frame: FrameId,
}
