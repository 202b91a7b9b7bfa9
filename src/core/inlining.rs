// This module implements the inlining ledger: the ordered record of every function body a
// compilation merged into the one being optimized. Each entry keeps handles to the inlined
// function's shared info and bytecode (the bytecode explicitly, so it is not flushed while
// source positions still point into it) and the position of the call site. Entries are
// numbered in registration order starting at 0; the number is what IR nodes originating from
// the inlined body carry. The ledger is append-only and only feeds source-position and
// deoptimization metadata, never code correctness.

//! Inlining ledger.

use crate::heap::{BytecodeArray, Handle, SharedFunctionInfo};

/// Source position, optionally inside an inlined function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub script_offset: i32,
    /// Id of the inlined function the position is in, or
    /// [`SourcePosition::NOT_INLINED`].
    pub inlining_id: i32,
}

impl SourcePosition {
    pub const NO_SOURCE_POSITION: i32 = -1;
    pub const NOT_INLINED: i32 = -1;

    pub const fn new(script_offset: i32) -> Self {
        Self {
            script_offset,
            inlining_id: Self::NOT_INLINED,
        }
    }

    pub const fn inlined(script_offset: i32, inlining_id: i32) -> Self {
        Self {
            script_offset,
            inlining_id,
        }
    }

    pub const fn unknown() -> Self {
        Self::new(Self::NO_SOURCE_POSITION)
    }

    pub fn is_known(&self) -> bool {
        self.script_offset != Self::NO_SOURCE_POSITION
    }

    pub fn is_inlined(&self) -> bool {
        self.inlining_id != Self::NOT_INLINED
    }
}

/// Call-site position of an inlined function and the id it was assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InliningPosition {
    pub position: SourcePosition,
    pub inlined_function_id: i32,
}

/// One inlined function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlinedFunctionHolder {
    pub shared_info: Handle<SharedFunctionInfo>,
    /// Held so the bytecode survives flushing.
    pub bytecode_array: Handle<BytecodeArray>,
    pub position: InliningPosition,
}

impl InlinedFunctionHolder {
    pub fn new(
        shared_info: Handle<SharedFunctionInfo>,
        bytecode_array: Handle<BytecodeArray>,
        pos: SourcePosition,
    ) -> Self {
        Self {
            shared_info,
            bytecode_array,
            position: InliningPosition {
                position: pos,
                inlined_function_id: SourcePosition::NOT_INLINED,
            },
        }
    }

    fn register_inlined_function_id(&mut self, id: usize) {
        self.position.inlined_function_id = id as i32;
    }
}

/// Append-only list of inlined functions.
#[derive(Debug, Default, Clone)]
pub struct InliningLedger {
    holders: Vec<InlinedFunctionHolder>,
}

impl InliningLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inlined function, returning its inlining id.
    pub fn add(
        &mut self,
        shared_info: Handle<SharedFunctionInfo>,
        bytecode_array: Handle<BytecodeArray>,
        pos: SourcePosition,
    ) -> usize {
        let id = self.holders.len();
        let mut holder = InlinedFunctionHolder::new(shared_info, bytecode_array, pos);
        holder.register_inlined_function_id(id);
        self.holders.push(holder);
        id
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&InlinedFunctionHolder> {
        self.holders.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InlinedFunctionHolder> {
        self.holders.iter()
    }

    pub fn as_slice(&self) -> &[InlinedFunctionHolder] {
        &self.holders
    }

    pub(crate) fn holders_mut(&mut self) -> &mut [InlinedFunctionHolder] {
        &mut self.holders
    }
}

impl<'a> IntoIterator for &'a InliningLedger {
    type Item = &'a InlinedFunctionHolder;
    type IntoIter = std::slice::Iter<'a, InlinedFunctionHolder>;

    fn into_iter(self) -> Self::IntoIter {
        self.holders.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::{HandleScope, ObjectId};

    #[test]
    fn test_ids_are_sequential() {
        let mut scope = HandleScope::open();
        let mut ledger = InliningLedger::new();

        for i in 0..3u64 {
            let shared = scope.handle(ObjectId(i * 2)).unwrap();
            let bytecode = scope.handle(ObjectId(i * 2 + 1)).unwrap();
            let id = ledger.add(shared, bytecode, SourcePosition::new(10 * i as i32));
            assert_eq!(id, i as usize);
        }

        let ids: Vec<i32> = ledger
            .iter()
            .map(|h| h.position.inlined_function_id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(ledger.get(1).unwrap().position.position.script_offset, 10);
    }

    #[test]
    fn test_source_position_helpers() {
        assert!(!SourcePosition::unknown().is_known());
        assert!(!SourcePosition::new(4).is_inlined());
        assert!(SourcePosition::inlined(4, 0).is_inlined());
    }
}
