// This module defines the Runtime trait, the contract a compilation job needs from the
// runtime instance that owns the heap. The job never inspects objects itself: it asks the
// runtime for a function's name and bytecode when it is constructed, and for the closure's
// context, native context and global object when later pipeline stages want to specialize
// on them. The runtime may become unavailable (for example while it tears down); jobs turn
// that into a bailout rather than a crash. Implementations must be shareable across threads
// because the same runtime is consulted from the requesting thread and the worker.

//! Runtime instance contract.

use super::handles::ObjectId;

/// Queries a compilation job makes against the runtime that owns the heap.
///
/// All ids passed in were resolved by the job on its owning thread.
pub trait Runtime: Send + Sync {
    /// Whether handles can currently be reopened against this runtime.
    fn is_available(&self) -> bool {
        true
    }

    /// Name of the function, `None` for anonymous functions.
    fn function_name(&self, shared: ObjectId) -> Option<String>;

    /// Bytecode of the function, `None` if it has not been compiled.
    fn bytecode_array(&self, shared: ObjectId) -> Option<ObjectId>;

    /// Context a closure was created in.
    fn context(&self, closure: ObjectId) -> Option<ObjectId>;

    /// Native context of a closure.
    fn native_context(&self, closure: ObjectId) -> Option<ObjectId>;

    /// Global object of a native context.
    fn global_object(&self, native_context: ObjectId) -> Option<ObjectId>;
}
