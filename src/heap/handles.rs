// This module defines the typed handle used by compilation jobs to name garbage-collected
// objects. The collector owns the objects and may move them, so a Handle never stores an
// object identity directly: it stores the id of the scope (or persistent bundle) that issued
// it plus a slot index into that scope's table. The collector rewrites the slot tables when
// it relocates objects, and every handle issued from those tables observes the move. The
// HeapType marker types give handles a static type without this crate knowing anything
// about the object layout, which stays with the external object model.

//! Typed handles into handle scopes and persistent bundles.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of an object in the external heap.
///
/// The collector hands these out and may replace them when it moves an
/// object; slot tables are updated through `visit_roots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Identity of a handle scope or persistent bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

impl ScopeId {
    /// Allocate a process-unique scope id.
    pub(crate) fn fresh() -> Self {
        ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value, for diagnostics.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Marker for the object kinds a compilation job refers to.
pub trait HeapType: 'static {
    const NAME: &'static str;
}

macro_rules! heap_types {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            pub enum $name {}

            impl HeapType for $name {
                const NAME: &'static str = stringify!($name);
            }
        )*
    };
}

heap_types! {
    /// Per-function metadata shared between closures.
    SharedFunctionInfo,
    /// Interpreter bytecode of a function.
    BytecodeArray,
    /// A closure.
    JsFunction,
    /// A compiled code object.
    Code,
    /// A function context.
    Context,
    /// The native context a closure was created in.
    NativeContext,
    /// The global object of a native context.
    GlobalObject,
    /// Untyped object, used by persistent bundles holding mixed references.
    HeapObject,
}

/// Typed reference to a managed object.
///
/// A handle is only meaningful together with the scope that issued it;
/// resolving it elsewhere fails.
pub struct Handle<T: HeapType> {
    scope: ScopeId,
    slot: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: HeapType> Handle<T> {
    pub(crate) fn new(scope: ScopeId, slot: u32) -> Self {
        Self {
            scope,
            slot,
            _marker: PhantomData,
        }
    }

    /// Scope or bundle that issued this handle.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot as usize
    }

    /// Reinterpret as an untyped handle.
    pub fn erase(self) -> Handle<HeapObject> {
        Handle::new(self.scope, self.slot)
    }
}

impl<T: HeapType> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: HeapType> Copy for Handle<T> {}

impl<T: HeapType> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.scope == other.scope && self.slot == other.slot
    }
}

impl<T: HeapType> Eq for Handle<T> {}

impl<T: HeapType> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scope.hash(state);
        self.slot.hash(state);
    }
}

impl<T: HeapType> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({}, slot {})", T::NAME, self.scope, self.slot)
    }
}
