// This module groups everything a compilation job needs to hold references to garbage
// collected objects: typed handles, thread-affine handle scopes, the detachable persistent
// handle bundle, and the Runtime trait that answers queries about heap objects. The heap,
// the collector and the object model themselves live outside this crate; these types only
// encode the contract between a job and them.

//! Managed references.
//!
//! # Key Components
//!
//! - [`Handle`]: typed, copyable reference issued by a scope or bundle
//! - [`HandleScope`]: slot table valid on one thread
//! - [`PersistentHandles`]: detachable bundle that follows the job across threads
//! - [`Runtime`]: queries against the owning runtime instance

pub mod error;
pub mod handles;
pub mod persistent;
pub mod runtime;
pub mod scope;

pub use error::HeapError;
pub use handles::{
    BytecodeArray, Code, Context, GlobalObject, Handle, HeapObject, HeapType, JsFunction,
    NativeContext, ObjectId, ScopeId, SharedFunctionInfo,
};
pub use persistent::PersistentHandles;
pub use runtime::Runtime;
pub use scope::HandleScope;
