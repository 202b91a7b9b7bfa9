// This module implements HandleScope, the thread-affine slot table that backs the handles a
// compilation job holds while it runs on one thread. A scope records the thread that opened
// it; creating or resolving handles from any other thread is rejected, which is how the
// "no dereference before reopen" rule of the hand-off protocol is enforced at runtime. When
// a job moves to another thread it opens a fresh scope there and adopts each handle from the
// old scope into the new one. The collector reaches every slot through visit_roots.

//! Thread-affine handle scopes.

use std::thread::{self, ThreadId};

use super::error::HeapError;
use super::handles::{Handle, HeapType, ObjectId, ScopeId};

/// Slot table for handles that are valid on a single thread.
#[derive(Debug)]
pub struct HandleScope {
    id: ScopeId,
    thread: ThreadId,
    slots: Vec<ObjectId>,
}

impl HandleScope {
    /// Open an empty scope bound to the calling thread.
    pub fn open() -> Self {
        Self {
            id: ScopeId::fresh(),
            thread: thread::current().id(),
            slots: Vec::new(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Thread the scope is bound to.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Whether the calling thread may use this scope.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Create a handle for `object` in this scope.
    pub fn handle<T: HeapType>(&mut self, object: ObjectId) -> Result<Handle<T>, HeapError> {
        self.check_thread()?;
        Ok(self.push(object))
    }

    /// Resolve a handle issued by this scope.
    pub fn resolve<T: HeapType>(&self, handle: Handle<T>) -> Result<ObjectId, HeapError> {
        self.check_thread()?;
        self.lookup(handle)
    }

    /// Re-home a handle issued by `from` into this scope.
    ///
    /// The old scope is not required to belong to the calling thread: the
    /// caller owns both scopes exclusively during a hand-off.
    pub fn adopt<T: HeapType>(
        &mut self,
        from: &HandleScope,
        handle: Handle<T>,
    ) -> Result<Handle<T>, HeapError> {
        self.check_thread()?;
        let object = from.lookup(handle)?;
        Ok(self.push(object))
    }

    /// Let the collector visit and update every slot.
    pub fn visit_roots(&mut self, visitor: &mut dyn FnMut(&mut ObjectId)) {
        for slot in &mut self.slots {
            visitor(slot);
        }
    }

    fn push<T: HeapType>(&mut self, object: ObjectId) -> Handle<T> {
        let slot = self.slots.len() as u32;
        self.slots.push(object);
        Handle::new(self.id, slot)
    }

    fn lookup<T: HeapType>(&self, handle: Handle<T>) -> Result<ObjectId, HeapError> {
        if handle.scope() != self.id {
            return Err(HeapError::ForeignHandle {
                handle_scope: handle.scope(),
                scope: self.id,
            });
        }
        self.slots
            .get(handle.slot())
            .copied()
            .ok_or(HeapError::DanglingSlot {
                scope: self.id,
                slot: handle.slot(),
            })
    }

    fn check_thread(&self) -> Result<(), HeapError> {
        let current = thread::current().id();
        if current != self.thread {
            return Err(HeapError::WrongThread {
                scope: self.id,
                owner: self.thread,
                current,
            });
        }
        Ok(())
    }
}
