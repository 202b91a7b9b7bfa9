// This module implements PersistentHandles, the reference bundle a compilation job carries
// across threads. Unlike a HandleScope, a bundle is not tied to the thread that created it
// for its whole life: it is bound to whichever thread currently owns the job and is rebound
// when the job is reopened on a new thread. Roots are deduplicated through a hashbrown map
// so asking for the same object twice returns the same handle. Ownership of a bundle is
// always a Box moved between owners (job, heap broker, local heap); nothing in this module
// clones one.

//! Detachable bundle of persistent handles.

use std::thread::{self, ThreadId};

use hashbrown::HashMap;

use super::error::HeapError;
use super::handles::{Handle, HeapType, ObjectId, ScopeId};

/// Exclusively-owned collection of managed references usable off the
/// creating thread once rebound.
#[derive(Debug)]
pub struct PersistentHandles {
    id: ScopeId,
    owner: ThreadId,
    roots: Vec<ObjectId>,
    index: HashMap<ObjectId, u32>,
}

impl PersistentHandles {
    /// Create an empty bundle owned by the calling thread.
    pub fn new() -> Self {
        Self {
            id: ScopeId::fresh(),
            owner: thread::current().id(),
            roots: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Thread currently allowed to use the bundle.
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Add `object` as a root, reusing the existing slot if already held.
    pub fn new_handle<T: HeapType>(&mut self, object: ObjectId) -> Handle<T> {
        let next = self.roots.len() as u32;
        let slot = *self.index.entry(object).or_insert_with(|| {
            self.roots.push(object);
            next
        });
        Handle::new(self.id, slot)
    }

    /// Whether `object` is held by this bundle.
    pub fn contains(&self, object: ObjectId) -> bool {
        self.index.contains_key(&object)
    }

    /// Resolve a handle issued by this bundle on the owning thread.
    pub fn resolve<T: HeapType>(&self, handle: Handle<T>) -> Result<ObjectId, HeapError> {
        let current = thread::current().id();
        if current != self.owner {
            return Err(HeapError::WrongThread {
                scope: self.id,
                owner: self.owner,
                current,
            });
        }
        if handle.scope() != self.id {
            return Err(HeapError::ForeignHandle {
                handle_scope: handle.scope(),
                scope: self.id,
            });
        }
        self.roots
            .get(handle.slot())
            .copied()
            .ok_or(HeapError::DanglingSlot {
                scope: self.id,
                slot: handle.slot(),
            })
    }

    /// Bind the bundle to the calling thread.
    pub fn bind_to_current_thread(&mut self) {
        let current = thread::current().id();
        if current != self.owner {
            log::trace!("{} rebound from {:?} to {:?}", self.id, self.owner, current);
            self.owner = current;
        }
    }

    /// Let the collector visit and update every root.
    pub fn visit_roots(&mut self, visitor: &mut dyn FnMut(&mut ObjectId)) {
        for root in &mut self.roots {
            visitor(root);
        }
        self.index = self
            .roots
            .iter()
            .enumerate()
            .map(|(slot, object)| (*object, slot as u32))
            .collect();
    }
}

impl Default for PersistentHandles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::handles::{BytecodeArray, SharedFunctionInfo};

    #[test]
    fn test_new_handle_deduplicates() {
        let mut bundle = PersistentHandles::new();
        let a: Handle<SharedFunctionInfo> = bundle.new_handle(ObjectId(5));
        let b: Handle<SharedFunctionInfo> = bundle.new_handle(ObjectId(5));
        let c: Handle<BytecodeArray> = bundle.new_handle(ObjectId(6));

        assert_eq!(a, b);
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.resolve(c), Ok(ObjectId(6)));
        assert!(bundle.contains(ObjectId(5)));
    }

    #[test]
    fn test_rebinding_follows_the_owner() {
        let mut bundle = Box::new(PersistentHandles::new());
        let h: Handle<SharedFunctionInfo> = bundle.new_handle(ObjectId(1));

        let bundle = thread::scope(|s| {
            s.spawn(move || {
                assert!(matches!(bundle.resolve(h), Err(HeapError::WrongThread { .. })));
                let mut bundle = bundle;
                bundle.bind_to_current_thread();
                assert_eq!(bundle.resolve(h), Ok(ObjectId(1)));
                bundle
            })
            .join()
            .unwrap()
        });

        assert!(bundle.resolve(h).is_err());
    }

    #[test]
    fn test_visit_roots_keeps_index_consistent() {
        let mut bundle = PersistentHandles::new();
        let h: Handle<SharedFunctionInfo> = bundle.new_handle(ObjectId(1));
        bundle.visit_roots(&mut |root| root.0 *= 10);

        assert_eq!(bundle.resolve(h), Ok(ObjectId(10)));
        assert!(bundle.contains(ObjectId(10)));
        assert!(!bundle.contains(ObjectId(1)));
    }
}
