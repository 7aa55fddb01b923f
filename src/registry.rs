//! # Observer registry - bindings indexed by event type.
//!
//! The registry is the storage half of dispatch: it owns
//! [`HandlerBinding`]s, grouped by the `TypeId` of the event each one
//! accepts, and hands out per-type snapshots for delivery loops to walk.
//!
//! ## Architecture
//! ```text
//! register ──► insert_unique(listener_id, bindings)
//!                     │
//!                     ▼
//!          RwLock<HashMap<TypeId, Vec<Arc<HandlerBinding>>>>
//!                     │
//! publish ──► bindings_for(type_id) ──► Vec<Arc<HandlerBinding>> (snapshot)
//! ```
//!
//! ## Rules
//! - The registry stores bindings; it never invokes them. Buses walk
//!   snapshots outside the lock.
//! - A snapshot taken before a removal keeps delivering: removal affects
//!   future lookups, not loops already in flight.
//! - Per event type, bindings keep insertion order.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::bindings::{HandlerBinding, ListenerId};

type Index = HashMap<TypeId, Vec<Arc<HandlerBinding>>>;

/// Thread-safe store of bindings, indexed by accepted event type.
#[derive(Default)]
pub struct ObserverRegistry {
    bindings: RwLock<Index>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a single standalone binding.
    ///
    /// No identity check: callers that need listener-level dedupe go
    /// through [`ObserverRegistry::insert_unique`].
    pub fn insert(&self, binding: HandlerBinding) {
        let type_id = binding.event_type_id();
        self.write()
            .entry(type_id)
            .or_default()
            .push(Arc::new(binding));
    }

    /// Inserts all bindings of one listener, unless that listener is
    /// already present.
    ///
    /// The presence check and the insertion happen under one write lock,
    /// so two concurrent registrations of the same instance cannot both
    /// land. Returns whether the bindings were inserted.
    pub fn insert_unique(&self, id: ListenerId, bindings: Vec<HandlerBinding>) -> bool {
        let mut index = self.write();
        if index
            .values()
            .any(|set| set.iter().any(|b| b.listener_id() == id))
        {
            return false;
        }
        for binding in bindings {
            index
                .entry(binding.event_type_id())
                .or_default()
                .push(Arc::new(binding));
        }
        true
    }

    /// Returns a snapshot of the bindings accepting `event` type, in
    /// insertion order. Empty if nobody subscribed to it.
    pub fn bindings_for(&self, event: TypeId) -> Vec<Arc<HandlerBinding>> {
        self.read().get(&event).cloned().unwrap_or_default()
    }

    /// Removes every binding of the given listener instance.
    ///
    /// Returns the number of bindings removed (0 if the listener was not
    /// registered).
    pub fn remove_listener(&self, id: ListenerId) -> usize {
        let mut removed = 0;
        self.write().retain(|_, set| {
            let before = set.len();
            set.retain(|b| b.listener_id() != id);
            removed += before - set.len();
            !set.is_empty()
        });
        removed
    }

    /// Whether any binding of the given listener instance is present.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.read()
            .values()
            .any(|set| set.iter().any(|b| b.listener_id() == id))
    }

    /// Total number of bindings across all event types.
    pub fn len(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    /// Returns true if the registry holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns the sorted, deduplicated labels of registered listeners.
    pub fn listeners(&self) -> Vec<String> {
        let index = self.read();
        let mut labels: Vec<String> = index
            .values()
            .flat_map(|set| set.iter().map(|b| b.listener().to_string()))
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    fn read(&self) -> RwLockReadGuard<'_, Index> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Index> {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
