//! # Synchronous event bus - publish on the caller's thread.
//!
//! [`EventBus`] pairs an [`ObserverRegistry`] with a report sink and walks
//! binding snapshots inline: `publish` returns when every matching handler
//! has run (or had its failure reported). No queues, no workers, no
//! runtime requirement.
//!
//! ## Architecture
//! ```text
//! register(&Arc<L>) ──► Subscriptions ──► bindings ──► ObserverRegistry
//!
//! publish(&event) ──► registry.bindings_for(TypeId)
//!                           │ (snapshot, lock released)
//!                           ▼
//!                  binding.deliver(&event)   x N, caller's thread
//!                           │
//!                           └── failures ──► ReportSink
//! ```
//!
//! ## Rules
//! - Within one event type, handlers fire in registration order, and in
//!   declaration order within one listener.
//! - A panicking handler is contained by its binding; the loop continues
//!   with the next one.
//! - Registering the same instance twice is a no-op (`Ok(0)`).
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use eventvisor::{EventBus, Listener, Subscriptions};
//!
//! struct Saved(String);
//!
//! #[derive(Default)]
//! struct Auditor {
//!     log: Mutex<Vec<String>>,
//! }
//!
//! impl Auditor {
//!     fn on_saved(&self, ev: &Saved) {
//!         self.log.lock().unwrap().push(ev.0.clone());
//!     }
//! }
//!
//! impl Listener for Auditor {
//!     fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
//!         subs.handler("on_saved", Auditor::on_saved);
//!     }
//! }
//!
//! let bus = EventBus::new();
//! let auditor = Arc::new(Auditor::default());
//! assert_eq!(bus.register(&auditor)?, 1);
//!
//! bus.publish(&Saved("draft-7".into()));
//! assert_eq!(auditor.log.lock().unwrap().len(), 1);
//! # Ok::<(), eventvisor::InvalidBindingError>(())
//! ```

use std::any::TypeId;
use std::sync::Arc;

use crate::bindings::{Listener, ListenerId, Subscriptions};
use crate::error::InvalidBindingError;
use crate::events::Event;
use crate::registry::ObserverRegistry;
use crate::sinks::{ReportSink, StderrSink};

/// In-process bus that dispatches on the publisher's thread.
pub struct EventBus {
    registry: ObserverRegistry,
    sink: Arc<dyn ReportSink>,
}

impl EventBus {
    /// Creates an empty bus reporting to [`StderrSink`].
    pub fn new() -> Self {
        Self {
            registry: ObserverRegistry::new(),
            sink: Arc::new(StderrSink),
        }
    }

    /// Replaces the sink applied to bindings registered from here on.
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Registers a listener: collects its handler declarations and stores
    /// the resulting bindings.
    ///
    /// Returns the number of bindings added. Registering an instance that
    /// is already present (same `Arc` allocation) is a no-op returning
    /// `Ok(0)`; a listener declaring no handlers is not retained. If any
    /// declaration fails to bind, nothing is registered.
    pub fn register<L: Listener>(&self, listener: &Arc<L>) -> Result<usize, InvalidBindingError> {
        let id = ListenerId::of(listener);
        if self.registry.contains(id) {
            return Ok(0);
        }

        let mut subs = Subscriptions::new(listener).with_sink(Arc::clone(&self.sink));
        listener.subscriptions(&mut subs);
        let bindings = subs.into_bindings()?;

        let added = bindings.len();
        if !self.registry.insert_unique(id, bindings) {
            return Ok(0);
        }
        Ok(added)
    }

    /// Removes every binding of the given listener instance.
    ///
    /// Returns the number of bindings removed (0 if it was not registered).
    pub fn unregister<L: Listener>(&self, listener: &Arc<L>) -> usize {
        self.registry.remove_listener(ListenerId::of(listener))
    }

    /// Delivers `event` to every handler subscribed to its exact type,
    /// on the calling thread.
    ///
    /// Handler failures are reported to the sink, never raised here;
    /// publishing with no registered listeners is a no-op.
    pub fn publish<E: Event>(&self, event: &E) {
        for binding in self.registry.bindings_for(TypeId::of::<E>()) {
            binding.deliver(event);
        }
    }

    /// The underlying registry, for snapshots and standalone insertion.
    pub fn registry(&self) -> &ObserverRegistry {
        &self.registry
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::sinks::FailureTally;

    struct Saved(String);

    struct Deleted;

    #[derive(Default)]
    struct Auditor {
        saved: Mutex<Vec<String>>,
        deleted: AtomicU64,
    }

    impl Auditor {
        fn on_saved(&self, ev: &Saved) {
            self.saved.lock().unwrap().push(ev.0.clone());
        }

        fn on_deleted(&self, _ev: &Deleted) {
            self.deleted.fetch_add(1, Ordering::Relaxed);
        }
    }

    impl Listener for Auditor {
        fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
            subs.handler("on_saved", Auditor::on_saved)
                .handler("on_deleted", Auditor::on_deleted);
        }

        fn label(&self) -> &str {
            "auditor"
        }
    }

    struct Flaky;

    impl Flaky {
        fn on_saved(&self, _ev: &Saved) {
            panic!("flaky by nature");
        }
    }

    impl Listener for Flaky {
        fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
            subs.handler("on_saved", Flaky::on_saved);
        }

        fn label(&self) -> &str {
            "flaky"
        }
    }

    #[test]
    fn test_publish_routes_by_event_type() {
        let bus = EventBus::new();
        let auditor = Arc::new(Auditor::default());
        assert_eq!(bus.register(&auditor).unwrap(), 2);

        bus.publish(&Saved("a".into()));
        bus.publish(&Saved("b".into()));
        bus.publish(&Deleted);

        assert_eq!(auditor.saved.lock().unwrap().clone(), vec!["a", "b"]);
        assert_eq!(auditor.deleted.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_publish_without_listeners_is_noop() {
        let bus = EventBus::new();
        bus.publish(&Saved("ignored".into()));
        assert!(bus.registry().is_empty());
    }

    #[test]
    fn test_duplicate_register_is_noop() {
        let bus = EventBus::new();
        let auditor = Arc::new(Auditor::default());
        assert_eq!(bus.register(&auditor).unwrap(), 2);
        assert_eq!(bus.register(&auditor).unwrap(), 0);

        bus.publish(&Deleted);
        assert_eq!(auditor.deleted.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_separate_instances_register_separately() {
        let bus = EventBus::new();
        let first = Arc::new(Auditor::default());
        let second = Arc::new(Auditor::default());
        bus.register(&first).unwrap();
        bus.register(&second).unwrap();

        bus.publish(&Deleted);
        assert_eq!(first.deleted.load(Ordering::Relaxed), 1);
        assert_eq!(second.deleted.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unregister_stops_delivery() {
        let bus = EventBus::new();
        let auditor = Arc::new(Auditor::default());
        bus.register(&auditor).unwrap();

        bus.publish(&Deleted);
        assert_eq!(bus.unregister(&auditor), 2);
        assert_eq!(bus.unregister(&auditor), 0);

        bus.publish(&Deleted);
        assert_eq!(auditor.deleted.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_panicking_listener_spares_the_rest() {
        let tally = FailureTally::new();
        let bus = EventBus::new().with_sink(Arc::new(tally.clone()));
        let flaky = Arc::new(Flaky);
        let auditor = Arc::new(Auditor::default());

        // flaky first: its panic runs before auditor's handler
        bus.register(&flaky).unwrap();
        bus.register(&auditor).unwrap();

        bus.publish(&Saved("kept".into()));

        assert_eq!(auditor.saved.lock().unwrap().clone(), vec!["kept"]);
        assert_eq!(tally.failures_for("flaky"), 1);
        assert_eq!(tally.failures_for("auditor"), 0);
    }
}
