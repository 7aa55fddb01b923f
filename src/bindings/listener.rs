//! # Listener contract and subscription collection.
//!
//! `Listener` is the extension point for plugging event handlers into a bus.
//! A listener names its handlers once, in [`Listener::subscriptions`]; the
//! bus turns each declaration into a [`HandlerBinding`] via a
//! [`Subscriptions`] collector and owns the bindings from there.
//!
//! ## Contract
//! - [`Listener::subscriptions`] declares handlers only; it must not
//!   publish or block.
//! - Handlers take `&self` and one event reference. State that mutates
//!   under delivery lives behind interior mutability.
//! - On the async bus each listener additionally declares its preferred
//!   queue capacity via [`Listener::queue_capacity`]. If the queue
//!   overflows, events for that listener are **dropped** (reported).
//!
//! ## Example
//! ```rust
//! use eventvisor::{Listener, Subscriptions};
//!
//! struct Tick;
//!
//! struct Audit;
//!
//! impl Audit {
//!     fn on_tick(&self, _tick: &Tick) {
//!         // write audit record...
//!     }
//! }
//!
//! impl Listener for Audit {
//!     fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
//!         subs.handler("on_tick", Audit::on_tick);
//!     }
//!
//!     fn queue_capacity(&self) -> usize {
//!         512
//!     }
//! }
//! ```

use std::any::type_name;
use std::sync::{Arc, Weak};

use crate::error::InvalidBindingError;
use crate::events::Event;
use crate::sinks::{ReportSink, StderrSink};

use super::binding::HandlerBinding;

/// Contract for event listeners.
///
/// Handlers are invoked from whichever context is dispatching: the
/// publisher's thread on [`EventBus`](crate::EventBus), a dedicated worker
/// on [`AsyncEventBus`](crate::AsyncEventBus).
pub trait Listener: Send + Sync + 'static {
    /// Declares this listener's handlers on the collector.
    ///
    /// Called once per registration. Declaration order is preserved: for a
    /// given event type, handlers fire in the order they were declared
    /// here.
    fn subscriptions(&self, subs: &mut Subscriptions<Self>)
    where
        Self: Sized;

    /// Human-readable label (for failure reports and snapshots).
    fn label(&self) -> &str {
        type_name::<Self>()
    }

    /// Preferred capacity of this listener's queue on the async bus.
    ///
    /// Values are clamped to at least 1. On overflow, events for this
    /// listener are **dropped** (reported).
    fn queue_capacity(&self) -> usize {
        1024
    }
}

/// Collects handler declarations into bindings for one listener instance.
///
/// ## Rules
/// - The first declaration that fails to bind aborts collection:
///   [`Subscriptions::into_bindings`] returns that error and later
///   declarations are ignored, so a listener is never half-registered.
/// - Duplicate declarations are kept as-is; each one delivers.
/// - The listener's label and the configured sink are applied to every
///   collected binding.
pub struct Subscriptions<L> {
    target: Weak<L>,
    label: Arc<str>,
    sink: Arc<dyn ReportSink>,
    bindings: Vec<HandlerBinding>,
    failed: Option<InvalidBindingError>,
}

impl<L: Listener> Subscriptions<L> {
    /// Creates an empty collector for the listener behind `listener`.
    ///
    /// The collector holds only a weak reference; it is the declarations
    /// themselves that upgrade it, one binding at a time.
    pub fn new(listener: &Arc<L>) -> Self {
        Self {
            target: Arc::downgrade(listener),
            label: Arc::from(listener.label()),
            sink: Arc::new(StderrSink),
            bindings: Vec::new(),
            failed: None,
        }
    }

    /// Replaces the sink applied to every collected binding.
    ///
    /// Defaults to [`StderrSink`].
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Declares `handler` under `name`.
    ///
    /// No-op if an earlier declaration already failed.
    pub fn handler<E, F>(&mut self, name: &'static str, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&L, &E) + Send + Sync + 'static,
    {
        if self.failed.is_some() {
            return self;
        }
        match HandlerBinding::bind(&self.target, name, handler) {
            Ok(binding) => self.bindings.push(binding),
            Err(err) => self.failed = Some(err),
        }
        self
    }

    /// Number of bindings collected so far.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing has been collected yet.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Finishes collection, yielding the bindings with label and sink
    /// applied, or the first binding error if any declaration failed.
    pub fn into_bindings(self) -> Result<Vec<HandlerBinding>, InvalidBindingError> {
        let Self {
            label,
            sink,
            bindings,
            failed,
            ..
        } = self;

        match failed {
            Some(err) => Err(err),
            None => Ok(bindings
                .into_iter()
                .map(|b| {
                    b.with_listener_label(Arc::clone(&label))
                        .with_sink(Arc::clone(&sink))
                })
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::sinks::FailureTally;

    struct Tick;

    #[derive(Default)]
    struct Ticker {
        ticks: AtomicU64,
        notes: Mutex<Vec<String>>,
    }

    impl Ticker {
        fn on_tick(&self, _tick: &Tick) {
            self.ticks.fetch_add(1, Ordering::Relaxed);
        }

        fn on_note(&self, note: &String) {
            self.notes.lock().unwrap().push(note.clone());
        }
    }

    impl Listener for Ticker {
        fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
            subs.handler("on_tick", Ticker::on_tick)
                .handler("on_note", Ticker::on_note);
        }

        fn label(&self) -> &str {
            "ticker"
        }
    }

    struct Plain;

    impl Listener for Plain {
        fn subscriptions(&self, _subs: &mut Subscriptions<Self>) {}
    }

    #[test]
    fn test_collects_declarations_in_order() {
        let ticker = Arc::new(Ticker::default());
        let mut subs = Subscriptions::new(&ticker);
        ticker.subscriptions(&mut subs);

        assert_eq!(subs.len(), 2);
        let bindings = subs.into_bindings().unwrap();
        assert_eq!(bindings[0].handler().name, "on_tick");
        assert_eq!(bindings[1].handler().name, "on_note");
        assert!(bindings.iter().all(|b| b.listener() == "ticker"));
    }

    #[test]
    fn test_first_failure_aborts_collection() {
        let ticker = Arc::new(Ticker::default());
        let mut subs = Subscriptions::new(&ticker);
        drop(ticker);

        subs.handler("first", Ticker::on_tick)
            .handler("second", Ticker::on_note);

        assert!(subs.is_empty());
        let err = subs.into_bindings().unwrap_err();
        assert!(matches!(
            err,
            InvalidBindingError::ListenerGone { handler, .. } if handler.name == "first"
        ));
    }

    #[test]
    fn test_duplicate_declarations_each_deliver() {
        let ticker = Arc::new(Ticker::default());
        let mut subs = Subscriptions::new(&ticker);
        subs.handler("on_tick", Ticker::on_tick)
            .handler("on_tick", Ticker::on_tick);

        for binding in subs.into_bindings().unwrap() {
            binding.deliver(&Tick);
        }
        assert_eq!(ticker.ticks.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_sink_applies_to_collected_bindings() {
        let ticker = Arc::new(Ticker::default());
        let tally = FailureTally::new();
        let mut subs = Subscriptions::new(&ticker).with_sink(Arc::new(tally.clone()));

        subs.handler("boom", |_t: &Ticker, _e: &u8| panic!("kaboom"));
        for binding in subs.into_bindings().unwrap() {
            binding.deliver(&0u8);
        }

        assert_eq!(tally.failures_for("ticker"), 1);
    }

    #[test]
    fn test_defaults_come_from_the_trait() {
        let plain = Plain;
        assert!(plain.label().contains("Plain"));
        assert_eq!(plain.queue_capacity(), 1024);
    }
}
