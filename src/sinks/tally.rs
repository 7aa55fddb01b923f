//! # Stateful sink that counts contained failures per listener.
//!
//! [`FailureTally`] keeps an in-memory map of listener label to failure
//! counters, fed by the [`ReportSink`] calls the dispatch pipeline makes.
//! Delivery itself stays signal-free; an application that wants to notice
//! chronically failing listeners shares a tally with the bus and inspects
//! it on its own schedule.
//!
//! ## Architecture
//! ```text
//!  HandlerBinding ── invocation_failed(err) ──► FailureTally
//!  AsyncEventBus ─── event_dropped(label) ────►   (HashMap<label, counters>
//!                                                  behind Mutex)
//!                                                       │
//!  Application ── failures_for(label) / snapshot() ◄────┘
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{EventBus, FailureTally};
//!
//! let tally = FailureTally::new();
//! let bus = EventBus::new().with_sink(Arc::new(tally.clone()));
//!
//! // ... register listeners, publish events ...
//!
//! assert_eq!(tally.failures_for("Ticker"), 0);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::HandlerInvocationError;

use super::report::{DropReason, ReportSink};

/// Counters for a single listener.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListenerTally {
    /// Handler invocations that panicked or rejected the delivered event type.
    pub invocation_failures: u64,
    /// Events the async fan-out dropped before they reached this listener.
    pub dropped_events: u64,
}

/// Counts contained failures per listener label.
///
/// Thread-safe and cloneable: clones share the same counters, so the same
/// tally can be handed to a bus as its sink and kept by the application
/// for inspection.
#[derive(Debug, Clone)]
pub struct FailureTally {
    inner: Arc<Mutex<HashMap<String, ListenerTally>>>,
}

impl FailureTally {
    /// Creates a new, empty tally.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the number of failed handler invocations recorded for `listener`.
    pub fn failures_for(&self, listener: &str) -> u64 {
        self.lock()
            .get(listener)
            .map(|t| t.invocation_failures)
            .unwrap_or(0)
    }

    /// Returns the number of dropped events recorded for `listener`.
    pub fn drops_for(&self, listener: &str) -> u64 {
        self.lock()
            .get(listener)
            .map(|t| t.dropped_events)
            .unwrap_or(0)
    }

    /// Returns all counters, sorted by listener label.
    pub fn snapshot(&self) -> Vec<(String, ListenerTally)> {
        let mut all: Vec<(String, ListenerTally)> = self
            .lock()
            .iter()
            .map(|(name, tally)| (name.clone(), *tally))
            .collect();
        all.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Counters survive a panic inside a sink caller; a poisoned lock still
    /// holds valid numbers.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ListenerTally>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FailureTally {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportSink for FailureTally {
    fn invocation_failed(&self, error: &HandlerInvocationError) {
        self.lock()
            .entry(error.listener().to_string())
            .or_default()
            .invocation_failures += 1;
    }

    fn event_dropped(&self, listener: &str, _reason: DropReason) {
        self.lock()
            .entry(listener.to_string())
            .or_default()
            .dropped_events += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::HandlerId;

    fn panic_err(listener: &str) -> HandlerInvocationError {
        HandlerInvocationError::HandlerPanicked {
            listener: listener.into(),
            handler: HandlerId::new("on_tick", "tick"),
            panic: "boom".into(),
        }
    }

    #[test]
    fn test_counts_are_tracked_per_listener() {
        let tally = FailureTally::new();

        tally.invocation_failed(&panic_err("a"));
        tally.invocation_failed(&panic_err("a"));
        tally.invocation_failed(&panic_err("b"));
        tally.event_dropped("a", DropReason::QueueFull);

        assert_eq!(tally.failures_for("a"), 2);
        assert_eq!(tally.failures_for("b"), 1);
        assert_eq!(tally.drops_for("a"), 1);
        assert_eq!(tally.drops_for("b"), 0);
    }

    #[test]
    fn test_unknown_listener_reads_zero() {
        let tally = FailureTally::new();
        assert_eq!(tally.failures_for("ghost"), 0);
        assert_eq!(tally.drops_for("ghost"), 0);
    }

    #[test]
    fn test_snapshot_is_sorted_by_label() {
        let tally = FailureTally::new();
        tally.event_dropped("zeta", DropReason::WorkerClosed);
        tally.event_dropped("alpha", DropReason::QueueFull);
        tally.invocation_failed(&panic_err("mid"));

        let snap = tally.snapshot();
        let labels: Vec<&str> = snap.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(labels, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_clones_share_counters() {
        let tally = FailureTally::new();
        let shared = tally.clone();

        shared.invocation_failed(&panic_err("a"));
        assert_eq!(tally.failures_for("a"), 1);
    }
}
