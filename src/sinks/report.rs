//! # Diagnostic seam for contained delivery failures.
//!
//! `deliver` never propagates handler failures to the publisher; it hands
//! them to a [`ReportSink`] instead. The sink is the one pluggable point
//! where an application decides what a contained failure looks like:
//! stderr line, metric increment, dead-letter queue, test double.
//!
//! ## Rules
//! - Sink methods are called from whichever thread is dispatching (the
//!   publisher's thread on the sync bus, a worker on the async one), so
//!   implementations must be cheap and must not block.
//! - A sink must not panic. There is no second-level containment behind it.
//! - No pipeline lock is held while a sink runs: a sink may call back into
//!   the bus that reports to it (for example to unregister a listener that
//!   keeps overflowing).

use std::fmt;

use crate::error::HandlerInvocationError;

/// Why an event never reached a listener's queue on the async fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The listener's bounded queue was full at publish time.
    QueueFull,
    /// The listener's worker already exited and closed its queue.
    WorkerClosed,
}

impl DropReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DropReason::QueueFull => "queue_full",
            DropReason::WorkerClosed => "worker_closed",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::QueueFull => write!(f, "queue full"),
            DropReason::WorkerClosed => write!(f, "worker closed"),
        }
    }
}

/// Receiver for failures the dispatch pipeline contains on purpose.
///
/// Implementations decide what "reported" means. The bundled ones are
/// [`StderrSink`](crate::StderrSink) (default) and
/// [`FailureTally`](crate::FailureTally) (per-listener counters).
pub trait ReportSink: Send + Sync + 'static {
    /// Called when a handler invocation failed (panic or type mismatch).
    ///
    /// The event was consumed; delivery to other handlers continues.
    fn invocation_failed(&self, error: &HandlerInvocationError);

    /// Called when the async fan-out drops an event before it reaches
    /// `listener`'s queue.
    ///
    /// Default is a no-op: sync-only deployments never see drops.
    fn event_dropped(&self, listener: &str, reason: DropReason) {
        let _ = (listener, reason);
    }
}
