//! # Default stderr reporting sink.
//!
//! [`StderrSink`] prints contained failures to stderr in a single-line,
//! human-readable format. Every binding and bus starts with this sink so
//! that swallowed failures are never fully silent.
//!
//! ## Output format
//! ```text
//! [eventvisor] listener `Ticker` handler `on_tick(demo::Tick)` panicked: boom
//! [eventvisor] listener `Ticker` handler `on_tick(demo::Tick)` cannot take `alloc::string::String`
//! [eventvisor] listener 'Ticker' dropped event: queue full
//! ```
//!
//! Not intended as an observability story: wire a custom
//! [`ReportSink`](crate::ReportSink) for structured logging or metrics.

use crate::error::HandlerInvocationError;

use super::report::{DropReason, ReportSink};

/// Prints contained failures to stderr, prefixed with `[eventvisor]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl ReportSink for StderrSink {
    fn invocation_failed(&self, error: &HandlerInvocationError) {
        eprintln!("[eventvisor] {error}");
    }

    fn event_dropped(&self, listener: &str, reason: DropReason) {
        eprintln!("[eventvisor] listener '{listener}' dropped event: {reason}");
    }
}
