//! Report sinks: where contained failures go.
//!
//! Delivery never raises; everything a handler does wrong is routed through
//! a [`ReportSink`]. This module holds the seam itself and the two bundled
//! implementations.
//!
//! ## Contents
//! - [`ReportSink`], [`DropReason`] the diagnostic seam
//! - [`StderrSink`] default single-line stderr reporting
//! - [`FailureTally`], [`ListenerTally`] per-listener failure counters

mod report;
mod stderr;
mod tally;

pub use report::{DropReason, ReportSink};
pub use stderr::StderrSink;
pub use tally::{FailureTally, ListenerTally};
