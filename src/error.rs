//! Error types used by the dispatch pipeline.
//!
//! This module defines three error enums:
//!
//! - [`InvalidBindingError`]: construction-time failures. The binding could
//!   not be created and no usable [`HandlerBinding`](crate::HandlerBinding)
//!   exists.
//! - [`HandlerInvocationError`]: delivery-time failures. The handler ran (or
//!   was about to run) and something went wrong. These never escape
//!   `deliver`; they are handed to the configured
//!   [`ReportSink`](crate::ReportSink).
//! - [`ShutdownError`]: errors raised while draining the async fan-out.
//!
//! All types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::bindings::HandlerId;

/// # Errors raised while constructing a binding.
///
/// A failed construction produces no binding at all; this is the only error
/// surface of the pipeline that callers are expected to handle explicitly.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum InvalidBindingError {
    /// The listener instance was already dropped when the binding was created.
    #[error("cannot bind `{handler}` for `{listener}`: listener instance is gone")]
    ListenerGone {
        /// Type name of the listener the handler belongs to.
        listener: &'static str,
        /// Identifier of the handler that was being bound.
        handler: HandlerId,
    },
}

impl InvalidBindingError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::{HandlerId, InvalidBindingError};
    ///
    /// let err = InvalidBindingError::ListenerGone {
    ///     listener: "demo::Ticker",
    ///     handler: HandlerId::new("on_tick", "demo::Tick"),
    /// };
    /// assert_eq!(err.as_label(), "binding_listener_gone");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            InvalidBindingError::ListenerGone { .. } => "binding_listener_gone",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            InvalidBindingError::ListenerGone { listener, handler } => {
                format!("listener gone: {listener} (handler {handler})")
            }
        }
    }
}

/// # Errors raised while delivering an event to a handler.
///
/// These are contained by design: `deliver` reports them through the binding's
/// [`ReportSink`](crate::ReportSink) and returns normally, so one misbehaving
/// handler cannot poison the dispatch loop for its siblings.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerInvocationError {
    /// The handler panicked while processing the event.
    #[error("listener `{listener}` handler `{handler}` panicked: {panic}")]
    HandlerPanicked {
        /// Label of the listener that owns the handler.
        listener: Arc<str>,
        /// Identifier of the handler that panicked.
        handler: HandlerId,
        /// Best-effort rendering of the panic payload.
        panic: String,
    },

    /// The delivered event is not of the type the handler accepts.
    #[error("listener `{listener}` handler `{handler}` cannot take `{delivered}`")]
    EventMismatch {
        /// Label of the listener that owns the handler.
        listener: Arc<str>,
        /// Identifier of the handler (its accepted event type included).
        handler: HandlerId,
        /// Type name of the event that was actually delivered.
        delivered: &'static str,
    },
}

impl HandlerInvocationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::{HandlerId, HandlerInvocationError};
    ///
    /// let err = HandlerInvocationError::HandlerPanicked {
    ///     listener: "Ticker".into(),
    ///     handler: HandlerId::new("on_tick", "demo::Tick"),
    ///     panic: "boom".into(),
    /// };
    /// assert_eq!(err.as_label(), "handler_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerInvocationError::HandlerPanicked { .. } => "handler_panicked",
            HandlerInvocationError::EventMismatch { .. } => "handler_event_mismatch",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerInvocationError::HandlerPanicked { handler, panic, .. } => {
                format!("panic in {handler}: {panic}")
            }
            HandlerInvocationError::EventMismatch { handler, delivered, .. } => {
                format!("{handler} cannot take {delivered}")
            }
        }
    }

    /// Returns the label of the listener the failing handler belongs to.
    ///
    /// Useful for sinks that aggregate failures per listener.
    pub fn listener(&self) -> &str {
        match self {
            HandlerInvocationError::HandlerPanicked { listener, .. } => listener,
            HandlerInvocationError::EventMismatch { listener, .. } => listener,
        }
    }

    /// Returns the identifier of the failing handler.
    pub fn handler(&self) -> HandlerId {
        match self {
            HandlerInvocationError::HandlerPanicked { handler, .. } => *handler,
            HandlerInvocationError::EventMismatch { handler, .. } => *handler,
        }
    }
}

/// # Errors raised while shutting down the async fan-out.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ShutdownError {
    /// Shutdown grace period was exceeded; some listener workers remained stuck
    /// and had to be force-cancelled.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing cancellation")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Labels of listeners whose workers did not drain in time.
        stuck: Vec<String>,
    },
}

impl ShutdownError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventvisor::ShutdownError;
    /// use std::time::Duration;
    ///
    /// let err = ShutdownError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "shutdown_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ShutdownError::GraceExceeded { .. } => "shutdown_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ShutdownError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck listeners={stuck:?}")
            }
        }
    }
}
