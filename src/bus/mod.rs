//! Buses: registration plus delivery, in two temperaments.
//!
//! Both buses share the same front half (listener registration through
//! [`Subscriptions`](crate::Subscriptions), identity dedupe, sink wiring)
//! and differ in the back half: who runs the handlers, and when.
//!
//! ## Contents
//! - [`EventBus`] synchronous: handlers run on the publisher's thread,
//!   `publish` returns after the last one
//! - [`AsyncEventBus`] fan-out: per-listener bounded queues and worker
//!   tasks, `publish` never waits on a handler
//!
//! ## Wiring
//! ```text
//!               register(&Arc<L>)
//!                      │
//!            Subscriptions<L> ──► Vec<HandlerBinding>
//!                      │
//!        ┌─────────────┴──────────────┐
//!        ▼                            ▼
//!    EventBus                   AsyncEventBus
//!  ObserverRegistry           queue + worker per listener
//!  (inline deliver)           (try_send, drop on overflow)
//!        │                            │
//!        └────── failures ──► ReportSink ◄── drops ──┘
//! ```

mod fanout;
mod sync;

pub use fanout::AsyncEventBus;
pub use sync::EventBus;
