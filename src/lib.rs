//! # eventvisor
//!
//! **Eventvisor** is a lightweight in-process publish/subscribe library for
//! Rust.
//!
//! It resolves each listener handler into a [`HandlerBinding`]: a directly
//! callable unit that owns its listener, contains its failures, and reports
//! them instead of raising. Events reach bindings either inline or through
//! per-listener worker queues. The crate is designed as a building block
//! for application event wiring.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐      ┌──────────────┐      ┌──────────────┐
//!     │  Listener A  │      │  Listener B  │      │  Listener C  │
//!     └──────┬───────┘      └──────┬───────┘      └──────┬───────┘
//!            │ register            │ register            │ register
//!            ▼                     ▼                     ▼
//!      Subscriptions ──────► HandlerBinding (one per declared handler)
//!                                  │
//!              ┌───────────────────┴───────────────────┐
//!              ▼                                       ▼
//!       EventBus (sync)                       AsyncEventBus (fan-out)
//!      ObserverRegistry                    queue + worker per listener
//!              │                                       │
//!    publish(&event) inline                 publish(event), try_send
//!              │                                       │
//!              └──────────────────┬────────────────────┘
//!                                 ▼
//!               binding.deliver() ──► handler(&listener, &event)
//!                                 │
//!                                 └── panic / mismatch / drop
//!                                              │
//!                                              ▼
//!                                         ReportSink
//! ```
//!
//! ### Delivery
//! ```text
//! publish(event)
//!   ├─► look up bindings by TypeId (exact event type, no subtyping)
//!   ├─► for each binding:
//!   │     ├─ downcast the event to the declared type
//!   │     ├─ invoke handler(&listener, &event)    (at most once)
//!   │     └─ on panic / mismatch ─► ReportSink::invocation_failed
//!   └─► returns:
//!         - EventBus: after the last matching handler ran
//!         - AsyncEventBus: immediately after enqueueing
//!
//! shutdown (AsyncEventBus only):
//!   close queues ─► workers drain ─► await up to grace
//!     └─ deadline passed ─► force-cancel ─► GraceExceeded { stuck }
//! ```
//!
//! ## Features
//! | Area              | Description                                                          | Key types / traits                                              |
//! |-------------------|----------------------------------------------------------------------|-----------------------------------------------------------------|
//! | **Listener API**  | Declare handlers once; they fire per exact event type.               | [`Listener`], [`Subscriptions`]                                 |
//! | **Bindings**      | Listener + handler resolved into a callable, failure-contained unit. | [`HandlerBinding`], [`HandlerId`], [`ListenerId`]               |
//! | **Buses**         | Inline dispatch, or per-listener queues with worker tasks.           | [`EventBus`], [`AsyncEventBus`]                                 |
//! | **Registry**      | Bindings indexed by event type; snapshot-based delivery.             | [`ObserverRegistry`]                                            |
//! | **Reporting**     | Pluggable sinks for contained failures and drops.                    | [`ReportSink`], [`StderrSink`], [`FailureTally`]                |
//! | **Errors**        | Typed construction, delivery and shutdown errors.                    | [`InvalidBindingError`], [`HandlerInvocationError`], [`ShutdownError`] |
//! | **Configuration** | Fan-out shutdown settings.                                           | [`FanoutConfig`]                                                |
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use eventvisor::{EventBus, FailureTally, Listener, Subscriptions};
//!
//! struct OrderPlaced {
//!     id: u64,
//! }
//!
//! #[derive(Default)]
//! struct Billing {
//!     invoiced: Mutex<Vec<u64>>,
//! }
//!
//! impl Billing {
//!     fn on_order(&self, order: &OrderPlaced) {
//!         self.invoiced.lock().unwrap().push(order.id);
//!     }
//! }
//!
//! impl Listener for Billing {
//!     fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
//!         subs.handler("on_order", Billing::on_order);
//!     }
//!
//!     fn label(&self) -> &str {
//!         "billing"
//!     }
//! }
//!
//! fn main() -> Result<(), eventvisor::InvalidBindingError> {
//!     let tally = FailureTally::new();
//!     let bus = EventBus::new().with_sink(Arc::new(tally.clone()));
//!
//!     let billing = Arc::new(Billing::default());
//!     bus.register(&billing)?;
//!
//!     bus.publish(&OrderPlaced { id: 4711 });
//!
//!     assert_eq!(billing.invoiced.lock().unwrap().clone(), vec![4711]);
//!     assert_eq!(tally.failures_for("billing"), 0);
//!     Ok(())
//! }
//! ```

mod bindings;
mod bus;
mod config;
mod error;
mod events;
mod registry;
mod sinks;

// ---- Public re-exports ----

pub use bindings::{HandlerBinding, HandlerId, Listener, ListenerId, Subscriptions};
pub use bus::{AsyncEventBus, EventBus};
pub use config::FanoutConfig;
pub use error::{HandlerInvocationError, InvalidBindingError, ShutdownError};
pub use events::Event;
pub use registry::ObserverRegistry;
pub use sinks::{DropReason, FailureTally, ListenerTally, ReportSink, StderrSink};
