//! Event vocabulary: the erased view every pipeline stage speaks.
//!
//! This module holds the **data model** side of dispatch: what counts as an
//! event and how the pipeline inspects one without knowing its concrete type.
//!
//! ## Contents
//! - [`Event`] blanket trait over `'static + Send + Sync` types
//!
//! ## Quick reference
//! - **Producers**: anything calling `EventBus::publish` / `AsyncEventBus::publish`.
//! - **Consumers**: `HandlerBinding::deliver`, which downcasts through
//!   [`Event::as_any`] back to the concrete type a handler declared.
//!
//! See `bus/mod.rs` for the system-level wiring diagram.

mod event;

pub use event::Event;
