//! Bindings: listeners resolved into directly callable units.
//!
//! This module holds the invocation layer of the pipeline: the contract a
//! listener implements, and the binding a registry stores per declared
//! handler.
//!
//! ## Contents
//! - [`HandlerBinding`], [`HandlerId`], [`ListenerId`] the invocation unit
//!   and its identity types
//! - [`Listener`], [`Subscriptions`] the declaration contract and collector
//!
//! ## Quick reference
//! - **Producers**: `Subscriptions::handler` (bus registration path) and
//!   `HandlerBinding::bind` (standalone construction).
//! - **Consumers**: `ObserverRegistry` stores bindings; `EventBus` and
//!   `AsyncEventBus` workers call `deliver`.

mod binding;
mod listener;

pub use binding::{HandlerBinding, HandlerId, ListenerId};
pub use listener::{Listener, Subscriptions};
