//! # Example: custom_sink
//!
//! Demonstrates how to build and attach a custom report sink.
//!
//! Shows how to:
//! - Implement the [`ReportSink`] trait.
//! - Inspect [`HandlerInvocationError`] for contained failures.
//! - Wire the sink into [`EventBus::with_sink`].
//!
//! ## Flow
//! ```text
//! publish(&OrderPlaced) ──► EventBus
//!     ├─► billing.on_order()   (ok)
//!     ├─► fraud.on_order()     (panics on order #2)
//!     │        └─► contained ──► ConsoleSink::invocation_failed()
//!     └─► publish returns normally either way
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_sink
//! ```

use std::sync::Arc;

use eventvisor::{
    DropReason, EventBus, HandlerInvocationError, InvalidBindingError, Listener, ReportSink,
    Subscriptions,
};

struct OrderPlaced {
    id: u64,
    total_cents: u64,
}

/// A simple console sink that prints contained failures.
/// In real life, you could export metrics, ship logs, or trigger alerts.
struct ConsoleSink;

impl ReportSink for ConsoleSink {
    fn invocation_failed(&self, error: &HandlerInvocationError) {
        println!(
            "[sink] contained: listener={} handler={} kind={}",
            error.listener(),
            error.handler(),
            error.as_label()
        );
    }

    fn event_dropped(&self, listener: &str, reason: DropReason) {
        println!("[sink] dropped: listener={listener} reason={reason}");
    }
}

struct Billing;

impl Billing {
    fn on_order(&self, order: &OrderPlaced) {
        println!(
            "[billing] invoicing order #{} ({} cents)",
            order.id, order.total_cents
        );
    }
}

impl Listener for Billing {
    fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
        subs.handler("on_order", Billing::on_order);
    }

    fn label(&self) -> &str {
        "billing"
    }
}

/// Panics on large orders, on purpose (to demonstrate containment).
struct Fraud;

impl Fraud {
    fn on_order(&self, order: &OrderPlaced) {
        if order.total_cents > 10_000 {
            panic!("suspicious order #{}", order.id);
        }
        println!("[fraud] order #{} looks fine", order.id);
    }
}

impl Listener for Fraud {
    fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
        subs.handler("on_order", Fraud::on_order);
    }

    fn label(&self) -> &str {
        "fraud"
    }
}

fn main() -> Result<(), InvalidBindingError> {
    // keep the demo output readable; the sink still reports the containment
    std::panic::set_hook(Box::new(|_| {}));

    let bus = EventBus::new().with_sink(Arc::new(ConsoleSink));

    bus.register(&Arc::new(Billing))?;
    bus.register(&Arc::new(Fraud))?;

    bus.publish(&OrderPlaced {
        id: 1,
        total_cents: 4_500,
    });
    bus.publish(&OrderPlaced {
        id: 2,
        total_cents: 95_000,
    });

    println!("done: publish survived the panic");
    Ok(())
}
