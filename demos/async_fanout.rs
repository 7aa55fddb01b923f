//! # Example: async_fanout
//!
//! Demonstrates the async bus: per-listener queues, overflow drops, and
//! graceful shutdown.
//!
//! Shows how to:
//! - Register listeners with different queue capacities.
//! - Observe overflow drops through a shared [`FailureTally`].
//! - Drain the bus with [`AsyncEventBus::shutdown`].
//!
//! ## Flow
//! ```text
//! publish(Tick) x32 ──► AsyncEventBus
//!     ├─► [queue cap 4]  ─► meter worker ─► slow handler (drops expected)
//!     └─► [queue cap 64] ─► log worker   ─► fast handler
//!
//! shutdown() ─► close queues ─► drain ─► report drop counts
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example async_fanout
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventvisor::{AsyncEventBus, FailureTally, FanoutConfig, Listener, Subscriptions};

struct Tick(u64);

/// Slow consumer with a tiny queue; some ticks will be dropped for it.
struct SlowMeter;

impl SlowMeter {
    fn on_tick(&self, tick: &Tick) {
        // simulate slow handling (handlers are sync; this holds only
        // this listener's worker back)
        std::thread::sleep(Duration::from_millis(20));
        println!("[meter] tick {}", tick.0);
    }
}

impl Listener for SlowMeter {
    fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
        subs.handler("on_tick", SlowMeter::on_tick);
    }

    fn label(&self) -> &str {
        "meter"
    }

    fn queue_capacity(&self) -> usize {
        4
    }
}

/// Fast consumer; sees every tick.
struct FastLog;

impl FastLog {
    fn on_tick(&self, tick: &Tick) {
        println!("[log] tick {}", tick.0);
    }
}

impl Listener for FastLog {
    fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
        subs.handler("on_tick", FastLog::on_tick);
    }

    fn label(&self) -> &str {
        "log"
    }

    fn queue_capacity(&self) -> usize {
        64
    }
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tally = FailureTally::new();
    let bus = AsyncEventBus::new(FanoutConfig {
        grace: Duration::from_secs(2),
    })
    .with_sink(Arc::new(tally.clone()));

    bus.register(&Arc::new(SlowMeter))?;
    bus.register(&Arc::new(FastLog))?;

    for n in 0..32 {
        bus.publish(Tick(n));
    }

    bus.shutdown().await?;

    println!("\nmeter dropped {} ticks", tally.drops_for("meter"));
    println!("log dropped {} ticks", tally.drops_for("log"));
    Ok(())
}
