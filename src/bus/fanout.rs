//! # AsyncEventBus: non-blocking fan-out over listener workers.
//!
//! [`AsyncEventBus`] gives every registered listener a bounded queue and a
//! dedicated worker task; `publish` enqueues and returns without awaiting
//! anyone's handlers.
//!
//! ## What it guarantees
//! - `publish(event)` returns immediately.
//! - Per-listener FIFO (queue order); within one event, a listener's
//!   handlers fire in declaration order.
//! - Panics inside handlers are contained by the bindings; a stuck
//!   handler stalls only its own listener's queue.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different listeners.
//! - No retries on queue overflow: the event is dropped for that listener
//!   and the drop is reported to the sink.
//!
//! ## Diagram
//! ```text
//!    publish(event)            (Arc-clone per listener)
//!        │
//!        ├───── try_send ────► [queue L1] ─► worker L1 ─► deliver()
//!        ├───── try_send ────► [queue L2] ─► worker L2 ─► deliver()
//!        └───── try_send ────► [queue LN] ─► worker LN ─► deliver()
//!
//!    shutdown()
//!        └── close queues ─► drain ─► await workers (grace) ─► force-cancel
//! ```
//!
//! ## Example
//! ```no_run
//! # use std::sync::Arc;
//! # use eventvisor::{AsyncEventBus, Listener, Subscriptions};
//! struct Tick(u64);
//!
//! struct Meter;
//!
//! impl Meter {
//!     fn on_tick(&self, _tick: &Tick) { /* update gauges... */ }
//! }
//!
//! impl Listener for Meter {
//!     fn subscriptions(&self, subs: &mut Subscriptions<Self>) {
//!         subs.handler("on_tick", Meter::on_tick);
//!     }
//! }
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let bus = AsyncEventBus::default();
//! bus.register(&Arc::new(Meter))?;
//!
//! bus.publish(Tick(1));
//! bus.shutdown().await?; // drains queues before returning
//! # Ok(())
//! # }
//! ```

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bindings::{HandlerBinding, Listener, ListenerId, Subscriptions};
use crate::config::FanoutConfig;
use crate::error::{InvalidBindingError, ShutdownError};
use crate::events::Event;
use crate::sinks::{DropReason, ReportSink, StderrSink};

/// Per-listener queue with routing metadata.
struct ListenerChannel {
    label: Arc<str>,
    /// Event types this listener subscribed to; anything else skips the queue.
    accepts: HashSet<TypeId>,
    /// Binding count, reported back from `unregister`.
    bindings: usize,
    tx: mpsc::Sender<Arc<dyn Event>>,
}

/// A spawned worker and the label it drains for.
struct Worker {
    label: Arc<str>,
    handle: JoinHandle<()>,
}

type Channels = HashMap<ListenerId, ListenerChannel>;

/// Fan-out bus with per-listener bounded queues and worker tasks.
///
/// Requires a Tokio runtime: `register` spawns the listener's worker.
pub struct AsyncEventBus {
    cfg: FanoutConfig,
    sink: Arc<dyn ReportSink>,
    cancel: CancellationToken,
    channels: RwLock<Channels>,
    workers: Mutex<Vec<Worker>>,
}

impl AsyncEventBus {
    /// Creates an empty bus reporting to [`StderrSink`].
    pub fn new(cfg: FanoutConfig) -> Self {
        Self {
            cfg,
            sink: Arc::new(StderrSink),
            cancel: CancellationToken::new(),
            channels: RwLock::new(HashMap::new()),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the sink applied to bindings registered from here on and
    /// to drop reports.
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Registers a listener: collects its handler declarations, opens its
    /// queue (capacity per [`Listener::queue_capacity`], min 1) and spawns
    /// its worker.
    ///
    /// Returns the number of bindings added. Registering an instance that
    /// is already present is a no-op returning `Ok(0)`; a listener
    /// declaring no handlers is not retained. If any declaration fails to
    /// bind, nothing is registered and no worker is spawned.
    pub fn register<L: Listener>(&self, listener: &Arc<L>) -> Result<usize, InvalidBindingError> {
        let id = ListenerId::of(listener);
        if self.channels_read().contains_key(&id) {
            return Ok(0);
        }

        let mut subs = Subscriptions::new(listener).with_sink(Arc::clone(&self.sink));
        listener.subscriptions(&mut subs);
        let bindings = subs.into_bindings()?;
        if bindings.is_empty() {
            return Ok(0);
        }

        let mut routes: HashMap<TypeId, Vec<HandlerBinding>> = HashMap::new();
        for binding in bindings {
            routes
                .entry(binding.event_type_id())
                .or_default()
                .push(binding);
        }
        let accepts: HashSet<TypeId> = routes.keys().copied().collect();
        let added: usize = routes.values().map(Vec::len).sum();

        let label: Arc<str> = Arc::from(listener.label());
        let capacity = listener.queue_capacity().max(1);
        let (tx, mut rx) = mpsc::channel::<Arc<dyn Event>>(capacity);

        {
            let mut channels = self.channels_write();
            // lost the race to a concurrent register of the same instance
            if channels.contains_key(&id) {
                return Ok(0);
            }
            channels.insert(
                id,
                ListenerChannel {
                    label: Arc::clone(&label),
                    accepts,
                    bindings: added,
                    tx,
                },
            );
        }

        let token = self.cancel.child_token();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Some(event) => {
                            // route by the erased event's type: as_any on the Arc
                            // itself would describe Arc<dyn Event>, not the event
                            let type_id = event.as_ref().as_any().type_id();
                            if let Some(set) = routes.get(&type_id) {
                                for binding in set {
                                    binding.deliver(event.as_ref());
                                }
                            }
                        }
                        None => break,
                    }
                }
            }
        });
        self.workers_lock().push(Worker { label, handle });

        Ok(added)
    }

    /// Removes the listener and closes its queue.
    ///
    /// Events already queued are still drained by its worker, which then
    /// exits; [`shutdown`](Self::shutdown) still awaits it. Handles of
    /// workers that have already exited are reclaimed here. Returns the
    /// number of bindings removed (0 if the listener was not registered).
    pub fn unregister<L: Listener>(&self, listener: &Arc<L>) -> usize {
        let removed = match self.channels_write().remove(&ListenerId::of(listener)) {
            Some(channel) => channel.bindings,
            None => 0,
        };
        self.workers_lock().retain(|w| !w.handle.is_finished());
        removed
    }

    /// Fans `event` out to every listener subscribed to its exact type
    /// (non-blocking).
    ///
    /// If a listener's queue is **full** or **closed**, the event is
    /// dropped for that listener and the drop is reported to the sink.
    /// Reports are issued after the internal lock is released, so a sink
    /// may call back into the bus (for example to unregister the listener
    /// it was told about).
    pub fn publish<E: Event>(&self, event: E) {
        let event: Arc<dyn Event> = Arc::new(event);
        let type_id = TypeId::of::<E>();

        let mut dropped: Vec<(Arc<str>, DropReason)> = Vec::new();
        {
            let channels = self.channels_read();
            for channel in channels.values() {
                if !channel.accepts.contains(&type_id) {
                    continue;
                }
                match channel.tx.try_send(Arc::clone(&event)) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        dropped.push((Arc::clone(&channel.label), DropReason::QueueFull));
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        dropped.push((Arc::clone(&channel.label), DropReason::WorkerClosed));
                    }
                }
            }
        }

        for (label, reason) in dropped {
            self.sink.event_dropped(&label, reason);
        }
    }

    /// Graceful shutdown: close all queues, let workers drain, await them
    /// up to the configured grace.
    ///
    /// With `grace = 0` this waits indefinitely. Otherwise, workers still
    /// running at the deadline are force-cancelled and named in
    /// [`ShutdownError::GraceExceeded`]; a worker stuck inside a handler
    /// only observes the cancel once that handler returns.
    pub async fn shutdown(self) -> Result<(), ShutdownError> {
        self.channels_write().clear();
        let mut workers = {
            let mut guard = self.workers_lock();
            mem::take(&mut *guard)
        };

        match self.cfg.grace_window() {
            None => {
                for worker in &mut workers {
                    let _ = (&mut worker.handle).await;
                }
                Ok(())
            }
            Some(grace) => {
                let drained = async {
                    for worker in &mut workers {
                        let _ = (&mut worker.handle).await;
                    }
                };
                if tokio::time::timeout(grace, drained).await.is_ok() {
                    return Ok(());
                }

                self.cancel.cancel();
                let stuck: Vec<String> = workers
                    .iter()
                    .filter(|w| !w.handle.is_finished())
                    .map(|w| w.label.to_string())
                    .collect();
                Err(ShutdownError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels_read().len()
    }

    /// True if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels_read().is_empty()
    }

    /// Returns the sorted labels of registered listeners.
    pub fn listeners(&self) -> Vec<String> {
        let channels = self.channels_read();
        let mut labels: Vec<String> = channels.values().map(|c| c.label.to_string()).collect();
        labels.sort_unstable();
        labels
    }

    fn channels_read(&self) -> RwLockReadGuard<'_, Channels> {
        self.channels.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn channels_write(&self) -> RwLockWriteGuard<'_, Channels> {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn workers_lock(&self) -> MutexGuard<'_, Vec<Worker>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for AsyncEventBus {
    fn default() -> Self {
        Self::new(FanoutConfig::default())
    }
}
