//! # Handler bindings: the invocation unit of dispatch.
//!
//! A [`HandlerBinding`] pairs one listener instance with one of its
//! one-argument handlers, resolved into a directly callable form. Every
//! registry and bus in this crate is, in the end, a collection of these.
//!
//! ## Construction and delivery
//! ```text
//!  Arc<L> ── downgrade ──► Weak<L>
//!                            │
//!                    bind(name, L::handler)     upgraded exactly once;
//!                            │                  binding owns Arc<L> from here
//!                            ▼
//!                      HandlerBinding ── deliver(&event) ──► handler(&L, &E)
//!                            │
//!                            └── panic / type mismatch ──► ReportSink
//! ```
//!
//! ## Rules
//! - The target is checked **once**, at [`HandlerBinding::bind`]: a dead
//!   `Weak` fails construction with
//!   [`InvalidBindingError::ListenerGone`]. A successfully constructed
//!   binding owns a strong reference and can never observe an absent
//!   target again.
//! - Handler visibility is resolved where the handler is **named**, not
//!   where the binding is used: binding a private method from a scope
//!   that can see it yields a binding that delivers from anywhere.
//! - [`HandlerBinding::deliver`] invokes the handler at most once per
//!   call and never propagates failures; panics and event-type
//!   mismatches go to the binding's [`ReportSink`].
//! - Identity ([`HandlerBinding::listener`], [`HandlerBinding::handler`])
//!   is fixed at construction.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::HandlerBinding;
//!
//! struct Greeter;
//!
//! impl Greeter {
//!     fn on_greeting(&self, name: &String) {
//!         println!("hello, {name}");
//!     }
//! }
//!
//! let greeter = Arc::new(Greeter);
//! let binding = HandlerBinding::bind(&Arc::downgrade(&greeter), "on_greeting", Greeter::on_greeting)?;
//!
//! binding.deliver(&"world".to_string()); // invokes Greeter::on_greeting
//! binding.deliver(&42u32);               // wrong type: reported, not raised
//! # Ok::<(), eventvisor::InvalidBindingError>(())
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use crate::error::{HandlerInvocationError, InvalidBindingError};
use crate::events::Event;
use crate::sinks::{ReportSink, StderrSink};

/// Identifier of a bound handler: its declared name plus the type name of
/// the event it accepts.
///
/// Displays as `name(event)`, e.g. `on_tick(demo::Tick)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    /// Handler name as declared at bind time.
    pub name: &'static str,
    /// Type name of the accepted event.
    pub event: &'static str,
}

impl HandlerId {
    /// Creates an identifier from a handler name and an event type name.
    pub fn new(name: &'static str, event: &'static str) -> Self {
        Self { name, event }
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.event)
    }
}

/// Identity of a listener instance, derived from its allocation.
///
/// Two `Arc` clones of the same listener yield the same id; two separate
/// instances of the same listener type do not. Registries use this to
/// group and remove bindings without naming the listener's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

impl ListenerId {
    /// Returns the identity of the instance behind `listener`.
    pub fn of<L>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }
}

/// Erased invocation: `true` means the handler ran, `false` means the
/// event was not of the accepted type.
type Invoke = Box<dyn Fn(&dyn Event) -> bool + Send + Sync>;

/// One listener instance bound to one of its one-argument handlers.
///
/// Immutable after construction and `Send + Sync`: a binding can be
/// shared freely between dispatch threads and invoked concurrently.
pub struct HandlerBinding {
    /// Listener label used in failure reports.
    listener: Arc<str>,
    /// Identity of the listener instance.
    listener_id: ListenerId,
    /// Identity of the bound handler.
    handler: HandlerId,
    /// `TypeId` of the accepted event, for registry indexing.
    event: TypeId,
    /// Where contained delivery failures are reported.
    sink: Arc<dyn ReportSink>,
    /// The resolved call; owns the strong reference to the listener.
    invoke: Invoke,
}

impl HandlerBinding {
    /// Binds `handler` of the listener behind `target` under `name`.
    ///
    /// The weak reference is upgraded here, exactly once: if the listener
    /// is already gone this fails with
    /// [`InvalidBindingError::ListenerGone`], and no binding exists.
    /// On success the binding holds its own strong reference, so the
    /// listener outlives every binding onto it.
    ///
    /// `name` is diagnostic identity only; nothing checks that it matches
    /// the Rust name of `handler`.
    pub fn bind<L, E, F>(
        target: &Weak<L>,
        name: &'static str,
        handler: F,
    ) -> Result<Self, InvalidBindingError>
    where
        L: Send + Sync + 'static,
        E: Event,
        F: Fn(&L, &E) + Send + Sync + 'static,
    {
        let id = HandlerId::new(name, type_name::<E>());
        let target = target.upgrade().ok_or(InvalidBindingError::ListenerGone {
            listener: type_name::<L>(),
            handler: id,
        })?;
        let listener_id = ListenerId::of(&target);

        let invoke: Invoke = Box::new(move |event: &dyn Event| {
            match event.as_any().downcast_ref::<E>() {
                Some(ev) => {
                    handler(&target, ev);
                    true
                }
                None => false,
            }
        });

        Ok(Self {
            listener: Arc::from(type_name::<L>()),
            listener_id,
            handler: id,
            event: TypeId::of::<E>(),
            sink: Arc::new(StderrSink),
            invoke,
        })
    }

    /// Replaces the listener label used in failure reports.
    ///
    /// Defaults to the listener's type name.
    #[inline]
    pub fn with_listener_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.listener = label.into();
        self
    }

    /// Replaces the sink that receives contained delivery failures.
    ///
    /// Defaults to [`StderrSink`].
    #[inline]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Delivers `event` to the bound handler.
    ///
    /// The handler is invoked at most once. Failures are contained: a
    /// panicking handler or an event of the wrong type is reported to the
    /// binding's sink and `deliver` returns normally either way, so one
    /// bad handler cannot break the dispatch loop around it.
    ///
    /// A panic caught here may have left state shared with the handler
    /// half-updated; the report names the listener and handler so such
    /// cases can be found.
    pub fn deliver(&self, event: &dyn Event) {
        if let Err(err) = self.try_deliver(event) {
            self.sink.invocation_failed(&err);
        }
    }

    fn try_deliver(&self, event: &dyn Event) -> Result<(), HandlerInvocationError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.invoke)(event))) {
            Ok(true) => Ok(()),
            Ok(false) => Err(HandlerInvocationError::EventMismatch {
                listener: Arc::clone(&self.listener),
                handler: self.handler,
                delivered: event.event_type(),
            }),
            Err(payload) => Err(HandlerInvocationError::HandlerPanicked {
                listener: Arc::clone(&self.listener),
                handler: self.handler,
                panic: panic_message(payload),
            }),
        }
    }

    /// Returns the listener label used in failure reports.
    #[inline]
    pub fn listener(&self) -> &str {
        &self.listener
    }

    /// Returns the identity of the listener instance this binding holds.
    #[inline]
    pub fn listener_id(&self) -> ListenerId {
        self.listener_id
    }

    /// Returns the identity of the bound handler.
    #[inline]
    pub fn handler(&self) -> HandlerId {
        self.handler
    }

    /// Returns the `TypeId` of the event type this handler accepts.
    #[inline]
    pub fn event_type_id(&self) -> TypeId {
        self.event
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("listener", &self.listener)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

/// Best-effort rendering of a panic payload (`&str` and `String` payloads
/// cover `panic!` with a message; anything else is opaque).
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Witness {
        seen: Mutex<Vec<String>>,
    }

    impl Witness {
        fn record(&self, msg: &String) {
            self.seen.lock().unwrap().push(msg.clone());
        }
    }

    #[derive(Default)]
    struct CapturingSink {
        reports: Mutex<Vec<(String, String)>>,
    }

    impl CapturingSink {
        fn labels(&self) -> Vec<String> {
            self.reports
                .lock()
                .unwrap()
                .iter()
                .map(|(label, _)| label.clone())
                .collect()
        }

        fn messages(&self) -> Vec<String> {
            self.reports
                .lock()
                .unwrap()
                .iter()
                .map(|(_, msg)| msg.clone())
                .collect()
        }
    }

    impl ReportSink for CapturingSink {
        fn invocation_failed(&self, error: &HandlerInvocationError) {
            self.reports
                .lock()
                .unwrap()
                .push((error.as_label().to_string(), error.to_string()));
        }
    }

    mod hidden {
        use super::*;

        pub(super) struct Quiet {
            pub(super) hits: AtomicU64,
        }

        impl Quiet {
            fn bump(&self, _tick: &u64) {
                self.hits.fetch_add(1, Ordering::Relaxed);
            }
        }

        // `bump` is private to this module; the binding is handed out anyway.
        pub(super) fn bind_bump(quiet: &Arc<Quiet>) -> HandlerBinding {
            HandlerBinding::bind(&Arc::downgrade(quiet), "bump", Quiet::bump).unwrap()
        }
    }

    #[test]
    fn test_deliver_invokes_handler_exactly_once() {
        let witness = Arc::new(Witness::default());
        let binding =
            HandlerBinding::bind(&Arc::downgrade(&witness), "record", Witness::record).unwrap();

        binding.deliver(&"hello".to_string());

        let seen = witness.seen.lock().unwrap().clone();
        assert_eq!(seen, ["hello"]);
    }

    #[test]
    fn test_binding_keeps_listener_alive() {
        let witness = Arc::new(Witness::default());
        let weak = Arc::downgrade(&witness);
        let binding = HandlerBinding::bind(&weak, "record", Witness::record).unwrap();

        drop(witness);
        assert!(weak.upgrade().is_some());

        binding.deliver(&"still here".to_string());
        let seen = weak.upgrade().unwrap().seen.lock().unwrap().clone();
        assert_eq!(seen, ["still here"]);

        drop(binding);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_bind_fails_when_listener_is_gone() {
        let witness = Arc::new(Witness::default());
        let weak = Arc::downgrade(&witness);
        drop(witness);

        let err = HandlerBinding::bind(&weak, "record", Witness::record).unwrap_err();
        assert_eq!(err.as_label(), "binding_listener_gone");
        assert!(matches!(
            err,
            InvalidBindingError::ListenerGone { listener, .. } if listener.contains("Witness")
        ));
    }

    #[test]
    fn test_panicking_handler_is_contained() {
        let witness = Arc::new(Witness::default());
        let sink = Arc::new(CapturingSink::default());
        let panicker = |_p: &Witness, _e: &String| panic!("boom");

        let binding = HandlerBinding::bind(&Arc::downgrade(&witness), "panicker", panicker)
            .unwrap()
            .with_sink(sink.clone());

        binding.deliver(&"hello".to_string());

        assert_eq!(sink.labels(), ["handler_panicked"]);
        assert!(sink.messages()[0].contains("boom"));
        assert!(sink.messages()[0].contains("panicker"));
    }

    #[test]
    fn test_bindings_on_one_target_fail_independently() {
        let witness = Arc::new(Witness::default());
        let sink = Arc::new(CapturingSink::default());
        let panicker = |_p: &Witness, _e: &String| panic!("first one down");

        let bad = HandlerBinding::bind(&Arc::downgrade(&witness), "panicker", panicker)
            .unwrap()
            .with_sink(sink.clone());
        let good = HandlerBinding::bind(&Arc::downgrade(&witness), "record", Witness::record)
            .unwrap()
            .with_sink(sink.clone());

        bad.deliver(&"event".to_string());
        good.deliver(&"event".to_string());
        bad.deliver(&"again".to_string());
        good.deliver(&"again".to_string());

        let seen = witness.seen.lock().unwrap().clone();
        assert_eq!(seen, ["event", "again"]);
        assert_eq!(sink.labels(), ["handler_panicked", "handler_panicked"]);
    }

    #[test]
    fn test_mismatched_event_is_reported_not_invoked() {
        let witness = Arc::new(Witness::default());
        let sink = Arc::new(CapturingSink::default());

        let binding = HandlerBinding::bind(&Arc::downgrade(&witness), "record", Witness::record)
            .unwrap()
            .with_sink(sink.clone());

        binding.deliver(&42u32);

        assert!(witness.seen.lock().unwrap().is_empty());
        assert_eq!(sink.labels(), ["handler_event_mismatch"]);
        assert!(sink.messages()[0].contains("u32"));
    }

    #[test]
    fn test_private_handler_stays_invocable() {
        let quiet = Arc::new(hidden::Quiet {
            hits: AtomicU64::new(0),
        });
        let binding = hidden::bind_bump(&quiet);

        binding.deliver(&1u64);
        binding.deliver(&2u64);

        assert_eq!(quiet.hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_identity_reflects_bind_arguments() {
        let witness = Arc::new(Witness::default());
        let binding = HandlerBinding::bind(&Arc::downgrade(&witness), "record", Witness::record)
            .unwrap()
            .with_listener_label("witness-1");

        assert_eq!(binding.listener(), "witness-1");
        assert_eq!(binding.handler().name, "record");
        assert!(binding.handler().event.contains("String"));
        assert_eq!(binding.event_type_id(), TypeId::of::<String>());
        assert_eq!(binding.listener_id(), ListenerId::of(&witness));
    }

    #[test]
    fn test_listener_id_tracks_instances_not_types() {
        let a = Arc::new(Witness::default());
        let b = Arc::new(Witness::default());

        assert_eq!(ListenerId::of(&a), ListenerId::of(&a.clone()));
        assert_ne!(ListenerId::of(&a), ListenerId::of(&b));
    }

    #[test]
    fn test_default_label_is_the_type_name() {
        let witness = Arc::new(Witness::default());
        let binding =
            HandlerBinding::bind(&Arc::downgrade(&witness), "record", Witness::record).unwrap();

        assert!(binding.listener().contains("Witness"));
    }
}
