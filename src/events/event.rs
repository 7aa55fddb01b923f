//! # Event vocabulary for the dispatch pipeline.
//!
//! Anything `'static + Send + Sync` can be published: the [`Event`] trait is
//! implemented for every such type by a blanket impl, so event types are plain
//! user structs (or even `String` / integers in tests) with no registration
//! ceremony.
//!
//! The trait gives the pipeline a uniform erased view:
//! - [`Event::as_any`] is the erasure seam a binding downcasts through to
//!   recover the concrete type its handler declared;
//! - [`Event::event_type`] is the human-readable type label used in
//!   failure reports.
//!
//! ## Matching rules
//! Handlers subscribe to exactly one concrete event type. A published event
//! reaches a handler only when their [`TypeId`](std::any::TypeId)s are equal;
//! there is no subtype or "assignable from" relation.
//!
//! ## Example
//! ```rust
//! use eventvisor::Event;
//!
//! struct Tick {
//!     n: u64,
//! }
//!
//! let tick = Tick { n: 3 };
//! assert!(tick.event_type().ends_with("Tick"));
//! assert_eq!(tick.as_any().downcast_ref::<Tick>().map(|t| t.n), Some(3));
//! ```

use std::any::{Any, type_name};

/// Erased view of a publishable event.
///
/// Implemented for every `'static + Send + Sync` type via a blanket impl;
/// do not implement it manually.
///
/// ### Note
/// Always go through [`Event::as_any`] to obtain a [`TypeId`](std::any::TypeId):
/// `as_any` dispatches to the concrete type, while `type_id` taken directly on
/// a `&dyn Event` describes the trait object itself. The same holds one level
/// up: `Arc<dyn Event>` satisfies the blanket impl too, so `as_any` must be
/// called through `as_ref()` there, never on the `Arc` itself.
pub trait Event: Any + Send + Sync {
    /// Returns the erased form used for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Returns the concrete type name, for logs and failure reports.
    fn event_type(&self) -> &'static str;
}

impl<T: Any + Send + Sync> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn event_type(&self) -> &'static str {
        type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;
    use std::sync::Arc;

    struct Tick {
        n: u64,
    }

    #[test]
    fn test_blanket_impl_covers_plain_structs() {
        let tick = Tick { n: 7 };

        assert_eq!(tick.as_any().downcast_ref::<Tick>().map(|t| t.n), Some(7));
        assert!(tick.event_type().ends_with("Tick"));
    }

    #[test]
    fn test_type_id_comes_from_the_event_not_the_wrapper() {
        let event: Arc<dyn Event> = Arc::new(Tick { n: 1 });

        assert_eq!(event.as_ref().as_any().type_id(), TypeId::of::<Tick>());
        // the wrapper satisfies the blanket impl itself
        assert_ne!(event.as_any().type_id(), TypeId::of::<Tick>());
    }
}
