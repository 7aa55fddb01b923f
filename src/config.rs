//! # Async fan-out configuration.
//!
//! Provides [`FanoutConfig`] settings for the
//! [`AsyncEventBus`](crate::AsyncEventBus) worker pool and its shutdown.
//!
//! ## Sentinel values
//! - `grace = 0s` → shutdown waits for workers indefinitely (no deadline)

use std::time::Duration;

/// Configuration for the async fan-out.
///
/// Per-listener queue capacity is not configured here; each listener
/// declares its own via
/// [`Listener::queue_capacity`](crate::Listener::queue_capacity).
///
/// ## Field semantics
/// - `grace`: Maximum wait for workers to drain on shutdown
///   (`0s` = wait indefinitely)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to
/// avoid sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct FanoutConfig {
    /// Maximum time to wait for listener workers to drain on shutdown.
    ///
    /// When `shutdown` is called:
    /// - Listener queues are closed; workers drain what they already hold
    /// - The bus waits up to `grace` for every worker to exit
    /// - If the deadline passes, workers are force-cancelled and
    ///   `ShutdownError::GraceExceeded` names the stuck listeners
    pub grace: Duration,
}

impl FanoutConfig {
    /// Returns the shutdown deadline as an `Option`.
    ///
    /// - `None` → wait indefinitely
    /// - `Some(d)` → force-cancel after `d`
    #[inline]
    pub fn grace_window(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for FanoutConfig {
    /// Default configuration:
    ///
    /// - `grace = 5s` (drain window before force-cancelling workers)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_grace_means_no_deadline() {
        let cfg = FanoutConfig {
            grace: Duration::ZERO,
        };
        assert_eq!(cfg.grace_window(), None);
    }

    #[test]
    fn test_nonzero_grace_is_the_deadline() {
        let cfg = FanoutConfig::default();
        assert_eq!(cfg.grace_window(), Some(Duration::from_secs(5)));
    }
}
