//! Bounded polling with an injectable clock.
//!
//! Polling is the only repeated-attempt mechanism in Switchyard: it waits for a
//! condition to converge (e.g., a deleted resource disappearing) at a fixed
//! interval up to a fixed deadline. Errors from the check itself are never
//! retried.
//!
//! # Example
//!
//! ```ignore
//! use switchyard_common::{poll_until, PollPolicy, SystemClock};
//!
//! poll_until(&SystemClock, &PollPolicy::default(), || async {
//!     Ok::<_, MyError>(store.get().await?.is_none())
//! })
//! .await?;
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tracing::trace;

/// Default interval between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Default upper bound on total wait time
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Interval and deadline for a bounded poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    /// Time between checks
    pub interval: Duration,
    /// Maximum total time to keep checking
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

impl PollPolicy {
    /// Create a policy with the given interval and timeout
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

/// Source of time for polling loops.
///
/// Production code uses [`SystemClock`]; tests substitute a clock that
/// advances instantly on `sleep`.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by tokio timers
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Why a poll ended without the condition being met.
#[derive(Debug, Error, PartialEq)]
pub enum PollError<E> {
    /// The deadline passed while the condition was still false
    #[error("condition not met after {elapsed:?} ({attempts} checks)")]
    Timeout {
        /// Time spent polling
        elapsed: Duration,
        /// Number of checks performed
        attempts: u32,
    },

    /// The check itself failed; polling stopped immediately
    #[error("{0}")]
    Check(E),
}

/// Poll `check` until it returns `Ok(true)` or the policy's timeout elapses.
///
/// The first check runs immediately. A check error aborts the poll and is
/// returned as [`PollError::Check`]. Returns the number of checks performed
/// on success.
pub async fn poll_until<C, F, Fut, E>(
    clock: &C,
    policy: &PollPolicy,
    mut check: F,
) -> Result<u32, PollError<E>>
where
    C: Clock + ?Sized,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let start = clock.now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if check().await.map_err(PollError::Check)? {
            return Ok(attempts);
        }

        let elapsed = clock.now().saturating_duration_since(start);
        if elapsed >= policy.timeout {
            return Err(PollError::Timeout { elapsed, attempts });
        }

        trace!(attempt = attempts, "Polling condition not yet met");
        clock.sleep(policy.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Clock that jumps forward on every sleep
    struct ManualClock {
        now: Mutex<Instant>,
        sleeps: AtomicU32,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Mutex::new(Instant::now()),
                sleeps: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.fetch_add(1, Ordering::SeqCst);
            *self.now.lock().unwrap() += duration;
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy::new(Duration::from_secs(2), Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_condition_already_met_does_not_sleep() {
        let clock = ManualClock::new();
        let result: Result<u32, PollError<&str>> =
            poll_until(&clock, &policy(), || async { Ok(true) }).await;
        assert_eq!(result, Ok(1));
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_condition_met_after_several_polls() {
        let clock = ManualClock::new();
        let count = AtomicU32::new(0);

        let result: Result<u32, PollError<&str>> = poll_until(&clock, &policy(), || {
            let n = count.fetch_add(1, Ordering::SeqCst);
            async move { Ok(n >= 3) }
        })
        .await;

        assert_eq!(result, Ok(4));
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_times_out_at_deadline() {
        let clock = ManualClock::new();

        let result: Result<u32, PollError<&str>> =
            poll_until(&clock, &policy(), || async { Ok(false) }).await;

        // checks at t=0,2,4,6,8,10 then the 10s deadline is reached
        assert_eq!(
            result,
            Err(PollError::Timeout {
                elapsed: Duration::from_secs(10),
                attempts: 6,
            })
        );
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_check_error_stops_immediately() {
        let clock = ManualClock::new();
        let count = AtomicU32::new(0);

        let result: Result<u32, PollError<&str>> = poll_until(&clock, &policy(), || {
            count.fetch_add(1, Ordering::SeqCst);
            async { Err("api unavailable") }
        })
        .await;

        assert_eq!(result, Err(PollError::Check("api unavailable")));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(clock.sleeps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.timeout, Duration::from_secs(300));
    }
}
