//! Retry Combinator Module
//!
//! Wraps a fallible async operation with bounded retries and exponential
//! backoff. Callers get back a plain `Result` rather than an exception-style
//! control flow.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

// == Backoff Policy ==
/// Retry schedule: total attempt budget plus the delay curve between
/// attempts.
#[derive(Debug, Clone)]
pub struct Backoff {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each attempt after that
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_interval: Duration,
}

impl Backoff {
    // == Delay Before ==
    /// Delay inserted before attempt `attempt` (1-based; the first attempt
    /// has no delay): `base_delay * 2^(attempt - 2)`, capped at
    /// `max_interval`.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(2).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << doublings);
        delay.min(self.max_interval)
    }
}

// == Attempt Error ==
/// How one attempt failed, deciding whether another attempt is worthwhile.
#[derive(Debug)]
pub enum AttemptError<E> {
    /// Transient failure (network, 5xx, timeout); retried until the
    /// attempt budget runs out
    Transient(E),
    /// Retrying cannot help; surfaced immediately without consuming the
    /// remaining attempts
    Fatal(E),
}

// == Retry With Backoff ==
/// Runs `op` until it succeeds, fails fatally, or exhausts
/// `policy.max_attempts`. Only the final attempt's error is returned.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &Backoff, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, AttemptError<E>>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(e)) => return Err(e),
            Err(AttemptError::Transient(e)) => {
                if attempt >= max_attempts {
                    return Err(e);
                }
                let delay = policy.delay_before(attempt + 1);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "attempt failed, backing off: {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
