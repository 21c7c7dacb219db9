//! Retry strategies and predicates for handling transient failures.
//!
//! [`RetryPolicy`] is the combinator the client wraps around every request:
//! a [`RetryStrategy`] decides how long to wait and when to give up, and a
//! [`RetryPredicate`] decides which errors are worth another attempt.

use crate::{Error, Result};
use http::StatusCode;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Total attempts made by the default policy, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: usize = 6;

/// Defines when and how to retry failed requests.
///
/// # Examples
///
/// ```
/// use radar_mapping_api::RetryStrategy;
/// use std::time::Duration;
///
/// // The client default: 1s, 2s, 4s, 8s, 16s, then give up.
/// let radar = RetryStrategy::default();
/// assert_eq!(radar.delay_for_attempt(3), Some(Duration::from_secs(4)));
///
/// // Fixed delay, handy for tests.
/// let linear = RetryStrategy::Linear {
///     delay: Duration::from_millis(5),
///     max_retries: 2,
/// };
/// assert_eq!(linear.delay_for_attempt(3), None);
/// ```
#[derive(Debug, Clone)]
pub enum RetryStrategy {
    /// Do not retry failed requests.
    None,

    /// Retry with exponentially increasing delays.
    ///
    /// Each retry waits for `initial_delay * 2^(attempt - 1)` (capped at `max_delay`).
    ExponentialBackoff {
        /// The delay before the first retry.
        initial_delay: Duration,
        /// The maximum delay between retries.
        max_delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
        /// Whether to scale each delay by a random factor in `0.5..=1.0`.
        jitter: bool,
    },

    /// Retry with a fixed delay between attempts.
    Linear {
        /// The delay between retry attempts.
        delay: Duration,
        /// The maximum number of retry attempts.
        max_retries: usize,
    },

    /// Custom retry logic.
    ///
    /// The function takes the retry number (starting from 1) and returns
    /// `Some(delay)` to retry after the delay, or `None` to stop.
    Custom {
        /// Function that determines retry delay.
        delay_fn: fn(attempt: usize) -> Option<Duration>,
    },
}

impl Default for RetryStrategy {
    /// Exponential backoff starting at one second, doubling, capped at 32
    /// seconds, for at most [`DEFAULT_MAX_ATTEMPTS`] attempts in total.
    fn default() -> Self {
        RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
            max_retries: DEFAULT_MAX_ATTEMPTS - 1,
            jitter: false,
        }
    }
}

impl RetryStrategy {
    /// Returns the delay before the given retry attempt, or `None` if retries are exhausted.
    ///
    /// `attempt` is 1-indexed: 1 is the first retry, made after the initial
    /// request failed.
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        match self {
            RetryStrategy::None => None,
            RetryStrategy::ExponentialBackoff {
                initial_delay,
                max_delay,
                max_retries,
                jitter,
            } => {
                if attempt > *max_retries {
                    return None;
                }

                let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
                let multiplier = 2u32.saturating_pow(exponent);
                let delay = initial_delay.saturating_mul(multiplier).min(*max_delay);

                if *jitter {
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    Some(delay.mul_f64(jitter_factor))
                } else {
                    Some(delay)
                }
            }
            RetryStrategy::Linear { delay, max_retries } => {
                if attempt > *max_retries {
                    None
                } else {
                    Some(*delay)
                }
            }
            RetryStrategy::Custom { delay_fn } => delay_fn(attempt),
        }
    }

    /// Returns the maximum number of retries, if known up front.
    pub fn max_retries(&self) -> Option<usize> {
        match self {
            RetryStrategy::None => Some(0),
            RetryStrategy::ExponentialBackoff { max_retries, .. } => Some(*max_retries),
            RetryStrategy::Linear { max_retries, .. } => Some(*max_retries),
            RetryStrategy::Custom { .. } => None,
        }
    }
}

/// Decides whether a failed request should be retried.
///
/// Any `Fn(&Error, usize) -> bool` closure is a predicate too.
///
/// # Examples
///
/// ```
/// use radar_mapping_api::{Error, RetryPredicate};
///
/// struct RetryOnRateLimit;
///
/// impl RetryPredicate for RetryOnRateLimit {
///     fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
///         error.status().is_some_and(|s| s.as_u16() == 429)
///     }
/// }
/// ```
pub trait RetryPredicate: Send + Sync {
    /// Returns `true` if the request should be retried after `error`.
    ///
    /// `attempt` is the 1-indexed number of the attempt that just failed.
    fn should_retry(&self, error: &Error, attempt: usize) -> bool;
}

impl<F> RetryPredicate for F
where
    F: Fn(&Error, usize) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self(error, attempt)
    }
}

/// The default predicate: retry every transport or HTTP failure except
/// `402 Payment Required`.
///
/// Client errors such as 400 and 404 are retried as well. Use
/// [`RetryOnTransient`] for a policy that only retries failures likely to
/// go away on their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryUnlessQuotaExceeded;

impl RetryPredicate for RetryUnlessQuotaExceeded {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        error.is_transport() && !error.is_quota_exceeded()
    }
}

/// Retry network errors, timeouts, `429 Too Many Requests` and 5xx
/// responses. Never retries a quota-exceeded 402.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryOnTransient;

impl RetryPredicate for RetryOnTransient {
    fn should_retry(&self, error: &Error, _attempt: usize) -> bool {
        match error {
            Error::Network(_) | Error::Timeout => true,
            Error::HttpError { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// Combine multiple retry predicates with OR logic.
///
/// Retries if ANY of the predicates return `true`.
///
/// # Examples
///
/// ```
/// use radar_mapping_api::retry::{OrPredicate, RetryOnTransient};
/// use radar_mapping_api::Error;
///
/// // Transient failures, plus 404s while a freshly created place propagates.
/// let predicate = OrPredicate::new(vec![
///     Box::new(RetryOnTransient),
///     Box::new(|e: &Error, attempt: usize| {
///         attempt < 3 && e.status().is_some_and(|s| s.as_u16() == 404)
///     }),
/// ]);
/// ```
pub struct OrPredicate {
    predicates: Vec<Box<dyn RetryPredicate>>,
}

impl OrPredicate {
    /// Creates a new `OrPredicate` from a list of predicates.
    pub fn new(predicates: Vec<Box<dyn RetryPredicate>>) -> Self {
        Self { predicates }
    }
}

impl RetryPredicate for OrPredicate {
    fn should_retry(&self, error: &Error, attempt: usize) -> bool {
        self.predicates
            .iter()
            .any(|p| p.should_retry(error, attempt))
    }
}

/// A retry loop: a backoff schedule plus a predicate.
///
/// When attempts run out, the last error is returned as-is so callers can
/// still match on its kind.
pub struct RetryPolicy {
    strategy: RetryStrategy,
    predicate: Box<dyn RetryPredicate>,
}

impl RetryPolicy {
    /// Creates a policy from a strategy and a predicate.
    pub fn new(strategy: RetryStrategy, predicate: Box<dyn RetryPredicate>) -> Self {
        Self {
            strategy,
            predicate,
        }
    }

    /// The backoff schedule of this policy.
    pub fn strategy(&self) -> &RetryStrategy {
        &self.strategy
    }

    /// Runs `op` until it succeeds, fails with an error the predicate
    /// rejects, or the strategy runs out of retries.
    ///
    /// `op` receives the 1-indexed attempt number.
    ///
    /// # Examples
    ///
    /// ```
    /// use radar_mapping_api::{Error, RetryPolicy, RetryStrategy};
    /// use radar_mapping_api::retry::RetryUnlessQuotaExceeded;
    /// use std::time::Duration;
    ///
    /// # async fn example() {
    /// let policy = RetryPolicy::new(
    ///     RetryStrategy::Linear { delay: Duration::from_millis(1), max_retries: 2 },
    ///     Box::new(RetryUnlessQuotaExceeded),
    /// );
    ///
    /// let result: Result<(), Error> = policy.run(|_attempt| async { Err(Error::Timeout) }).await;
    /// assert!(matches!(result, Err(Error::Timeout)));
    /// # }
    /// ```
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !self.predicate.should_retry(&error, attempt) {
                return Err(error);
            }

            let Some(delay) = self.strategy.delay_for_attempt(attempt) else {
                tracing::warn!(
                    error = %error,
                    attempts = attempt,
                    "Giving up after exhausting retries"
                );
                return Err(error);
            };

            tracing::info!(
                error = %error,
                attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                "Retrying request after delay"
            );

            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryStrategy::default(), Box::new(RetryUnlessQuotaExceeded))
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn http_error(status: u16) -> Error {
        Error::HttpError {
            status: StatusCode::from_u16(status).unwrap(),
            raw_response: String::new(),
        }
    }

    fn fast_policy(max_retries: usize, predicate: Box<dyn RetryPredicate>) -> RetryPolicy {
        RetryPolicy::new(
            RetryStrategy::Linear {
                delay: Duration::from_millis(1),
                max_retries,
            },
            predicate,
        )
    }

    #[test]
    fn test_default_backoff_schedule() {
        let strategy = RetryStrategy::default();

        let delays: Vec<_> = (1..=6).map(|n| strategy.delay_for_attempt(n)).collect();
        assert_eq!(
            delays,
            vec![
                Some(Duration::from_secs(1)),
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(4)),
                Some(Duration::from_secs(8)),
                Some(Duration::from_secs(16)),
                None,
            ]
        );
        assert_eq!(strategy.max_retries(), Some(DEFAULT_MAX_ATTEMPTS - 1));
    }

    #[test]
    fn test_exponential_backoff_caps_at_max_delay() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(32),
            max_retries: 10,
            jitter: false,
        };

        assert_eq!(strategy.delay_for_attempt(6), Some(Duration::from_secs(32)));
        assert_eq!(strategy.delay_for_attempt(7), Some(Duration::from_secs(32)));
        assert_eq!(strategy.delay_for_attempt(64), None);
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let strategy = RetryStrategy::ExponentialBackoff {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            max_retries: 3,
            jitter: true,
        };

        for _ in 0..20 {
            let delay = strategy.delay_for_attempt(2).unwrap();
            assert!(delay >= Duration::from_millis(100) && delay <= Duration::from_millis(200));
        }
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(RetryStrategy::None.delay_for_attempt(1), None);
    }

    #[test]
    fn test_default_predicate_skips_only_quota_exceeded() {
        let predicate = RetryUnlessQuotaExceeded;

        assert!(!predicate.should_retry(&http_error(402), 1));
        assert!(predicate.should_retry(&http_error(500), 1));
        assert!(predicate.should_retry(&http_error(404), 1));
        assert!(predicate.should_retry(&http_error(400), 1));
        assert!(predicate.should_retry(&Error::Timeout, 1));
        assert!(!predicate.should_retry(&Error::InvalidArgument("query".into()), 1));
        assert!(!predicate.should_retry(
            &Error::SchemaValidation {
                serde_error: "missing field".into(),
                raw_response: "{}".into(),
            },
            1
        ));
    }

    #[test]
    fn test_transient_predicate_is_stricter() {
        let predicate = RetryOnTransient;

        assert!(predicate.should_retry(&http_error(503), 1));
        assert!(predicate.should_retry(&http_error(429), 1));
        assert!(predicate.should_retry(&Error::Timeout, 1));
        assert!(!predicate.should_retry(&http_error(404), 1));
        assert!(!predicate.should_retry(&http_error(402), 1));
    }

    #[test]
    fn test_or_predicate_with_closure() {
        let predicate = OrPredicate::new(vec![
            Box::new(RetryOnTransient),
            Box::new(|e: &Error, _attempt: usize| e.status() == Some(StatusCode::NOT_FOUND)),
        ]);

        assert!(predicate.should_retry(&http_error(404), 1));
        assert!(predicate.should_retry(&http_error(500), 1));
        assert!(!predicate.should_retry(&http_error(400), 1));
    }

    #[tokio::test]
    async fn test_run_returns_first_success() {
        let calls = AtomicUsize::new(0);
        let policy = fast_policy(5, Box::new(RetryUnlessQuotaExceeded));

        let value = policy
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(http_error(503))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_reraises_last_error_unchanged() {
        let calls = AtomicUsize::new(0);
        let policy = fast_policy(DEFAULT_MAX_ATTEMPTS - 1, Box::new(RetryUnlessQuotaExceeded));

        let result: Result<()> = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(http_error(500)) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), DEFAULT_MAX_ATTEMPTS);
        match result {
            Err(Error::HttpError { status, .. }) => assert_eq!(status.as_u16(), 500),
            other => panic!("Expected HttpError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_stops_on_rejected_error() {
        let calls = AtomicUsize::new(0);
        let policy = fast_policy(5, Box::new(RetryUnlessQuotaExceeded));

        let result: Result<()> = policy
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(http_error(402)) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.unwrap_err().is_quota_exceeded());
    }
}
