//! Bounded retry for transient transport failures.
//!
//! Only failures where no response arrived (timeouts, refused or dropped
//! connections) are retried. A response with an error status is final.

use std::time::Duration;

use super::http::TransportError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = fail immediately).
    pub max_retries: u32,
    /// Fixed pause before each retry.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Whether another attempt is allowed after `retries_done` retries failed with `error`.
    pub fn should_retry(&self, retries_done: u32, error: &TransportError) -> bool {
        retries_done < self.max_retries && error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::TransportErrorKind;

    fn connect() -> TransportError {
        TransportError::new(TransportErrorKind::Connect, "refused")
    }

    #[test]
    fn default_is_three_retries_one_second_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }

    #[test]
    fn retries_until_budget_spent() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0, &connect()));
        assert!(policy.should_retry(2, &connect()));
        assert!(!policy.should_retry(3, &connect()));
    }

    #[test]
    fn non_transient_errors_not_retried() {
        let policy = RetryPolicy::default();
        let body = TransportError::new(TransportErrorKind::Body, "truncated");
        assert!(!policy.should_retry(0, &body));
    }

    #[test]
    fn none_never_retries() {
        assert!(!RetryPolicy::none().should_retry(0, &connect()));
    }
}
