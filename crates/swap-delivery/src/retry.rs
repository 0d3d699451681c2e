//! Bounded retry with exponential backoff.
//!
//! Every retried operation in the pipeline shares one schedule shape: a
//! fixed attempt count with pauses that double after each failure. The
//! delay computation is a pure function so the schedules can be asserted
//! without running a clock.

use std::future::Future;
use std::time::Duration;

/// A retry schedule: how many attempts to make and how long the first
/// pause lasts. Pauses double after every failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
	pub max_attempts: u32,
	pub base_delay: Duration,
}

impl RetryPolicy {
	pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self {
			max_attempts,
			base_delay,
		}
	}

	/// Schedule for chain reads: three attempts pausing 1s then 2s.
	pub const fn reads() -> Self {
		Self::new(3, Duration::from_secs(1))
	}

	/// Schedule for transaction submission and confirmation rounds:
	/// three attempts pausing 2s then 4s.
	pub const fn transactions() -> Self {
		Self::new(3, Duration::from_secs(2))
	}

	/// Pause to take after the given 1-based failed attempt.
	pub fn backoff_delay(&self, attempt: u32) -> Duration {
		self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
	}
}

/// Runs `op` until it succeeds, `should_retry` rejects the error, or the
/// policy is exhausted. The last error is returned unchanged.
pub async fn retry_if<T, E, F, Fut, R>(
	policy: &RetryPolicy,
	label: &str,
	mut op: F,
	should_retry: R,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: std::fmt::Display,
	R: Fn(&E) -> bool,
{
	let mut attempt = 1u32;
	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if attempt < policy.max_attempts && should_retry(&err) => {
				let delay = policy.backoff_delay(attempt);
				tracing::warn!(
					operation = label,
					attempt,
					max_attempts = policy.max_attempts,
					delay_ms = delay.as_millis() as u64,
					error = %err,
					"Operation failed, retrying"
				);
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
			Err(err) => return Err(err),
		}
	}
}

/// Runs `op`, retrying every failure until the policy is exhausted.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, op: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: std::fmt::Display,
{
	retry_if(policy, label, op, |_| true).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicU32, Ordering};

	#[test]
	fn test_read_schedule_doubles_from_one_second() {
		let policy = RetryPolicy::reads();
		assert_eq!(policy.max_attempts, 3);
		assert_eq!(policy.backoff_delay(1), Duration::from_secs(1));
		assert_eq!(policy.backoff_delay(2), Duration::from_secs(2));
	}

	#[test]
	fn test_transaction_schedule_doubles_from_two_seconds() {
		let policy = RetryPolicy::transactions();
		assert_eq!(policy.max_attempts, 3);
		assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
		assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
	}

	#[tokio::test(start_paused = true)]
	async fn test_exhausts_attempts_and_returns_last_error() {
		let calls = AtomicU32::new(0);
		let started = tokio::time::Instant::now();

		let result: Result<(), String> = retry(&RetryPolicy::reads(), "always-fails", || {
			let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
			async move { Err(format!("attempt {n} failed")) }
		})
		.await;

		assert_eq!(result, Err("attempt 3 failed".to_string()));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
		// two pauses: 1s after the first failure, 2s after the second
		assert_eq!(started.elapsed(), Duration::from_secs(3));
	}

	#[tokio::test(start_paused = true)]
	async fn test_succeeds_after_transient_failures() {
		let calls = AtomicU32::new(0);

		let result = retry(&RetryPolicy::reads(), "flaky", || {
			let n = calls.fetch_add(1, Ordering::SeqCst);
			async move {
				if n < 2 {
					Err("transient".to_string())
				} else {
					Ok(n)
				}
			}
		})
		.await;

		assert_eq!(result, Ok(2));
		assert_eq!(calls.load(Ordering::SeqCst), 3);
	}

	#[tokio::test(start_paused = true)]
	async fn test_rejected_errors_are_not_retried() {
		let calls = AtomicU32::new(0);

		let result: Result<(), String> = retry_if(
			&RetryPolicy::transactions(),
			"fatal",
			|| {
				calls.fetch_add(1, Ordering::SeqCst);
				async { Err("nonce too low".to_string()) }
			},
			|_| false,
		)
		.await;

		assert!(result.is_err());
		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}
}
