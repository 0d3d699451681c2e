//! Receipt monitoring with bounded polling rounds.

use std::sync::Arc;
use std::time::Duration;
use swap_delivery::retry::RetryPolicy;
use swap_delivery::ChainService;
use swap_types::{truncate_id, TransactionHash, TransactionReceipt};
use tracing::instrument;

/// Waits for transaction receipts.
///
/// Each polling round is bounded by the configured attempt timeout, and
/// the rounds themselves are bounded by the transaction retry schedule,
/// so a vanished transaction cannot hold a flow open indefinitely.
pub struct TransactionMonitor {
	chain: Arc<ChainService>,
	confirmations: u64,
	attempt_timeout: Duration,
	policy: RetryPolicy,
}

impl TransactionMonitor {
	pub fn new(chain: Arc<ChainService>, confirmations: u64, attempt_timeout: Duration) -> Self {
		Self {
			chain,
			confirmations,
			attempt_timeout,
			policy: RetryPolicy::transactions(),
		}
	}

	/// Polls until the transaction surfaces or every round is spent.
	///
	/// The receipt is returned exactly as found, reverted ones included;
	/// callers decide what a failed execution means. `None` means the
	/// transaction never surfaced within the window.
	#[instrument(skip_all, fields(tx_hash = %truncate_id(&tx_hash.to_string())))]
	pub async fn await_receipt(&self, tx_hash: &TransactionHash) -> Option<TransactionReceipt> {
		for attempt in 1..=self.policy.max_attempts {
			match self
				.chain
				.wait_for_receipt(tx_hash, self.confirmations, self.attempt_timeout)
				.await
			{
				Ok(Some(receipt)) => {
					tracing::info!(
						component = "monitor",
						block = receipt.block_number,
						success = receipt.success,
						"Receipt found"
					);
					return Some(receipt);
				}
				Ok(None) => {
					tracing::warn!(
						component = "monitor",
						attempt,
						max_attempts = self.policy.max_attempts,
						"No receipt within the attempt window"
					);
				}
				Err(e) => {
					tracing::warn!(
						component = "monitor",
						attempt,
						max_attempts = self.policy.max_attempts,
						error = %e,
						"Receipt lookup failed"
					);
				}
			}

			if attempt < self.policy.max_attempts {
				tokio::time::sleep(self.policy.backoff_delay(attempt)).await;
			}
		}
		None
	}
}
