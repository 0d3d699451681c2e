//! Shared submit-and-confirm flow with progress events.
//!
//! Both the approval and the swap itself pass through the same two
//! steps: submit with bounded retries, then wait for the receipt. Each
//! step announces its outcome on the event bus exactly once, so a flow
//! produces a single terminal event no matter where it stops.

use swap_account::WalletService;
use swap_delivery::retry::{retry_if, RetryPolicy};
use swap_types::{
	FailureKind, SwapError, SwapEvent, SwapStage, Transaction, TransactionHash,
	TransactionReceipt,
};

use crate::engine::EventBus;
use crate::monitoring::TransactionMonitor;

/// Submits `tx`, retrying transport-level failures only. Publishes
/// `TransactionSubmitted` on success and `TransactionFailed` when the
/// final error is terminal.
pub(crate) async fn submit_with_retry(
	wallet: &WalletService,
	event_bus: &EventBus,
	stage: SwapStage,
	tx: &Transaction,
) -> Result<TransactionHash, SwapError> {
	let result = retry_if(
		&RetryPolicy::transactions(),
		"send_transaction",
		|| wallet.send_transaction(tx),
		|err| FailureKind::classify(&err.to_string()).retryable(),
	)
	.await;

	match result {
		Ok(tx_hash) => {
			tracing::info!(
				component = "submission",
				stage = ?stage,
				tx_hash = %tx_hash,
				"Transaction submitted"
			);
			event_bus
				.publish(SwapEvent::TransactionSubmitted { stage, tx_hash })
				.ok();
			Ok(tx_hash)
		}
		Err(err) => Err(report_failure(event_bus, stage, SwapError::classified(err))),
	}
}

/// Waits for the receipt of `tx_hash`. Publishes exactly one of
/// `TransactionConfirmed`, `TransactionFailed` (for a revert) or
/// `TransactionTimedOut`.
pub(crate) async fn confirm_or_report(
	monitor: &TransactionMonitor,
	event_bus: &EventBus,
	stage: SwapStage,
	tx_hash: TransactionHash,
) -> Result<TransactionReceipt, SwapError> {
	match monitor.await_receipt(&tx_hash).await {
		Some(receipt) if receipt.success => {
			event_bus
				.publish(SwapEvent::TransactionConfirmed { stage, tx_hash })
				.ok();
			Ok(receipt)
		}
		Some(receipt) => Err(report_failure(
			event_bus,
			stage,
			SwapError::new(
				FailureKind::ExecutionReverted,
				format!(
					"transaction {} reverted in block {}",
					tx_hash, receipt.block_number
				),
			),
		)),
		None => {
			event_bus
				.publish(SwapEvent::TransactionTimedOut { stage, tx_hash })
				.ok();
			Err(SwapError::new(
				FailureKind::Timeout,
				format!("no receipt for {} within the monitoring window", tx_hash),
			))
		}
	}
}

/// Publishes the terminal failure event for `stage` and hands the error
/// back for propagation.
pub(crate) fn report_failure(
	event_bus: &EventBus,
	stage: SwapStage,
	err: SwapError,
) -> SwapError {
	event_bus
		.publish(SwapEvent::TransactionFailed {
			stage,
			kind: err.kind,
			message: err.message.clone(),
		})
		.ok();
	err
}
