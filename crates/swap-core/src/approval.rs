//! ERC-20 allowance management ahead of a swap.
//!
//! The curve contract pulls tokens from the wallet, so a swap needs a
//! sufficient allowance before it can settle. When the allowance has to
//! be raised at all it is raised to the maximum, which makes every later
//! swap on the same token skip this step entirely.

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use std::sync::Arc;
use swap_account::WalletService;
use swap_delivery::ChainService;
use swap_types::abi::erc20;
use swap_types::{GasFee, SwapError, SwapStage, Transaction, TransactionHash};

use crate::curve::FEE_MARGIN_PERCENT;
use crate::engine::EventBus;
use crate::monitoring::TransactionMonitor;
use crate::submission;

/// How an allowance requirement was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
	/// The existing allowance already covers the requested amount.
	AlreadyApproved { allowance: U256 },
	/// A max-allowance approval was submitted and confirmed.
	Approved { tx_hash: TransactionHash },
}

/// Checks and, when needed, raises the allowance a spender holds on an
/// ERC-20 token.
pub struct AllowanceManager {
	chain: Arc<ChainService>,
	wallet: Arc<WalletService>,
	monitor: Arc<TransactionMonitor>,
	event_bus: EventBus,
	chain_id: u64,
}

impl AllowanceManager {
	pub fn new(
		chain: Arc<ChainService>,
		wallet: Arc<WalletService>,
		monitor: Arc<TransactionMonitor>,
		event_bus: EventBus,
		chain_id: u64,
	) -> Self {
		Self {
			chain,
			wallet,
			monitor,
			event_bus,
			chain_id,
		}
	}

	/// Ensures `spender` may move at least `required` of `token` from
	/// `owner`, approving the maximum allowance when the current one
	/// falls short.
	pub async fn ensure_allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
		required: U256,
	) -> Result<ApprovalOutcome, SwapError> {
		if required.is_zero() {
			return Err(SwapError::validation("approval amount must be positive"));
		}

		let current = self
			.chain
			.allowance(token, owner, spender)
			.await
			.map_err(|e| {
				submission::report_failure(
					&self.event_bus,
					SwapStage::Approval,
					SwapError::classified(e),
				)
			})?;

		if current >= required {
			tracing::debug!(
				component = "approval",
				allowance = %current,
				"Existing allowance is sufficient"
			);
			return Ok(ApprovalOutcome::AlreadyApproved { allowance: current });
		}

		tracing::info!(
			component = "approval",
			current = %current,
			required = %required,
			token = %token,
			"Raising allowance to maximum"
		);

		let fees = self
			.chain
			.fee_estimate()
			.await
			.map_err(|e| {
				submission::report_failure(
					&self.event_bus,
					SwapStage::Approval,
					SwapError::classified(e),
				)
			})?
			.with_margin(FEE_MARGIN_PERCENT);

		let tx = build_approval(token, spender, self.chain_id, fees);
		let tx_hash = submission::submit_with_retry(
			&self.wallet,
			&self.event_bus,
			SwapStage::Approval,
			&tx,
		)
		.await?;
		submission::confirm_or_report(
			&self.monitor,
			&self.event_bus,
			SwapStage::Approval,
			tx_hash,
		)
		.await?;

		Ok(ApprovalOutcome::Approved { tx_hash })
	}
}

/// Builds a max-allowance approval transaction.
fn build_approval(token: Address, spender: Address, chain_id: u64, fees: GasFee) -> Transaction {
	let call = erc20::approveCall {
		spender,
		amount: U256::MAX,
	};
	Transaction {
		to: token,
		data: call.abi_encode().into(),
		value: U256::ZERO,
		chain_id,
		gas_limit: None,
		nonce: None,
		max_fee_per_gas: fees.max_fee_per_gas,
		max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
	}
}
