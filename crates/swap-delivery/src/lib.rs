//! Chain access for the swap pipeline.
//!
//! This crate owns every read the pipeline makes against the chain:
//! balances, allowances, token metadata, fee quotes, raw contract calls
//! and receipt lookups. The `ChainInterface` trait is implemented by
//! chain backends; the `ChainService` wrapper adds the bounded retry
//! schedule around transient read failures, so callers see either a
//! value or the final error after the schedule is exhausted.

pub mod implementations {
	pub mod evm;
}
pub mod retry;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::time::Duration;
use swap_types::{GasFee, TransactionHash, TransactionReceipt};
use thiserror::Error;

use crate::retry::{retry, RetryPolicy};

/// Errors that can occur during chain access.
#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
}

/// Interface for chain backends.
#[async_trait]
pub trait ChainInterface: Send + Sync {
	/// Native token balance of `owner`.
	async fn native_balance(&self, owner: Address) -> Result<U256, DeliveryError>;

	/// ERC-20 balance of `owner` on `token`.
	async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, DeliveryError>;

	/// Amount `spender` may move from `owner` on `token`.
	async fn allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, DeliveryError>;

	/// Decimal places reported by `token`.
	async fn token_decimals(&self, token: Address) -> Result<u8, DeliveryError>;

	/// Current EIP-1559 fee quote.
	async fn fee_estimate(&self) -> Result<GasFee, DeliveryError>;

	/// Executes a read-only contract call and returns the raw result.
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeliveryError>;

	/// Fetches the receipt for `tx_hash`, if the transaction was mined.
	async fn receipt(
		&self,
		tx_hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError>;

	/// Polls for the receipt of `tx_hash` until it reaches the requested
	/// confirmation depth or `timeout` elapses. Returns `Ok(None)` when
	/// the window closes without a receipt.
	async fn wait_for_receipt(
		&self,
		tx_hash: &TransactionHash,
		confirmations: u64,
		timeout: Duration,
	) -> Result<Option<TransactionReceipt>, DeliveryError>;
}

/// Service wrapping a chain backend with the read retry schedule.
///
/// Receipt operations pass through unretried; the confirmation monitor
/// owns its own attempt loop.
pub struct ChainService {
	implementation: Box<dyn ChainInterface>,
	read_policy: RetryPolicy,
}

impl ChainService {
	/// Creates a new ChainService with the default read schedule.
	pub fn new(implementation: Box<dyn ChainInterface>) -> Self {
		Self {
			implementation,
			read_policy: RetryPolicy::reads(),
		}
	}

	pub async fn native_balance(&self, owner: Address) -> Result<U256, DeliveryError> {
		retry(&self.read_policy, "native_balance", || {
			self.implementation.native_balance(owner)
		})
		.await
	}

	pub async fn erc20_balance(
		&self,
		token: Address,
		owner: Address,
	) -> Result<U256, DeliveryError> {
		retry(&self.read_policy, "erc20_balance", || {
			self.implementation.erc20_balance(token, owner)
		})
		.await
	}

	pub async fn allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, DeliveryError> {
		retry(&self.read_policy, "allowance", || {
			self.implementation.allowance(token, owner, spender)
		})
		.await
	}

	pub async fn token_decimals(&self, token: Address) -> Result<u8, DeliveryError> {
		retry(&self.read_policy, "token_decimals", || {
			self.implementation.token_decimals(token)
		})
		.await
	}

	pub async fn fee_estimate(&self) -> Result<GasFee, DeliveryError> {
		retry(&self.read_policy, "fee_estimate", || {
			self.implementation.fee_estimate()
		})
		.await
	}

	pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeliveryError> {
		retry(&self.read_policy, "call", || {
			self.implementation.call(to, data.clone())
		})
		.await
	}

	pub async fn receipt(
		&self,
		tx_hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		self.implementation.receipt(tx_hash).await
	}

	pub async fn wait_for_receipt(
		&self,
		tx_hash: &TransactionHash,
		confirmations: u64,
		timeout: Duration,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		self.implementation
			.wait_for_receipt(tx_hash, confirmations, timeout)
			.await
	}
}
