//! Transactions, receipts, logs and fee quotes.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte hash identifying a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub B256);

impl fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// EIP-1559 transaction ready for signing and submission.
///
/// `gas_limit` and `nonce` are optional; when absent the wallet lets the
/// provider fill them in from current chain state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Recipient contract or account.
	pub to: Address,
	/// ABI-encoded call data.
	pub data: Bytes,
	/// Native value to attach.
	pub value: U256,
	/// Chain the transaction is valid on.
	pub chain_id: u64,
	/// Explicit gas limit, if the caller wants to pin one.
	pub gas_limit: Option<u64>,
	/// Explicit nonce, if the caller wants to pin one.
	pub nonce: Option<u64>,
	/// Maximum total fee per gas unit, in wei.
	pub max_fee_per_gas: u128,
	/// Maximum priority fee per gas unit, in wei.
	pub max_priority_fee_per_gas: u128,
}

/// A single log entry emitted during transaction execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
	/// Contract that emitted the log.
	pub address: Address,
	/// Indexed topics; the first is the event signature hash.
	pub topics: Vec<B256>,
	/// ABI-encoded non-indexed fields.
	pub data: Bytes,
}

/// Receipt describing the outcome of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
	/// Hash of the transaction this receipt belongs to.
	pub hash: TransactionHash,
	/// Block the transaction was included in.
	pub block_number: u64,
	/// Whether execution succeeded.
	pub success: bool,
	/// Logs emitted during execution.
	pub logs: Vec<EventLog>,
}

/// EIP-1559 fee quote fetched from the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasFee {
	pub max_fee_per_gas: u128,
	pub max_priority_fee_per_gas: u128,
}

impl GasFee {
	/// Scales both fields to `percent` of their value, rounding down.
	///
	/// Passing 120 yields a 20% safety margin over the quoted fees.
	pub fn with_margin(&self, percent: u128) -> GasFee {
		GasFee {
			max_fee_per_gas: self.max_fee_per_gas * percent / 100,
			max_priority_fee_per_gas: self.max_priority_fee_per_gas * percent / 100,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_margin_scales_both_fee_fields() {
		let fees = GasFee {
			max_fee_per_gas: 100,
			max_priority_fee_per_gas: 10,
		};
		let bumped = fees.with_margin(120);
		assert_eq!(bumped.max_fee_per_gas, 120);
		assert_eq!(bumped.max_priority_fee_per_gas, 12);
	}

	#[test]
	fn test_margin_rounds_down() {
		let fees = GasFee {
			max_fee_per_gas: 33,
			max_priority_fee_per_gas: 7,
		};
		let bumped = fees.with_margin(120);
		assert_eq!(bumped.max_fee_per_gas, 39);
		assert_eq!(bumped.max_priority_fee_per_gas, 8);
	}

	#[test]
	fn test_hash_displays_with_prefix() {
		let hash = TransactionHash(B256::repeat_byte(0xab));
		let rendered = hash.to_string();
		assert!(rendered.starts_with("0x"));
		assert_eq!(rendered.len(), 66);
	}
}
