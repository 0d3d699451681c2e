//! Structured result returned by the swap engine.

use crate::{FailureKind, TransactionHash};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Final record of a swap flow.
///
/// Amounts are raw base-unit values rendered as decimal strings, so
/// callers never lose precision to floating point. Classified failures
/// land here instead of propagating as errors; only programming bugs
/// escape the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapOutcome {
	pub success: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<TransactionHash>,
	/// Creator coins moved by the swap, in base units.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub creator_coins: Option<String>,
	/// Payment tokens moved by the swap, in base units.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub payment_tokens: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<FailureKind>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
}

impl SwapOutcome {
	pub fn success(tx_hash: TransactionHash, creator_coins: U256, payment_tokens: U256) -> Self {
		Self {
			success: true,
			tx_hash: Some(tx_hash),
			creator_coins: Some(creator_coins.to_string()),
			payment_tokens: Some(payment_tokens.to_string()),
			error: None,
			message: None,
		}
	}

	pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
		Self {
			success: false,
			tx_hash: None,
			creator_coins: None,
			payment_tokens: None,
			error: Some(kind),
			message: Some(message.into()),
		}
	}
}
