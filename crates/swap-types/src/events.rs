//! Progress events published while a swap flow runs.
//!
//! The engine broadcasts these over its event bus so subscribers (the CLI
//! progress printer, tests) can follow a flow without polling. A flow
//! emits at most one terminal event: `TransactionConfirmed` for the swap
//! stage on success, or one of `TransactionFailed`, `TransactionTimedOut`
//! and `InsufficientBalance` on failure. Steps that perform no network
//! I/O emit nothing.

use crate::{FailureKind, TransactionHash};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Which transaction of a flow an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStage {
	/// The ERC-20 approval granting the curve contract spending rights.
	Approval,
	/// The bonding-curve buy or sell itself.
	Swap,
}

/// Events describing the lifecycle of a swap flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SwapEvent {
	/// A transaction was accepted by the node.
	TransactionSubmitted {
		stage: SwapStage,
		tx_hash: TransactionHash,
	},
	/// A transaction was mined and executed successfully.
	TransactionConfirmed {
		stage: SwapStage,
		tx_hash: TransactionHash,
	},
	/// A transaction failed terminally, either at submission or on-chain.
	TransactionFailed {
		stage: SwapStage,
		kind: FailureKind,
		message: String,
	},
	/// No receipt appeared within the monitoring window.
	TransactionTimedOut {
		stage: SwapStage,
		tx_hash: TransactionHash,
	},
	/// A sell was rejected up front because the seller holds too few coins.
	InsufficientBalance { available: U256, requested: U256 },
}
