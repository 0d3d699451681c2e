//! Failure classification and the pipeline-wide error type.
//!
//! Raw provider errors are free-form strings. [`FailureKind::classify`]
//! maps them onto a closed set of causes by substring matching, so the
//! engine can decide whether a retry is worthwhile and callers receive a
//! stable machine-readable code instead of node-specific text.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classified cause of a failed swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
	/// The wallet cannot cover the transfer amount plus gas.
	InsufficientFunds,
	/// The contract reverted during execution.
	ExecutionReverted,
	/// The submitted nonce was already used.
	NonceError,
	/// The node rejected the fee as below its floor.
	GasPriceTooLow,
	/// The confirmed receipt did not contain the expected contract event.
	EventNotFound,
	/// No receipt appeared within the monitoring window.
	Timeout,
	/// Request parameters failed validation before any network call.
	Validation,
	/// Anything that matched no known pattern.
	SwapFailed,
}

impl FailureKind {
	/// Classifies a raw error message. Matching is case-insensitive and
	/// falls back to [`FailureKind::SwapFailed`] for unknown text.
	pub fn classify(raw: &str) -> Self {
		let message = raw.to_lowercase();
		if message.contains("insufficient funds") {
			FailureKind::InsufficientFunds
		} else if message.contains("execution reverted") {
			FailureKind::ExecutionReverted
		} else if message.contains("nonce too low") {
			FailureKind::NonceError
		} else if message.contains("gas price too low") {
			FailureKind::GasPriceTooLow
		} else {
			FailureKind::SwapFailed
		}
	}

	/// Stable machine-readable code for this kind.
	pub fn as_str(&self) -> &'static str {
		match self {
			FailureKind::InsufficientFunds => "INSUFFICIENT_FUNDS",
			FailureKind::ExecutionReverted => "EXECUTION_REVERTED",
			FailureKind::NonceError => "NONCE_ERROR",
			FailureKind::GasPriceTooLow => "GAS_PRICE_TOO_LOW",
			FailureKind::EventNotFound => "EVENT_NOT_FOUND",
			FailureKind::Timeout => "TIMEOUT",
			FailureKind::Validation => "VALIDATION",
			FailureKind::SwapFailed => "SWAP_FAILED",
		}
	}

	/// Whether resubmitting the same transaction may succeed.
	///
	/// Only the generic bucket is transient; every specifically
	/// classified cause reproduces on resubmission.
	pub fn retryable(&self) -> bool {
		matches!(self, FailureKind::SwapFailed)
	}
}

impl fmt::Display for FailureKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Error carried through the swap pipeline: a classified kind plus the
/// message that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct SwapError {
	pub kind: FailureKind,
	pub message: String,
}

impl SwapError {
	pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	/// Builds an error by classifying the display form of `source`.
	pub fn classified(source: impl fmt::Display) -> Self {
		let message = source.to_string();
		Self {
			kind: FailureKind::classify(&message),
			message,
		}
	}

	pub fn validation(message: impl Into<String>) -> Self {
		Self::new(FailureKind::Validation, message)
	}
}
