//! Swap flow phases and their legal transitions.
//!
//! A flow moves through a fixed sequence of phases; the static table
//! below is the single source of truth for which moves are legal. Every
//! pre-terminal phase may fall into `Failed`, and the two terminal
//! phases allow nothing further.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use swap_types::{FailureKind, SwapError};
use thiserror::Error;

/// Phases a swap flow moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPhase {
	/// Checking request shape and funds before any transaction.
	Validating,
	/// Reading the current ERC-20 allowance.
	CheckingAllowance,
	/// An approval transaction is in flight.
	ApprovingAllowance,
	/// Submitting the swap transaction.
	Submitting,
	/// Waiting for the swap receipt.
	AwaitingConfirmation,
	/// Extracting amounts from the confirmed receipt.
	Decoding,
	/// Flow finished successfully.
	Done,
	/// Flow finished with a classified failure.
	Failed,
}

impl fmt::Display for SwapPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SwapPhase::Validating => "validating",
			SwapPhase::CheckingAllowance => "checking_allowance",
			SwapPhase::ApprovingAllowance => "approving_allowance",
			SwapPhase::Submitting => "submitting",
			SwapPhase::AwaitingConfirmation => "awaiting_confirmation",
			SwapPhase::Decoding => "decoding",
			SwapPhase::Done => "done",
			SwapPhase::Failed => "failed",
		};
		f.write_str(name)
	}
}

/// Error returned when a flow attempts an illegal phase move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid phase transition from {from} to {to}")]
pub struct InvalidTransition {
	pub from: SwapPhase,
	pub to: SwapPhase,
}

impl From<InvalidTransition> for SwapError {
	fn from(err: InvalidTransition) -> Self {
		SwapError::new(FailureKind::SwapFailed, err.to_string())
	}
}

static TRANSITIONS: Lazy<HashMap<SwapPhase, HashSet<SwapPhase>>> = Lazy::new(|| {
	use SwapPhase::*;

	let mut transitions = HashMap::new();
	transitions.insert(Validating, HashSet::from([CheckingAllowance, Failed]));
	transitions.insert(
		CheckingAllowance,
		HashSet::from([ApprovingAllowance, Submitting, Failed]),
	);
	transitions.insert(ApprovingAllowance, HashSet::from([Submitting, Failed]));
	transitions.insert(Submitting, HashSet::from([AwaitingConfirmation, Failed]));
	transitions.insert(AwaitingConfirmation, HashSet::from([Decoding, Failed]));
	transitions.insert(Decoding, HashSet::from([Done, Failed]));
	transitions.insert(Done, HashSet::new()); // terminal
	transitions.insert(Failed, HashSet::new()); // terminal
	transitions
});

/// Whether moving from `from` to `to` is legal.
pub fn is_valid_transition(from: SwapPhase, to: SwapPhase) -> bool {
	TRANSITIONS.get(&from).is_some_and(|next| next.contains(&to))
}

/// Tracks the phase of one in-flight swap, rejecting illegal moves.
#[derive(Debug)]
pub struct PhaseTracker {
	current: SwapPhase,
}

impl PhaseTracker {
	pub fn new() -> Self {
		Self {
			current: SwapPhase::Validating,
		}
	}

	pub fn current(&self) -> SwapPhase {
		self.current
	}

	/// Moves the flow to `next`.
	pub fn advance(&mut self, next: SwapPhase) -> Result<(), InvalidTransition> {
		if !is_valid_transition(self.current, next) {
			return Err(InvalidTransition {
				from: self.current,
				to: next,
			});
		}
		tracing::debug!(from = %self.current, to = %next, "Phase transition");
		self.current = next;
		Ok(())
	}
}

impl Default for PhaseTracker {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use SwapPhase::*;

	#[test]
	fn test_buy_with_approval_walks_the_full_path() {
		let mut tracker = PhaseTracker::new();
		for phase in [
			CheckingAllowance,
			ApprovingAllowance,
			Submitting,
			AwaitingConfirmation,
			Decoding,
			Done,
		] {
			tracker.advance(phase).unwrap();
		}
		assert_eq!(tracker.current(), Done);
	}

	#[test]
	fn test_approval_phase_can_be_skipped() {
		let mut tracker = PhaseTracker::new();
		tracker.advance(CheckingAllowance).unwrap();
		tracker.advance(Submitting).unwrap();
		assert_eq!(tracker.current(), Submitting);
	}

	#[test]
	fn test_every_live_phase_may_fail() {
		for phase in [
			Validating,
			CheckingAllowance,
			ApprovingAllowance,
			Submitting,
			AwaitingConfirmation,
			Decoding,
		] {
			assert!(is_valid_transition(phase, Failed), "{phase} cannot fail");
		}
	}

	#[test]
	fn test_terminal_phases_allow_nothing() {
		for target in [
			Validating,
			CheckingAllowance,
			ApprovingAllowance,
			Submitting,
			AwaitingConfirmation,
			Decoding,
			Done,
			Failed,
		] {
			assert!(!is_valid_transition(Done, target));
			assert!(!is_valid_transition(Failed, target));
		}
	}

	#[test]
	fn test_skipping_phases_is_rejected() {
		assert!(!is_valid_transition(Validating, Submitting));
		assert!(!is_valid_transition(CheckingAllowance, AwaitingConfirmation));
		assert!(!is_valid_transition(Submitting, Decoding));

		let mut tracker = PhaseTracker::new();
		let err = tracker.advance(Done).unwrap_err();
		assert_eq!(err.from, Validating);
		assert_eq!(err.to, Done);
	}

	#[test]
	fn test_backward_moves_are_rejected() {
		assert!(!is_valid_transition(AwaitingConfirmation, Submitting));
		assert!(!is_valid_transition(Decoding, CheckingAllowance));
	}
}
