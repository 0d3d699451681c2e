//! Core orchestration for bonding-curve swaps.
//!
//! The crate wires validation, allowance management, transaction
//! submission, confirmation monitoring and event decoding into the
//! [`SwapEngine`]. Chain and wallet access stay behind the interfaces
//! defined in `swap-delivery` and `swap-account`, so every flow in here
//! is testable without a node.

/// ERC-20 allowance checks and max-approval submission.
pub mod approval;
/// Bonding-curve calldata building, previews and receipt decoding.
pub mod curve;
/// The swap engine and its event bus.
pub mod engine;
/// Receipt polling with bounded rounds.
pub mod monitoring;
/// The swap phase machine.
pub mod state;

mod submission;

#[cfg(test)]
pub(crate) mod mocks;

pub use engine::{
	BuyRequest, EngineError, EventBus, SellRequest, SwapEngine, WalletBalances,
};
