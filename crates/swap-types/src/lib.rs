//! Core type definitions for the creator coin swap pipeline.
//!
//! This crate provides the shared vocabulary used by every other crate in
//! the workspace: chain-facing transaction types, contract call and event
//! declarations, failure classification, progress events and a handful of
//! utilities. Keeping them in one place lets the wallet, delivery and
//! engine crates exchange data without depending on each other.

/// Address parsing and checksum validation.
pub mod address;

/// Contract call and event declarations for the ERC-20 and bonding-curve
/// surfaces the pipeline touches.
pub mod abi;

/// Progress events published while a swap flow runs.
pub mod events;

/// Failure classification and the pipeline-wide error type.
pub mod failure;

/// Display helpers for identifiers and token amounts.
pub mod formatting;

/// Structured result returned by the swap engine.
pub mod outcome;

/// Secret string handling with redaction and zeroization.
pub mod secret_string;

/// Transactions, receipts, logs and fee quotes.
pub mod transaction;

pub use address::*;
pub use events::*;
pub use failure::*;
pub use formatting::*;
pub use outcome::*;
pub use secret_string::*;
pub use transaction::*;
