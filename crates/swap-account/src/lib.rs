//! Wallet management for the swap pipeline.
//!
//! This crate owns transaction signing and submission. It defines the
//! `WalletInterface` trait that wallet backends implement, and the
//! `WalletService` wrapper the engine talks to. The only backend today is
//! a local private-key wallet; the trait keeps room for remote signers
//! without touching the engine.

pub mod implementations {
	pub mod local;
}

use alloy::primitives::Address;
use async_trait::async_trait;
use swap_types::{Transaction, TransactionHash};
use thiserror::Error;

/// Errors that can occur during wallet operations.
#[derive(Debug, Error)]
pub enum WalletError {
	#[error("Invalid key: {0}")]
	InvalidKey(String),
	#[error("Connection failed: {0}")]
	Connection(String),
	#[error("Submission failed: {0}")]
	Submission(String),
	#[error("Transaction targets chain {requested} but wallet is connected to chain {configured}")]
	ChainMismatch { requested: u64, configured: u64 },
}

/// Interface for wallet implementations that sign and submit
/// transactions.
#[async_trait]
pub trait WalletInterface: Send + Sync {
	/// Address this wallet signs with.
	fn address(&self) -> Address;

	/// Signs `tx` and submits it to the chain, returning the hash the
	/// node acknowledged.
	async fn send_transaction(&self, tx: &Transaction) -> Result<TransactionHash, WalletError>;
}

/// Service wrapping a wallet implementation.
pub struct WalletService {
	implementation: Box<dyn WalletInterface>,
}

impl WalletService {
	/// Creates a new WalletService with the given implementation.
	pub fn new(implementation: Box<dyn WalletInterface>) -> Self {
		Self { implementation }
	}

	/// Returns the signing address.
	pub fn address(&self) -> Address {
		self.implementation.address()
	}

	/// Signs and submits a transaction.
	pub async fn send_transaction(
		&self,
		tx: &Transaction,
	) -> Result<TransactionHash, WalletError> {
		self.implementation.send_transaction(tx).await
	}
}
