//! Local private-key wallet over an HTTP provider.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use swap_types::{SecretString, Transaction, TransactionHash};

use crate::{WalletError, WalletInterface};

/// Wallet backed by an in-memory private key.
///
/// The provider carries the signer as a filler, so `send_transaction`
/// signs locally and only the raw transaction leaves the process.
pub struct LocalWallet<P> {
	provider: P,
	address: Address,
	chain_id: u64,
}

/// Builds a local wallet from a private key, connected to `rpc_url`.
pub fn create_wallet(
	rpc_url: &str,
	chain_id: u64,
	private_key: &SecretString,
) -> Result<Box<dyn WalletInterface>, WalletError> {
	let signer = private_key
		.with_exposed(|key| key.parse::<PrivateKeySigner>())
		.map_err(|_| {
			WalletError::InvalidKey("not a valid secp256k1 private key".to_string())
		})?;
	let address = signer.address();

	let url: Url = rpc_url
		.parse()
		.map_err(|e| WalletError::Connection(format!("invalid RPC URL: {e}")))?;
	let provider = ProviderBuilder::new()
		.wallet(EthereumWallet::from(signer))
		.connect_http(url);

	tracing::info!(
		component = "wallet",
		address = %address,
		"Loaded local wallet"
	);

	Ok(Box::new(LocalWallet {
		provider,
		address,
		chain_id,
	}))
}

#[async_trait]
impl<P> WalletInterface for LocalWallet<P>
where
	P: Provider + 'static,
{
	fn address(&self) -> Address {
		self.address
	}

	async fn send_transaction(&self, tx: &Transaction) -> Result<TransactionHash, WalletError> {
		if tx.chain_id != self.chain_id {
			return Err(WalletError::ChainMismatch {
				requested: tx.chain_id,
				configured: self.chain_id,
			});
		}

		let mut request = TransactionRequest::default()
			.to(tx.to)
			.value(tx.value)
			.input(tx.data.clone().into())
			.max_fee_per_gas(tx.max_fee_per_gas)
			.max_priority_fee_per_gas(tx.max_priority_fee_per_gas);
		if let Some(gas_limit) = tx.gas_limit {
			request = request.gas_limit(gas_limit);
		}
		if let Some(nonce) = tx.nonce {
			request = request.nonce(nonce);
		}

		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| WalletError::Submission(e.to_string()))?;
		let hash = TransactionHash(*pending.tx_hash());

		tracing::debug!(
			component = "wallet",
			tx_hash = %hash,
			to = %tx.to,
			"Transaction submitted"
		);
		Ok(hash)
	}
}
