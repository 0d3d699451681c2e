//! Chain access over an HTTP provider.

use alloy::primitives::{Address, Bytes, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use std::time::Duration;
use swap_types::abi::erc20;
use swap_types::{EventLog, GasFee, TransactionHash, TransactionReceipt};

use crate::{ChainInterface, DeliveryError};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Chain backend talking JSON-RPC over HTTP.
pub struct AlloyChain<P> {
	provider: P,
}

/// Connects a read-only chain client to `rpc_url`.
pub fn create_http_chain(rpc_url: &str) -> Result<Box<dyn ChainInterface>, DeliveryError> {
	let url: Url = rpc_url
		.parse()
		.map_err(|e| DeliveryError::Network(format!("invalid RPC URL: {e}")))?;
	let provider = ProviderBuilder::new().connect_http(url);
	Ok(Box::new(AlloyChain { provider }))
}

impl<P: Provider> AlloyChain<P> {
	async fn call_contract(&self, to: Address, data: Bytes) -> Result<Bytes, DeliveryError> {
		let request = TransactionRequest::default().to(to).input(data.into());
		self.provider
			.call(request)
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))
	}
}

#[async_trait]
impl<P> ChainInterface for AlloyChain<P>
where
	P: Provider + 'static,
{
	async fn native_balance(&self, owner: Address) -> Result<U256, DeliveryError> {
		self.provider
			.get_balance(owner)
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))
	}

	async fn erc20_balance(&self, token: Address, owner: Address) -> Result<U256, DeliveryError> {
		let data = erc20::balanceOfCall { account: owner }.abi_encode();
		let raw = self.call_contract(token, data.into()).await?;
		erc20::balanceOfCall::abi_decode_returns(&raw)
			.map_err(|e| DeliveryError::InvalidResponse(format!("balanceOf: {e}")))
	}

	async fn allowance(
		&self,
		token: Address,
		owner: Address,
		spender: Address,
	) -> Result<U256, DeliveryError> {
		let data = erc20::allowanceCall { owner, spender }.abi_encode();
		let raw = self.call_contract(token, data.into()).await?;
		erc20::allowanceCall::abi_decode_returns(&raw)
			.map_err(|e| DeliveryError::InvalidResponse(format!("allowance: {e}")))
	}

	async fn token_decimals(&self, token: Address) -> Result<u8, DeliveryError> {
		let data = erc20::decimalsCall {}.abi_encode();
		let raw = self.call_contract(token, data.into()).await?;
		erc20::decimalsCall::abi_decode_returns(&raw)
			.map_err(|e| DeliveryError::InvalidResponse(format!("decimals: {e}")))
	}

	async fn fee_estimate(&self) -> Result<GasFee, DeliveryError> {
		let estimate = self
			.provider
			.estimate_eip1559_fees()
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))?;
		Ok(GasFee {
			max_fee_per_gas: estimate.max_fee_per_gas,
			max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
		})
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, DeliveryError> {
		self.call_contract(to, data).await
	}

	async fn receipt(
		&self,
		tx_hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let receipt = self
			.provider
			.get_transaction_receipt(tx_hash.0)
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))?;
		Ok(receipt.map(to_receipt))
	}

	async fn wait_for_receipt(
		&self,
		tx_hash: &TransactionHash,
		confirmations: u64,
		timeout: Duration,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		let started = tokio::time::Instant::now();
		loop {
			match self.provider.get_transaction_receipt(tx_hash.0).await {
				Ok(Some(receipt)) => {
					let deep_enough = if confirmations > 1 {
						let mined_in = receipt.block_number.unwrap_or_default();
						let current = self
							.provider
							.get_block_number()
							.await
							.map_err(|e| DeliveryError::Network(e.to_string()))?;
						current.saturating_sub(mined_in) + 1 >= confirmations
					} else {
						true
					};
					if deep_enough {
						return Ok(Some(to_receipt(receipt)));
					}
				}
				Ok(None) => {}
				Err(e) => return Err(DeliveryError::Network(e.to_string())),
			}

			// the timeout bounds the whole wait, depth accumulation included
			if started.elapsed() >= timeout {
				return Ok(None);
			}
			tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
		}
	}
}

fn to_receipt(receipt: alloy::rpc::types::TransactionReceipt) -> TransactionReceipt {
	let logs = receipt
		.inner
		.logs()
		.iter()
		.map(|log| EventLog {
			address: log.inner.address,
			topics: log.inner.data.topics().to_vec(),
			data: log.inner.data.data.clone(),
		})
		.collect();
	TransactionReceipt {
		hash: TransactionHash(receipt.transaction_hash),
		block_number: receipt.block_number.unwrap_or_default(),
		success: receipt.status(),
		logs,
	}
}
