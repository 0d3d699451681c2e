//! Bonding-curve call construction, previews and event decoding.

use alloy::primitives::{Address, LogData, U256};
use alloy::sol_types::{SolCall, SolEvent};
use std::sync::Arc;
use swap_delivery::ChainService;
use swap_types::abi::curve;
use swap_types::{FailureKind, GasFee, SwapError, Transaction, TransactionReceipt};

/// Safety margin applied to fee quotes, in percent.
pub const FEE_MARGIN_PERCENT: u128 = 120;

/// Builds and previews bonding-curve swap transactions.
pub struct CurveExecutor {
	chain: Arc<ChainService>,
	curve_address: Address,
	chain_id: u64,
}

impl CurveExecutor {
	pub fn new(chain: Arc<ChainService>, curve_address: Address, chain_id: u64) -> Self {
		Self {
			chain,
			curve_address,
			chain_id,
		}
	}

	/// Fetches a fresh fee quote with the safety margin applied. Quotes
	/// are never cached; every transaction pays current prices.
	pub async fn swap_fees(&self) -> Result<GasFee, SwapError> {
		let fees = self
			.chain
			.fee_estimate()
			.await
			.map_err(SwapError::classified)?;
		Ok(fees.with_margin(FEE_MARGIN_PERCENT))
	}

	/// Builds the buy transaction without submitting it.
	pub fn build_buy(
		&self,
		subject: Address,
		deposit: U256,
		min_return: U256,
		fees: GasFee,
	) -> Transaction {
		let call = curve::buySharesV2Call {
			subject,
			depositAmount: deposit,
			minReturnAmountAfterFee: min_return,
		};
		self.curve_transaction(call.abi_encode(), fees)
	}

	/// Builds the sell transaction without submitting it.
	pub fn build_sell(
		&self,
		subject: Address,
		coins: U256,
		min_return: U256,
		fees: GasFee,
	) -> Transaction {
		let call = curve::sellSharesV2Call {
			subject,
			sellAmount: coins,
			minReturnAmountAfterFee: min_return,
		};
		self.curve_transaction(call.abi_encode(), fees)
	}

	/// Previews the creator coins a deposit would currently buy.
	pub async fn preview_buy(&self, subject: Address, deposit: U256) -> Result<U256, SwapError> {
		let call = curve::calculateTokensForBuyCall {
			subject,
			depositAmount: deposit,
		};
		let raw = self
			.chain
			.call(self.curve_address, call.abi_encode().into())
			.await
			.map_err(SwapError::classified)?;
		curve::calculateTokensForBuyCall::abi_decode_returns(&raw).map_err(|e| {
			SwapError::new(
				FailureKind::SwapFailed,
				format!("buy preview decode failed: {e}"),
			)
		})
	}

	/// Previews the payment tokens a sale would currently return.
	pub async fn preview_sell(&self, subject: Address, coins: U256) -> Result<U256, SwapError> {
		let call = curve::calculateTokensForSellCall {
			subject,
			sellAmount: coins,
		};
		let raw = self
			.chain
			.call(self.curve_address, call.abi_encode().into())
			.await
			.map_err(SwapError::classified)?;
		curve::calculateTokensForSellCall::abi_decode_returns(&raw).map_err(|e| {
			SwapError::new(
				FailureKind::SwapFailed,
				format!("sell preview decode failed: {e}"),
			)
		})
	}

	fn curve_transaction(&self, data: Vec<u8>, fees: GasFee) -> Transaction {
		Transaction {
			to: self.curve_address,
			data: data.into(),
			value: U256::ZERO,
			chain_id: self.chain_id,
			gas_limit: None,
			nonce: None,
			max_fee_per_gas: fees.max_fee_per_gas,
			max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
		}
	}
}

/// Amounts moved by a confirmed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAmounts {
	/// Creator coins into or out of the wallet.
	pub creator_coins: U256,
	/// Payment tokens out of or into the wallet.
	pub payment_tokens: U256,
}

/// Extracts the amounts from a confirmed buy receipt.
///
/// The receipt is searched for a `SubjectSharePurchased` event emitted
/// by the curve contract. Its absence is a failure even though the
/// transaction itself succeeded, since without it the settled amounts
/// are unknown.
pub fn decode_purchase(
	receipt: &TransactionReceipt,
	curve_address: Address,
) -> Result<SwapAmounts, SwapError> {
	find_curve_event::<curve::SubjectSharePurchased>(receipt, curve_address)
		.map(|event| SwapAmounts {
			creator_coins: event.buyAmount,
			payment_tokens: event.sellAmount,
		})
		.ok_or_else(|| {
			SwapError::new(
				FailureKind::EventNotFound,
				"confirmed receipt carries no SubjectSharePurchased event",
			)
		})
}

/// Extracts the amounts from a confirmed sell receipt.
pub fn decode_sale(
	receipt: &TransactionReceipt,
	curve_address: Address,
) -> Result<SwapAmounts, SwapError> {
	find_curve_event::<curve::SubjectShareSold>(receipt, curve_address)
		.map(|event| SwapAmounts {
			creator_coins: event.sellAmount,
			payment_tokens: event.buyAmount,
		})
		.ok_or_else(|| {
			SwapError::new(
				FailureKind::EventNotFound,
				"confirmed receipt carries no SubjectShareSold event",
			)
		})
}

/// First decodable event of type `E` emitted by `curve_address`.
fn find_curve_event<E: SolEvent>(
	receipt: &TransactionReceipt,
	curve_address: Address,
) -> Option<E> {
	receipt
		.logs
		.iter()
		.filter(|log| log.address == curve_address)
		.find_map(|log| {
			if *log.topics.first()? != E::SIGNATURE_HASH {
				return None;
			}
			let data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
			E::decode_log_data(&data).ok()
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mocks::{plain_receipt, purchase_receipt, sale_receipt, ChainHandle, MockChain};
	use std::sync::atomic::Ordering;
	use swap_types::TransactionHash;

	const CURVE: Address = Address::repeat_byte(0x5c);
	const SUBJECT: Address = Address::repeat_byte(0x22);

	fn executor_over(chain: &Arc<MockChain>) -> CurveExecutor {
		let service = Arc::new(ChainService::new(Box::new(ChainHandle(chain.clone()))));
		CurveExecutor::new(service, CURVE, 8453)
	}

	#[test]
	fn test_buy_transaction_encodes_the_curve_call() {
		let chain = Arc::new(MockChain::new());
		let executor = executor_over(&chain);
		let fees = GasFee {
			max_fee_per_gas: 120,
			max_priority_fee_per_gas: 12,
		};

		let tx = executor.build_buy(SUBJECT, U256::from(1000u64), U256::ZERO, fees);

		let expected = curve::buySharesV2Call {
			subject: SUBJECT,
			depositAmount: U256::from(1000u64),
			minReturnAmountAfterFee: U256::ZERO,
		}
		.abi_encode();
		assert_eq!(tx.to, CURVE);
		assert_eq!(tx.data.as_ref(), expected.as_slice());
		assert_eq!(tx.value, U256::ZERO);
		assert_eq!(tx.chain_id, 8453);
		assert_eq!(tx.max_fee_per_gas, 120);
	}

	#[tokio::test(start_paused = true)]
	async fn test_fees_are_refetched_with_margin_every_time() {
		let chain = Arc::new(MockChain::new());
		let executor = executor_over(&chain);

		let first = executor.swap_fees().await.unwrap();
		assert_eq!(first.max_fee_per_gas, 120);
		assert_eq!(first.max_priority_fee_per_gas, 12);

		*chain.fees.lock().unwrap() = GasFee {
			max_fee_per_gas: 200,
			max_priority_fee_per_gas: 20,
		};
		let second = executor.swap_fees().await.unwrap();
		assert_eq!(second.max_fee_per_gas, 240);
		assert_eq!(chain.fee_calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_preview_decodes_the_returned_amount() {
		let chain = Arc::new(MockChain::new());
		*chain.call_result.lock().unwrap() =
			U256::from(500u64).to_be_bytes::<32>().to_vec().into();
		let executor = executor_over(&chain);

		let coins = executor
			.preview_buy(SUBJECT, U256::from(1000u64))
			.await
			.unwrap();
		assert_eq!(coins, U256::from(500u64));
	}

	#[test]
	fn test_purchase_amounts_come_from_the_curve_event() {
		let hash = TransactionHash(alloy::primitives::B256::repeat_byte(0xcd));
		let receipt = purchase_receipt(hash, CURVE, U256::from(1000u64), U256::from(500u64));

		let amounts = decode_purchase(&receipt, CURVE).unwrap();
		assert_eq!(amounts.creator_coins, U256::from(500u64));
		assert_eq!(amounts.payment_tokens, U256::from(1000u64));
	}

	#[test]
	fn test_sale_amounts_flip_the_direction() {
		let hash = TransactionHash(alloy::primitives::B256::repeat_byte(0xce));
		let receipt = sale_receipt(hash, CURVE, U256::from(1000u64), U256::from(750u64));

		let amounts = decode_sale(&receipt, CURVE).unwrap();
		assert_eq!(amounts.creator_coins, U256::from(1000u64));
		assert_eq!(amounts.payment_tokens, U256::from(750u64));
	}

	#[test]
	fn test_missing_event_is_a_decode_failure() {
		let hash = TransactionHash(alloy::primitives::B256::repeat_byte(0xcf));
		let receipt = plain_receipt(hash);

		let err = decode_purchase(&receipt, CURVE).unwrap_err();
		assert_eq!(err.kind, FailureKind::EventNotFound);
	}

	#[test]
	fn test_events_from_other_contracts_are_ignored() {
		let hash = TransactionHash(alloy::primitives::B256::repeat_byte(0xd0));
		let other_contract = Address::repeat_byte(0x99);
		let receipt = purchase_receipt(hash, other_contract, U256::from(1u64), U256::from(2u64));

		let err = decode_purchase(&receipt, CURVE).unwrap_err();
		assert_eq!(err.kind, FailureKind::EventNotFound);
	}

	#[test]
	fn test_sale_event_does_not_satisfy_a_purchase_decode() {
		let hash = TransactionHash(alloy::primitives::B256::repeat_byte(0xd1));
		let receipt = sale_receipt(hash, CURVE, U256::from(1u64), U256::from(2u64));

		let err = decode_purchase(&receipt, CURVE).unwrap_err();
		assert_eq!(err.kind, FailureKind::EventNotFound);
	}
}
