//! Shared test doubles for the chain and wallet backends.

use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol_types::SolEvent;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swap_account::{WalletError, WalletInterface};
use swap_delivery::{ChainInterface, DeliveryError};
use swap_types::abi::curve;
use swap_types::{
	EventLog, GasFee, Transaction, TransactionHash, TransactionReceipt,
};

/// Chain backend with settable responses and per-method call counters.
pub(crate) struct MockChain {
	pub allowance: Mutex<U256>,
	pub erc20_balance: Mutex<U256>,
	pub native_balance: Mutex<U256>,
	pub fees: Mutex<GasFee>,
	pub call_result: Mutex<Bytes>,
	/// Receipt returned by receipt lookups; `None` simulates a
	/// transaction that never surfaces.
	pub wait_receipt: Mutex<Option<TransactionReceipt>>,
	pub allowance_calls: AtomicU32,
	pub balance_calls: AtomicU32,
	pub fee_calls: AtomicU32,
	pub wait_calls: AtomicU32,
}

impl MockChain {
	pub fn new() -> Self {
		Self {
			allowance: Mutex::new(U256::ZERO),
			erc20_balance: Mutex::new(U256::ZERO),
			native_balance: Mutex::new(U256::ZERO),
			fees: Mutex::new(GasFee {
				max_fee_per_gas: 100,
				max_priority_fee_per_gas: 10,
			}),
			call_result: Mutex::new(Bytes::new()),
			wait_receipt: Mutex::new(None),
			allowance_calls: AtomicU32::new(0),
			balance_calls: AtomicU32::new(0),
			fee_calls: AtomicU32::new(0),
			wait_calls: AtomicU32::new(0),
		}
	}
}

/// Boxable handle sharing one [`MockChain`]; the orphan rule forbids
/// implementing the foreign `ChainInterface` directly for
/// `Arc<MockChain>` in this crate.
pub(crate) struct ChainHandle(pub Arc<MockChain>);

#[async_trait]
impl ChainInterface for ChainHandle {
	async fn native_balance(&self, _owner: Address) -> Result<U256, DeliveryError> {
		Ok(*self.0.native_balance.lock().unwrap())
	}

	async fn erc20_balance(
		&self,
		_token: Address,
		_owner: Address,
	) -> Result<U256, DeliveryError> {
		self.0.balance_calls.fetch_add(1, Ordering::SeqCst);
		Ok(*self.0.erc20_balance.lock().unwrap())
	}

	async fn allowance(
		&self,
		_token: Address,
		_owner: Address,
		_spender: Address,
	) -> Result<U256, DeliveryError> {
		self.0.allowance_calls.fetch_add(1, Ordering::SeqCst);
		Ok(*self.0.allowance.lock().unwrap())
	}

	async fn token_decimals(&self, _token: Address) -> Result<u8, DeliveryError> {
		Ok(18)
	}

	async fn fee_estimate(&self) -> Result<GasFee, DeliveryError> {
		self.0.fee_calls.fetch_add(1, Ordering::SeqCst);
		Ok(*self.0.fees.lock().unwrap())
	}

	async fn call(&self, _to: Address, _data: Bytes) -> Result<Bytes, DeliveryError> {
		Ok(self.0.call_result.lock().unwrap().clone())
	}

	async fn receipt(
		&self,
		_tx_hash: &TransactionHash,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		Ok(self.0.wait_receipt.lock().unwrap().clone())
	}

	async fn wait_for_receipt(
		&self,
		_tx_hash: &TransactionHash,
		_confirmations: u64,
		_timeout: Duration,
	) -> Result<Option<TransactionReceipt>, DeliveryError> {
		self.0.wait_calls.fetch_add(1, Ordering::SeqCst);
		Ok(self.0.wait_receipt.lock().unwrap().clone())
	}
}

/// Wallet backend recording every submission.
pub(crate) struct MockWallet {
	pub address: Address,
	pub response_hash: TransactionHash,
	/// When set, submissions fail with this message instead.
	pub failure: Mutex<Option<String>>,
	pub calls: AtomicU32,
	pub sent: Mutex<Vec<Transaction>>,
}

impl MockWallet {
	pub fn new() -> Self {
		Self {
			address: Address::repeat_byte(0xaa),
			response_hash: TransactionHash(B256::repeat_byte(0xab)),
			failure: Mutex::new(None),
			calls: AtomicU32::new(0),
			sent: Mutex::new(Vec::new()),
		}
	}
}

/// Boxable handle sharing one [`MockWallet`]; see [`ChainHandle`].
pub(crate) struct WalletHandle(pub Arc<MockWallet>);

#[async_trait]
impl WalletInterface for WalletHandle {
	fn address(&self) -> Address {
		self.0.address
	}

	async fn send_transaction(&self, tx: &Transaction) -> Result<TransactionHash, WalletError> {
		self.0.calls.fetch_add(1, Ordering::SeqCst);
		if let Some(message) = self.0.failure.lock().unwrap().clone() {
			return Err(WalletError::Submission(message));
		}
		self.0.sent.lock().unwrap().push(tx.clone());
		Ok(self.0.response_hash)
	}
}

/// Successful receipt without any logs, enough to confirm an approval.
pub(crate) fn plain_receipt(hash: TransactionHash) -> TransactionReceipt {
	TransactionReceipt {
		hash,
		block_number: 1200,
		success: true,
		logs: Vec::new(),
	}
}

/// Successful receipt carrying a `SubjectSharePurchased` event.
pub(crate) fn purchase_receipt(
	hash: TransactionHash,
	curve_address: Address,
	payment_in: U256,
	coins_out: U256,
) -> TransactionReceipt {
	let event = curve::SubjectSharePurchased {
		subject: Address::repeat_byte(0x22),
		sellToken: Address::repeat_byte(0x33),
		sellAmount: payment_in,
		spender: Address::repeat_byte(0xaa),
		buyToken: Address::repeat_byte(0x22),
		buyAmount: coins_out,
		beneficiary: Address::repeat_byte(0xaa),
	};
	receipt_with_log(hash, curve_address, event.encode_log_data())
}

/// Successful receipt carrying a `SubjectShareSold` event.
pub(crate) fn sale_receipt(
	hash: TransactionHash,
	curve_address: Address,
	coins_in: U256,
	payment_out: U256,
) -> TransactionReceipt {
	let event = curve::SubjectShareSold {
		subject: Address::repeat_byte(0x22),
		sellToken: Address::repeat_byte(0x22),
		sellAmount: coins_in,
		spender: Address::repeat_byte(0xaa),
		buyToken: Address::repeat_byte(0x33),
		buyAmount: payment_out,
		beneficiary: Address::repeat_byte(0xaa),
	};
	receipt_with_log(hash, curve_address, event.encode_log_data())
}

fn receipt_with_log(
	hash: TransactionHash,
	address: Address,
	log_data: alloy::primitives::LogData,
) -> TransactionReceipt {
	TransactionReceipt {
		hash,
		block_number: 1200,
		success: true,
		logs: vec![EventLog {
			address,
			topics: log_data.topics().to_vec(),
			data: log_data.data.clone(),
		}],
	}
}
