//! Swap orchestration.
//!
//! `SwapEngine` drives buy and sell requests through the phase machine:
//! validation, allowance handling, submission, confirmation and event
//! decoding. Classified failures are folded into the returned
//! [`SwapOutcome`] rather than propagated, so callers always get a
//! structured record of what happened; progress is broadcast on the
//! engine's [`EventBus`] along the way.

pub mod event_bus;

pub use event_bus::EventBus;

use alloy::primitives::{Address, U256};
use std::sync::Arc;
use swap_account::{WalletInterface, WalletService};
use swap_config::Config;
use swap_delivery::{ChainInterface, ChainService};
use swap_types::{
	parse_address, truncate_id, FailureKind, SwapError, SwapEvent, SwapOutcome, SwapStage,
};
use thiserror::Error;
use tracing::instrument;

use crate::approval::{AllowanceManager, ApprovalOutcome};
use crate::curve::{decode_purchase, decode_sale, CurveExecutor};
use crate::monitoring::TransactionMonitor;
use crate::state::{PhaseTracker, SwapPhase};
use crate::submission;

/// Errors surfaced while wiring an engine together.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Parameters for a buy flow.
#[derive(Debug, Clone)]
pub struct BuyRequest {
	/// Caller identity recorded with the flow.
	pub user_id: String,
	/// Wallet expected to sign; must match the configured signer.
	pub wallet_address: String,
	/// Creator coin contract to buy.
	pub subject_address: String,
	/// Payment tokens to spend, in base units.
	pub deposit: U256,
	/// Minimum coins acceptable after fees; no floor when absent.
	pub min_return: Option<U256>,
}

/// Parameters for a sell flow.
#[derive(Debug, Clone)]
pub struct SellRequest {
	pub user_id: String,
	pub wallet_address: String,
	pub subject_address: String,
	/// Creator coins to sell, in base units.
	pub coins: U256,
	pub min_return: Option<U256>,
}

/// Balance snapshot for one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletBalances {
	pub native: U256,
	pub payment: U256,
	pub payment_decimals: u8,
}

/// Orchestrates swap flows against one chain, one curve contract and
/// one signing wallet.
pub struct SwapEngine {
	chain: Arc<ChainService>,
	wallet: Arc<WalletService>,
	allowance: AllowanceManager,
	curve: CurveExecutor,
	monitor: Arc<TransactionMonitor>,
	event_bus: EventBus,
	payment_token: Address,
	curve_address: Address,
}

impl SwapEngine {
	/// Wires an engine from configuration and backend implementations.
	pub fn new(
		config: &Config,
		chain: Box<dyn ChainInterface>,
		wallet: Box<dyn WalletInterface>,
	) -> Result<Self, EngineError> {
		let curve_address = parse_address(&config.contracts.bonding_curve)
			.map_err(|e| EngineError::Config(format!("contracts.bonding_curve: {e}")))?;
		let payment_token = parse_address(&config.contracts.payment_token)
			.map_err(|e| EngineError::Config(format!("contracts.payment_token: {e}")))?;

		let chain = Arc::new(ChainService::new(chain));
		let wallet = Arc::new(WalletService::new(wallet));
		let event_bus = EventBus::new(1000);
		let monitor = Arc::new(TransactionMonitor::new(
			chain.clone(),
			config.monitor.confirmations,
			config.monitor.attempt_timeout(),
		));
		let allowance = AllowanceManager::new(
			chain.clone(),
			wallet.clone(),
			monitor.clone(),
			event_bus.clone(),
			config.chain.chain_id,
		);
		let curve = CurveExecutor::new(chain.clone(), curve_address, config.chain.chain_id);

		Ok(Self {
			chain,
			wallet,
			allowance,
			curve,
			monitor,
			event_bus,
			payment_token,
			curve_address,
		})
	}

	/// Event bus handle for progress subscribers.
	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Buys creator coins with the payment token.
	#[instrument(skip_all, fields(user_id = %request.user_id, subject = %truncate_id(&request.subject_address)))]
	pub async fn execute_buy(&self, request: &BuyRequest) -> SwapOutcome {
		let mut phase = PhaseTracker::new();
		match self.run_buy(request, &mut phase).await {
			Ok(outcome) => outcome,
			Err(err) => {
				phase.advance(SwapPhase::Failed).ok();
				tracing::warn!(
					component = "engine",
					kind = %err.kind,
					message = %err.message,
					"Buy flow failed"
				);
				SwapOutcome::failure(err.kind, err.message)
			}
		}
	}

	/// Sells creator coins back for the payment token.
	#[instrument(skip_all, fields(user_id = %request.user_id, subject = %truncate_id(&request.subject_address)))]
	pub async fn execute_sell(&self, request: &SellRequest) -> SwapOutcome {
		let mut phase = PhaseTracker::new();
		match self.run_sell(request, &mut phase).await {
			Ok(outcome) => outcome,
			Err(err) => {
				phase.advance(SwapPhase::Failed).ok();
				tracing::warn!(
					component = "engine",
					kind = %err.kind,
					message = %err.message,
					"Sell flow failed"
				);
				SwapOutcome::failure(err.kind, err.message)
			}
		}
	}

	/// Previews the creator coins a deposit would buy, without touching
	/// the wallet.
	pub async fn quote_buy(&self, subject_address: &str, deposit: U256) -> Result<U256, SwapError> {
		let subject = parse_address(subject_address)
			.map_err(|e| SwapError::validation(format!("subject address: {e}")))?;
		if deposit.is_zero() {
			return Err(SwapError::validation("amount must be greater than zero"));
		}
		self.curve.preview_buy(subject, deposit).await
	}

	/// Previews the payment tokens a sale would return.
	pub async fn quote_sell(&self, subject_address: &str, coins: U256) -> Result<U256, SwapError> {
		let subject = parse_address(subject_address)
			.map_err(|e| SwapError::validation(format!("subject address: {e}")))?;
		if coins.is_zero() {
			return Err(SwapError::validation("amount must be greater than zero"));
		}
		self.curve.preview_sell(subject, coins).await
	}

	/// Balance and decimals of an arbitrary ERC-20 token.
	pub async fn token_balance(
		&self,
		token_address: &str,
		owner_address: &str,
	) -> Result<(U256, u8), SwapError> {
		let token = parse_address(token_address)
			.map_err(|e| SwapError::validation(format!("token address: {e}")))?;
		let owner = parse_address(owner_address)
			.map_err(|e| SwapError::validation(format!("wallet address: {e}")))?;
		let balance = self
			.chain
			.erc20_balance(token, owner)
			.await
			.map_err(SwapError::classified)?;
		let decimals = self
			.chain
			.token_decimals(token)
			.await
			.map_err(SwapError::classified)?;
		Ok((balance, decimals))
	}

	/// Native and payment-token balances of a wallet.
	pub async fn balances(&self, owner_address: &str) -> Result<WalletBalances, SwapError> {
		let owner = parse_address(owner_address)
			.map_err(|e| SwapError::validation(format!("wallet address: {e}")))?;
		let native = self
			.chain
			.native_balance(owner)
			.await
			.map_err(SwapError::classified)?;
		let payment = self
			.chain
			.erc20_balance(self.payment_token, owner)
			.await
			.map_err(SwapError::classified)?;
		let payment_decimals = self
			.chain
			.token_decimals(self.payment_token)
			.await
			.map_err(SwapError::classified)?;
		Ok(WalletBalances {
			native,
			payment,
			payment_decimals,
		})
	}

	async fn run_buy(
		&self,
		request: &BuyRequest,
		phase: &mut PhaseTracker,
	) -> Result<SwapOutcome, SwapError> {
		let (owner, subject) = self.validate(
			&request.user_id,
			&request.wallet_address,
			&request.subject_address,
			request.deposit,
		)?;

		phase.advance(SwapPhase::CheckingAllowance)?;
		let approval = self
			.allowance
			.ensure_allowance(self.payment_token, owner, self.curve_address, request.deposit)
			.await?;
		if matches!(approval, ApprovalOutcome::Approved { .. }) {
			phase.advance(SwapPhase::ApprovingAllowance)?;
		}

		phase.advance(SwapPhase::Submitting)?;
		let fees = self
			.curve
			.swap_fees()
			.await
			.map_err(|e| submission::report_failure(&self.event_bus, SwapStage::Swap, e))?;
		let tx = self.curve.build_buy(
			subject,
			request.deposit,
			request.min_return.unwrap_or(U256::ZERO),
			fees,
		);
		let tx_hash =
			submission::submit_with_retry(&self.wallet, &self.event_bus, SwapStage::Swap, &tx)
				.await?;

		phase.advance(SwapPhase::AwaitingConfirmation)?;
		let receipt =
			submission::confirm_or_report(&self.monitor, &self.event_bus, SwapStage::Swap, tx_hash)
				.await?;

		phase.advance(SwapPhase::Decoding)?;
		let amounts = decode_purchase(&receipt, self.curve_address)
			.map_err(|e| submission::report_failure(&self.event_bus, SwapStage::Swap, e))?;

		phase.advance(SwapPhase::Done)?;
		tracing::info!(
			component = "engine",
			tx_hash = %tx_hash,
			creator_coins = %amounts.creator_coins,
			payment_tokens = %amounts.payment_tokens,
			"Buy confirmed"
		);
		Ok(SwapOutcome::success(
			tx_hash,
			amounts.creator_coins,
			amounts.payment_tokens,
		))
	}

	async fn run_sell(
		&self,
		request: &SellRequest,
		phase: &mut PhaseTracker,
	) -> Result<SwapOutcome, SwapError> {
		let (owner, subject) = self.validate(
			&request.user_id,
			&request.wallet_address,
			&request.subject_address,
			request.coins,
		)?;

		// the curve cannot move coins the seller does not hold, so stop
		// before any transaction is built
		let available = self
			.chain
			.erc20_balance(subject, owner)
			.await
			.map_err(|e| {
				submission::report_failure(
					&self.event_bus,
					SwapStage::Swap,
					SwapError::classified(e),
				)
			})?;
		if available < request.coins {
			self.event_bus
				.publish(SwapEvent::InsufficientBalance {
					available,
					requested: request.coins,
				})
				.ok();
			return Err(SwapError::new(
				FailureKind::InsufficientFunds,
				format!(
					"wallet holds {} creator coins but {} were requested",
					available, request.coins
				),
			));
		}

		phase.advance(SwapPhase::CheckingAllowance)?;
		let approval = self
			.allowance
			.ensure_allowance(subject, owner, self.curve_address, request.coins)
			.await?;
		if matches!(approval, ApprovalOutcome::Approved { .. }) {
			phase.advance(SwapPhase::ApprovingAllowance)?;
		}

		phase.advance(SwapPhase::Submitting)?;
		let fees = self
			.curve
			.swap_fees()
			.await
			.map_err(|e| submission::report_failure(&self.event_bus, SwapStage::Swap, e))?;
		let tx = self.curve.build_sell(
			subject,
			request.coins,
			request.min_return.unwrap_or(U256::ZERO),
			fees,
		);
		let tx_hash =
			submission::submit_with_retry(&self.wallet, &self.event_bus, SwapStage::Swap, &tx)
				.await?;

		phase.advance(SwapPhase::AwaitingConfirmation)?;
		let receipt =
			submission::confirm_or_report(&self.monitor, &self.event_bus, SwapStage::Swap, tx_hash)
				.await?;

		phase.advance(SwapPhase::Decoding)?;
		let amounts = decode_sale(&receipt, self.curve_address)
			.map_err(|e| submission::report_failure(&self.event_bus, SwapStage::Swap, e))?;

		phase.advance(SwapPhase::Done)?;
		tracing::info!(
			component = "engine",
			tx_hash = %tx_hash,
			creator_coins = %amounts.creator_coins,
			payment_tokens = %amounts.payment_tokens,
			"Sell confirmed"
		);
		Ok(SwapOutcome::success(
			tx_hash,
			amounts.creator_coins,
			amounts.payment_tokens,
		))
	}

	fn validate(
		&self,
		user_id: &str,
		wallet_address: &str,
		subject_address: &str,
		amount: U256,
	) -> Result<(Address, Address), SwapError> {
		if user_id.trim().is_empty() {
			return Err(SwapError::validation("user id must not be empty"));
		}
		let owner = parse_address(wallet_address)
			.map_err(|e| SwapError::validation(format!("wallet address: {e}")))?;
		let subject = parse_address(subject_address)
			.map_err(|e| SwapError::validation(format!("subject address: {e}")))?;
		if amount.is_zero() {
			return Err(SwapError::validation("amount must be greater than zero"));
		}
		let signer = self.wallet.address();
		if owner != signer {
			return Err(SwapError::validation(format!(
				"wallet {owner} does not match the configured signer {signer}"
			)));
		}
		Ok((owner, subject))
	}
}
