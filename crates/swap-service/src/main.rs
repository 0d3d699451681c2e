//! Command-line entry point for the swap service.
//!
//! Wires the swap engine to an HTTP chain backend and a local signing
//! wallet, then runs one command: buy, sell, quote or balance. Swap
//! outcomes are printed as JSON on stdout; progress events stream to
//! the log as they happen.

use alloy::primitives::U256;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use swap_account::implementations::local::create_wallet;
use swap_config::Config;
use swap_core::{BuyRequest, SellRequest, SwapEngine};
use swap_delivery::implementations::evm::create_http_chain;
use swap_types::{format_token_amount, SwapEvent};

/// Command-line arguments for the swap service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Buy creator coins with the payment token
	Buy {
		/// Caller identity recorded with the flow
		#[arg(long)]
		user: String,
		/// Wallet expected to sign; must match the configured key
		#[arg(long)]
		wallet: String,
		/// Creator coin contract to buy
		#[arg(long)]
		subject: String,
		/// Payment tokens to spend, in base units
		#[arg(long)]
		amount: String,
		/// Minimum coins acceptable after fees, in base units
		#[arg(long)]
		min_return: Option<String>,
	},
	/// Sell creator coins back for the payment token
	Sell {
		#[arg(long)]
		user: String,
		#[arg(long)]
		wallet: String,
		#[arg(long)]
		subject: String,
		/// Creator coins to sell, in base units
		#[arg(long)]
		amount: String,
		#[arg(long)]
		min_return: Option<String>,
	},
	/// Preview a swap without touching the wallet
	Quote {
		#[arg(long, value_enum)]
		side: QuoteSide,
		#[arg(long)]
		subject: String,
		/// Amount in, in base units
		#[arg(long)]
		amount: String,
	},
	/// Show native and payment-token balances of a wallet
	Balance {
		#[arg(long)]
		wallet: String,
		/// ERC-20 token to read instead of the configured payment token
		#[arg(long)]
		token: Option<String>,
	},
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum QuoteSide {
	Buy,
	Sell,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = Config::from_file(&args.config)?;
	tracing::info!(chain_id = config.chain.chain_id, "Loaded configuration");

	let engine = build_engine(&config)?;

	match args.command {
		Command::Buy {
			user,
			wallet,
			subject,
			amount,
			min_return,
		} => {
			let request = BuyRequest {
				user_id: user,
				wallet_address: wallet,
				subject_address: subject,
				deposit: parse_amount(&amount)?,
				min_return: min_return.as_deref().map(parse_amount).transpose()?,
			};
			forward_events(&engine);
			let outcome = engine.execute_buy(&request).await;
			println!("{}", serde_json::to_string_pretty(&outcome)?);
			if !outcome.success {
				std::process::exit(1);
			}
		}
		Command::Sell {
			user,
			wallet,
			subject,
			amount,
			min_return,
		} => {
			let request = SellRequest {
				user_id: user,
				wallet_address: wallet,
				subject_address: subject,
				coins: parse_amount(&amount)?,
				min_return: min_return.as_deref().map(parse_amount).transpose()?,
			};
			forward_events(&engine);
			let outcome = engine.execute_sell(&request).await;
			println!("{}", serde_json::to_string_pretty(&outcome)?);
			if !outcome.success {
				std::process::exit(1);
			}
		}
		Command::Quote {
			side,
			subject,
			amount,
		} => {
			let amount = parse_amount(&amount)?;
			let quoted = match side {
				QuoteSide::Buy => engine.quote_buy(&subject, amount).await?,
				QuoteSide::Sell => engine.quote_sell(&subject, amount).await?,
			};
			println!("{quoted}");
		}
		Command::Balance { wallet, token } => match token {
			Some(token) => {
				let (balance, decimals) = engine.token_balance(&token, &wallet).await?;
				println!("token: {}", format_token_amount(balance, decimals));
			}
			None => {
				let balances = engine.balances(&wallet).await?;
				println!("native: {}", format_token_amount(balances.native, 18));
				println!(
					"payment: {}",
					format_token_amount(balances.payment, balances.payment_decimals)
				);
			}
		},
	}

	Ok(())
}

/// Wires the engine from configuration: an HTTP chain backend and a
/// local signing wallet.
fn build_engine(config: &Config) -> Result<SwapEngine, Box<dyn std::error::Error>> {
	let chain = create_http_chain(&config.chain.rpc_url)?;
	let wallet = create_wallet(
		&config.chain.rpc_url,
		config.chain.chain_id,
		&config.wallet.private_key,
	)?;
	Ok(SwapEngine::new(config, chain, wallet)?)
}

/// Streams engine progress events into the log until the flow ends.
fn forward_events(engine: &SwapEngine) {
	let mut events = engine.event_bus().subscribe();
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			match event {
				SwapEvent::TransactionSubmitted { stage, tx_hash } => {
					tracing::info!(
						component = "cli",
						stage = ?stage,
						tx_hash = %tx_hash,
						"Transaction submitted"
					);
				}
				SwapEvent::TransactionConfirmed { stage, tx_hash } => {
					tracing::info!(
						component = "cli",
						stage = ?stage,
						tx_hash = %tx_hash,
						"Transaction confirmed"
					);
				}
				SwapEvent::TransactionFailed {
					stage,
					kind,
					message,
				} => {
					tracing::warn!(
						component = "cli",
						stage = ?stage,
						kind = %kind,
						message = %message,
						"Transaction failed"
					);
				}
				SwapEvent::TransactionTimedOut { stage, tx_hash } => {
					tracing::warn!(
						component = "cli",
						stage = ?stage,
						tx_hash = %tx_hash,
						"Transaction timed out"
					);
				}
				SwapEvent::InsufficientBalance {
					available,
					requested,
				} => {
					tracing::warn!(
						component = "cli",
						available = %available,
						requested = %requested,
						"Insufficient balance"
					);
				}
			}
		}
	});
}

fn parse_amount(raw: &str) -> Result<U256, Box<dyn std::error::Error>> {
	raw.parse::<U256>()
		.map_err(|e| format!("invalid amount {raw:?}: {e}").into())
}
