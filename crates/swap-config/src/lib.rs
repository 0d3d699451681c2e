//! Configuration loading for the swap pipeline.
//!
//! Configuration lives in a TOML file. Values may reference environment
//! variables with `${VAR}` or `${VAR:-default}` syntax, which is resolved
//! before parsing so secrets like the wallet private key never need to be
//! written into the file itself. Every load runs validation, so a
//! constructed [`Config`] is always internally consistent.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use swap_types::{parse_address, SecretString};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Parse error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration for the swap pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub chain: ChainConfig,
	pub contracts: ContractsConfig,
	pub wallet: WalletConfig,
	#[serde(default)]
	pub monitor: MonitorConfig,
}

/// Chain connectivity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
	/// HTTP RPC endpoint.
	pub rpc_url: String,
	/// Chain id transactions are bound to.
	pub chain_id: u64,
}

/// Addresses of the contracts the pipeline talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
	/// Bonding-curve contract swaps settle through.
	pub bonding_curve: String,
	/// ERC-20 payment token spent on buys and received on sells.
	pub payment_token: String,
}

/// Wallet settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
	/// Private key of the signing wallet. Redacted in all output.
	pub private_key: SecretString,
}

/// Receipt monitoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
	/// Blocks to wait for before treating a transaction as final.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	/// How long a single receipt-wait attempt may run, in seconds.
	#[serde(default = "default_attempt_timeout_secs")]
	pub attempt_timeout_secs: u64,
}

impl MonitorConfig {
	pub fn attempt_timeout(&self) -> Duration {
		Duration::from_secs(self.attempt_timeout_secs)
	}
}

impl Default for MonitorConfig {
	fn default() -> Self {
		Self {
			confirmations: default_confirmations(),
			attempt_timeout_secs: default_attempt_timeout_secs(),
		}
	}
}

/// Default number of confirmations.
fn default_confirmations() -> u64 {
	1
}

/// Default per-attempt receipt wait.
fn default_attempt_timeout_secs() -> u64 {
	60
}

impl Config {
	/// Loads and validates configuration from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		content.parse()
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.chain.rpc_url.is_empty() {
			return Err(ConfigError::Validation(
				"chain.rpc_url cannot be empty".to_string(),
			));
		}
		if self.chain.chain_id == 0 {
			return Err(ConfigError::Validation(
				"chain.chain_id must be non-zero".to_string(),
			));
		}
		parse_address(&self.contracts.bonding_curve).map_err(|e| {
			ConfigError::Validation(format!("contracts.bonding_curve: {e}"))
		})?;
		parse_address(&self.contracts.payment_token).map_err(|e| {
			ConfigError::Validation(format!("contracts.payment_token: {e}"))
		})?;
		if self.wallet.private_key.is_empty() {
			return Err(ConfigError::Validation(
				"wallet.private_key cannot be empty".to_string(),
			));
		}
		if self.monitor.confirmations == 0 {
			return Err(ConfigError::Validation(
				"monitor.confirmations must be at least 1".to_string(),
			));
		}
		if self.monitor.attempt_timeout_secs == 0 {
			return Err(ConfigError::Validation(
				"monitor.attempt_timeout_secs must be non-zero".to_string(),
			));
		}
		Ok(())
	}
}

impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

/// Resolves `${VAR}` and `${VAR:-default}` references against the
/// process environment. A reference without a set variable or default is
/// an error rather than an empty string.
fn resolve_env_vars(content: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_CONFIG_SIZE: usize = 1024 * 1024; // 1MB
	if content.len() > MAX_CONFIG_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration exceeds maximum size of {} bytes",
			MAX_CONFIG_SIZE
		)));
	}

	let pattern = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Invalid regex: {}", e)))?;

	let mut replacements = Vec::new();
	for caps in pattern.captures_iter(content) {
		let full_match = caps.get(0).ok_or_else(|| {
			ConfigError::Parse("Invalid capture group".to_string())
		})?;
		let var_name = &caps[1];
		let default_value = caps.get(2).map(|m| m.as_str());

		let replacement = match std::env::var(var_name) {
			Ok(value) => value,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found and no default provided",
						var_name
					)))
				}
			},
		};
		replacements.push((full_match.range(), replacement));
	}

	// Apply in reverse so earlier ranges stay valid.
	let mut result = content.to_string();
	for (range, replacement) in replacements.into_iter().rev() {
		result.replace_range(range, &replacement);
	}
	Ok(result)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn base_config() -> String {
		r#"
[chain]
rpc_url = "http://localhost:8545"
chain_id = 8453

[contracts]
bonding_curve = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
payment_token = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359"

[wallet]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"
"#
		.to_string()
	}

	#[test]
	fn test_parses_complete_config() {
		let config: Config = base_config().parse().unwrap();
		assert_eq!(config.chain.chain_id, 8453);
		assert_eq!(config.chain.rpc_url, "http://localhost:8545");
		assert!(config
			.contracts
			.bonding_curve
			.starts_with("0x5aaeb6053f"));
	}

	#[test]
	fn test_monitor_section_defaults_when_omitted() {
		let config: Config = base_config().parse().unwrap();
		assert_eq!(config.monitor.confirmations, 1);
		assert_eq!(config.monitor.attempt_timeout(), Duration::from_secs(60));
	}

	#[test]
	fn test_monitor_section_overrides_defaults() {
		let toml = format!(
			"{}\n[monitor]\nconfirmations = 3\nattempt_timeout_secs = 30\n",
			base_config()
		);
		let config: Config = toml.parse().unwrap();
		assert_eq!(config.monitor.confirmations, 3);
		assert_eq!(config.monitor.attempt_timeout_secs, 30);
	}

	#[test]
	fn test_resolves_env_var_reference() {
		std::env::set_var("SWAP_CONFIG_TEST_RPC", "http://node.internal:8545");
		let toml = base_config().replace(
			"http://localhost:8545",
			"${SWAP_CONFIG_TEST_RPC}",
		);
		let config: Config = toml.parse().unwrap();
		assert_eq!(config.chain.rpc_url, "http://node.internal:8545");
		std::env::remove_var("SWAP_CONFIG_TEST_RPC");
	}

	#[test]
	fn test_uses_default_when_env_var_missing() {
		std::env::remove_var("SWAP_CONFIG_TEST_MISSING");
		let toml = base_config().replace(
			"http://localhost:8545",
			"${SWAP_CONFIG_TEST_MISSING:-http://fallback:8545}",
		);
		let config: Config = toml.parse().unwrap();
		assert_eq!(config.chain.rpc_url, "http://fallback:8545");
	}

	#[test]
	fn test_errors_when_env_var_missing_without_default() {
		std::env::remove_var("SWAP_CONFIG_TEST_ABSENT");
		let toml = base_config()
			.replace("http://localhost:8545", "${SWAP_CONFIG_TEST_ABSENT}");
		let result: Result<Config, _> = toml.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_rejects_empty_rpc_url() {
		let toml = base_config().replace("http://localhost:8545", "");
		let result: Result<Config, _> = toml.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_rejects_invalid_contract_address() {
		let toml = base_config().replace(
			"0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
			"0x1234",
		);
		let result: Result<Config, _> = toml.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_loads_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(base_config().as_bytes()).unwrap();
		let config = Config::from_file(file.path()).unwrap();
		assert_eq!(config.chain.chain_id, 8453);
	}
}
