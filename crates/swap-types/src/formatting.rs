//! Display helpers for identifiers and token amounts.

use alloy::primitives::U256;

/// Shortens a long identifier (hash, address) for log output.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 10 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

/// Renders a base-unit amount as a decimal token quantity.
///
/// The result keeps full precision: trailing zeros in the fractional
/// part are trimmed but nothing is rounded.
pub fn format_token_amount(amount: U256, decimals: u8) -> String {
	let raw = amount.to_string();
	if decimals == 0 {
		return raw;
	}

	let decimals = decimals as usize;
	let padded = if raw.len() <= decimals {
		format!("{}{}", "0".repeat(decimals - raw.len() + 1), raw)
	} else {
		raw
	};

	let split = padded.len() - decimals;
	let integer = &padded[..split];
	let fraction = padded[split..].trim_end_matches('0');

	if fraction.is_empty() {
		integer.to_string()
	} else {
		format!("{integer}.{fraction}")
	}
}
