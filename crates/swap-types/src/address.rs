//! Address parsing and checksum validation.
//!
//! Inputs arrive as user-supplied strings and are validated here once,
//! at the edge. Everything past this module works with typed [`Address`]
//! values, so malformed input can never reach an RPC call.

use alloy::primitives::Address;
use thiserror::Error;

/// Errors produced while parsing an address string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
	#[error("Address must start with 0x")]
	MissingPrefix,
	#[error("Address must be 40 hex characters, got {0}")]
	InvalidLength(usize),
	#[error("Address contains non-hexadecimal characters")]
	InvalidCharacter,
	#[error("Address has an invalid EIP-55 checksum")]
	ChecksumMismatch,
}

/// Parses a `0x`-prefixed hex address.
///
/// Mixed-case input is treated as EIP-55 encoded and its checksum is
/// verified. All-lowercase and all-uppercase input carries no checksum
/// information and is accepted as-is.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
	let hex_part = input
		.strip_prefix("0x")
		.ok_or(AddressError::MissingPrefix)?;

	if hex_part.len() != 40 {
		return Err(AddressError::InvalidLength(hex_part.len()));
	}

	if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
		return Err(AddressError::InvalidCharacter);
	}

	let has_lowercase = hex_part.chars().any(|c| c.is_ascii_lowercase());
	let has_uppercase = hex_part.chars().any(|c| c.is_ascii_uppercase());

	if has_lowercase && has_uppercase {
		Address::parse_checksummed(input, None).map_err(|_| AddressError::ChecksumMismatch)
	} else {
		hex_part
			.parse()
			.map_err(|_| AddressError::InvalidCharacter)
	}
}
