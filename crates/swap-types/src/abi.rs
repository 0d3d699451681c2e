//! Contract call and event declarations.
//!
//! Everything here is generated by `sol!` from the canonical signatures,
//! so selectors and event topic hashes always match what the contracts
//! emit on-chain.

use alloy::primitives::B256;
use alloy::sol_types::SolEvent;

/// Minimal ERC-20 surface used by the pipeline.
pub mod erc20 {
	use alloy::sol;

	sol! {
		function approve(address spender, uint256 amount) external returns (bool);
		function allowance(address owner, address spender) external view returns (uint256);
		function balanceOf(address account) external view returns (uint256);
		function decimals() external view returns (uint8);

		event Transfer(address indexed from, address indexed to, uint256 value);
	}
}

/// Bonding-curve contract surface.
///
/// Both swap directions settle through the curve and emit one of two
/// events. For a purchase, `sellToken` is the payment token and
/// `buyAmount` is the creator coins received; for a sale the roles flip,
/// with `sellAmount` counting creator coins in and `buyAmount` the
/// payment tokens out.
pub mod curve {
	use alloy::sol;

	sol! {
		function buySharesV2(address subject, uint256 depositAmount, uint256 minReturnAmountAfterFee) external returns (uint256);
		function sellSharesV2(address subject, uint256 sellAmount, uint256 minReturnAmountAfterFee) external returns (uint256);
		function calculateTokensForBuy(address subject, uint256 depositAmount) external view returns (uint256);
		function calculateTokensForSell(address subject, uint256 sellAmount) external view returns (uint256);

		event SubjectSharePurchased(
			address indexed subject,
			address indexed sellToken,
			uint256 sellAmount,
			address spender,
			address buyToken,
			uint256 buyAmount,
			address indexed beneficiary
		);

		event SubjectShareSold(
			address indexed subject,
			address indexed sellToken,
			uint256 sellAmount,
			address spender,
			address buyToken,
			uint256 buyAmount,
			address indexed beneficiary
		);
	}
}

/// Topic hash of the standard ERC-20 `Transfer` event.
pub const TRANSFER_TOPIC: B256 = erc20::Transfer::SIGNATURE_HASH;
