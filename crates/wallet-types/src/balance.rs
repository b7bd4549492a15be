//! Balance representation and native-token metadata.

use serde::{Deserialize, Serialize};

/// Static metadata for the chain's native token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
	pub symbol: String,
	pub name: String,
	pub decimals: u8,
}

impl Default for TokenMetadata {
	fn default() -> Self {
		Self {
			symbol: "ETH".to_string(),
			name: "Ether".to_string(),
			decimals: 18,
		}
	}
}

/// Read-only balance view derived from a raw integer balance plus token
/// metadata. Amounts cross this boundary as strings, never floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceInfo {
	/// Human-readable decimal string, e.g. "1.5".
	pub value: String,
	/// Exact balance in base units as a decimal string.
	pub base_units: String,
	pub decimals: u8,
	pub symbol: String,
	pub name: String,
}
