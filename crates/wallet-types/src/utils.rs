//! Formatting and address helpers.
//!
//! All addresses leaving the wallet are canonical: lowercase, 0x-prefixed,
//! fixed-length hex. Amounts are formatted as decimal strings.

use alloy_primitives::{Address, U256};

/// Checks whether a string already is a 0x-prefixed 20-byte hex address.
pub fn is_hex_address(input: &str) -> bool {
	input.len() == 42
		&& input.starts_with("0x")
		&& input[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

/// Renders an address in canonical form: lowercase 0x-prefixed hex.
pub fn canonical_address(address: &Address) -> String {
	format!("0x{}", hex::encode(address.as_slice()))
}

/// Adds a "0x" prefix to a hex string unless one is already present.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Truncates a hash string for log readability.
pub fn truncate_hash(hash: &str) -> String {
	if hash.len() <= 10 {
		hash.to_string()
	} else {
		format!("{}..", &hash[..10])
	}
}

/// Formats a base-unit amount as a human decimal string.
///
/// The integer part is split at `decimals` digits from the right and
/// trailing fractional zeros are trimmed, so 1500000000000000000 with 18
/// decimals renders as "1.5" and exact integers render without a point.
pub fn format_units(amount: U256, decimals: u8) -> String {
	let raw = amount.to_string();
	if decimals == 0 {
		return raw;
	}

	let places = decimals as usize;
	let (integer, fraction) = if raw.len() <= places {
		("0".to_string(), format!("{:0>width$}", raw, width = places))
	} else {
		let split = raw.len() - places;
		(raw[..split].to_string(), raw[split..].to_string())
	};

	let fraction = fraction.trim_end_matches('0');
	if fraction.is_empty() {
		integer
	} else {
		format!("{}.{}", integer, fraction)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_is_hex_address() {
		assert!(is_hex_address(
			"0x5fbdb2315678afecb367f032d93f642f64180aa3"
		));
		assert!(is_hex_address(
			"0x5FbDB2315678afecb367f032d93F642f64180AA3"
		));
		assert!(!is_hex_address("vitalik.eth"));
		assert!(!is_hex_address("0x5fbdb2"));
		assert!(!is_hex_address(
			"0x5fbdb2315678afecb367f032d93f642f64180ag3"
		));
	}

	#[test]
	fn test_format_units() {
		assert_eq!(
			format_units(U256::from(1_500_000_000_000_000_000u64), 18),
			"1.5"
		);
		assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");
		assert_eq!(format_units(U256::from(42u64), 0), "42");
		assert_eq!(
			format_units(U256::from(2_000_000_000_000_000_000u64), 18),
			"2"
		);
	}

	#[test]
	fn test_truncate_hash() {
		assert_eq!(truncate_hash("0xabcd"), "0xabcd");
		assert_eq!(
			truncate_hash("0xabcdef0123456789"),
			"0xabcdef01.."
		);
	}
}
