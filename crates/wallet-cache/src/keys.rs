//! Canonical cache-key builders.
//!
//! Keys are pure functions of the logical operation, the lowercased
//! address(es) involved, and a stable serialization of extra arguments.
//! The canonical argument serialization is `serde_json::to_string` of the
//! argument list; two calls with identical arguments always build the
//! same key, which is what makes a cache hit correct rather than merely
//! present. This is a boundary contract: callers composing keys by hand
//! must use the same serialization.

/// Fixed key for the cached network gas price.
pub const GAS_PRICE: &str = "gas_price";

/// Key for a contract view-call result.
pub fn read(address: &str, function: &str, args: &[serde_json::Value]) -> String {
	format!(
		"read:{}:{}:{}",
		address.to_lowercase(),
		function,
		serde_json::to_string(args).unwrap_or_default()
	)
}

/// Key for a balance lookup, optionally scoped to a token contract.
pub fn balance(address: &str, token: Option<&str>) -> String {
	match token {
		Some(token) => format!(
			"balance:{}:{}",
			address.to_lowercase(),
			token.to_lowercase()
		),
		None => format!("balance:{}", address.to_lowercase()),
	}
}

/// Key for a name-resolution result.
pub fn ens(name: &str) -> String {
	format!("ens:{}", name.to_lowercase())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_keys_normalize_address_case() {
		assert_eq!(
			read("0xABCD000000000000000000000000000000000001", "decimals", &[]),
			read("0xabcd000000000000000000000000000000000001", "decimals", &[]),
		);
		assert_eq!(
			balance("0xABCD000000000000000000000000000000000001", None),
			balance("0xabcd000000000000000000000000000000000001", None),
		);
		assert_eq!(ens("Vitalik.ETH"), ens("vitalik.eth"));
	}

	#[test]
	fn test_identical_arguments_build_identical_keys() {
		let args = vec![serde_json::json!("0x01"), serde_json::json!(5)];
		let a = read("0xabcd000000000000000000000000000000000001", "allowance", &args);
		let b = read("0xabcd000000000000000000000000000000000001", "allowance", &args);
		assert_eq!(a, b);

		let other = read(
			"0xabcd000000000000000000000000000000000001",
			"allowance",
			&[serde_json::json!("0x02")],
		);
		assert_ne!(a, other);
	}

	#[test]
	fn test_token_scoped_balance_key_is_distinct() {
		let native = balance("0xabcd000000000000000000000000000000000001", None);
		let token = balance(
			"0xabcd000000000000000000000000000000000001",
			Some("0x1111000000000000000000000000000000000001"),
		);
		assert_ne!(native, token);
	}
}
