//! Minimal ABI call encoding for contract interactions.
//!
//! The wallet only needs to pack function calls whose parameters are
//! static words (addresses, integers, booleans, fixed bytes), so the
//! codec here is a deliberately small hand-rolled encoder: a 4-byte
//! selector from the keccak hash of the function signature followed by
//! one 32-byte word per argument. Dynamic types (string, bytes, arrays,
//! tuples) are rejected with `ChainError::InvalidInput`.

use crate::ChainError;
use alloy_primitives::{keccak256, Address, U256};

/// Trait for encoding contract calls from a JSON ABI descriptor.
pub trait AbiCodec: Send + Sync {
	/// Encodes `function(args..)` into selector-prefixed call data.
	fn encode_call(
		&self,
		abi: &serde_json::Value,
		function: &str,
		args: &[serde_json::Value],
	) -> Result<Vec<u8>, ChainError>;

	/// Decodes raw return data for `function` into a JSON value.
	fn decode_return(
		&self,
		abi: &serde_json::Value,
		function: &str,
		data: &[u8],
	) -> Result<serde_json::Value, ChainError>;
}

/// Static-word ABI codec.
///
/// Integers are returned as decimal strings on decode so values never
/// pass through floating point.
pub struct StaticAbiCodec;

impl StaticAbiCodec {
	fn find_function<'a>(
		abi: &'a serde_json::Value,
		function: &str,
	) -> Result<&'a serde_json::Value, ChainError> {
		let entries = abi.as_array().ok_or_else(|| {
			ChainError::InvalidInput("ABI descriptor must be a JSON array".to_string())
		})?;
		entries
			.iter()
			.find(|entry| {
				entry.get("name").and_then(|n| n.as_str()) == Some(function)
					&& entry
						.get("type")
						.and_then(|t| t.as_str())
						.map_or(true, |t| t == "function")
			})
			.ok_or_else(|| {
				ChainError::InvalidInput(format!("function {} not found in ABI", function))
			})
	}

	fn parameter_types(entry: &serde_json::Value, key: &str) -> Vec<String> {
		entry
			.get(key)
			.and_then(|v| v.as_array())
			.map(|params| {
				params
					.iter()
					.filter_map(|p| p.get("type").and_then(|t| t.as_str()))
					.map(|t| t.to_string())
					.collect()
			})
			.unwrap_or_default()
	}

	fn encode_word(kind: &str, arg: &serde_json::Value) -> Result<[u8; 32], ChainError> {
		let mut word = [0u8; 32];
		match kind {
			"address" => {
				let text = arg.as_str().ok_or_else(|| {
					ChainError::InvalidInput("address argument must be a string".to_string())
				})?;
				let address: Address = text.parse().map_err(|_| {
					ChainError::InvalidInput(format!("invalid address argument: {}", text))
				})?;
				word[12..].copy_from_slice(address.as_slice());
			}
			"bool" => {
				let flag = match arg {
					serde_json::Value::Bool(b) => *b,
					serde_json::Value::String(s) if s == "true" => true,
					serde_json::Value::String(s) if s == "false" => false,
					_ => {
						return Err(ChainError::InvalidInput(
							"bool argument must be true or false".to_string(),
						))
					}
				};
				word[31] = flag as u8;
			}
			_ if kind.starts_with("uint") || kind.starts_with("int") => {
				let value = coerce_u256(arg)?;
				word.copy_from_slice(&value.to_be_bytes::<32>());
			}
			_ if kind.starts_with("bytes") && kind.len() > 5 => {
				let width: usize = kind[5..].parse().map_err(|_| {
					ChainError::InvalidInput(format!("unsupported parameter type: {}", kind))
				})?;
				let text = arg.as_str().ok_or_else(|| {
					ChainError::InvalidInput("fixed bytes argument must be a hex string".to_string())
				})?;
				let bytes = hex::decode(text.trim_start_matches("0x")).map_err(|_| {
					ChainError::InvalidInput(format!("invalid hex argument: {}", text))
				})?;
				if width > 32 || bytes.len() != width {
					return Err(ChainError::InvalidInput(format!(
						"expected {} bytes, got {}",
						width,
						bytes.len()
					)));
				}
				word[..width].copy_from_slice(&bytes);
			}
			_ => {
				return Err(ChainError::InvalidInput(format!(
					"dynamic parameter type {} is not supported by the static codec",
					kind
				)))
			}
		}
		Ok(word)
	}
}

fn coerce_u256(arg: &serde_json::Value) -> Result<U256, ChainError> {
	match arg {
		serde_json::Value::Number(n) => n
			.as_u64()
			.map(U256::from)
			.ok_or_else(|| ChainError::InvalidInput(format!("invalid integer argument: {}", n))),
		serde_json::Value::String(s) => {
			let parsed = if let Some(hex_digits) = s.strip_prefix("0x") {
				U256::from_str_radix(hex_digits, 16)
			} else {
				U256::from_str_radix(s, 10)
			};
			parsed.map_err(|_| ChainError::InvalidInput(format!("invalid integer argument: {}", s)))
		}
		_ => Err(ChainError::InvalidInput(
			"integer argument must be a number or string".to_string(),
		)),
	}
}

impl AbiCodec for StaticAbiCodec {
	fn encode_call(
		&self,
		abi: &serde_json::Value,
		function: &str,
		args: &[serde_json::Value],
	) -> Result<Vec<u8>, ChainError> {
		let entry = Self::find_function(abi, function)?;
		let inputs = Self::parameter_types(entry, "inputs");
		if inputs.len() != args.len() {
			return Err(ChainError::InvalidInput(format!(
				"{} expects {} arguments, got {}",
				function,
				inputs.len(),
				args.len()
			)));
		}

		let signature = format!("{}({})", function, inputs.join(","));
		let selector = &keccak256(signature.as_bytes())[..4];

		let mut data = Vec::with_capacity(4 + 32 * args.len());
		data.extend_from_slice(selector);
		for (kind, arg) in inputs.iter().zip(args) {
			data.extend_from_slice(&Self::encode_word(kind, arg)?);
		}
		Ok(data)
	}

	fn decode_return(
		&self,
		abi: &serde_json::Value,
		function: &str,
		data: &[u8],
	) -> Result<serde_json::Value, ChainError> {
		let entry = Self::find_function(abi, function)?;
		let outputs = Self::parameter_types(entry, "outputs");

		// Anything beyond a single static word is handed back raw.
		if outputs.len() != 1 || data.len() < 32 {
			return Ok(serde_json::Value::String(format!(
				"0x{}",
				hex::encode(data)
			)));
		}

		let kind = outputs[0].as_str();
		let value = match kind {
			"address" => {
				let address = Address::from_slice(&data[12..32]);
				serde_json::Value::String(format!("0x{}", hex::encode(address.as_slice())))
			}
			"bool" => serde_json::Value::Bool(data[31] != 0),
			_ if kind.starts_with("uint") || kind.starts_with("int") => {
				serde_json::Value::String(U256::from_be_slice(&data[..32]).to_string())
			}
			_ if kind.starts_with("bytes") && kind.len() > 5 => {
				let width: usize = kind[5..].parse().unwrap_or(32);
				serde_json::Value::String(format!("0x{}", hex::encode(&data[..width.min(32)])))
			}
			_ => serde_json::Value::String(format!("0x{}", hex::encode(data))),
		};
		Ok(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn erc20_abi() -> serde_json::Value {
		serde_json::json!([
			{
				"type": "function",
				"name": "balanceOf",
				"inputs": [{"name": "owner", "type": "address"}],
				"outputs": [{"name": "", "type": "uint256"}]
			},
			{
				"type": "function",
				"name": "transfer",
				"inputs": [
					{"name": "to", "type": "address"},
					{"name": "amount", "type": "uint256"}
				],
				"outputs": [{"name": "", "type": "bool"}]
			},
			{
				"type": "function",
				"name": "tokenURI",
				"inputs": [{"name": "id", "type": "string"}],
				"outputs": []
			}
		])
	}

	#[test]
	fn test_encode_balance_of_selector_and_padding() {
		let codec = StaticAbiCodec;
		let data = codec
			.encode_call(
				&erc20_abi(),
				"balanceOf",
				&[serde_json::json!("0x5fbdb2315678afecb367f032d93f642f64180aa3")],
			)
			.unwrap();
		// Well-known selector for balanceOf(address).
		assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
		assert_eq!(data.len(), 36);
		assert_eq!(&data[4..16], &[0u8; 12]);
	}

	#[test]
	fn test_encode_transfer_accepts_decimal_string_amount() {
		let codec = StaticAbiCodec;
		let data = codec
			.encode_call(
				&erc20_abi(),
				"transfer",
				&[
					serde_json::json!("0x5fbdb2315678afecb367f032d93f642f64180aa3"),
					serde_json::json!("1000000000000000000"),
				],
			)
			.unwrap();
		// Well-known selector for transfer(address,uint256).
		assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
		assert_eq!(
			U256::from_be_slice(&data[36..68]),
			U256::from(1_000_000_000_000_000_000u64)
		);
	}

	#[test]
	fn test_dynamic_types_are_rejected() {
		let codec = StaticAbiCodec;
		let err = codec
			.encode_call(&erc20_abi(), "tokenURI", &[serde_json::json!("1")])
			.unwrap_err();
		assert!(matches!(err, ChainError::InvalidInput(_)));
	}

	#[test]
	fn test_argument_count_mismatch_is_rejected() {
		let codec = StaticAbiCodec;
		let err = codec.encode_call(&erc20_abi(), "balanceOf", &[]).unwrap_err();
		assert!(matches!(err, ChainError::InvalidInput(_)));
	}

	#[test]
	fn test_decode_uint_and_bool_returns() {
		let codec = StaticAbiCodec;
		let mut word = [0u8; 32];
		word[31] = 42;
		assert_eq!(
			codec.decode_return(&erc20_abi(), "balanceOf", &word).unwrap(),
			serde_json::json!("42")
		);

		let mut flag = [0u8; 32];
		flag[31] = 1;
		assert_eq!(
			codec.decode_return(&erc20_abi(), "transfer", &flag).unwrap(),
			serde_json::json!(true)
		);
	}
}
