//! Structured-data signing.
//!
//! This is a simplified typed-data scheme: the payload is canonicalized
//! into deterministic JSON, prefixed with a domain-separation tag and
//! signed as a message. It does not produce the struct-hash encoding
//! full EIP-712 verifiers expect; both signer and verifier must use this
//! scheme.

use std::sync::Arc;
use wallet_chain::ChainClient;
use wallet_types::{TypedData, TypedDataField, WalletError};

/// Domain-separation prefix applied before signing.
const SIGNING_PREFIX: &str = "EIP-712 Signed Message:\n";

/// Name of the implicit domain struct definition.
const DOMAIN_TYPE: &str = "EIP712Domain";

/// Typed-data signing service.
pub struct TypedDataSigner {
	chain: Arc<dyn ChainClient>,
}

impl TypedDataSigner {
	pub fn new(chain: Arc<dyn ChainClient>) -> Self {
		Self { chain }
	}

	/// Signs a typed-data payload and returns the signature as 0x-hex.
	pub async fn sign_typed_data(&self, payload: &TypedData) -> Result<String, WalletError> {
		let canonical = canonical_payload(payload)?;
		let message = format!("{}{}", SIGNING_PREFIX, canonical);

		let signature = self
			.chain
			.sign_message(message.as_bytes())
			.await
			.map_err(|e| WalletError::Signing(e.to_string()))?;

		Ok(format!("0x{}", hex::encode(signature)))
	}
}

/// Serializes the payload deterministically.
///
/// The domain schema is derived from the populated domain fields and
/// merged into the type map under the standard domain type name, so two
/// payloads with identical content always canonicalize identically.
fn canonical_payload(payload: &TypedData) -> Result<String, WalletError> {
	let mut types: std::collections::BTreeMap<String, Vec<TypedDataField>> =
		payload.types.clone();
	types
		.entry(DOMAIN_TYPE.to_string())
		.or_insert_with(|| payload.domain.schema());

	if !types.contains_key(&payload.primary_type) {
		return Err(WalletError::Signing(format!(
			"primary type {} is not defined in the type map",
			payload.primary_type
		)));
	}

	let document = serde_json::json!({
		"types": types,
		"domain": payload.domain,
		"primaryType": payload.primary_type,
		"message": payload.message,
	});
	serde_json::to_string(&document).map_err(|e| WalletError::Signing(e.to_string()))
}
