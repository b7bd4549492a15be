//! Structured-data payloads for typed signing.
//!
//! Field maps are ordered (`BTreeMap`) so the canonical JSON encoding the
//! signer produces is deterministic across calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single field of a typed-data struct definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedDataField {
	pub name: String,
	#[serde(rename = "type")]
	pub kind: String,
}

impl TypedDataField {
	pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind: kind.into(),
		}
	}
}

/// The signing domain of a typed-data payload.
///
/// Only the fields that are present participate in the domain schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chain_id: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub verifying_contract: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub salt: Option<String>,
}

impl TypedDataDomain {
	/// Derives the domain field schema from the fields that are present,
	/// in the standard field order.
	pub fn schema(&self) -> Vec<TypedDataField> {
		let mut fields = Vec::new();
		if self.name.is_some() {
			fields.push(TypedDataField::new("name", "string"));
		}
		if self.version.is_some() {
			fields.push(TypedDataField::new("version", "string"));
		}
		if self.chain_id.is_some() {
			fields.push(TypedDataField::new("chainId", "uint256"));
		}
		if self.verifying_contract.is_some() {
			fields.push(TypedDataField::new("verifyingContract", "address"));
		}
		if self.salt.is_some() {
			fields.push(TypedDataField::new("salt", "bytes32"));
		}
		fields
	}
}

/// A structured-data payload to be signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
	pub domain: TypedDataDomain,
	/// Struct definitions keyed by type name.
	pub types: BTreeMap<String, Vec<TypedDataField>>,
	pub primary_type: String,
	pub message: serde_json::Value,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_domain_schema_tracks_present_fields() {
		let domain = TypedDataDomain {
			name: Some("Example".to_string()),
			chain_id: Some(1),
			..Default::default()
		};
		let schema = domain.schema();
		assert_eq!(schema.len(), 2);
		assert_eq!(schema[0].name, "name");
		assert_eq!(schema[1].kind, "uint256");
	}
}
