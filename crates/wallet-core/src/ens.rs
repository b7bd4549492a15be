//! Best-effort name resolution through the on-chain registry.
//!
//! The fast path never touches the network: a string that already is a
//! hex address is lowercased and returned. Names go through the registry
//! lookup (namehash -> resolver contract -> address), with results cached
//! under the original name so re-resolution within the TTL costs nothing.

use std::sync::Arc;
use wallet_cache::{keys, TtlCache};
use wallet_chain::ChainClient;
use wallet_types::{is_hex_address, WalletError};

use alloy_primitives::{keccak256, Address, B256};

/// Selector of `resolver(bytes32)` on the registry contract.
const RESOLVER_SELECTOR: [u8; 4] = [0x01, 0x78, 0xb8, 0xbf];
/// Selector of `addr(bytes32)` on a resolver contract.
const ADDR_SELECTOR: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde];

/// Name-resolution service.
pub struct EnsResolver {
	chain: Arc<dyn ChainClient>,
	cache: Option<Arc<TtlCache>>,
	registry: Address,
}

impl EnsResolver {
	pub fn new(
		chain: Arc<dyn ChainClient>,
		registry: Address,
		cache: Option<Arc<TtlCache>>,
	) -> Self {
		Self {
			chain,
			cache,
			registry,
		}
	}

	/// Resolves a name or address to canonical lowercase hex form.
	///
	/// Idempotent within the cache TTL: re-resolving a name returns the
	/// first resolution without another network round trip.
	pub async fn resolve_address(&self, name_or_address: &str) -> Result<String, WalletError> {
		if is_hex_address(name_or_address) {
			return Ok(name_or_address.to_lowercase());
		}

		let cache_key = keys::ens(name_or_address);
		if let Some(cache) = &self.cache {
			if let Some(cached) = cache.get::<String>(&cache_key).await {
				return Ok(cached);
			}
		}

		let node = namehash(name_or_address);

		let resolver = self
			.lookup(self.registry, RESOLVER_SELECTOR, node, name_or_address)
			.await?;
		if resolver.is_zero() {
			return Err(WalletError::AddressResolution {
				message: "no resolver registered for name".to_string(),
				address: name_or_address.to_string(),
			});
		}

		let address = self
			.lookup(resolver, ADDR_SELECTOR, node, name_or_address)
			.await?;
		if address.is_zero() {
			return Err(WalletError::AddressResolution {
				message: "resolver holds no address for name".to_string(),
				address: name_or_address.to_string(),
			});
		}

		let resolved = format!("0x{}", hex::encode(address.as_slice()));
		tracing::debug!(name = name_or_address, address = %resolved, "resolved name");

		if let Some(cache) = &self.cache {
			cache.set(&cache_key, &resolved).await;
		}
		Ok(resolved)
	}

	/// Cost-bounded probe: resolution errors become `false`.
	pub async fn can_resolve(&self, name_or_address: &str) -> bool {
		self.resolve_address(name_or_address).await.is_ok()
	}

	/// Calls `contract.selector(node)` and decodes an address word.
	async fn lookup(
		&self,
		contract: Address,
		selector: [u8; 4],
		node: B256,
		name: &str,
	) -> Result<Address, WalletError> {
		let mut data = Vec::with_capacity(36);
		data.extend_from_slice(&selector);
		data.extend_from_slice(node.as_slice());

		let result = self.chain.call(contract, data).await.map_err(|e| {
			WalletError::AddressResolution {
				message: e.to_string(),
				address: name.to_string(),
			}
		})?;

		if result.len() < 32 {
			return Err(WalletError::AddressResolution {
				message: "malformed registry response".to_string(),
				address: name.to_string(),
			});
		}
		Ok(Address::from_slice(&result[12..32]))
	}
}

/// Computes the structured name hash over dot-separated labels.
///
/// Labels are hashed right to left: node = keccak256(node ++ keccak256(label)),
/// starting from the zero hash. Names are lowercased first; full
/// normalization beyond case folding is out of scope.
pub fn namehash(name: &str) -> B256 {
	let mut node = B256::ZERO;
	if name.is_empty() {
		return node;
	}
	for label in name.to_lowercase().split('.').rev() {
		let label_hash = keccak256(label.as_bytes());
		let mut combined = [0u8; 64];
		combined[..32].copy_from_slice(node.as_slice());
		combined[32..].copy_from_slice(label_hash.as_slice());
		node = keccak256(combined);
	}
	node
}
