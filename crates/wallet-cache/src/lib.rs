//! Short-lived read-through cache for the wallet system.
//!
//! Every wallet component avoids redundant remote calls through this
//! time-to-live key/value store. Expiry is evaluated lazily on read
//! against a fixed `max_age` chosen at construction; there is no
//! background eviction task. Values are stored as JSON so heterogeneous
//! payloads (balances, read results, resolved names, gas price) share one
//! store; typed access goes through serde.
//!
//! Time is measured with `tokio::time::Instant`, so expiry behaves
//! deterministically under a paused test clock.

/// Canonical cache-key builders.
pub mod keys;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry {
	value: serde_json::Value,
	written_at: Instant,
}

/// A key/value store whose entries expire `max_age` after they were
/// written. Reads past the deadline behave as a miss and purge the entry.
pub struct TtlCache {
	max_age: Duration,
	entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
	/// Creates a cache whose entries live for `max_age`.
	pub fn new(max_age: Duration) -> Self {
		Self {
			max_age,
			entries: RwLock::new(HashMap::new()),
		}
	}

	/// Returns the cached value for `key` if present and fresh.
	///
	/// An entry older than `max_age`, or one that no longer deserializes
	/// to `T`, is treated as absent and purged.
	pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let expired = {
			let entries = self.entries.read().await;
			let entry = entries.get(key)?;
			if entry.written_at.elapsed() > self.max_age {
				true
			} else {
				match serde_json::from_value(entry.value.clone()) {
					Ok(value) => return Some(value),
					Err(_) => true,
				}
			}
		};
		if expired {
			self.entries.write().await.remove(key);
		}
		None
	}

	/// Stores `value` under `key`, replacing any previous entry.
	///
	/// Values that cannot be serialized are not cached; the caller's
	/// producer simply runs again next time.
	pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
		let value = match serde_json::to_value(value) {
			Ok(value) => value,
			Err(e) => {
				tracing::trace!(key, error = %e, "value not cacheable, skipping");
				return;
			}
		};
		self.entries.write().await.insert(
			key.to_string(),
			CacheEntry {
				value,
				written_at: Instant::now(),
			},
		);
	}

	/// Removes the entry for `key`, if any.
	pub async fn delete(&self, key: &str) {
		self.entries.write().await.remove(key);
	}

	/// Drops all entries.
	pub async fn clear(&self) {
		self.entries.write().await.clear();
	}

	/// Number of stored entries, including any not yet purged expired ones.
	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	/// Whether the cache holds no entries.
	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}

	/// Returns the cached value for `key`, or invokes `producer`, stores
	/// its result and returns it.
	///
	/// The producer runs at most once per call site; concurrent callers
	/// missing on the same key may each invoke their own producer, since
	/// this cache does not coalesce requests.
	pub async fn get_or_fetch<T, E, F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
	where
		T: Serialize + DeserializeOwned,
		F: FnOnce() -> Fut,
		Fut: std::future::Future<Output = Result<T, E>>,
	{
		if let Some(value) = self.get::<T>(key).await {
			return Ok(value);
		}
		let value = producer().await?;
		self.set(key, &value).await;
		Ok(value)
	}
}
