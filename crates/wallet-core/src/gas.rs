//! Gas estimation and dry-run simulation.
//!
//! Estimates are always buffered: the raw node estimate is multiplied by
//! the configured multiplier and ceiling-rounded before a caller ever
//! sees it. Simulation reuses estimation as a weak success signal: a node
//! rejects estimation for a transaction that would revert, so estimation
//! success predicts acceptance without tracing state changes.

use std::sync::Arc;
use wallet_cache::{keys, TtlCache};
use wallet_chain::abi::AbiCodec;
use wallet_chain::{ChainClient, GasProbe};
use wallet_types::{SimulationResult, TransactionRequest, WalletError};

use alloy_primitives::{Address, U256};

/// Gas estimation service.
pub struct GasEstimator {
	chain: Arc<dyn ChainClient>,
	codec: Arc<dyn AbiCodec>,
	multiplier: f64,
	cache: Option<Arc<TtlCache>>,
}

impl GasEstimator {
	pub fn new(
		chain: Arc<dyn ChainClient>,
		codec: Arc<dyn AbiCodec>,
		multiplier: f64,
		cache: Option<Arc<TtlCache>>,
	) -> Self {
		Self {
			chain,
			codec,
			multiplier,
			cache,
		}
	}

	/// Estimates a buffered gas limit for a prospective transaction.
	///
	/// The request's recipient must already be a canonical address; the
	/// orchestrator resolves names before estimating.
	pub async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, WalletError> {
		request
			.validate()
			.map_err(|e| WalletError::GasEstimation(e.to_string()))?;

		let to: Address = request.to.parse().map_err(|_| {
			WalletError::GasEstimation(format!("invalid destination address: {}", request.to))
		})?;

		let data = match &request.call {
			Some(call) => self
				.codec
				.encode_call(&call.abi, &call.function, &call.args)
				.map_err(|e| WalletError::GasEstimation(e.to_string()))?,
			None => Vec::new(),
		};

		let probe = GasProbe {
			to,
			value: request.value.unwrap_or(U256::ZERO),
			data,
		};

		let raw = self
			.chain
			.estimate_gas(probe)
			.await
			.map_err(|e| WalletError::GasEstimation(e.to_string()))?;

		Ok(apply_buffer(raw, self.multiplier))
	}

	/// Dry-runs a transaction: success means the node would accept it.
	///
	/// Estimation failure is read as a revert signal. This is a weak
	/// simulation with no state diff; `gas_used` is the buffered estimate,
	/// not a traced execution cost.
	pub async fn simulate_transaction(&self, request: &TransactionRequest) -> SimulationResult {
		match self.estimate_gas(request).await {
			Ok(gas) => SimulationResult {
				success: true,
				gas_used: gas,
				error: None,
			},
			Err(e) => SimulationResult {
				success: false,
				gas_used: 0,
				error: Some(e.to_string()),
			},
		}
	}

	/// Current gas price, cached under the fixed gas-price key.
	///
	/// Degrades to zero on any provider failure instead of propagating:
	/// this backs a non-critical fee-display path, so callers must treat
	/// zero as "unknown", not "free".
	pub async fn gas_price(&self) -> U256 {
		if let Some(cache) = &self.cache {
			if let Some(cached) = cache.get::<String>(keys::GAS_PRICE).await {
				if let Ok(price) = cached.parse::<U256>() {
					return price;
				}
			}
		}

		match self.chain.gas_price().await {
			Ok(price) => {
				if let Some(cache) = &self.cache {
					cache.set(keys::GAS_PRICE, &price.to_string()).await;
				}
				price
			}
			Err(e) => {
				tracing::warn!(error = %e, "gas price unavailable, degrading to zero");
				U256::ZERO
			}
		}
	}
}

/// Applies the buffer multiplier to a raw estimate, rounding up.
fn apply_buffer(raw: u64, multiplier: f64) -> u64 {
	(raw as f64 * multiplier).ceil() as u64
}
