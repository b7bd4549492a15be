//! Wallet configuration.
//!
//! All lifecycle behavior is tuned here: which optional services are
//! enabled, the gas buffer, confirmation depth, monitor timing, cache TTL
//! and the name-registry address. The struct deserializes from TOML with
//! per-field defaults so partial configuration files work.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use wallet_types::TokenMetadata;

/// The canonical name-registry contract on Ethereum mainnet.
pub const DEFAULT_ENS_REGISTRY: &str = "0x00000000000c2e074ec69a0dfb2997ba6c7d2e1e";

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("Failed to parse configuration: {0}")]
	Parse(String),
	#[error("Invalid value for {field}: {message}")]
	InvalidValue { field: String, message: String },
}

/// How the monitor counts confirmations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationMode {
	/// True confirmation counting from the chain height:
	/// confirmations = height - receipt height + 1.
	#[default]
	Height,
	/// Synthesize one confirmation as soon as a receipt exists. Weaker
	/// than height counting: with this mode a required depth above 1 can
	/// never be reached, so it only suits nodes that expose no height.
	FirstSeen,
}

/// Configuration for a wallet instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
	/// Resolve human-readable names through the on-chain registry.
	#[serde(default = "default_true")]
	pub enable_ens: bool,
	/// Estimate gas for requests without an explicit limit.
	#[serde(default = "default_true")]
	pub enable_gas_estimation: bool,
	/// Register submitted hashes with the transaction monitor.
	#[serde(default = "default_true")]
	pub enable_monitoring: bool,
	/// Buffer applied to raw gas estimates, ceiling-rounded.
	#[serde(default = "default_gas_multiplier")]
	pub gas_multiplier: f64,
	/// Default required confirmation depth.
	#[serde(default = "default_confirmations")]
	pub confirmations: u64,
	/// Monitor deadline per transaction, in milliseconds.
	#[serde(default = "default_transaction_timeout_ms")]
	pub transaction_timeout_ms: u64,
	/// Monitor polling interval, in milliseconds.
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
	/// Cache entry time-to-live, in milliseconds.
	#[serde(default = "default_max_cache_age_ms")]
	pub max_cache_age_ms: u64,
	/// Name-registry contract address.
	#[serde(default = "default_ens_registry")]
	pub ens_registry: String,
	/// When set, submissions are rejected unless the node reports this
	/// chain id.
	#[serde(default)]
	pub expected_chain_id: Option<u64>,
	#[serde(default)]
	pub confirmation_mode: ConfirmationMode,
	/// Metadata of the chain's native token, used for balance display.
	#[serde(default)]
	pub native_token: TokenMetadata,
}

fn default_true() -> bool {
	true
}

fn default_gas_multiplier() -> f64 {
	1.2
}

fn default_confirmations() -> u64 {
	1
}

fn default_transaction_timeout_ms() -> u64 {
	60_000
}

fn default_poll_interval_ms() -> u64 {
	5_000
}

fn default_max_cache_age_ms() -> u64 {
	30_000
}

fn default_ens_registry() -> String {
	DEFAULT_ENS_REGISTRY.to_string()
}

impl Default for WalletConfig {
	fn default() -> Self {
		Self {
			enable_ens: default_true(),
			enable_gas_estimation: default_true(),
			enable_monitoring: default_true(),
			gas_multiplier: default_gas_multiplier(),
			confirmations: default_confirmations(),
			transaction_timeout_ms: default_transaction_timeout_ms(),
			poll_interval_ms: default_poll_interval_ms(),
			max_cache_age_ms: default_max_cache_age_ms(),
			ens_registry: default_ens_registry(),
			expected_chain_id: None,
			confirmation_mode: ConfirmationMode::default(),
			native_token: TokenMetadata::default(),
		}
	}
}

impl WalletConfig {
	/// Loads configuration from a TOML document and validates it.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		let config: Self =
			toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
		config.validate()?;
		Ok(config)
	}

	/// Validates tunable ranges.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if !self.gas_multiplier.is_finite() || self.gas_multiplier < 1.0 {
			return Err(ConfigError::InvalidValue {
				field: "gas_multiplier".to_string(),
				message: "must be a finite value >= 1.0".to_string(),
			});
		}
		if self.confirmations == 0 {
			return Err(ConfigError::InvalidValue {
				field: "confirmations".to_string(),
				message: "must be >= 1".to_string(),
			});
		}
		if self.poll_interval_ms == 0 {
			return Err(ConfigError::InvalidValue {
				field: "poll_interval_ms".to_string(),
				message: "must be > 0".to_string(),
			});
		}
		Ok(())
	}

	pub fn transaction_timeout(&self) -> Duration {
		Duration::from_millis(self.transaction_timeout_ms)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}

	pub fn max_cache_age(&self) -> Duration {
		Duration::from_millis(self.max_cache_age_ms)
	}
}
