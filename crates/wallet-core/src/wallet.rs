//! The wallet orchestrator.
//!
//! Composes the chain client with name resolution, gas estimation,
//! typed-data signing, caching, batch submission and lifecycle
//! monitoring behind one façade. Every send funnels through the batch
//! path so ordering, resolution, estimation and monitoring behave
//! identically for one transaction or twenty.

use std::sync::Arc;

use crate::batch::BatchTransactionHandler;
use crate::config::{ConfigError, WalletConfig};
use crate::ens::EnsResolver;
use crate::events::EventBus;
use crate::gas::GasEstimator;
use crate::monitor::{MonitorSettings, TransactionMonitor};
use crate::typed_data::TypedDataSigner;

use alloy_primitives::{Address, U256};
use tokio::sync::broadcast;
use wallet_cache::{keys, TtlCache};
use wallet_chain::abi::{AbiCodec, StaticAbiCodec};
use wallet_chain::ChainClient;
use wallet_types::{
	format_units, is_hex_address, BalanceInfo, ReadRequest, ReadResult, SimulationResult,
	SubmittedTransaction, TransactionDetails, TransactionEvent, TransactionHash,
	TransactionRequest, TypedData, WalletError,
};

/// High-level wallet façade over a single signing identity.
pub struct Wallet {
	chain: Arc<dyn ChainClient>,
	codec: Arc<dyn AbiCodec>,
	config: WalletConfig,
	cache: Arc<TtlCache>,
	estimator: GasEstimator,
	resolver: Option<EnsResolver>,
	typed_data: TypedDataSigner,
	monitor: TransactionMonitor,
	batch: BatchTransactionHandler,
	bus: EventBus,
}

impl std::fmt::Debug for Wallet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Wallet").finish_non_exhaustive()
	}
}

impl Wallet {
	/// Builds a wallet over a chain client, validating the configuration
	/// up front. All collaborators are constructed eagerly; nothing is
	/// initialized lazily on first use.
	pub fn new(chain: Arc<dyn ChainClient>, config: WalletConfig) -> Result<Self, ConfigError> {
		config.validate()?;
		let codec: Arc<dyn AbiCodec> = Arc::new(StaticAbiCodec);
		let cache = Arc::new(TtlCache::new(config.max_cache_age()));
		let bus = EventBus::default();

		let resolver = if config.enable_ens {
			let registry: Address =
				config
					.ens_registry
					.parse()
					.map_err(|_| ConfigError::InvalidValue {
						field: "ens_registry".to_string(),
						message: format!("not a valid address: {}", config.ens_registry),
					})?;
			Some(EnsResolver::new(
				Arc::clone(&chain),
				registry,
				Some(Arc::clone(&cache)),
			))
		} else {
			None
		};

		let estimator = GasEstimator::new(
			Arc::clone(&chain),
			Arc::clone(&codec),
			config.gas_multiplier,
			Some(Arc::clone(&cache)),
		);
		let typed_data = TypedDataSigner::new(Arc::clone(&chain));
		let monitor = TransactionMonitor::new(
			Arc::clone(&chain),
			bus.clone(),
			MonitorSettings {
				poll_interval: config.poll_interval(),
				timeout: config.transaction_timeout(),
				confirmations: config.confirmations,
				confirmation_mode: config.confirmation_mode,
			},
		);
		let batch = BatchTransactionHandler::new(Arc::clone(&chain), Arc::clone(&codec));

		Ok(Self {
			chain,
			codec,
			config,
			cache,
			estimator,
			resolver,
			typed_data,
			monitor,
			batch,
			bus,
		})
	}

	/// Canonical address of the wallet's signing identity.
	pub fn address(&self) -> String {
		self.chain.address()
	}

	/// Resolves a name or address to canonical lowercase hex.
	///
	/// With name resolution disabled only hex addresses pass through.
	pub async fn resolve_address(&self, input: &str) -> Result<String, WalletError> {
		match &self.resolver {
			Some(resolver) => resolver.resolve_address(input).await,
			None => {
				if is_hex_address(input) {
					Ok(input.to_lowercase())
				} else {
					Err(WalletError::AddressResolution {
						message: "name resolution is disabled".to_string(),
						address: input.to_string(),
					})
				}
			}
		}
	}

	/// Signs an arbitrary message; returns the signature as 0x-hex.
	pub async fn sign_message(&self, message: &[u8]) -> Result<String, WalletError> {
		let signature = self
			.chain
			.sign_message(message)
			.await
			.map_err(|e| WalletError::Signing(e.to_string()))?;
		Ok(format!("0x{}", hex::encode(signature)))
	}

	/// Signs a structured-data payload.
	pub async fn sign_typed_data(&self, payload: &TypedData) -> Result<String, WalletError> {
		self.typed_data.sign_typed_data(payload).await
	}

	/// Submits a single transaction.
	///
	/// A simulate-only request never reaches the network submission path;
	/// it returns the zero-hash sentinel on success and an error carrying
	/// the revert reason otherwise.
	pub async fn send_transaction(
		&self,
		request: &TransactionRequest,
	) -> Result<SubmittedTransaction, WalletError> {
		if request.simulate_only {
			let simulation = self.simulate_transaction(request).await?;
			if !simulation.success {
				return Err(WalletError::Transaction {
					message: simulation
						.error
						.unwrap_or_else(|| "simulation failed".to_string()),
					hash: None,
					code: Some("simulation_failed".to_string()),
				});
			}
			return Ok(SubmittedTransaction::simulation_sentinel());
		}

		let mut submitted = self
			.send_batch(std::slice::from_ref(request))
			.await
			.map_err(|e| match e {
				// A single send surfaces as a transaction failure, not a
				// batch failure.
				WalletError::Batch { message, .. } => WalletError::Transaction {
					message,
					hash: None,
					code: Some("submission_failed".to_string()),
				},
				other => other,
			})?;
		submitted.pop().ok_or_else(|| WalletError::Transaction {
			message: "submission returned no transaction".to_string(),
			hash: None,
			code: None,
		})
	}

	/// Submits a batch of transactions in strict order.
	///
	/// The whole batch is validated, resolved and estimated before the
	/// first submission. A mid-batch failure carries the failed index and
	/// the hashes of the prefix already on-chain. Accepted hashes are
	/// registered with the monitor when monitoring is enabled.
	pub async fn send_batch(
		&self,
		requests: &[TransactionRequest],
	) -> Result<Vec<SubmittedTransaction>, WalletError> {
		if requests.is_empty() {
			return Err(WalletError::Batch {
				message: "batch contains no transactions".to_string(),
				failed_index: 0,
				previous: Vec::new(),
			});
		}
		for (index, request) in requests.iter().enumerate() {
			request.validate().map_err(|e| WalletError::Batch {
				message: e.to_string(),
				failed_index: index,
				previous: Vec::new(),
			})?;
			if request.simulate_only {
				return Err(WalletError::Batch {
					message: "simulate-only requests cannot be batched".to_string(),
					failed_index: index,
					previous: Vec::new(),
				});
			}
		}

		self.validate_chain().await?;

		let mut prepared = Vec::with_capacity(requests.len());
		for request in requests {
			let mut request = request.clone();
			request.to = self.resolve_address(&request.to).await?;
			if request.gas_limit.is_none() && self.config.enable_gas_estimation {
				request.gas_limit = Some(self.estimator.estimate_gas(&request).await?);
			}
			prepared.push(request);
		}

		let submitted = self.batch.execute(&prepared).await?;

		if self.config.enable_monitoring {
			for transaction in &submitted {
				self.monitor.monitor_transaction(&transaction.hash, None, None);
			}
		}
		Ok(submitted)
	}

	/// Dry-runs a transaction without submitting it.
	pub async fn simulate_transaction(
		&self,
		request: &TransactionRequest,
	) -> Result<SimulationResult, WalletError> {
		let mut request = request.clone();
		request.to = self.resolve_address(&request.to).await?;
		Ok(self.estimator.simulate_transaction(&request).await)
	}

	/// Executes a contract view call.
	///
	/// Read failures never surface as errors: the result carries a
	/// success flag and the failure reason, and only successful reads are
	/// cached.
	pub async fn read(&self, request: &ReadRequest) -> ReadResult {
		let address = match self.resolve_address(&request.address).await {
			Ok(address) => address,
			Err(e) => return ReadResult::failed(e.to_string()),
		};
		let cache_key = keys::read(&address, &request.function, &request.args);
		if let Some(value) = self.cache.get::<serde_json::Value>(&cache_key).await {
			return ReadResult::ok(value);
		}

		let to: Address = match address.parse() {
			Ok(to) => to,
			Err(_) => return ReadResult::failed(format!("invalid contract address: {}", address)),
		};
		let data = match self
			.codec
			.encode_call(&request.abi, &request.function, &request.args)
		{
			Ok(data) => data,
			Err(e) => return ReadResult::failed(e.to_string()),
		};
		let raw = match self.chain.call(to, data).await {
			Ok(raw) => raw,
			Err(e) => return ReadResult::failed(e.to_string()),
		};
		match self.codec.decode_return(&request.abi, &request.function, &raw) {
			Ok(value) => {
				self.cache.set(&cache_key, &value).await;
				ReadResult::ok(value)
			}
			Err(e) => ReadResult::failed(e.to_string()),
		}
	}

	/// Native balance of an address, defaulting to the wallet's own.
	///
	/// Unlike `read`, a balance failure is an error: callers asking for a
	/// balance cannot do anything useful with a silent absence.
	pub async fn balance_of(&self, address: Option<&str>) -> Result<BalanceInfo, WalletError> {
		let owner = match address {
			Some(address) => self.resolve_address(address).await?,
			None => self.address(),
		};
		let cache_key = keys::balance(&owner, None);
		if let Some(cached) = self.cache.get::<BalanceInfo>(&cache_key).await {
			return Ok(cached);
		}

		let parsed: Address = owner.parse().map_err(|_| WalletError::AddressResolution {
			message: format!("invalid address: {}", owner),
			address: owner.clone(),
		})?;
		let raw = self
			.chain
			.balance(parsed)
			.await
			.map_err(|e| WalletError::Transaction {
				message: e.to_string(),
				hash: None,
				code: None,
			})?;

		let token = &self.config.native_token;
		let info = BalanceInfo {
			value: format_units(raw, token.decimals),
			base_units: raw.to_string(),
			decimals: token.decimals,
			symbol: token.symbol.clone(),
			name: token.name.clone(),
		};
		self.cache.set(&cache_key, &info).await;
		Ok(info)
	}

	/// Current gas price; degrades to zero when the node cannot report one.
	pub async fn gas_price(&self) -> U256 {
		self.estimator.gas_price().await
	}

	/// Current details of a transaction, monitored or not.
	pub async fn transaction_details(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionDetails, WalletError> {
		self.monitor.transaction_details(hash).await
	}

	/// Blocks until a hash reaches a terminal state.
	pub async fn wait_for_transaction(
		&self,
		hash: &TransactionHash,
		confirmations: Option<u64>,
	) -> Result<TransactionDetails, WalletError> {
		self.monitor
			.wait_for_transaction(hash, confirmations, None)
			.await
	}

	/// Subscribes to lifecycle events for all monitored transactions.
	pub fn subscribe_events(&self) -> broadcast::Receiver<TransactionEvent> {
		self.bus.subscribe()
	}

	/// Stops tracking a hash without emitting an event.
	pub fn unmonitor(&self, hash: &TransactionHash) {
		self.monitor.unmonitor(hash);
	}

	/// Releases monitoring tasks and cached state.
	///
	/// The wallet remains usable afterwards; dispose only cancels what is
	/// in flight.
	pub async fn dispose(&self) {
		self.monitor.dispose();
		self.cache.clear().await;
	}

	async fn validate_chain(&self) -> Result<(), WalletError> {
		let Some(expected) = self.config.expected_chain_id else {
			return Ok(());
		};
		let actual = self
			.chain
			.chain_id()
			.await
			.map_err(|e| WalletError::Transaction {
				message: e.to_string(),
				hash: None,
				code: None,
			})?;
		if actual != expected {
			tracing::error!(expected, actual, "refusing submission to unexpected chain");
			return Err(WalletError::ChainValidation { chain_id: actual });
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;
	use wallet_chain::implementations::mock::MockChainClient;
	use wallet_types::Receipt;

	const DEST: &str = "0x1111111111111111111111111111111111111111";

	fn wallet(chain: &MockChainClient, config: WalletConfig) -> Wallet {
		Wallet::new(Arc::new(chain.clone()), config).unwrap()
	}

	fn no_ens() -> WalletConfig {
		WalletConfig {
			enable_ens: false,
			..WalletConfig::default()
		}
	}

	#[tokio::test]
	async fn test_send_transfer_estimates_and_submits() {
		let chain = MockChainClient::new();
		chain.set_estimate(21_000);
		let wallet = wallet(&chain, no_ens());
		let request = TransactionRequest::transfer(DEST, U256::from(5u64));

		let submitted = wallet.send_transaction(&request).await.unwrap();
		assert_eq!(submitted.hash, MockChainClient::hash_of(1));

		let submissions = chain.submissions();
		assert_eq!(submissions.len(), 1);
		assert_eq!(submissions[0].value, U256::from(5u64));
		// 21000 buffered by the default 1.2 multiplier.
		assert_eq!(submissions[0].gas_limit, Some(25_200));
	}

	#[tokio::test]
	async fn test_explicit_gas_limit_skips_estimation() {
		let chain = MockChainClient::new();
		let wallet = wallet(&chain, no_ens());
		let request = TransactionRequest::transfer(DEST, U256::from(1u64)).with_gas_limit(50_000);

		wallet.send_transaction(&request).await.unwrap();
		assert_eq!(chain.submissions()[0].gas_limit, Some(50_000));
		// Only the submission itself touched the network.
		assert_eq!(chain.network_calls(), 1);
	}

	#[tokio::test]
	async fn test_estimation_disabled_submits_without_limit() {
		let chain = MockChainClient::new();
		let config = WalletConfig {
			enable_gas_estimation: false,
			..no_ens()
		};
		let wallet = wallet(&chain, config);

		wallet
			.send_transaction(&TransactionRequest::transfer(DEST, U256::from(1u64)))
			.await
			.unwrap();
		assert_eq!(chain.submissions()[0].gas_limit, None);
	}

	#[tokio::test]
	async fn test_simulate_only_returns_sentinel_without_submitting() {
		let chain = MockChainClient::new();
		let wallet = wallet(&chain, no_ens());
		let request = TransactionRequest::transfer(DEST, U256::from(1u64)).simulated();

		let submitted = wallet.send_transaction(&request).await.unwrap();
		assert_eq!(submitted.hash.0, vec![0u8; 32]);
		assert!(chain.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_simulate_only_failure_is_an_error() {
		let chain = MockChainClient::new();
		chain.fail_estimate("execution reverted");
		let wallet = wallet(&chain, no_ens());
		let request = TransactionRequest::transfer(DEST, U256::from(1u64)).simulated();

		let err = wallet.send_transaction(&request).await.unwrap_err();
		assert!(matches!(
			err,
			WalletError::Transaction { code: Some(ref c), .. } if c == "simulation_failed"
		));
	}

	#[tokio::test]
	async fn test_chain_validation_blocks_submission() {
		let chain = MockChainClient::new();
		chain.set_chain_id(1);
		let config = WalletConfig {
			expected_chain_id: Some(5),
			..no_ens()
		};
		let wallet = wallet(&chain, config);

		let err = wallet
			.send_transaction(&TransactionRequest::transfer(DEST, U256::from(1u64)))
			.await
			.unwrap_err();
		assert!(matches!(err, WalletError::ChainValidation { chain_id: 1 }));
		assert!(chain.submissions().is_empty());
	}

	#[tokio::test]
	async fn test_empty_batch_rejected_before_network() {
		let chain = MockChainClient::new();
		let wallet = wallet(&chain, no_ens());

		let err = wallet.send_batch(&[]).await.unwrap_err();
		assert!(matches!(err, WalletError::Batch { failed_index: 0, .. }));
		assert_eq!(chain.network_calls(), 0);
	}

	#[tokio::test]
	async fn test_batch_failure_carries_prefix_hashes() {
		let chain = MockChainClient::new();
		chain.fail_submissions_to(DEST.parse().unwrap());
		let wallet = wallet(&chain, no_ens());
		let good = "0x2222222222222222222222222222222222222222";

		let err = wallet
			.send_batch(&[
				TransactionRequest::transfer(good, U256::from(1u64)),
				TransactionRequest::transfer(DEST, U256::from(2u64)),
			])
			.await
			.unwrap_err();
		match err {
			WalletError::Batch {
				failed_index,
				previous,
				..
			} => {
				assert_eq!(failed_index, 1);
				assert_eq!(previous, vec![MockChainClient::hash_of(1)]);
			}
			other => panic!("expected batch error, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_submission_is_monitored_to_finality() {
		let chain = MockChainClient::new();
		chain.set_receipt(&MockChainClient::hash_of(1), Receipt {
			block_number: Some(3),
			success: true,
			gas_used: 21_000,
			effective_gas_price: U256::from(2u64),
		});
		chain.set_block_number(3);
		let wallet = wallet(&chain, no_ens());
		let mut events = wallet.subscribe_events();

		let submitted = wallet
			.send_transaction(&TransactionRequest::transfer(DEST, U256::from(1u64)))
			.await
			.unwrap();

		let confirmed = events.recv().await.unwrap();
		assert_eq!(*confirmed.hash(), submitted.hash);
		assert!(matches!(confirmed, TransactionEvent::Confirmed { .. }));
		let finalized = events.recv().await.unwrap();
		assert!(matches!(finalized, TransactionEvent::Finalized { .. }));
	}

	#[tokio::test]
	async fn test_read_failure_is_reported_not_raised() {
		let chain = MockChainClient::new();
		let wallet = wallet(&chain, no_ens());
		let request = ReadRequest {
			address: DEST.to_string(),
			function: "balanceOf".to_string(),
			args: vec![serde_json::json!(DEST)],
			abi: serde_json::json!([{
				"type": "function",
				"name": "balanceOf",
				"inputs": [{"name": "owner", "type": "address"}],
				"outputs": [{"name": "", "type": "uint256"}]
			}]),
		};

		// No scripted response: the mock rejects the call.
		let result = wallet.read(&request).await;
		assert!(!result.success);
		assert!(result.error.is_some());
	}

	#[tokio::test]
	async fn test_read_success_is_cached() {
		let chain = MockChainClient::new();
		let mut word = vec![0u8; 32];
		word[31] = 42;
		// balanceOf(address) selector.
		chain.set_call_response(DEST.parse().unwrap(), [0x70, 0xa0, 0x82, 0x31], word);
		let wallet = wallet(&chain, no_ens());
		let request = ReadRequest {
			address: DEST.to_string(),
			function: "balanceOf".to_string(),
			args: vec![serde_json::json!(DEST)],
			abi: serde_json::json!([{
				"type": "function",
				"name": "balanceOf",
				"inputs": [{"name": "owner", "type": "address"}],
				"outputs": [{"name": "", "type": "uint256"}]
			}]),
		};

		let first = wallet.read(&request).await;
		assert!(first.success);
		assert_eq!(first.value, serde_json::json!("42"));
		let calls = chain.network_calls();

		let second = wallet.read(&request).await;
		assert_eq!(second.value, first.value);
		assert_eq!(chain.network_calls(), calls);
	}

	#[tokio::test]
	async fn test_balance_formats_with_native_token_metadata() {
		let chain = MockChainClient::new();
		chain.set_balance(
			DEST.parse().unwrap(),
			U256::from(1_500_000_000_000_000_000u64),
		);
		let wallet = wallet(&chain, no_ens());

		let info = wallet.balance_of(Some(DEST)).await.unwrap();
		assert_eq!(info.value, "1.5");
		assert_eq!(info.base_units, "1500000000000000000");
		assert_eq!(info.symbol, "ETH");

		// Second lookup is served from the cache.
		let calls = chain.network_calls();
		wallet.balance_of(Some(DEST)).await.unwrap();
		assert_eq!(chain.network_calls(), calls);
	}

	#[tokio::test]
	async fn test_balance_defaults_to_own_address() {
		let chain = MockChainClient::new();
		let own: Address = chain.address().parse().unwrap();
		chain.set_balance(own, U256::from(42u64));
		let config = WalletConfig {
			native_token: wallet_types::TokenMetadata {
				symbol: "TEST".to_string(),
				name: "Test".to_string(),
				decimals: 0,
			},
			..no_ens()
		};
		let wallet = wallet(&chain, config);

		let info = wallet.balance_of(None).await.unwrap();
		assert_eq!(info.value, "42");
		assert_eq!(info.symbol, "TEST");
	}

	#[tokio::test]
	async fn test_resolution_disabled_rejects_names_only() {
		let chain = MockChainClient::new();
		let wallet = wallet(&chain, no_ens());

		assert_eq!(
			wallet.resolve_address(DEST).await.unwrap(),
			DEST.to_lowercase()
		);
		assert!(matches!(
			wallet.resolve_address("alice.eth").await,
			Err(WalletError::AddressResolution { .. })
		));
	}

	#[tokio::test]
	async fn test_sign_message_returns_prefixed_hex() {
		let chain = MockChainClient::new();
		let wallet = wallet(&chain, no_ens());

		let signature = wallet.sign_message(b"hello").await.unwrap();
		assert!(signature.starts_with("0x"));
		assert_eq!(signature.len(), 2 + 64);
	}

	#[tokio::test]
	async fn test_dispose_clears_cached_state() {
		let chain = MockChainClient::new();
		chain.set_balance(DEST.parse().unwrap(), U256::from(1u64));
		let wallet = wallet(&chain, no_ens());
		wallet.balance_of(Some(DEST)).await.unwrap();

		wallet.dispose().await;

		let calls = chain.network_calls();
		wallet.balance_of(Some(DEST)).await.unwrap();
		assert!(chain.network_calls() > calls);
	}

	#[test]
	fn test_invalid_registry_address_rejected_at_construction() {
		let config = WalletConfig {
			ens_registry: "not-an-address".to_string(),
			..WalletConfig::default()
		};
		let err = Wallet::new(Arc::new(MockChainClient::new()), config).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "ens_registry"));
	}
}
