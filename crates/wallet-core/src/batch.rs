//! Ordered batch submission with partial-failure reporting.
//!
//! A batch is prepared in full before anything is submitted: every
//! request is shape-validated, its address parsed and its call data
//! encoded, so an invalid entry is rejected with nothing on-chain. The
//! submission order is the request order, and a mid-batch failure
//! reports the failed index together with the hashes already accepted,
//! letting callers recover the committed prefix.

use async_trait::async_trait;
use std::sync::Arc;
use wallet_chain::abi::AbiCodec;
use wallet_chain::ChainClient;
use wallet_types::{SubmittedTransaction, TransactionRequest, WalletError};

use alloy_primitives::{Address, U256};

/// A request that passed preparation and is ready to submit.
struct PreparedTransaction {
	to: Address,
	value: U256,
	/// Encoded call data, None for a plain transfer.
	data: Option<Vec<u8>>,
	gas_limit: Option<u64>,
}

/// How a batch of prepared transactions is driven onto the chain.
///
/// The sequential strategy is the only built-in; alternative orderings
/// (such as node-side atomic batching) plug in here.
#[async_trait]
pub trait BatchStrategy: Send + Sync {
	async fn submit(
		&self,
		chain: &dyn ChainClient,
		batch: Vec<PreparedBatch>,
	) -> Result<Vec<SubmittedTransaction>, WalletError>;
}

/// Opaque prepared unit handed to a strategy.
pub struct PreparedBatch {
	inner: PreparedTransaction,
}

/// Strict in-order submission; stops at the first failure.
pub struct SequentialStrategy;

#[async_trait]
impl BatchStrategy for SequentialStrategy {
	async fn submit(
		&self,
		chain: &dyn ChainClient,
		batch: Vec<PreparedBatch>,
	) -> Result<Vec<SubmittedTransaction>, WalletError> {
		let mut submitted: Vec<SubmittedTransaction> = Vec::with_capacity(batch.len());
		for (index, prepared) in batch.into_iter().enumerate() {
			let tx = prepared.inner;
			let result = match tx.data {
				Some(data) => {
					chain
						.submit_call(tx.to, data, tx.value, tx.gas_limit)
						.await
				}
				None => chain.submit_transfer(tx.to, tx.value, tx.gas_limit).await,
			};
			match result {
				Ok(hash) => {
					tracing::debug!(index, hash = %hash, "batch entry accepted");
					submitted.push(SubmittedTransaction::new(hash));
				}
				Err(e) => {
					tracing::warn!(index, error = %e, "batch stopped at failed entry");
					return Err(WalletError::Batch {
						message: e.to_string(),
						failed_index: index,
						previous: submitted.into_iter().map(|s| s.hash).collect(),
					});
				}
			}
		}
		Ok(submitted)
	}
}

/// Batch submission service.
pub struct BatchTransactionHandler {
	chain: Arc<dyn ChainClient>,
	codec: Arc<dyn AbiCodec>,
	strategy: Arc<dyn BatchStrategy>,
}

impl BatchTransactionHandler {
	pub fn new(chain: Arc<dyn ChainClient>, codec: Arc<dyn AbiCodec>) -> Self {
		Self::with_strategy(chain, codec, Arc::new(SequentialStrategy))
	}

	pub fn with_strategy(
		chain: Arc<dyn ChainClient>,
		codec: Arc<dyn AbiCodec>,
		strategy: Arc<dyn BatchStrategy>,
	) -> Self {
		Self {
			chain,
			codec,
			strategy,
		}
	}

	/// Submits a batch of requests in order.
	///
	/// Recipients must already be canonical addresses; name resolution
	/// happens upstream. An empty batch and any malformed entry are
	/// rejected before the first network access.
	pub async fn execute(
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

		let mut prepared = Vec::with_capacity(requests.len());
		for (index, request) in requests.iter().enumerate() {
			prepared.push(PreparedBatch {
				inner: self.prepare(request).map_err(|e| WalletError::Batch {
					message: e.to_string(),
					failed_index: index,
					previous: Vec::new(),
				})?,
			});
		}

		self.strategy.submit(self.chain.as_ref(), prepared).await
	}

	fn prepare(&self, request: &TransactionRequest) -> Result<PreparedTransaction, WalletError> {
		request.validate()?;
		let to: Address = request.to.parse().map_err(|_| WalletError::Transaction {
			message: format!("invalid destination address: {}", request.to),
			hash: None,
			code: Some("invalid_request".to_string()),
		})?;
		let data = match &request.call {
			Some(call) => Some(
				self.codec
					.encode_call(&call.abi, &call.function, &call.args)
					.map_err(|e| WalletError::Contract {
						message: e.to_string(),
						contract_address: request.to.clone(),
						function_name: Some(call.function.clone()),
					})?,
			),
			None => None,
		};
		Ok(PreparedTransaction {
			to,
			value: request.value.unwrap_or(U256::ZERO),
			data,
			gas_limit: request.gas_limit,
		})
	}
}
