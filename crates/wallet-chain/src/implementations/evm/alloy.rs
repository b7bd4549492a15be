//! Alloy-backed chain client for EVM nodes over HTTP.
//!
//! Uses the Alloy provider stack for submission, estimation and queries.
//! The provider's wallet filler signs submissions with the single local
//! signing identity; `sign_message` uses the same key directly.

use crate::{ChainClient, ChainError, GasProbe};
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, FixedBytes, U256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::Http;
use async_trait::async_trait;
use std::sync::Arc;
use wallet_types::{canonical_address, Receipt, TransactionHash};

/// HTTP chain client holding one signing identity.
pub struct AlloyChainClient {
	provider: Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
	signer: PrivateKeySigner,
	address: String,
}

impl AlloyChainClient {
	/// Connects to an EVM node over HTTP with the given private key.
	pub fn connect(rpc_url: &str, private_key: &str) -> Result<Self, ChainError> {
		let url = rpc_url
			.parse()
			.map_err(|e| ChainError::Network(format!("Invalid RPC URL: {}", e)))?;

		let signer: PrivateKeySigner = private_key
			.parse()
			.map_err(|_| ChainError::Signer("Invalid private key format".to_string()))?;
		let address = canonical_address(&signer.address());

		let wallet = EthereumWallet::from(signer.clone());
		let provider = ProviderBuilder::new()
			.with_recommended_fillers()
			.wallet(wallet)
			.on_http(url);

		Ok(Self {
			provider: Arc::new(provider) as Arc<dyn Provider<Http<reqwest::Client>> + Send + Sync>,
			signer,
			address,
		})
	}

	fn fixed_hash(hash: &TransactionHash) -> Result<FixedBytes<32>, ChainError> {
		if hash.0.len() != 32 {
			return Err(ChainError::InvalidInput(format!(
				"transaction hash must be 32 bytes, got {}",
				hash.0.len()
			)));
		}
		Ok(FixedBytes::<32>::from_slice(&hash.0))
	}

	async fn send(&self, request: TransactionRequest) -> Result<TransactionHash, ChainError> {
		let pending = self
			.provider
			.send_transaction(request)
			.await
			.map_err(|e| ChainError::Network(format!("Failed to send transaction: {}", e)))?;

		let tx_hash = *pending.tx_hash();
		tracing::info!(tx_hash = %format!("0x{}", hex::encode(tx_hash.0)), "Submitted transaction");
		Ok(TransactionHash(tx_hash.0.to_vec()))
	}
}

#[async_trait]
impl ChainClient for AlloyChainClient {
	fn address(&self) -> String {
		self.address.clone()
	}

	async fn submit_transfer(
		&self,
		to: Address,
		value: U256,
		gas_limit: Option<u64>,
	) -> Result<TransactionHash, ChainError> {
		let mut request = TransactionRequest::default().to(to).value(value);
		if let Some(limit) = gas_limit {
			request.set_gas_limit(limit);
		}
		self.send(request).await
	}

	async fn submit_call(
		&self,
		to: Address,
		data: Vec<u8>,
		value: U256,
		gas_limit: Option<u64>,
	) -> Result<TransactionHash, ChainError> {
		let mut request = TransactionRequest::default()
			.to(to)
			.value(value)
			.input(data.into());
		if let Some(limit) = gas_limit {
			request.set_gas_limit(limit);
		}
		self.send(request).await
	}

	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
		let request = TransactionRequest::default().to(to).input(data.into());
		let result = self
			.provider
			.call(&request)
			.await
			.map_err(|e| ChainError::Rejected(format!("Call failed: {}", e)))?;
		Ok(result.to_vec())
	}

	async fn estimate_gas(&self, probe: GasProbe) -> Result<u64, ChainError> {
		let mut request = TransactionRequest::default()
			.to(probe.to)
			.value(probe.value);
		if !probe.data.is_empty() {
			request = request.input(probe.data.into());
		}
		self.provider
			.estimate_gas(&request)
			.await
			.map_err(|e| ChainError::Rejected(format!("Failed to estimate gas: {}", e)))
	}

	async fn receipt(&self, hash: &TransactionHash) -> Result<Option<Receipt>, ChainError> {
		let tx_hash = Self::fixed_hash(hash)?;
		match self.provider.get_transaction_receipt(tx_hash).await {
			Ok(Some(receipt)) => Ok(Some(Receipt {
				block_number: receipt.block_number,
				success: receipt.status(),
				gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
				effective_gas_price: U256::from(receipt.effective_gas_price),
			})),
			Ok(None) => Ok(None),
			Err(e) => Err(ChainError::Network(format!("Failed to get receipt: {}", e))),
		}
	}

	async fn balance(&self, address: Address) -> Result<U256, ChainError> {
		self.provider
			.get_balance(address)
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get balance: {}", e)))
	}

	async fn block_number(&self) -> Result<u64, ChainError> {
		self.provider
			.get_block_number()
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get block number: {}", e)))
	}

	async fn gas_price(&self) -> Result<U256, ChainError> {
		let gas_price = self
			.provider
			.get_gas_price()
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get gas price: {}", e)))?;
		Ok(U256::from(gas_price))
	}

	async fn chain_id(&self) -> Result<u64, ChainError> {
		self.provider
			.get_chain_id()
			.await
			.map_err(|e| ChainError::Network(format!("Failed to get chain id: {}", e)))
	}

	async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, ChainError> {
		let signature = self
			.signer
			.sign_message(message)
			.await
			.map_err(|e| ChainError::Signer(format!("Failed to sign message: {}", e)))?;
		Ok(signature.as_bytes().to_vec())
	}
}
