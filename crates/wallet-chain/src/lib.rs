//! Remote chain-node boundary for the wallet system.
//!
//! This crate defines the narrow collaborator contract the wallet depends
//! on: transaction submission, view calls, gas estimation, receipt and
//! balance queries, and message signing with the wallet's single signing
//! identity. Everything behind the trait is opaque to the rest of the
//! system; the wallet never reaches past it.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use thiserror::Error;
use wallet_types::{Receipt, TransactionHash};

/// ABI call encoding for contract interactions.
pub mod abi;

/// Re-export implementations
pub mod implementations {
	pub mod evm {
		pub mod alloy;
	}
	pub mod mock;
}

/// Errors that can occur at the chain-node boundary.
#[derive(Debug, Error)]
pub enum ChainError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the node rejects or reverts an execution.
	#[error("Execution rejected: {0}")]
	Rejected(String),
	/// Error that occurs when the signer capability fails.
	#[error("Signer error: {0}")]
	Signer(String),
	/// Error that occurs when an argument cannot be encoded or parsed.
	#[error("Invalid input: {0}")]
	InvalidInput(String),
}

/// A zero-gas probe transaction used for estimation and simulation.
#[derive(Debug, Clone)]
pub struct GasProbe {
	/// Destination address.
	pub to: Address,
	/// Value in base units.
	pub value: U256,
	/// Encoded call data; empty for a plain transfer.
	pub data: Vec<u8>,
}

/// Trait defining the interface to the remote chain node.
///
/// Implementations hold the wallet's signing identity: `submit_*` methods
/// sign with it implicitly and `sign_message` exposes it for payloads the
/// node never sees. Every async method is a suspension point; none retry
/// internally.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// The canonical (lowercase hex) address of the signing identity.
	fn address(&self) -> String;

	/// Submits a plain value transfer and returns the assigned hash.
	async fn submit_transfer(
		&self,
		to: Address,
		value: U256,
		gas_limit: Option<u64>,
	) -> Result<TransactionHash, ChainError>;

	/// Submits a contract interaction carrying encoded call data.
	async fn submit_call(
		&self,
		to: Address,
		data: Vec<u8>,
		value: U256,
		gas_limit: Option<u64>,
	) -> Result<TransactionHash, ChainError>;

	/// Executes a view call and returns the raw return data.
	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError>;

	/// Asks the node to estimate gas for a probe transaction.
	///
	/// A node that would revert the transaction rejects the estimation,
	/// which is what makes estimation usable as a weak simulation.
	async fn estimate_gas(&self, probe: GasProbe) -> Result<u64, ChainError>;

	/// Fetches the receipt for a transaction, or None if not yet mined.
	async fn receipt(&self, hash: &TransactionHash) -> Result<Option<Receipt>, ChainError>;

	/// Fetches the native balance of an address in base units.
	async fn balance(&self, address: Address) -> Result<U256, ChainError>;

	/// Current block height.
	async fn block_number(&self) -> Result<u64, ChainError>;

	/// Current recommended gas price in base units.
	async fn gas_price(&self) -> Result<U256, ChainError>;

	/// Chain id the node reports.
	async fn chain_id(&self) -> Result<u64, ChainError>;

	/// Signs an arbitrary message with the wallet's signing identity.
	async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, ChainError>;
}
