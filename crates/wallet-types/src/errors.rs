//! Error taxonomy for the wallet system.
//!
//! Every kind carries the contextual fields callers branch on: the failed
//! batch index and prior hashes, the unresolvable address, the offending
//! chain id. Message-only errors are deliberately limited to signing and
//! estimation, whose callers never need more than the reason.

use crate::transaction::TransactionHash;
use thiserror::Error;

/// Errors produced by the wallet transaction-lifecycle subsystem.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
	/// A transaction was rejected, reverted, or could not be tracked.
	#[error("Transaction failed: {message}")]
	Transaction {
		message: String,
		/// Hash of the transaction, when one was assigned.
		hash: Option<TransactionHash>,
		/// Machine-readable failure code, e.g. "reverted" or "timeout".
		code: Option<String>,
	},
	/// A contract interaction failed.
	#[error("Contract call failed at {contract_address}: {message}")]
	Contract {
		message: String,
		contract_address: String,
		function_name: Option<String>,
	},
	/// A name or address could not be resolved to a canonical address.
	#[error("Address resolution failed for {address}: {message}")]
	AddressResolution { message: String, address: String },
	/// The signer capability refused or failed to sign.
	#[error("Signing failed: {0}")]
	Signing(String),
	/// The remote node could not estimate gas for a prospective transaction.
	#[error("Gas estimation failed: {0}")]
	GasEstimation(String),
	/// A batch stopped at `failed_index`; the hashes of the transactions
	/// already on-chain are carried so callers can recover the prefix.
	#[error("Batch failed at index {failed_index}: {message}")]
	Batch {
		message: String,
		failed_index: usize,
		previous: Vec<TransactionHash>,
	},
	/// The connected node reported an unexpected chain id.
	#[error("Connected to unexpected chain {chain_id}")]
	ChainValidation { chain_id: u64 },
}
