//! Transaction types for the wallet system.
//!
//! Defines the request shape callers hand to the wallet, the hash and
//! receipt types returned by the remote node, and the derived detail
//! structures served to callers.

use crate::errors::WalletError;
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Blockchain transaction hash representation.
///
/// Stores transaction hashes as raw bytes; display and logging always go
/// through the 0x-prefixed hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHash(pub Vec<u8>);

impl TransactionHash {
	/// Returns the 0x-prefixed lowercase hex form of the hash.
	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

impl std::fmt::Display for TransactionHash {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

/// A contract interaction attached to a transaction request.
///
/// The ABI descriptor and function name always travel together, making the
/// half-specified contract shape unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractCall {
	/// JSON ABI descriptor of the target contract (array of entries).
	pub abi: serde_json::Value,
	/// Name of the function to invoke.
	pub function: String,
	/// Positional arguments for the call.
	#[serde(default)]
	pub args: Vec<serde_json::Value>,
}

/// A prospective transaction submitted by a caller.
///
/// A request is either a plain transfer (no `call`) or a contract
/// interaction (`call` present); those are the only two valid shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
	/// Recipient: a 0x hex address or a resolvable name.
	pub to: String,
	/// Value to transfer in base units.
	#[serde(default)]
	pub value: Option<U256>,
	/// Optional contract interaction.
	#[serde(default)]
	pub call: Option<ContractCall>,
	/// Explicit gas limit; when absent the wallet estimates one.
	#[serde(default)]
	pub gas_limit: Option<u64>,
	/// When set, the transaction is only simulated, never submitted.
	#[serde(default)]
	pub simulate_only: bool,
}

impl TransactionRequest {
	/// Creates a plain value transfer request.
	pub fn transfer(to: impl Into<String>, value: U256) -> Self {
		Self {
			to: to.into(),
			value: Some(value),
			call: None,
			gas_limit: None,
			simulate_only: false,
		}
	}

	/// Creates a contract interaction request.
	pub fn contract(to: impl Into<String>, call: ContractCall) -> Self {
		Self {
			to: to.into(),
			value: None,
			call: Some(call),
			gas_limit: None,
			simulate_only: false,
		}
	}

	/// Sets an explicit gas limit, bypassing estimation.
	pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
		self.gas_limit = Some(gas_limit);
		self
	}

	/// Marks the request as simulate-only.
	pub fn simulated(mut self) -> Self {
		self.simulate_only = true;
		self
	}

	/// Validates the request shape before any network access.
	///
	/// Rejects empty recipients, empty function names and non-array ABI
	/// descriptors. Contract fields cannot be half-specified by
	/// construction, so only their content is checked here.
	pub fn validate(&self) -> Result<(), WalletError> {
		if self.to.is_empty() {
			return Err(WalletError::Transaction {
				message: "transaction recipient is empty".to_string(),
				hash: None,
				code: Some("invalid_request".to_string()),
			});
		}
		if let Some(call) = &self.call {
			if call.function.is_empty() {
				return Err(WalletError::Contract {
					message: "contract call function name is empty".to_string(),
					contract_address: self.to.clone(),
					function_name: None,
				});
			}
			if !call.abi.is_array() {
				return Err(WalletError::Contract {
					message: "contract ABI descriptor must be a JSON array".to_string(),
					contract_address: self.to.clone(),
					function_name: Some(call.function.clone()),
				});
			}
		}
		Ok(())
	}
}

/// A transaction accepted by the remote node.
///
/// Immutable once created; the monitor receives the hash by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTransaction {
	/// Hash assigned by the remote node.
	pub hash: TransactionHash,
	/// Unix timestamp of the submission acknowledgment.
	pub submitted_at: u64,
}

impl SubmittedTransaction {
	/// Creates a record for a freshly acknowledged submission.
	pub fn new(hash: TransactionHash) -> Self {
		Self {
			hash,
			submitted_at: unix_now(),
		}
	}

	/// Sentinel returned by simulate-only sends: the zero hash marks that
	/// nothing was submitted to the network.
	pub fn simulation_sentinel() -> Self {
		Self {
			hash: TransactionHash(vec![0u8; 32]),
			submitted_at: unix_now(),
		}
	}
}

fn unix_now() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

/// Receipt data returned by the remote node for a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
	/// The block the transaction was included in, when known.
	pub block_number: Option<u64>,
	/// Whether the transaction executed successfully.
	pub success: bool,
	/// Gas consumed by the execution.
	pub gas_used: u64,
	/// Effective gas price paid, in base units.
	pub effective_gas_price: U256,
}

/// Derived, read-only view of a transaction's state.
///
/// All fields except the hash are absent until a receipt exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDetails {
	/// The transaction hash.
	pub hash: TransactionHash,
	/// Inclusion block, when mined.
	pub block_number: Option<u64>,
	/// Execution status, when mined.
	pub success: Option<bool>,
	/// Gas consumed, when mined.
	pub gas_used: Option<u64>,
	/// Effective gas price, when mined.
	pub effective_gas_price: Option<U256>,
	/// Total fee paid (gas_used * effective_gas_price), when mined.
	pub fee: Option<U256>,
}

impl TransactionDetails {
	/// Minimal details for a transaction with no receipt yet.
	pub fn pending(hash: TransactionHash) -> Self {
		Self {
			hash,
			block_number: None,
			success: None,
			gas_used: None,
			effective_gas_price: None,
			fee: None,
		}
	}

	/// Details derived from a node receipt.
	pub fn from_receipt(hash: TransactionHash, receipt: &Receipt) -> Self {
		Self {
			hash,
			block_number: receipt.block_number,
			success: Some(receipt.success),
			gas_used: Some(receipt.gas_used),
			effective_gas_price: Some(receipt.effective_gas_price),
			fee: Some(receipt.effective_gas_price * U256::from(receipt.gas_used)),
		}
	}
}

/// Result of a dry-run simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
	/// Whether the transaction would be accepted by the node.
	pub success: bool,
	/// Buffered gas estimate when successful, zero otherwise.
	pub gas_used: u64,
	/// Revert or estimation error when unsuccessful.
	pub error: Option<String>,
}

/// A contract view-call request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadRequest {
	/// Contract address or resolvable name.
	pub address: String,
	/// View function to call.
	pub function: String,
	/// Positional arguments.
	#[serde(default)]
	pub args: Vec<serde_json::Value>,
	/// JSON ABI descriptor of the contract.
	pub abi: serde_json::Value,
}

/// Outcome of a contract view call.
///
/// Read failures are reported through the `success` flag rather than an
/// error, so callers decide whether absence is fatal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResult {
	/// Decoded return value, or null on failure.
	pub value: serde_json::Value,
	/// Whether the call succeeded.
	pub success: bool,
	/// Failure description when unsuccessful.
	#[serde(default)]
	pub error: Option<String>,
}

impl ReadResult {
	/// A successful read result.
	pub fn ok(value: serde_json::Value) -> Self {
		Self {
			value,
			success: true,
			error: None,
		}
	}

	/// A failed read result carrying the failure description.
	pub fn failed(error: impl Into<String>) -> Self {
		Self {
			value: serde_json::Value::Null,
			success: false,
			error: Some(error.into()),
		}
	}
}
