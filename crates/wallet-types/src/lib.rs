//! Common types for the wallet transaction-lifecycle library.
//!
//! This crate defines the data model shared by every component of the
//! wallet: transaction requests and hashes, receipts and details, balance
//! information, typed-data payloads, lifecycle events, and the structured
//! error taxonomy callers branch on.

/// Balance representation and native-token metadata.
pub mod balance;
/// Structured error kinds carrying contextual fields.
pub mod errors;
/// Transaction lifecycle events emitted by the monitor.
pub mod events;
/// Transaction requests, hashes, receipts and read requests.
pub mod transaction;
/// Structured-data payloads for typed signing.
pub mod typed_data;
/// Formatting and address helpers.
pub mod utils;

pub use balance::{BalanceInfo, TokenMetadata};
pub use errors::WalletError;
pub use events::TransactionEvent;
pub use transaction::{
	ContractCall, ReadRequest, ReadResult, Receipt, SimulationResult, SubmittedTransaction,
	TransactionDetails, TransactionHash, TransactionRequest,
};
pub use typed_data::{TypedData, TypedDataDomain, TypedDataField};
pub use utils::{canonical_address, format_units, is_hex_address, truncate_hash, with_0x_prefix};
