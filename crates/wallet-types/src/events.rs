//! Lifecycle events emitted by the transaction monitor.
//!
//! Events flow through a broadcast bus; subscribers filter by hash. Every
//! terminal event deregisters its entry before being published, so a hash
//! emits at most one of Finalized, Failed or TimedOut.

use crate::transaction::{TransactionDetails, TransactionHash};
use serde::{Deserialize, Serialize};

/// Events describing monitored transaction state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransactionEvent {
	/// The transaction received its first confirmation.
	Confirmed { details: TransactionDetails },
	/// The transaction reached the required confirmation depth. Terminal.
	Finalized { details: TransactionDetails },
	/// The transaction reverted on-chain. Terminal.
	Failed {
		hash: TransactionHash,
		error: String,
	},
	/// The deadline elapsed before any terminal state. Terminal.
	TimedOut { hash: TransactionHash },
}

impl TransactionEvent {
	/// The hash this event refers to.
	pub fn hash(&self) -> &TransactionHash {
		match self {
			TransactionEvent::Confirmed { details } | TransactionEvent::Finalized { details } => {
				&details.hash
			}
			TransactionEvent::Failed { hash, .. } | TransactionEvent::TimedOut { hash } => hash,
		}
	}

	/// Whether this event ends monitoring for its hash.
	pub fn is_terminal(&self) -> bool {
		!matches!(self, TransactionEvent::Confirmed { .. })
	}
}
