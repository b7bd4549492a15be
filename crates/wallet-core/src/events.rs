//! Broadcast bus for transaction lifecycle events.
//!
//! A thin wrapper around a tokio broadcast channel. Publishing never
//! blocks; events sent while no subscriber exists are dropped, which is
//! the fire-and-forget contract monitoring callers expect.

use tokio::sync::broadcast;
use wallet_types::TransactionEvent;

/// Cloneable handle to the wallet's event channel.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<TransactionEvent>,
}

impl EventBus {
	/// Creates a bus buffering up to `capacity` undelivered events per
	/// subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Subscribes to all events published after this call.
	pub fn subscribe(&self) -> broadcast::Receiver<TransactionEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	///
	/// Fails only when no subscriber exists, which callers may ignore.
	pub fn publish(
		&self,
		event: TransactionEvent,
	) -> Result<usize, broadcast::error::SendError<TransactionEvent>> {
		self.sender.send(event)
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(64)
	}
}
