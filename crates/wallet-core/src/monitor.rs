//! Polling transaction monitor.
//!
//! Tracks submitted hashes through pending, confirmed and finalized
//! states by polling the node for receipts. One background loop serves
//! all entries and parks itself when the registry drains; each entry
//! additionally owns a deadline task that fires a timeout if no terminal
//! state is reached in time. Terminal events deregister their entry
//! before publishing, so a hash emits at most one terminal event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::ConfirmationMode;
use crate::events::EventBus;
use wallet_chain::ChainClient;
use wallet_types::{TransactionDetails, TransactionEvent, TransactionHash, WalletError};

/// Minimum gap between receipt checks for a single entry.
///
/// Re-registering a hash or shrinking the poll interval must not turn
/// into a receipt-query storm against the node.
const MIN_CHECK_GAP: Duration = Duration::from_secs(2);

/// Timing and counting parameters for the monitor.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
	/// Gap between polling passes.
	pub poll_interval: Duration,
	/// Default deadline per transaction.
	pub timeout: Duration,
	/// Default required confirmation depth.
	pub confirmations: u64,
	pub confirmation_mode: ConfirmationMode,
}

struct MonitoredEntry {
	hash: TransactionHash,
	required_confirmations: u64,
	confirmations: u64,
	last_checked: Option<Instant>,
	deadline_task: JoinHandle<()>,
}

struct MonitorInner {
	chain: Arc<dyn ChainClient>,
	bus: EventBus,
	settings: MonitorSettings,
	entries: Mutex<HashMap<Vec<u8>, MonitoredEntry>>,
	poll_running: AtomicBool,
}

/// Transaction lifecycle monitor.
pub struct TransactionMonitor {
	inner: Arc<MonitorInner>,
}

impl TransactionMonitor {
	pub fn new(chain: Arc<dyn ChainClient>, bus: EventBus, settings: MonitorSettings) -> Self {
		Self {
			inner: Arc::new(MonitorInner {
				chain,
				bus,
				settings,
				entries: Mutex::new(HashMap::new()),
				poll_running: AtomicBool::new(false),
			}),
		}
	}

	/// Registers a hash for lifecycle tracking.
	///
	/// Re-registering a hash replaces the previous registration and
	/// restarts its deadline. The polling loop is started lazily on the
	/// first registration and parks itself once the registry drains.
	pub fn monitor_transaction(
		&self,
		hash: &TransactionHash,
		confirmations: Option<u64>,
		timeout: Option<Duration>,
	) {
		let required = confirmations.unwrap_or(self.inner.settings.confirmations).max(1);
		let deadline = timeout.unwrap_or(self.inner.settings.timeout);

		let deadline_task = {
			let inner = Arc::clone(&self.inner);
			let hash = hash.clone();
			tokio::spawn(async move {
				tokio::time::sleep(deadline).await;
				// Removal is the terminal guard: a concurrent terminal
				// transition already took the entry and this fires into
				// nothing.
				if MonitorInner::deregister(&inner, &hash) {
					tracing::warn!(hash = %hash, "transaction timed out before finality");
					let _ = inner.bus.publish(TransactionEvent::TimedOut { hash });
				}
			})
		};

		let replaced = {
			let mut entries = self.lock_entries();
			entries.insert(
				hash.0.clone(),
				MonitoredEntry {
					hash: hash.clone(),
					required_confirmations: required,
					confirmations: 0,
					last_checked: None,
					deadline_task,
				},
			)
		};
		if let Some(previous) = replaced {
			previous.deadline_task.abort();
		}

		self.ensure_poll_loop();
	}

	/// Stops tracking a hash without emitting an event.
	pub fn unmonitor(&self, hash: &TransactionHash) {
		MonitorInner::deregister(&self.inner, hash);
	}

	/// Whether a hash is currently registered.
	pub fn is_monitoring(&self, hash: &TransactionHash) -> bool {
		self.lock_entries().contains_key(&hash.0)
	}

	pub fn monitored_count(&self) -> usize {
		self.lock_entries().len()
	}

	/// Registers the hash and blocks until it reaches a terminal state.
	///
	/// Finalization resolves with the transaction details; a revert or a
	/// timeout resolves with an error carrying the matching code. The
	/// event subscription is taken before registration so a terminal
	/// event on a fast chain cannot slip past the caller.
	pub async fn wait_for_transaction(
		&self,
		hash: &TransactionHash,
		confirmations: Option<u64>,
		timeout: Option<Duration>,
	) -> Result<TransactionDetails, WalletError> {
		let mut events = self.inner.bus.subscribe();
		self.monitor_transaction(hash, confirmations, timeout);

		loop {
			match events.recv().await {
				Ok(event) => {
					if event.hash() != hash {
						continue;
					}
					match event {
						TransactionEvent::Confirmed { .. } => continue,
						TransactionEvent::Finalized { details } => return Ok(details),
						TransactionEvent::Failed { hash, error } => {
							return Err(WalletError::Transaction {
								message: error,
								hash: Some(hash),
								code: Some("reverted".to_string()),
							})
						}
						TransactionEvent::TimedOut { hash } => {
							return Err(WalletError::Transaction {
								message: "transaction was not finalized before the deadline"
									.to_string(),
								hash: Some(hash),
								code: Some("timeout".to_string()),
							})
						}
					}
				}
				Err(broadcast::error::RecvError::Lagged(_)) => continue,
				Err(broadcast::error::RecvError::Closed) => {
					return Err(WalletError::Transaction {
						message: "event channel closed while waiting".to_string(),
						hash: Some(hash.clone()),
						code: None,
					})
				}
			}
		}
	}

	/// Fetches the current details of a transaction, monitored or not.
	pub async fn transaction_details(
		&self,
		hash: &TransactionHash,
	) -> Result<TransactionDetails, WalletError> {
		let receipt = self
			.inner
			.chain
			.receipt(hash)
			.await
			.map_err(|e| WalletError::Transaction {
				message: e.to_string(),
				hash: Some(hash.clone()),
				code: None,
			})?;
		Ok(match receipt {
			Some(receipt) => TransactionDetails::from_receipt(hash.clone(), &receipt),
			None => TransactionDetails::pending(hash.clone()),
		})
	}

	/// Drops every registration and cancels all deadline tasks.
	pub fn dispose(&self) {
		let drained: Vec<MonitoredEntry> = {
			let mut entries = self.lock_entries();
			entries.drain().map(|(_, entry)| entry).collect()
		};
		for entry in drained {
			entry.deadline_task.abort();
		}
	}

	fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<Vec<u8>, MonitoredEntry>> {
		self.inner
			.entries
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn ensure_poll_loop(&self) {
		if self.inner.poll_running.swap(true, Ordering::SeqCst) {
			return;
		}
		let inner = Arc::clone(&self.inner);
		tokio::spawn(async move {
			loop {
				tokio::time::sleep(inner.settings.poll_interval).await;
				if MonitorInner::is_drained(&inner) {
					inner.poll_running.store(false, Ordering::SeqCst);
					// A registration may have raced the park decision;
					// reclaim the loop instead of leaving it orphaned.
					if MonitorInner::is_drained(&inner)
						|| inner.poll_running.swap(true, Ordering::SeqCst)
					{
						return;
					}
					continue;
				}
				MonitorInner::poll_once(&inner).await;
			}
		});
	}
}

impl Drop for TransactionMonitor {
	fn drop(&mut self) {
		self.dispose();
	}
}

impl MonitorInner {
	fn lock_entries(
		inner: &Arc<Self>,
	) -> std::sync::MutexGuard<'_, HashMap<Vec<u8>, MonitoredEntry>> {
		inner
			.entries
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn is_drained(inner: &Arc<Self>) -> bool {
		Self::lock_entries(inner).is_empty()
	}

	/// Removes an entry and cancels its deadline. Returns whether the
	/// entry was still registered, which makes terminal transitions
	/// idempotent across the poll loop and the deadline task.
	fn deregister(inner: &Arc<Self>, hash: &TransactionHash) -> bool {
		let removed = Self::lock_entries(inner).remove(&hash.0);
		match removed {
			Some(entry) => {
				entry.deadline_task.abort();
				true
			}
			None => false,
		}
	}

	/// One polling pass over all entries that are due for a check.
	///
	/// The registry lock is never held across network access: due hashes
	/// are snapshotted, receipts fetched, then results applied to
	/// whichever entries still exist.
	async fn poll_once(inner: &Arc<Self>) {
		let now = Instant::now();
		let due: Vec<TransactionHash> = {
			let mut entries = Self::lock_entries(inner);
			entries
				.values_mut()
				.filter(|entry| match entry.last_checked {
					Some(checked) => now.duration_since(checked) >= MIN_CHECK_GAP,
					None => true,
				})
				.map(|entry| {
					entry.last_checked = Some(now);
					entry.hash.clone()
				})
				.collect()
		};
		if due.is_empty() {
			return;
		}

		let height = match inner.settings.confirmation_mode {
			ConfirmationMode::Height => match inner.chain.block_number().await {
				Ok(height) => Some(height),
				Err(e) => {
					tracing::warn!(error = %e, "block height unavailable, skipping pass");
					return;
				}
			},
			ConfirmationMode::FirstSeen => None,
		};

		for hash in due {
			let receipt = match inner.chain.receipt(&hash).await {
				Ok(receipt) => receipt,
				Err(e) => {
					// Transient node failures leave the entry pending; the
					// deadline task bounds how long that can go on.
					tracing::debug!(hash = %hash, error = %e, "receipt query failed");
					continue;
				}
			};
			let Some(receipt) = receipt else {
				continue;
			};

			if !receipt.success {
				if Self::deregister(inner, &hash) {
					tracing::info!(hash = %hash, "transaction reverted");
					let _ = inner.bus.publish(TransactionEvent::Failed {
						hash,
						error: "transaction reverted on-chain".to_string(),
					});
				}
				continue;
			}

			let confirmations = match height {
				Some(height) => match receipt.block_number {
					Some(mined_at) if height >= mined_at => height - mined_at + 1,
					_ => 0,
				},
				// First-seen counting: a receipt is one confirmation.
				None => 1,
			};
			if confirmations == 0 {
				continue;
			}

			let details = TransactionDetails::from_receipt(hash.clone(), &receipt);
			let (first_confirmation, finalized) = {
				let mut entries = Self::lock_entries(inner);
				let Some(entry) = entries.get_mut(&hash.0) else {
					continue;
				};
				let first = entry.confirmations == 0;
				entry.confirmations = confirmations;
				(first, confirmations >= entry.required_confirmations)
			};

			if first_confirmation {
				let _ = inner.bus.publish(TransactionEvent::Confirmed {
					details: details.clone(),
				});
			}
			if finalized && Self::deregister(inner, &hash) {
				tracing::info!(hash = %hash, confirmations, "transaction finalized");
				let _ = inner.bus.publish(TransactionEvent::Finalized { details });
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;
	use wallet_chain::implementations::mock::MockChainClient;
	use wallet_types::Receipt;

	fn settings() -> MonitorSettings {
		MonitorSettings {
			poll_interval: Duration::from_secs(5),
			timeout: Duration::from_secs(60),
			confirmations: 1,
			confirmation_mode: ConfirmationMode::Height,
		}
	}

	fn monitor(chain: &MockChainClient, settings: MonitorSettings) -> (TransactionMonitor, EventBus) {
		let bus = EventBus::new(16);
		let monitor = TransactionMonitor::new(Arc::new(chain.clone()), bus.clone(), settings);
		(monitor, bus)
	}

	fn receipt(block: u64, success: bool) -> Receipt {
		Receipt {
			block_number: Some(block),
			success,
			gas_used: 21_000,
			effective_gas_price: U256::from(1u64),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_timeout_when_never_mined() {
		let chain = MockChainClient::new();
		let (monitor, bus) = monitor(&chain, settings());
		let hash = MockChainClient::hash_of(1);
		let mut events = bus.subscribe();

		monitor.monitor_transaction(&hash, None, Some(Duration::from_secs(30)));

		let event = events.recv().await.unwrap();
		assert!(matches!(event, TransactionEvent::TimedOut { hash: ref h } if *h == hash));
		assert!(!monitor.is_monitoring(&hash));
	}

	#[tokio::test(start_paused = true)]
	async fn test_revert_emits_failed_once() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(1);
		chain.set_receipt(&hash, receipt(5, false));
		chain.set_block_number(5);
		let (monitor, bus) = monitor(&chain, settings());
		let mut events = bus.subscribe();

		monitor.monitor_transaction(&hash, None, None);

		let event = events.recv().await.unwrap();
		assert!(matches!(event, TransactionEvent::Failed { hash: ref h, .. } if *h == hash));
		assert!(!monitor.is_monitoring(&hash));
	}

	#[tokio::test(start_paused = true)]
	async fn test_confirmed_then_finalized_at_depth_one() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(1);
		chain.set_receipt(&hash, receipt(5, true));
		chain.set_block_number(5);
		let (monitor, bus) = monitor(&chain, settings());
		let mut events = bus.subscribe();

		monitor.monitor_transaction(&hash, Some(1), None);

		let first = events.recv().await.unwrap();
		assert!(matches!(first, TransactionEvent::Confirmed { .. }));
		let second = events.recv().await.unwrap();
		match second {
			TransactionEvent::Finalized { details } => {
				assert_eq!(details.hash, hash);
				assert_eq!(details.block_number, Some(5));
				assert_eq!(details.success, Some(true));
			}
			other => panic!("expected finalized, got {:?}", other),
		}
		assert!(!monitor.is_monitoring(&hash));
	}

	#[tokio::test(start_paused = true)]
	async fn test_depth_accumulates_across_passes() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(1);
		chain.set_receipt(&hash, receipt(5, true));
		chain.set_block_number(5);
		let (monitor, bus) = monitor(&chain, settings());
		let mut events = bus.subscribe();

		monitor.monitor_transaction(&hash, Some(3), None);

		// First pass: one confirmation, not yet final.
		assert!(matches!(
			events.recv().await.unwrap(),
			TransactionEvent::Confirmed { .. }
		));
		assert!(monitor.is_monitoring(&hash));

		// Chain advances to height 7: 7 - 5 + 1 = 3 confirmations.
		chain.set_block_number(7);
		let event = events.recv().await.unwrap();
		assert!(matches!(event, TransactionEvent::Finalized { .. }));
		assert!(!monitor.is_monitoring(&hash));
	}

	#[tokio::test(start_paused = true)]
	async fn test_first_seen_mode_without_heights() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(1);
		chain.set_receipt(
			&hash,
			Receipt {
				block_number: None,
				success: true,
				gas_used: 21_000,
				effective_gas_price: U256::from(1u64),
			},
		);
		let mut settings = settings();
		settings.confirmation_mode = ConfirmationMode::FirstSeen;
		let (monitor, bus) = monitor(&chain, settings);
		let mut events = bus.subscribe();

		monitor.monitor_transaction(&hash, Some(1), None);

		assert!(matches!(
			events.recv().await.unwrap(),
			TransactionEvent::Confirmed { .. }
		));
		assert!(matches!(
			events.recv().await.unwrap(),
			TransactionEvent::Finalized { .. }
		));
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_for_transaction_resolves_on_finality() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(1);
		chain.set_receipt(&hash, receipt(10, true));
		chain.set_block_number(10);
		let (monitor, _bus) = monitor(&chain, settings());

		let details = monitor
			.wait_for_transaction(&hash, Some(1), None)
			.await
			.unwrap();
		assert_eq!(details.hash, hash);
		assert_eq!(details.fee, Some(U256::from(21_000u64)));
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_for_transaction_times_out_with_code() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(1);
		let (monitor, _bus) = monitor(&chain, settings());

		let err = monitor
			.wait_for_transaction(&hash, None, Some(Duration::from_secs(10)))
			.await
			.unwrap_err();
		match err {
			WalletError::Transaction { code, .. } => {
				assert_eq!(code.as_deref(), Some("timeout"));
			}
			other => panic!("expected transaction error, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_wait_for_transaction_reports_revert() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(1);
		chain.set_receipt(&hash, receipt(3, false));
		chain.set_block_number(3);
		let (monitor, _bus) = monitor(&chain, settings());

		let err = monitor
			.wait_for_transaction(&hash, None, None)
			.await
			.unwrap_err();
		match err {
			WalletError::Transaction { code, hash: h, .. } => {
				assert_eq!(code.as_deref(), Some("reverted"));
				assert_eq!(h, Some(hash));
			}
			other => panic!("expected transaction error, got {:?}", other),
		}
	}

	#[tokio::test(start_paused = true)]
	async fn test_details_for_unmonitored_pending_hash() {
		let chain = MockChainClient::new();
		let hash = MockChainClient::hash_of(9);
		let (monitor, _bus) = monitor(&chain, settings());

		let details = monitor.transaction_details(&hash).await.unwrap();
		assert_eq!(details.hash, hash);
		assert_eq!(details.success, None);
	}

	#[tokio::test(start_paused = true)]
	async fn test_dispose_cancels_everything() {
		let chain = MockChainClient::new();
		let (monitor, bus) = monitor(&chain, settings());
		let mut events = bus.subscribe();
		monitor.monitor_transaction(&MockChainClient::hash_of(1), None, Some(Duration::from_secs(5)));
		monitor.monitor_transaction(&MockChainClient::hash_of(2), None, Some(Duration::from_secs(5)));
		assert_eq!(monitor.monitored_count(), 2);

		monitor.dispose();
		assert_eq!(monitor.monitored_count(), 0);

		// Past every deadline: aborted tasks must not have fired.
		tokio::time::sleep(Duration::from_secs(30)).await;
		assert!(matches!(
			events.try_recv(),
			Err(broadcast::error::TryRecvError::Empty)
		));
	}
}
