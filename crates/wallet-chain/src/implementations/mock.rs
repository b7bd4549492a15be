//! Scriptable in-memory chain client for tests and development.
//!
//! Behaves like a deterministic remote node: balances, receipts, call
//! responses and failures are scripted up front, submissions are logged,
//! and every remote call is counted so tests can assert that validation
//! failures never reach the network.

use crate::{ChainClient, ChainError, GasProbe};
use alloy_primitives::{keccak256, Address, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use wallet_types::{Receipt, TransactionHash};

/// A logged submission accepted by the mock node.
#[derive(Debug, Clone)]
pub struct MockSubmission {
	pub to: Address,
	pub value: U256,
	/// Encoded call data, None for a plain transfer.
	pub data: Option<Vec<u8>>,
	pub gas_limit: Option<u64>,
	pub hash: TransactionHash,
}

struct MockState {
	balances: HashMap<Address, U256>,
	receipts: HashMap<Vec<u8>, Receipt>,
	estimate_response: Result<u64, String>,
	gas_price: Result<U256, String>,
	chain_id: u64,
	block_number: u64,
	fail_submissions_to: HashSet<Address>,
	call_responses: HashMap<(Address, [u8; 4]), Vec<u8>>,
	submissions: Vec<MockSubmission>,
	network_calls: u64,
	next_hash: u64,
}

impl Default for MockState {
	fn default() -> Self {
		Self {
			balances: HashMap::new(),
			receipts: HashMap::new(),
			estimate_response: Ok(21_000),
			gas_price: Ok(U256::from(1_000_000_000u64)),
			chain_id: 1,
			block_number: 0,
			fail_submissions_to: HashSet::new(),
			call_responses: HashMap::new(),
			submissions: Vec::new(),
			network_calls: 0,
			next_hash: 1,
		}
	}
}

/// Deterministic chain client backed by scripted in-memory state.
#[derive(Clone)]
pub struct MockChainClient {
	state: Arc<Mutex<MockState>>,
	address: String,
}

impl Default for MockChainClient {
	fn default() -> Self {
		Self::new()
	}
}

impl MockChainClient {
	pub fn new() -> Self {
		Self {
			state: Arc::new(Mutex::new(MockState::default())),
			address: "0x00000000000000000000000000000000000000a1".to_string(),
		}
	}

	/// Predicts the hash the mock assigns to the n-th submission (1-based).
	pub fn hash_of(n: u64) -> TransactionHash {
		let mut bytes = vec![0u8; 32];
		bytes[24..].copy_from_slice(&n.to_be_bytes());
		TransactionHash(bytes)
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
		self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	pub fn set_balance(&self, address: Address, balance: U256) {
		self.lock().balances.insert(address, balance);
	}

	pub fn set_receipt(&self, hash: &TransactionHash, receipt: Receipt) {
		self.lock().receipts.insert(hash.0.clone(), receipt);
	}

	pub fn set_estimate(&self, gas: u64) {
		self.lock().estimate_response = Ok(gas);
	}

	pub fn fail_estimate(&self, reason: &str) {
		self.lock().estimate_response = Err(reason.to_string());
	}

	pub fn set_gas_price(&self, price: U256) {
		self.lock().gas_price = Ok(price);
	}

	pub fn fail_gas_price(&self, reason: &str) {
		self.lock().gas_price = Err(reason.to_string());
	}

	pub fn set_chain_id(&self, chain_id: u64) {
		self.lock().chain_id = chain_id;
	}

	pub fn set_block_number(&self, block_number: u64) {
		self.lock().block_number = block_number;
	}

	/// Makes every submission to `to` fail with a scripted rejection.
	pub fn fail_submissions_to(&self, to: Address) {
		self.lock().fail_submissions_to.insert(to);
	}

	/// Scripts the return data for view calls to `to` with `selector`.
	pub fn set_call_response(&self, to: Address, selector: [u8; 4], response: Vec<u8>) {
		self.lock().call_responses.insert((to, selector), response);
	}

	pub fn submissions(&self) -> Vec<MockSubmission> {
		self.lock().submissions.clone()
	}

	/// Number of remote-node calls observed so far.
	pub fn network_calls(&self) -> u64 {
		self.lock().network_calls
	}

	fn submit(
		&self,
		to: Address,
		value: U256,
		data: Option<Vec<u8>>,
		gas_limit: Option<u64>,
	) -> Result<TransactionHash, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		if state.fail_submissions_to.contains(&to) {
			return Err(ChainError::Rejected(format!(
				"scripted submission failure for 0x{}",
				hex::encode(to.as_slice())
			)));
		}
		let hash = Self::hash_of(state.next_hash);
		state.next_hash += 1;
		state.submissions.push(MockSubmission {
			to,
			value,
			data,
			gas_limit,
			hash: hash.clone(),
		});
		Ok(hash)
	}
}

#[async_trait]
impl ChainClient for MockChainClient {
	fn address(&self) -> String {
		self.address.clone()
	}

	async fn submit_transfer(
		&self,
		to: Address,
		value: U256,
		gas_limit: Option<u64>,
	) -> Result<TransactionHash, ChainError> {
		self.submit(to, value, None, gas_limit)
	}

	async fn submit_call(
		&self,
		to: Address,
		data: Vec<u8>,
		value: U256,
		gas_limit: Option<u64>,
	) -> Result<TransactionHash, ChainError> {
		self.submit(to, value, Some(data), gas_limit)
	}

	async fn call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		if data.len() < 4 {
			return Err(ChainError::InvalidInput(
				"call data must carry a selector".to_string(),
			));
		}
		let selector = [data[0], data[1], data[2], data[3]];
		state
			.call_responses
			.get(&(to, selector))
			.cloned()
			.ok_or_else(|| ChainError::Rejected("no scripted response for call".to_string()))
	}

	async fn estimate_gas(&self, _probe: GasProbe) -> Result<u64, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		state
			.estimate_response
			.clone()
			.map_err(ChainError::Rejected)
	}

	async fn receipt(&self, hash: &TransactionHash) -> Result<Option<Receipt>, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		Ok(state.receipts.get(&hash.0).cloned())
	}

	async fn balance(&self, address: Address) -> Result<U256, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		Ok(state.balances.get(&address).copied().unwrap_or(U256::ZERO))
	}

	async fn block_number(&self) -> Result<u64, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		Ok(state.block_number)
	}

	async fn gas_price(&self) -> Result<U256, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		state.gas_price.clone().map_err(ChainError::Network)
	}

	async fn chain_id(&self) -> Result<u64, ChainError> {
		let mut state = self.lock();
		state.network_calls += 1;
		Ok(state.chain_id)
	}

	async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, ChainError> {
		// Deterministic pseudo-signature; enough for encoding tests.
		Ok(keccak256(message).to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_submissions_are_logged_in_order() {
		let chain = MockChainClient::new();
		let to = Address::from_slice(&[0x11; 20]);

		let first = chain
			.submit_transfer(to, U256::from(1u64), None)
			.await
			.unwrap();
		let second = chain
			.submit_transfer(to, U256::from(2u64), Some(21_000))
			.await
			.unwrap();

		assert_eq!(first, MockChainClient::hash_of(1));
		assert_eq!(second, MockChainClient::hash_of(2));
		let submissions = chain.submissions();
		assert_eq!(submissions.len(), 2);
		assert_eq!(submissions[1].gas_limit, Some(21_000));
	}

	#[tokio::test]
	async fn test_scripted_failure_and_call_counting() {
		let chain = MockChainClient::new();
		let bad = Address::from_slice(&[0x22; 20]);
		chain.fail_submissions_to(bad);

		let err = chain
			.submit_transfer(bad, U256::ZERO, None)
			.await
			.unwrap_err();
		assert!(matches!(err, ChainError::Rejected(_)));
		assert_eq!(chain.network_calls(), 1);
		assert!(chain.submissions().is_empty());
	}
}
