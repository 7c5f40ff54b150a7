use std::{
	collections::HashMap,
	sync::Mutex,
	time::Duration,
};

use batchswap_hook_client::api::HookApi;
use batchswap_primitives::{compute_commitment_hash, CommitmentHash, PoolKey, RevealData, SwapIntent};
use ethers::types::H256;

/// Outcome of validating a single reveal before it is allowed to reach the network (spec §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealValidation {
	pub is_valid: bool,
	pub errors: Vec<String>,
}

/// Outcome of attempting to submit one buffered reveal (spec §4.2 `submit_all_reveals`).
#[derive(Debug, Clone)]
pub struct SubmitRevealResult {
	pub commitment_hash: CommitmentHash,
	pub success: bool,
	pub error: Option<String>,
}

fn validate_reveal_data(reveal: &RevealData, now_unix: u64) -> RevealValidation {
	let mut errors = Vec::new();

	if reveal.intent.amount_in.is_zero() {
		errors.push("amount_in is zero".to_string());
	}
	if reveal.intent.deadline_unix < now_unix {
		errors.push(format!(
			"deadline {} has already elapsed (now {now_unix})",
			reveal.intent.deadline_unix
		));
	}
	if !reveal.is_zk_verified {
		let computed = compute_commitment_hash(&reveal.intent);
		if computed != reveal.commitment_hash {
			errors.push(format!(
				"commitment hash mismatch: expected {}, computed {}",
				reveal.commitment_hash, computed
			));
		}
	}

	RevealValidation { is_valid: errors.is_empty(), errors }
}

struct State {
	reveals: HashMap<CommitmentHash, RevealData>,
	/// Insertion order of commitment hashes per pool, preserving FIFO submission order
	/// independently of the unordered `reveals` map.
	order: HashMap<H256, Vec<CommitmentHash>>,
}

/// Holds reveals the caller intends to submit, validates them before any network I/O, drives
/// submission in FIFO order per pool, and tracks the submitted/executed lifecycle (spec §4.2).
pub struct RevealManager {
	state: Mutex<State>,
	submission_delay: Option<Duration>,
}

impl RevealManager {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(State { reveals: HashMap::new(), order: HashMap::new() }),
			submission_delay: None,
		}
	}

	pub fn with_submission_delay(submission_delay_ms: u64) -> Self {
		Self {
			state: Mutex::new(State { reveals: HashMap::new(), order: HashMap::new() }),
			submission_delay: Some(Duration::from_millis(submission_delay_ms)),
		}
	}

	/// Ignored if a reveal with the same `commitment_hash` already exists (spec §4.2, §8
	/// idempotence property).
	pub fn add_reveal(
		&self,
		commitment_hash: CommitmentHash,
		intent: SwapIntent,
		pool_key: PoolKey,
		pool_id: H256,
		is_zk_verified: bool,
	) {
		let mut state = self.state.lock().unwrap();
		if state.reveals.contains_key(&commitment_hash) {
			return
		}
		state.reveals.insert(
			commitment_hash,
			RevealData::new(commitment_hash, intent, pool_key, pool_id, is_zk_verified),
		);
		state.order.entry(pool_id).or_default().push(commitment_hash);
	}

	pub fn get_reveals_for_pool(&self, pool_id: H256) -> Vec<RevealData> {
		let state = self.state.lock().unwrap();
		state
			.order
			.get(&pool_id)
			.into_iter()
			.flatten()
			.filter_map(|hash| state.reveals.get(hash).cloned())
			.collect()
	}

	pub fn get_submitted_hashes_for_pool(&self, pool_id: H256) -> Vec<CommitmentHash> {
		let state = self.state.lock().unwrap();
		state
			.order
			.get(&pool_id)
			.into_iter()
			.flatten()
			.filter(|hash| state.reveals.get(hash).map(|r| r.submitted_on_chain).unwrap_or(false))
			.copied()
			.collect()
	}

	pub fn get_pending_count(&self) -> u32 {
		let state = self.state.lock().unwrap();
		state.reveals.values().filter(|r| !r.submitted_on_chain).count() as u32
	}

	pub fn validate_reveal(&self, commitment_hash: CommitmentHash, now_unix: u64) -> Option<RevealValidation> {
		let state = self.state.lock().unwrap();
		state.reveals.get(&commitment_hash).map(|reveal| validate_reveal_data(reveal, now_unix))
	}

	/// For each pending reveal in FIFO order, validates it, then submits it via the hook's ZK or
	/// non-ZK reveal call, marking it submitted on success or recording the error on failure
	/// (spec §4.2). An optional `submission_delay_ms` pause runs between successive submissions.
	pub async fn submit_all_reveals(
		&self,
		hook: &dyn HookApi,
		now_unix: u64,
	) -> Vec<SubmitRevealResult> {
		let pending: Vec<(H256, CommitmentHash)> = {
			let state = self.state.lock().unwrap();
			let mut out = Vec::new();
			for (pool_id, hashes) in state.order.iter() {
				for hash in hashes {
					if let Some(reveal) = state.reveals.get(hash) {
						if !reveal.submitted_on_chain {
							out.push((*pool_id, *hash));
						}
					}
				}
			}
			out
		};

		let mut results = Vec::with_capacity(pending.len());
		let mut first = true;
		for (_pool_id, hash) in pending {
			if !first {
				if let Some(delay) = self.submission_delay {
					tokio::time::sleep(delay).await;
				}
			}
			first = false;

			let validation = self.validate_reveal(hash, now_unix);
			let validation = match validation {
				Some(v) => v,
				None => continue,
			};
			if !validation.is_valid {
				let message = validation.errors.join("; ");
				self.record_error(hash, message.clone());
				results.push(SubmitRevealResult { commitment_hash: hash, success: false, error: Some(message) });
				continue
			}

			let (pool_key, intent, is_zk_verified) = {
				let state = self.state.lock().unwrap();
				let reveal = state.reveals.get(&hash).expect("present");
				(reveal.pool_key, reveal.intent.clone(), reveal.is_zk_verified)
			};

			let outcome = if is_zk_verified {
				hook.submit_reveal_for_zk(&pool_key, hash, &intent).await
			} else {
				hook.submit_reveal(&pool_key, &intent).await
			};

			match outcome {
				Ok(_tx) => {
					self.mark_submitted(hash, now_unix);
					results.push(SubmitRevealResult { commitment_hash: hash, success: true, error: None });
				},
				Err(error) => {
					let message = error.to_string();
					self.record_error(hash, message.clone());
					results.push(SubmitRevealResult { commitment_hash: hash, success: false, error: Some(message) });
				},
			}
		}

		results
	}

	fn mark_submitted(&self, hash: CommitmentHash, submission_timestamp: u64) {
		let mut state = self.state.lock().unwrap();
		if let Some(reveal) = state.reveals.get_mut(&hash) {
			reveal.submitted_on_chain = true;
			reveal.submission_timestamp = Some(submission_timestamp);
		}
	}

	fn record_error(&self, hash: CommitmentHash, message: String) {
		let mut state = self.state.lock().unwrap();
		if let Some(reveal) = state.reveals.get_mut(&hash) {
			reveal.errors.get_or_insert_with(Vec::new).push(message);
		}
	}

	/// Drops reveals whose hash appears in `hashes`, called by the executor after a successful
	/// batch execute (spec §4.2, §4.4).
	pub fn clear_executed_reveals(&self, hashes: &[CommitmentHash]) {
		let mut state = self.state.lock().unwrap();
		for hash in hashes {
			state.reveals.remove(hash);
		}
		for ordered in state.order.values_mut() {
			ordered.retain(|hash| !hashes.contains(hash));
		}
	}

	pub fn clear_pool(&self, pool_id: H256) {
		let mut state = self.state.lock().unwrap();
		if let Some(hashes) = state.order.remove(&pool_id) {
			for hash in hashes {
				state.reveals.remove(&hash);
			}
		}
	}

	pub fn clear_all(&self) {
		let mut state = self.state.lock().unwrap();
		state.reveals.clear();
		state.order.clear();
	}
}

impl Default for RevealManager {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use batchswap_hook_client::testing::MockHookApi;
	use ethers::types::Address;

	fn pool_key() -> PoolKey {
		PoolKey {
			currency0: Address::from_low_u64_be(1),
			currency1: Address::from_low_u64_be(2),
			fee_bps: 30,
			tick_spacing: 60,
			hook_address: Address::from_low_u64_be(9),
		}
	}

	fn intent(nonce: u64, deadline_unix: u64) -> SwapIntent {
		SwapIntent {
			user: Address::from_low_u64_be(1),
			token_in: Address::from_low_u64_be(1),
			token_out: Address::from_low_u64_be(2),
			amount_in: 1_000u64.into(),
			min_amount_out: 900u64.into(),
			recipient: Address::from_low_u64_be(1),
			nonce: nonce.into(),
			deadline_unix,
		}
	}

	#[test]
	fn add_reveal_is_idempotent_on_commitment_hash() {
		let manager = RevealManager::new();
		let pool_key = pool_key();
		let pool_id = pool_key.pool_id();
		let intent = intent(1, 2_000_000_000);
		let hash = compute_commitment_hash(&intent);

		manager.add_reveal(hash, intent.clone(), pool_key, pool_id, false);
		manager.add_reveal(hash, intent, pool_key, pool_id, false);

		assert_eq!(manager.get_reveals_for_pool(pool_id).len(), 1);
	}

	#[test]
	fn validate_reveal_rejects_zero_amount_and_expired_deadline() {
		let manager = RevealManager::new();
		let pool_key = pool_key();
		let pool_id = pool_key.pool_id();
		let mut bad_intent = intent(1, 100);
		bad_intent.amount_in = 0u64.into();
		let hash = compute_commitment_hash(&bad_intent);
		manager.add_reveal(hash, bad_intent, pool_key, pool_id, false);

		let result = manager.validate_reveal(hash, 2_000_000_000).unwrap();
		assert!(!result.is_valid);
		assert_eq!(result.errors.len(), 2);
	}

	#[test]
	fn validate_reveal_rejects_hash_mismatch_unless_zk_verified() {
		let manager = RevealManager::new();
		let pool_key = pool_key();
		let pool_id = pool_key.pool_id();
		let intent = intent(1, 2_000_000_000);
		// Store under the wrong hash to simulate a mismatch.
		let wrong_hash = CommitmentHash([7u8; 32]);
		manager.add_reveal(wrong_hash, intent.clone(), pool_key, pool_id, false);
		let result = manager.validate_reveal(wrong_hash, 1_000).unwrap();
		assert!(!result.is_valid);

		let manager_zk = RevealManager::new();
		manager_zk.add_reveal(wrong_hash, intent, pool_key, pool_id, true);
		let result = manager_zk.validate_reveal(wrong_hash, 1_000).unwrap();
		assert!(result.is_valid);
	}

	#[tokio::test]
	async fn submit_all_reveals_marks_success_and_preserves_fifo_order() {
		let manager = RevealManager::new();
		let hook = MockHookApi::new();
		let pool_key = pool_key();
		let pool_id = pool_key.pool_id();

		let first = intent(1, 2_000_000_000);
		let second = intent(2, 2_000_000_000);
		let first_hash = compute_commitment_hash(&first);
		let second_hash = compute_commitment_hash(&second);

		manager.add_reveal(first_hash, first, pool_key, pool_id, false);
		manager.add_reveal(second_hash, second, pool_key, pool_id, false);

		let results = manager.submit_all_reveals(hook.as_ref(), 1_000).await;
		assert!(results.iter().all(|r| r.success));

		let submitted = manager.get_submitted_hashes_for_pool(pool_id);
		assert_eq!(submitted, vec![first_hash, second_hash]);

		let hook_order = hook.submitted_reveals.lock().unwrap().clone();
		assert_eq!(hook_order, vec![first_hash, second_hash]);
	}

	#[tokio::test]
	async fn submit_all_reveals_skips_invalid_without_calling_hook() {
		let manager = RevealManager::new();
		let hook = MockHookApi::new();
		let pool_key = pool_key();
		let pool_id = pool_key.pool_id();

		let mut expired = intent(1, 100);
		expired.amount_in = 1_000u64.into();
		let hash = compute_commitment_hash(&expired);
		manager.add_reveal(hash, expired, pool_key, pool_id, false);

		let results = manager.submit_all_reveals(hook.as_ref(), 2_000_000_000).await;
		assert_eq!(results.len(), 1);
		assert!(!results[0].success);
		assert!(hook.submitted_reveals.lock().unwrap().is_empty());
	}

	#[test]
	fn clear_all_resets_pending_count() {
		let manager = RevealManager::new();
		let pool_key = pool_key();
		let pool_id = pool_key.pool_id();
		let intent = intent(1, 2_000_000_000);
		let hash = compute_commitment_hash(&intent);
		manager.add_reveal(hash, intent, pool_key, pool_id, false);
		assert_eq!(manager.get_pending_count(), 1);

		manager.clear_all();
		assert_eq!(manager.get_pending_count(), 0);
	}

	#[test]
	fn clear_executed_reveals_drops_only_named_hashes() {
		let manager = RevealManager::new();
		let pool_key = pool_key();
		let pool_id = pool_key.pool_id();
		let first = intent(1, 2_000_000_000);
		let second = intent(2, 2_000_000_000);
		let first_hash = compute_commitment_hash(&first);
		let second_hash = compute_commitment_hash(&second);
		manager.add_reveal(first_hash, first, pool_key, pool_id, false);
		manager.add_reveal(second_hash, second, pool_key, pool_id, false);

		manager.clear_executed_reveals(&[first_hash]);

		let remaining = manager.get_reveals_for_pool(pool_id);
		assert_eq!(remaining.len(), 1);
		assert_eq!(remaining[0].commitment_hash, second_hash);
	}
}
