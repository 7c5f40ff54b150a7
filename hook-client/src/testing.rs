use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use async_trait::async_trait;
use batchswap_primitives::{CommitmentHash, PoolKey, SwapIntent};
use ethers::types::H256;

use crate::{
	api::{CheckerResult, HookApi, TxResult},
	errors::decode_error,
	zk::ZkProof,
};

const SIMULATED_REVERT_SELECTOR: [u8; 4] = [0xc0, 0x67, 0x89, 0xfa];

/// An in-memory `HookApi` test double, mirroring the "testing" harness modules the teacher ships
/// alongside its RPC traits.
#[derive(Default)]
pub struct MockHookApi {
	pub min_commitments: Mutex<u32>,
	pub pending_commitments: Mutex<HashMap<H256, u32>>,
	pub can_exec: Mutex<HashMap<H256, bool>>,
	pub verified: Mutex<HashMap<[u8; 32], bool>>,
	pub submitted_commitments: Mutex<Vec<CommitmentHash>>,
	pub submitted_reveals: Mutex<Vec<CommitmentHash>>,
	pub batch_executions: Mutex<Vec<Vec<CommitmentHash>>>,
	pub fail_next_execute: Mutex<bool>,
	pub always_fail_execute: Mutex<bool>,
}

impl MockHookApi {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn set_min_commitments(&self, n: u32) {
		*self.min_commitments.lock().unwrap() = n;
	}

	pub fn set_pending_commitments(&self, pool_id: H256, n: u32) {
		self.pending_commitments.lock().unwrap().insert(pool_id, n);
	}

	pub fn set_can_exec(&self, pool_id: H256, can_exec: bool) {
		self.can_exec.lock().unwrap().insert(pool_id, can_exec);
	}
}

fn fake_tx_result(seed: usize) -> TxResult {
	let mut bytes = [0u8; 32];
	bytes[24..].copy_from_slice(&(seed as u64).to_be_bytes());
	TxResult { tx_hash: H256(bytes), block_number: Some(seed as u64), gas_used: Some(21_000) }
}

#[async_trait]
impl HookApi for MockHookApi {
	async fn submit_commitment(
		&self,
		_pool_key: &PoolKey,
		hash: CommitmentHash,
	) -> anyhow::Result<TxResult> {
		let mut submitted = self.submitted_commitments.lock().unwrap();
		submitted.push(hash);
		Ok(fake_tx_result(submitted.len()))
	}

	async fn submit_commitment_with_proof(
		&self,
		pool_key: &PoolKey,
		hash: CommitmentHash,
		_proof: &ZkProof,
	) -> anyhow::Result<TxResult> {
		self.submit_commitment(pool_key, hash).await
	}

	async fn submit_reveal(
		&self,
		_pool_key: &PoolKey,
		intent: &SwapIntent,
	) -> anyhow::Result<TxResult> {
		let hash = batchswap_primitives::compute_commitment_hash(intent);
		let mut submitted = self.submitted_reveals.lock().unwrap();
		submitted.push(hash);
		Ok(fake_tx_result(submitted.len()))
	}

	async fn submit_reveal_for_zk(
		&self,
		_pool_key: &PoolKey,
		commitment_hash: CommitmentHash,
		_intent: &SwapIntent,
	) -> anyhow::Result<TxResult> {
		let mut submitted = self.submitted_reveals.lock().unwrap();
		submitted.push(commitment_hash);
		Ok(fake_tx_result(submitted.len()))
	}

	async fn reveal_and_batch_execute(
		&self,
		_pool_key: &PoolKey,
		commitment_hashes: &[CommitmentHash],
	) -> anyhow::Result<TxResult> {
		if *self.always_fail_execute.lock().unwrap() {
			return Err(decode_error(SIMULATED_REVERT_SELECTOR).into())
		}
		if *self.fail_next_execute.lock().unwrap() {
			*self.fail_next_execute.lock().unwrap() = false;
			return Err(decode_error(SIMULATED_REVERT_SELECTOR).into())
		}
		let mut executions = self.batch_executions.lock().unwrap();
		executions.push(commitment_hashes.to_vec());
		Ok(fake_tx_result(executions.len()))
	}

	async fn reveal_and_batch_execute_with_proofs(
		&self,
		pool_key: &PoolKey,
		commitment_hashes: &[CommitmentHash],
		_proofs: &[ZkProof],
	) -> anyhow::Result<TxResult> {
		self.reveal_and_batch_execute(pool_key, commitment_hashes).await
	}

	async fn checker(&self, pool_id: H256) -> anyhow::Result<CheckerResult> {
		let can_exec = *self.can_exec.lock().unwrap().get(&pool_id).unwrap_or(&false);
		Ok(CheckerResult { can_exec, exec_payload: vec![] })
	}

	async fn get_pending_commitment_count(&self, pool_id: H256) -> anyhow::Result<u32> {
		Ok(*self.pending_commitments.lock().unwrap().get(&pool_id).unwrap_or(&0))
	}

	async fn is_commitment_verified(&self, hash: CommitmentHash) -> anyhow::Result<bool> {
		Ok(*self.verified.lock().unwrap().get(&hash.0).unwrap_or(&false))
	}

	async fn get_min_commitments(&self) -> anyhow::Result<u32> {
		Ok(*self.min_commitments.lock().unwrap())
	}
}
