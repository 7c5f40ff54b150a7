use async_trait::async_trait;
use batchswap_primitives::{CommitmentHash, PoolKey, SwapIntent};
use ethers::types::H256;
use serde::{Deserialize, Serialize};

use crate::zk::ZkProof;

/// The outcome of a state-mutating call, surfaced to callers regardless of chain (spec §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResult {
	pub tx_hash: H256,
	pub block_number: Option<u64>,
	pub gas_used: Option<u64>,
}

/// Result of the hook's `checker` view call — whether a batch execute would currently succeed,
/// and the calldata it would be called with.
#[derive(Debug, Clone)]
pub struct CheckerResult {
	pub can_exec: bool,
	pub exec_payload: Vec<u8>,
}

/// The typed RPC surface of the on-chain hook contract, consumed as an external collaborator
/// (spec §4.1, §6). Implementations may hit a real chain (`EthersHookClient`) or a test double
/// (`testing::MockHookApi`).
#[async_trait]
pub trait HookApi: Send + Sync {
	async fn submit_commitment(
		&self,
		pool_key: &PoolKey,
		hash: CommitmentHash,
	) -> anyhow::Result<TxResult>;

	async fn submit_commitment_with_proof(
		&self,
		pool_key: &PoolKey,
		hash: CommitmentHash,
		proof: &ZkProof,
	) -> anyhow::Result<TxResult>;

	async fn submit_reveal(
		&self,
		pool_key: &PoolKey,
		intent: &SwapIntent,
	) -> anyhow::Result<TxResult>;

	async fn submit_reveal_for_zk(
		&self,
		pool_key: &PoolKey,
		commitment_hash: CommitmentHash,
		intent: &SwapIntent,
	) -> anyhow::Result<TxResult>;

	async fn reveal_and_batch_execute(
		&self,
		pool_key: &PoolKey,
		commitment_hashes: &[CommitmentHash],
	) -> anyhow::Result<TxResult>;

	async fn reveal_and_batch_execute_with_proofs(
		&self,
		pool_key: &PoolKey,
		commitment_hashes: &[CommitmentHash],
		proofs: &[ZkProof],
	) -> anyhow::Result<TxResult>;

	async fn checker(&self, pool_id: H256) -> anyhow::Result<CheckerResult>;

	async fn get_pending_commitment_count(&self, pool_id: H256) -> anyhow::Result<u32>;

	async fn is_commitment_verified(&self, hash: CommitmentHash) -> anyhow::Result<bool>;

	async fn get_min_commitments(&self) -> anyhow::Result<u32>;
}
