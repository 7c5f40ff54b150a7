use std::sync::Arc;

use async_trait::async_trait;
use batchswap_primitives::{compute_commitment_hash, CommitmentHash, PoolKey, SwapIntent};
use ethers::{
	prelude::*,
	types::{Address, H256, U256},
};

use crate::{
	abi::{IBatchHook, IntentTuple, PoolKeyTuple},
	api::{CheckerResult, HookApi, TxResult},
	errors::classify_error_message,
	zk::ZkProof,
};

fn pool_key_tuple(key: &PoolKey) -> PoolKeyTuple {
	(key.currency0, key.currency1, key.fee_bps, key.tick_spacing, key.hook_address)
}

fn intent_tuple(intent: &SwapIntent) -> IntentTuple {
	(
		intent.user,
		intent.token_in,
		intent.token_out,
		intent.amount_in,
		intent.min_amount_out,
		intent.recipient,
		intent.nonce,
		U256::from(intent.deadline_unix),
	)
}

fn classify_error<E: std::fmt::Display>(error: E) -> anyhow::Error {
	classify_error_message(&error.to_string())
}

async fn pending_tx_result<M: Middleware + 'static>(
	call: ContractCall<M, ()>,
) -> anyhow::Result<TxResult> {
	let pending = call.send().await.map_err(classify_error)?;
	let tx_hash = pending.tx_hash();
	match pending.await.map_err(classify_error)? {
		Some(receipt) => Ok(TxResult {
			tx_hash,
			block_number: receipt.block_number.map(|n| n.as_u64()),
			gas_used: receipt.gas_used.map(|g| g.as_u64()),
		}),
		None => Ok(TxResult { tx_hash, block_number: None, gas_used: None }),
	}
}

/// Typed RPC surface over the on-chain hook contract, generic over whatever signing middleware
/// the caller has already assembled (wallet management is the caller's responsibility — spec
/// §6's "wallet collaborator"). Mirrors `VaultRpc`/`EthRpcSigningClient`'s thin-wrapper-over-an-
/// `ethers` contract-binding shape.
#[derive(Clone)]
pub struct EthersHookClient<M> {
	contract: IBatchHook<M>,
}

impl<M: Middleware + 'static> EthersHookClient<M> {
	pub fn new(hook_address: Address, client: Arc<M>) -> Self {
		Self { contract: IBatchHook::new(hook_address, client) }
	}
}

#[async_trait]
impl<M: Middleware + 'static> HookApi for EthersHookClient<M> {
	async fn submit_commitment(
		&self,
		pool_key: &PoolKey,
		hash: CommitmentHash,
	) -> anyhow::Result<TxResult> {
		pending_tx_result(self.contract.submit_commitment(pool_key_tuple(pool_key), hash.0)).await
	}

	async fn submit_commitment_with_proof(
		&self,
		pool_key: &PoolKey,
		hash: CommitmentHash,
		proof: &ZkProof,
	) -> anyhow::Result<TxResult> {
		pending_tx_result(self.contract.submit_commitment_with_proof(
			pool_key_tuple(pool_key),
			hash.0,
			proof.to_abi_bytes().into(),
		))
		.await
	}

	async fn submit_reveal(
		&self,
		pool_key: &PoolKey,
		intent: &SwapIntent,
	) -> anyhow::Result<TxResult> {
		pending_tx_result(
			self.contract.submit_reveal(pool_key_tuple(pool_key), intent_tuple(intent)),
		)
		.await
	}

	async fn submit_reveal_for_zk(
		&self,
		pool_key: &PoolKey,
		commitment_hash: CommitmentHash,
		intent: &SwapIntent,
	) -> anyhow::Result<TxResult> {
		pending_tx_result(self.contract.submit_reveal_for_zk(
			pool_key_tuple(pool_key),
			commitment_hash.0,
			intent_tuple(intent),
		))
		.await
	}

	async fn reveal_and_batch_execute(
		&self,
		pool_key: &PoolKey,
		commitment_hashes: &[CommitmentHash],
	) -> anyhow::Result<TxResult> {
		let hashes: Vec<[u8; 32]> = commitment_hashes.iter().map(|h| h.0).collect();
		pending_tx_result(self.contract.reveal_and_batch_execute(pool_key_tuple(pool_key), hashes))
			.await
	}

	async fn reveal_and_batch_execute_with_proofs(
		&self,
		pool_key: &PoolKey,
		commitment_hashes: &[CommitmentHash],
		proofs: &[ZkProof],
	) -> anyhow::Result<TxResult> {
		let hashes: Vec<[u8; 32]> = commitment_hashes.iter().map(|h| h.0).collect();
		let proofs: Vec<ethers::types::Bytes> =
			proofs.iter().map(|p| p.to_abi_bytes().into()).collect();
		pending_tx_result(self.contract.reveal_and_batch_execute_with_proofs(
			pool_key_tuple(pool_key),
			hashes,
			proofs,
		))
		.await
	}

	async fn checker(&self, pool_id: H256) -> anyhow::Result<CheckerResult> {
		let (can_exec, exec_payload) = self.contract.checker(pool_id.0).call().await?;
		Ok(CheckerResult { can_exec, exec_payload: exec_payload.to_vec() })
	}

	async fn get_pending_commitment_count(&self, pool_id: H256) -> anyhow::Result<u32> {
		Ok(self.contract.get_pending_commitment_count(pool_id.0).call().await?)
	}

	async fn is_commitment_verified(&self, hash: CommitmentHash) -> anyhow::Result<bool> {
		Ok(self.contract.is_commitment_verified(hash.0).call().await?)
	}

	async fn get_min_commitments(&self) -> anyhow::Result<u32> {
		Ok(self.contract.get_min_commitments().call().await?)
	}
}

/// Pure helper re-exported alongside the client: `get_pool_id` from spec §4.1.
pub fn get_pool_id(pool_key: &PoolKey) -> H256 {
	pool_key.pool_id()
}

/// Pure helper re-exported alongside the client: `compute_keccak_commitment_hash` from spec
/// §4.1. Delegates to the canonical implementation in `batchswap-primitives` so the Reveal
/// Manager can validate without depending on this crate's contract bindings.
pub fn compute_keccak_commitment_hash(intent: &SwapIntent) -> CommitmentHash {
	compute_commitment_hash(intent)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::errors::HookError;

	#[test]
	fn classifies_revert_message_as_hook_error() {
		let error = classify_error("0xc06789fa");
		assert_eq!(error.downcast_ref::<HookError>(), Some(&HookError::InvalidCommitment));
	}
}
