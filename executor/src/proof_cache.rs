use std::{collections::HashMap, sync::Mutex};

use batchswap_hook_client::zk::ZkProof;
use batchswap_primitives::CommitmentHash;

/// Keyed map from commitment hash to an opaque ZK proof. Not persisted across restarts — the
/// caller repopulates it if needed (spec §4.4).
#[derive(Default)]
pub struct ProofCache {
	proofs: Mutex<HashMap<CommitmentHash, ZkProof>>,
}

impl ProofCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn store_proof(&self, commitment_hash: CommitmentHash, proof: ZkProof) {
		self.proofs.lock().unwrap().insert(commitment_hash, proof);
	}

	pub fn get_proof(&self, commitment_hash: CommitmentHash) -> Option<ZkProof> {
		self.proofs.lock().unwrap().get(&commitment_hash).cloned()
	}

	pub fn clear(&self) {
		self.proofs.lock().unwrap().clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ethers::types::U256;

	fn sample_proof() -> ZkProof {
		ZkProof {
			a: [U256::from(1u64), U256::from(2u64)],
			b: [[U256::from(3u64), U256::from(4u64)], [U256::from(5u64), U256::from(6u64)]],
			c: [U256::from(7u64), U256::from(8u64)],
			public_signals: vec![U256::from(9u64)],
		}
	}

	#[test]
	fn store_then_get_round_trips() {
		let cache = ProofCache::new();
		let hash = CommitmentHash([1u8; 32]);
		cache.store_proof(hash, sample_proof());
		assert!(cache.get_proof(hash).is_some());
		assert!(cache.get_proof(CommitmentHash([2u8; 32])).is_none());
	}
}
