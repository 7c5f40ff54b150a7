use ethers::types::H256;
use serde::{Deserialize, Serialize};

use crate::{intent::CommitmentHash, intent::SwapIntent, pool::PoolKey};

/// A revealed intent awaiting or having completed submission. Lifecycle: created (pending) ->
/// submitted -> executed-and-cleared, or -> errored (retained until a retention policy evicts
/// it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealData {
	pub commitment_hash: CommitmentHash,
	pub intent: SwapIntent,
	pub pool_key: PoolKey,
	pub pool_id: H256,
	pub is_zk_verified: bool,
	pub submitted_on_chain: bool,
	pub submission_timestamp: Option<u64>,
	pub errors: Option<Vec<String>>,
}

impl RevealData {
	pub fn new(
		commitment_hash: CommitmentHash,
		intent: SwapIntent,
		pool_key: PoolKey,
		pool_id: H256,
		is_zk_verified: bool,
	) -> Self {
		Self {
			commitment_hash,
			intent,
			pool_key,
			pool_id,
			is_zk_verified,
			submitted_on_chain: false,
			submission_timestamp: None,
			errors: None,
		}
	}
}
