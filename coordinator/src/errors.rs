use ethers::types::H256;
use thiserror::Error;

/// Errors raised by the coordinator before any state mutation (spec §7). The coordinator logs
/// and rejects the signal rather than propagating a hard failure to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoordinationError {
	#[error("agent {agent_id} is not registered for pool {pool_id:?}")]
	UnknownAgent { agent_id: String, pool_id: H256 },
	#[error("pool {0:?} lost quorum")]
	QuorumLost(H256),
	#[error("pool {0:?} has no participating agents")]
	NoParticipatingAgents(H256),
}
