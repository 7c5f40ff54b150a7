use thiserror::Error;

/// Execution-ordering errors halt the current batch-execute attempt and do not consume retries
/// (spec §4.4, §7).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutionError {
	#[error("no submitted reveals for pool")]
	NoSubmittedReveals,
	#[error("missing ZK proof for commitment hash")]
	MissingZkProof,
	#[error("batch execute for pool failed after exhausting retries: {0}")]
	RetriesExhausted(String),
}
