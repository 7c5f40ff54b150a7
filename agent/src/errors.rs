use thiserror::Error;

/// Errors raised while wiring or running an agent, surfaced to `main` as `anyhow::Error` at the
/// process boundary (spec §7).
#[derive(Debug, Error)]
pub enum AgentError {
	#[error("no pools configured")]
	NoPoolsConfigured,
	#[error("duplicate pool configured: {0:?}")]
	DuplicatePool(ethers::types::H256),
	#[error("invalid private key")]
	InvalidPrivateKey(#[from] ethers::signers::WalletError),
}
