mod abi;
pub mod api;
pub mod client;
pub mod errors;
pub mod testing;
pub mod zk;

pub use api::{CheckerResult, HookApi, TxResult};
pub use client::{compute_keccak_commitment_hash, get_pool_id, EthersHookClient};
pub use errors::{classify_error_message, decode_error, extract_revert_selector, HookError, TransportError};
pub use zk::ZkProof;
