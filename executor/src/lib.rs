pub mod errors;
pub mod executor;
pub mod proof_cache;
pub mod stats;

pub use errors::ExecutionError;
pub use executor::{BatchExecutor, BatchReadiness, ExecutorConfig};
pub use proof_cache::ProofCache;
pub use stats::{ExecutionRecord, ExecutorStats};
