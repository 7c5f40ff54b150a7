pub mod coordination;
pub mod decision;
pub mod direction;
pub mod errors;
pub mod intent;
pub mod market;
pub mod pool;
pub mod reveal;
pub mod validate;

pub use coordination::{AgentReadinessSignal, BatchParameters, BatchReadyEvent, ConflictResolutionStrategy};
pub use decision::TradeDecision;
pub use direction::Direction;
pub use errors::ValidationError;
pub use intent::{compute_commitment_hash, CommitmentHash, SwapIntent};
pub use market::{MarketData, RawMarketData, RecentSwap, ReferencePrice};
pub use pool::PoolKey;
pub use reveal::RevealData;
pub use validate::{validate_market_data, MarketDataValidation};
