use thiserror::Error;

/// Errors raised before any network I/O: rejecting malformed input locally. Strategies convert
/// these into a no-trade `TradeDecision`; the Reveal Manager skips the offending reveal and
/// records the error (spec §7).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
	#[error("amount_in is zero")]
	ZeroAmount,
	#[error("deadline {deadline_unix} has already elapsed (now {now_unix})")]
	DeadlineExpired { deadline_unix: u64, now_unix: u64 },
	#[error("commitment hash mismatch: expected {expected}, computed {computed}")]
	CommitmentHashMismatch { expected: String, computed: String },
	#[error("invalid market data: {0}")]
	InvalidMarketData(String),
}
