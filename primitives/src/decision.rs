use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// The output of a strategy's `should_trade` call. A `false` `should_trade` always carries a
/// human-readable `reasoning` (spec §7 — validation failures become a no-trade decision with the
/// error in `reasoning`, rather than an `Err`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeDecision {
	pub should_trade: bool,
	pub direction: Option<Direction>,
	pub amount_in: Option<U256>,
	pub min_amount_out: Option<U256>,
	pub confidence: f64,
	pub reasoning: String,
}

impl TradeDecision {
	pub fn no_trade(reasoning: impl Into<String>) -> Self {
		Self {
			should_trade: false,
			direction: None,
			amount_in: None,
			min_amount_out: None,
			confidence: 0.0,
			reasoning: reasoning.into(),
		}
	}

	#[allow(clippy::too_many_arguments)]
	pub fn trade(
		direction: Direction,
		amount_in: U256,
		min_amount_out: U256,
		confidence: f64,
		reasoning: impl Into<String>,
	) -> Self {
		Self {
			should_trade: true,
			direction: Some(direction),
			amount_in: Some(amount_in),
			min_amount_out: Some(min_amount_out),
			confidence: confidence.clamp(0.0, 1.0),
			reasoning: reasoning.into(),
		}
	}
}
