use bigdecimal::BigDecimal;
use ethers::types::{H256, I256, U256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::pool::PoolKey;

/// A swap observed on-chain recently enough to feed volume/trend calculations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSwap {
	pub zero_for_one: bool,
	pub amount0: I256,
	pub amount1: I256,
	pub timestamp_ms: u64,
}

/// A price quote for the same pair from an external venue, either seeded via a strategy's config
/// or injected at runtime by the market-data collaborator alongside a pool's snapshot (spec
/// §4.5.2). Carried on `MarketData` rather than threaded through `Strategy::should_trade`
/// separately, since it is itself externally-sourced, per-pool data with the same staleness
/// concerns as the rest of the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencePrice {
	pub source: String,
	pub price: f64,
	pub timestamp_ms: u64,
	pub confidence: f64,
}

/// The market-data collaborator's raw snapshot, as it arrives before validation: numeric fields
/// are strings because an untrusted upstream source may hand back malformed data, and pool
/// identity may be absent entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMarketData {
	pub pool_id: Option<H256>,
	pub pool_key: Option<PoolKey>,
	pub current_price: String,
	pub price_change_1h_pct: f64,
	pub price_change_24h_pct: f64,
	pub total_liquidity: String,
	pub liquidity0: String,
	pub liquidity1: String,
	pub volume_1h: String,
	pub volume_24h: String,
	pub recent_swaps: Vec<RecentSwap>,
	pub captured_at_ms: u64,
	#[serde(default)]
	pub reference_prices: Vec<ReferencePrice>,
}

/// A validated market-data snapshot. No mutation after construction — treated as an immutable
/// value type (spec §5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketData {
	pub pool_id: H256,
	pub pool_key: PoolKey,
	pub current_price: BigDecimal,
	pub price_change_1h_pct: f64,
	pub price_change_24h_pct: f64,
	pub total_liquidity: U256,
	pub liquidity0: U256,
	pub liquidity1: U256,
	pub volume_1h: U256,
	pub volume_24h: U256,
	pub recent_swaps: Vec<RecentSwap>,
	pub captured_at_ms: u64,
	pub reference_prices: Vec<ReferencePrice>,
}

pub const STALE_AFTER_MS: u64 = 5 * 60 * 1000;

impl MarketData {
	pub fn is_stale(&self, now_ms: u64) -> bool {
		now_ms.saturating_sub(self.captured_at_ms) > STALE_AFTER_MS
	}

	/// `floor(current_price * 10^18)`, truncating toward zero (spec §9). Negative or
	/// unparseable prices collapse to zero rather than panicking — callers treat a zero price
	/// as "no trade".
	pub fn price_fixed_point_1e18(&self) -> U256 {
		if self.current_price.sign() == bigdecimal::num_bigint::Sign::Minus {
			return U256::zero()
		}
		let scaled = (&self.current_price * BigDecimal::from(10u64.pow(18)))
			.with_scale_round(0, bigdecimal::RoundingMode::Down);
		U256::from_dec_str(&scaled.to_string()).unwrap_or(U256::zero())
	}
}

/// `(reference - current) / current * 100`, used by the arbitrage strategy.
pub fn spread_pct(reference: &BigDecimal, current: &BigDecimal) -> Option<f64> {
	if current == &BigDecimal::from(0) {
		return None
	}
	let spread = (reference - current) / current * BigDecimal::from(100);
	f64::from_str(&spread.to_string()).ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_price_yields_zero_fixed_point() {
		let md = sample_market_data("0");
		assert_eq!(md.price_fixed_point_1e18(), U256::zero());
	}

	#[test]
	fn positive_price_scales_by_1e18() {
		let md = sample_market_data("2");
		assert_eq!(md.price_fixed_point_1e18(), U256::from(2u64) * U256::from(10u64).pow(U256::from(18u64)));
	}

	#[test]
	fn staleness_threshold() {
		let md = sample_market_data("1");
		assert!(!md.is_stale(md.captured_at_ms + STALE_AFTER_MS));
		assert!(md.is_stale(md.captured_at_ms + STALE_AFTER_MS + 1));
	}

	fn sample_market_data(price: &str) -> MarketData {
		MarketData {
			pool_id: H256::zero(),
			pool_key: crate::pool::PoolKey {
				currency0: Default::default(),
				currency1: Default::default(),
				fee_bps: 30,
				tick_spacing: 60,
				hook_address: Default::default(),
			},
			current_price: BigDecimal::from_str(price).unwrap(),
			price_change_1h_pct: 0.0,
			price_change_24h_pct: 0.0,
			total_liquidity: U256::zero(),
			liquidity0: U256::zero(),
			liquidity1: U256::zero(),
			volume_1h: U256::zero(),
			volume_24h: U256::zero(),
			recent_swaps: vec![],
			captured_at_ms: 1_000_000,
			reference_prices: vec![],
		}
	}
}
