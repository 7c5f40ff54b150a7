use batchswap_primitives::{Direction, MarketData, TradeDecision};
use ethers::types::U256;
use serde::Deserialize;

use crate::toolkit::{self, StrategyState};

#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityConfig {
	pub imbalance_threshold: f64,
	pub min_total_liquidity: U256,
	/// Zero means unbounded.
	pub max_total_liquidity: U256,
	pub volume_to_liquidity_threshold: f64,
	pub cooldown_s: u64,
	pub trade_into_imbalance: bool,
	pub min_confidence: f64,
	pub position_size_fraction: f64,
	pub detect_liquidity_changes: bool,
	pub liquidity_change_threshold_pct: f64,
	pub min_amount_in: U256,
	pub max_amount_in: U256,
	pub slippage_bps: u32,
}

/// Trades on pool-liquidity imbalance and sudden liquidity shifts rather than price moves (spec
/// §4.5.3).
pub struct LiquidityStrategy {
	pub config: LiquidityConfig,
}

impl LiquidityStrategy {
	pub fn new(config: LiquidityConfig) -> Self {
		Self { config }
	}

	fn is_viable(&self, market: &MarketData) -> bool {
		if market.total_liquidity < self.config.min_total_liquidity {
			return false
		}
		if !self.config.max_total_liquidity.is_zero() && market.total_liquidity > self.config.max_total_liquidity {
			return false
		}
		true
	}
}

fn imbalance_ratio(liquidity0: U256, liquidity1: U256) -> f64 {
	if liquidity0.is_zero() || liquidity1.is_zero() {
		return 1.0
	}
	let (hi, lo) = if liquidity0 > liquidity1 { (liquidity0, liquidity1) } else { (liquidity1, liquidity0) };
	hi.as_u128() as f64 / lo.as_u128() as f64
}

impl crate::Strategy for LiquidityStrategy {
	fn should_trade(&self, market: &MarketData, state: &mut StrategyState) -> TradeDecision {
		let cfg = &self.config;

		if toolkit::is_cooldown_active(state, market.captured_at_ms, cfg.cooldown_s * 1_000) {
			return TradeDecision::no_trade("liquidity strategy in cooldown")
		}

		if !self.is_viable(market) {
			return TradeDecision::no_trade("pool liquidity outside configured viability range")
		}

		let ratio = imbalance_ratio(market.liquidity0, market.liquidity1);
		let imbalance_active = ratio > cfg.imbalance_threshold;

		let volume_to_liquidity_ratio = if market.total_liquidity.is_zero() {
			0.0
		} else {
			market.volume_1h.as_u128() as f64 / market.total_liquidity.as_u128() as f64
		};
		let volume_active = volume_to_liquidity_ratio > cfg.volume_to_liquidity_threshold;

		let liquidity_change_active = cfg.detect_liquidity_changes
			&& state.last_total_liquidity.map_or(false, |previous| {
				if previous.is_zero() {
					return false
				}
				let delta = if market.total_liquidity > previous {
					market.total_liquidity - previous
				} else {
					previous - market.total_liquidity
				};
				let pct = delta.as_u128() as f64 / previous.as_u128() as f64 * 100.0;
				pct > cfg.liquidity_change_threshold_pct
			});

		let active_signal_count =
			[imbalance_active, volume_active, liquidity_change_active].iter().filter(|x| **x).count();
		let combined = active_signal_count > 1;

		let mut confidence = 0.0;
		if imbalance_active {
			let severity = ((ratio - cfg.imbalance_threshold) / cfg.imbalance_threshold).min(1.0);
			confidence += 0.3 + severity * 0.4;
		}
		if volume_active {
			confidence += if combined { 0.15 } else { 0.25 };
		}
		if liquidity_change_active {
			confidence += if combined { 0.1 } else { 0.2 };
		}
		confidence = confidence.clamp(0.0, 1.0);

		state.last_total_liquidity = Some(market.total_liquidity);

		if active_signal_count == 0 {
			return TradeDecision::no_trade("no liquidity signal detected")
		}
		if confidence < cfg.min_confidence {
			return TradeDecision::no_trade("liquidity signal confidence below min_confidence")
		}

		let liq0_scarcer = market.liquidity1 > market.liquidity0;
		let base_direction = if liq0_scarcer { Direction::ZeroForOne } else { Direction::OneForZero };
		let direction = if cfg.trade_into_imbalance {
			base_direction
		} else {
			match base_direction {
				Direction::ZeroForOne => Direction::OneForZero,
				Direction::OneForZero => Direction::ZeroForOne,
			}
		};

		let raw_amount = market.total_liquidity.as_u128() as f64 * cfg.position_size_fraction * confidence;
		let amount_in =
			toolkit::clamp_amount(U256::from(raw_amount.max(0.0) as u128), cfg.min_amount_in, cfg.max_amount_in);

		let min_amount_out =
			toolkit::compute_min_amount_out(amount_in, market.price_fixed_point_1e18(), direction, cfg.slippage_bps);

		toolkit::record_trade(state, market.captured_at_ms);
		TradeDecision::trade(direction, amount_in, min_amount_out, confidence, "liquidity imbalance signal")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Strategy;
	use batchswap_primitives::PoolKey;
	use bigdecimal::BigDecimal;
	use std::str::FromStr;

	fn config() -> LiquidityConfig {
		LiquidityConfig {
			imbalance_threshold: 1.5,
			min_total_liquidity: U256::from(1_000u64),
			max_total_liquidity: U256::zero(),
			volume_to_liquidity_threshold: 10.0,
			cooldown_s: 30,
			trade_into_imbalance: true,
			min_confidence: 0.2,
			position_size_fraction: 0.1,
			detect_liquidity_changes: true,
			liquidity_change_threshold_pct: 20.0,
			min_amount_in: U256::from(100u64),
			max_amount_in: U256::from(1_000_000u64),
			slippage_bps: 50,
		}
	}

	fn market(liquidity0: u64, liquidity1: u64, captured_at_ms: u64) -> MarketData {
		MarketData {
			pool_id: Default::default(),
			pool_key: PoolKey {
				currency0: Default::default(),
				currency1: Default::default(),
				fee_bps: 30,
				tick_spacing: 60,
				hook_address: Default::default(),
			},
			current_price: BigDecimal::from_str("2000").unwrap(),
			price_change_1h_pct: 0.0,
			price_change_24h_pct: 0.0,
			total_liquidity: U256::from(liquidity0 + liquidity1),
			liquidity0: U256::from(liquidity0),
			liquidity1: U256::from(liquidity1),
			volume_1h: U256::from(1u64),
			volume_24h: U256::from(2u64),
			recent_swaps: vec![],
			captured_at_ms,
			reference_prices: vec![],
		}
	}

	#[test]
	fn imbalance_trades_into_scarcer_token() {
		let strategy = LiquidityStrategy::new(config());
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market(10_000, 2_000, 1_000_000), &mut state);
		assert!(decision.should_trade);
		assert_eq!(decision.direction, Some(Direction::ZeroForOne));
	}

	#[test]
	fn balanced_pool_yields_no_signal() {
		let strategy = LiquidityStrategy::new(config());
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market(5_000, 5_000, 1_000_000), &mut state);
		assert!(!decision.should_trade);
	}

	#[test]
	fn below_min_liquidity_is_not_viable() {
		let strategy = LiquidityStrategy::new(config());
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market(100, 100, 1_000_000), &mut state);
		assert!(!decision.should_trade);
	}
}
