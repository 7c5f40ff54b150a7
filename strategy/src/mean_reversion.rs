use std::str::FromStr;

use batchswap_primitives::{Direction, MarketData, TradeDecision};
use ethers::types::U256;
use serde::Deserialize;

use crate::toolkit::{self, StrategyState};

#[derive(Debug, Clone, Deserialize)]
pub struct MeanReversionConfig {
	pub ema_period: u32,
	/// Defaults to `2 / (ema_period + 1)` when absent.
	pub ema_smoothing_factor: Option<f64>,
	pub moderate_dev_threshold: f64,
	pub strong_dev_threshold: f64,
	pub extreme_dev_threshold: f64,
	pub max_dev_threshold: f64,
	pub cooldown_s: u64,
	pub min_confidence: f64,
	pub require_volume_confirmation: bool,
	pub volume_confirmation_ratio: f64,
	pub min_data_points: usize,
	pub min_amount_in: U256,
	pub max_amount_in: U256,
	pub slippage_bps: u32,
}

impl MeanReversionConfig {
	fn smoothing_factor(&self) -> f64 {
		self.ema_smoothing_factor.unwrap_or(2.0 / (self.ema_period as f64 + 1.0))
	}
}

/// Trades against deviations of price from its running EMA, gated by a z-score band (spec
/// §4.5.4).
pub struct MeanReversionStrategy {
	pub config: MeanReversionConfig,
}

impl MeanReversionStrategy {
	pub fn new(config: MeanReversionConfig) -> Self {
		Self { config }
	}
}

impl crate::Strategy for MeanReversionStrategy {
	fn should_trade(&self, market: &MarketData, state: &mut StrategyState) -> TradeDecision {
		let cfg = &self.config;

		if toolkit::is_cooldown_active(state, market.captured_at_ms, cfg.cooldown_s * 1_000) {
			return TradeDecision::no_trade("mean-reversion strategy in cooldown")
		}

		let price = f64::from_str(&market.current_price.to_string()).unwrap_or(0.0);
		state.push_price(price, market.captured_at_ms);

		let k = cfg.smoothing_factor();
		match (state.ema, state.ema_sq) {
			(None, _) | (_, None) => {
				state.ema = Some(price);
				state.ema_sq = Some(price * price);
			},
			(Some(ema), Some(ema_sq)) => {
				state.ema = Some(price * k + ema * (1.0 - k));
				state.ema_sq = Some(price * price * k + ema_sq * (1.0 - k));
			},
		}

		if state.data_points() < cfg.min_data_points {
			return TradeDecision::no_trade("insufficient price history for mean-reversion signal")
		}

		let ema = state.ema.unwrap();
		let ema_sq = state.ema_sq.unwrap();
		let variance = (ema_sq - ema * ema).max(0.0);
		let sigma = variance.sqrt();
		if sigma == 0.0 || ema == 0.0 {
			return TradeDecision::no_trade("zero price variance, no deviation signal")
		}

		let z = (price - ema) / sigma;
		if z.abs() > cfg.max_dev_threshold {
			return TradeDecision::no_trade("price deviation exceeds max_dev_threshold, likely regime change")
		}

		let base_confidence: f64 = if z.abs() >= cfg.extreme_dev_threshold {
			0.9
		} else if z.abs() >= cfg.strong_dev_threshold {
			0.65
		} else if z.abs() >= cfg.moderate_dev_threshold {
			0.4
		} else {
			return TradeDecision::no_trade("price deviation below moderate_dev_threshold")
		};

		let volume_multiplier = if cfg.require_volume_confirmation {
			let avg_hourly_volume = market.volume_24h.as_u128() as f64 / 24.0;
			let confirmed = market.volume_1h.as_u128() as f64 >= cfg.volume_confirmation_ratio * avg_hourly_volume;
			if confirmed {
				1.2
			} else {
				0.7
			}
		} else {
			1.0
		};

		let confidence = (base_confidence * volume_multiplier).clamp(0.1, 1.0);
		if confidence < cfg.min_confidence {
			return TradeDecision::no_trade("mean-reversion signal confidence below min_confidence")
		}

		let direction = if z > 0.0 { Direction::ZeroForOne } else { Direction::OneForZero };
		let amount_in = toolkit::scale_amount(cfg.min_amount_in, cfg.max_amount_in, confidence);
		let min_amount_out =
			toolkit::compute_min_amount_out(amount_in, market.price_fixed_point_1e18(), direction, cfg.slippage_bps);

		toolkit::record_trade(state, market.captured_at_ms);
		TradeDecision::trade(direction, amount_in, min_amount_out, confidence, "mean-reversion deviation signal")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Strategy;
	use batchswap_primitives::PoolKey;
	use bigdecimal::BigDecimal;

	fn config() -> MeanReversionConfig {
		MeanReversionConfig {
			ema_period: 20,
			ema_smoothing_factor: None,
			moderate_dev_threshold: 1.0,
			strong_dev_threshold: 2.0,
			extreme_dev_threshold: 3.0,
			max_dev_threshold: 10.0,
			cooldown_s: 30,
			min_confidence: 0.2,
			require_volume_confirmation: false,
			volume_confirmation_ratio: 1.5,
			min_data_points: 5,
			min_amount_in: U256::from(1_000u64),
			max_amount_in: U256::from(100_000u64),
			slippage_bps: 50,
		}
	}

	fn market_at(price: &str, captured_at_ms: u64) -> MarketData {
		MarketData {
			pool_id: Default::default(),
			pool_key: PoolKey {
				currency0: Default::default(),
				currency1: Default::default(),
				fee_bps: 30,
				tick_spacing: 60,
				hook_address: Default::default(),
			},
			current_price: BigDecimal::from_str(price).unwrap(),
			price_change_1h_pct: 0.0,
			price_change_24h_pct: 0.0,
			total_liquidity: U256::from(1_000_000u64),
			liquidity0: U256::from(500_000u64),
			liquidity1: U256::from(500_000u64),
			volume_1h: U256::from(100u64),
			volume_24h: U256::from(2_400u64),
			recent_swaps: vec![],
			captured_at_ms,
			reference_prices: vec![],
		}
	}

	#[test]
	fn insufficient_history_blocks_trade() {
		let strategy = MeanReversionStrategy::new(config());
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market_at("100", 1_000_000), &mut state);
		assert!(!decision.should_trade);
	}

	#[test]
	fn sharp_spike_triggers_contrarian_sell() {
		let strategy = MeanReversionStrategy::new(config());
		let mut state = StrategyState::new();
		for i in 0..10u64 {
			strategy.should_trade(&market_at("100", 1_000_000 + i * 1_000), &mut state);
		}
		let decision = strategy.should_trade(&market_at("140", 1_000_000 + 10_000), &mut state);
		assert!(decision.should_trade);
		assert_eq!(decision.direction, Some(Direction::ZeroForOne));
	}

	#[test]
	fn stable_price_series_yields_no_signal() {
		let strategy = MeanReversionStrategy::new(config());
		let mut state = StrategyState::new();
		let mut decision = TradeDecision::no_trade("init");
		for i in 0..10u64 {
			decision = strategy.should_trade(&market_at("100", 1_000_000 + i * 1_000), &mut state);
		}
		assert!(!decision.should_trade);
	}
}
