use batchswap_primitives::{Direction, MarketData, TradeDecision};
use ethers::types::U256;
use serde::Deserialize;

use crate::toolkit::{self, StrategyState};

/// Configuration for the momentum strategy (spec §4.5.1).
#[derive(Debug, Clone, Deserialize)]
pub struct MomentumConfig {
	pub threshold_1h_pct: f64,
	pub threshold_24h_pct: f64,
	pub short_weight: f64,
	pub long_weight: f64,
	pub min_volume_threshold: U256,
	pub cooldown_s: u64,
	pub max_volatility_pct: f64,
	pub require_volume_confirmation: bool,
	pub trend_confirmation_swaps: usize,
	pub min_amount_in: U256,
	pub max_amount_in: U256,
	pub slippage_bps: u32,
}

/// Trades in the direction of a weighted 1h/24h price move, confirmed by recent swap flow
/// (spec §4.5.1).
pub struct MomentumStrategy {
	pub config: MomentumConfig,
}

impl MomentumStrategy {
	pub fn new(config: MomentumConfig) -> Self {
		Self { config }
	}

	fn trend_confirmation_multiplier(&self, market: &MarketData, composite: f64) -> f64 {
		let window = self.config.trend_confirmation_swaps;
		if window == 0 || market.recent_swaps.is_empty() {
			return 1.0
		}
		let recent = &market.recent_swaps[market.recent_swaps.len().saturating_sub(window)..];
		if recent.is_empty() {
			return 1.0
		}

		let expecting_uptrend = composite > 0.0;
		let aligned = recent
			.iter()
			.filter(|swap| if expecting_uptrend { !swap.zero_for_one } else { swap.zero_for_one })
			.count();
		let ratio = aligned as f64 / recent.len() as f64;

		if ratio >= 0.6 {
			1.2
		} else {
			0.7
		}
	}
}

impl crate::Strategy for MomentumStrategy {
	fn should_trade(&self, market: &MarketData, state: &mut StrategyState) -> TradeDecision {
		let cfg = &self.config;

		if toolkit::is_cooldown_active(state, market.captured_at_ms, cfg.cooldown_s * 1_000) {
			return TradeDecision::no_trade("momentum strategy in cooldown")
		}

		let delta_1h = market.price_change_1h_pct;
		let delta_24h = market.price_change_24h_pct;

		if delta_1h.abs() > cfg.max_volatility_pct || delta_24h.abs() > cfg.max_volatility_pct {
			return TradeDecision::no_trade("price volatility exceeds max_volatility_pct")
		}

		let composite = delta_1h * cfg.short_weight + delta_24h * cfg.long_weight;
		let threshold = cfg.threshold_1h_pct * cfg.short_weight + cfg.threshold_24h_pct * cfg.long_weight;
		if composite.abs() < threshold {
			return TradeDecision::no_trade("composite price movement below threshold")
		}

		if cfg.require_volume_confirmation && market.volume_1h < cfg.min_volume_threshold {
			return TradeDecision::no_trade("insufficient 1h volume for momentum confirmation")
		}

		let trend_multiplier = self.trend_confirmation_multiplier(market, composite);

		let conf_1h = if cfg.threshold_1h_pct > 0.0 { (delta_1h.abs() / (3.0 * cfg.threshold_1h_pct)).min(1.0) } else { 0.0 };
		let conf_24h =
			if cfg.threshold_24h_pct > 0.0 { (delta_24h.abs() / (3.0 * cfg.threshold_24h_pct)).min(1.0) } else { 0.0 };
		let weight_sum = cfg.short_weight + cfg.long_weight;
		let base_confidence =
			if weight_sum > 0.0 { (conf_1h * cfg.short_weight + conf_24h * cfg.long_weight) / weight_sum } else { 0.0 };

		let alignment_bonus = if delta_1h == 0.0 || delta_24h == 0.0 {
			0.0
		} else if delta_1h.signum() == delta_24h.signum() {
			0.15
		} else {
			-0.15
		};

		let confidence = ((base_confidence + alignment_bonus) * trend_multiplier).clamp(0.1, 1.0);

		let direction = if composite > 0.0 { Direction::ZeroForOne } else { Direction::OneForZero };
		let amount_in = toolkit::scale_amount(cfg.min_amount_in, cfg.max_amount_in, confidence);
		let min_amount_out =
			toolkit::compute_min_amount_out(amount_in, market.price_fixed_point_1e18(), direction, cfg.slippage_bps);

		toolkit::record_trade(state, market.captured_at_ms);
		TradeDecision::trade(direction, amount_in, min_amount_out, confidence, "momentum signal confirmed")
	}
}
