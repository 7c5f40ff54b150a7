use std::collections::HashMap;
use std::str::FromStr;

use batchswap_primitives::{Direction, MarketData, ReferencePrice, TradeDecision};
use ethers::types::U256;
use serde::Deserialize;

use crate::toolkit::{self, StrategyState};

const REFERENCE_PRICE_MAX_AGE_MS: u64 = 5 * 60 * 1_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ArbitrageConfig {
	pub min_spread_pct: f64,
	pub max_spread_pct: f64,
	pub estimated_gas_cost: U256,
	pub min_net_profit: U256,
	/// Reference prices seeded at startup; merged with `MarketData::reference_prices` injected
	/// per-snapshot by the market-data collaborator (spec §4.5.2).
	pub reference_prices: Vec<ReferencePrice>,
	pub cooldown_s: u64,
	pub min_liquidity: U256,
	pub max_slippage_bps: u32,
	pub source_weights: HashMap<String, f64>,
	pub enable_cross_pool: bool,
	pub min_amount_in: U256,
	pub max_amount_in: U256,
}

struct Opportunity {
	spread_pct: f64,
	confidence: f64,
}

/// Trades against the largest confirmed spread between the pool's current price and a set of
/// external reference prices (spec §4.5.2).
pub struct ArbitrageStrategy {
	pub config: ArbitrageConfig,
}

impl ArbitrageStrategy {
	pub fn new(config: ArbitrageConfig) -> Self {
		Self { config }
	}

	fn source_weight(&self, source: &str) -> f64 {
		self.config.source_weights.get(source).copied().unwrap_or(1.0)
	}

	fn best_opportunity(&self, current_price: f64, now_ms: u64, injected: &[ReferencePrice]) -> Option<Opportunity> {
		self.config
			.reference_prices
			.iter()
			.chain(injected.iter())
			.filter(|r| now_ms.saturating_sub(r.timestamp_ms) <= REFERENCE_PRICE_MAX_AGE_MS)
			.filter_map(|r| {
				if current_price == 0.0 {
					return None
				}
				let spread_pct = (r.price - current_price) / current_price * 100.0;
				if spread_pct.abs() < self.config.min_spread_pct || spread_pct.abs() > self.config.max_spread_pct {
					return None
				}
				let weight = self.source_weight(&r.source);
				let confidence =
					((spread_pct.abs() / (5.0 * self.config.min_spread_pct)) * r.confidence * weight).clamp(0.1, 1.0);
				Some(Opportunity { spread_pct, confidence })
			})
			.max_by(|a, b| {
				(a.spread_pct.abs() * a.confidence)
					.partial_cmp(&(b.spread_pct.abs() * b.confidence))
					.unwrap_or(std::cmp::Ordering::Equal)
			})
	}
}

impl crate::Strategy for ArbitrageStrategy {
	fn should_trade(&self, market: &MarketData, state: &mut StrategyState) -> TradeDecision {
		let cfg = &self.config;

		if toolkit::is_cooldown_active(state, market.captured_at_ms, cfg.cooldown_s * 1_000) {
			return TradeDecision::no_trade("arbitrage strategy in cooldown")
		}

		if market.total_liquidity < cfg.min_liquidity {
			return TradeDecision::no_trade("pool liquidity below min_liquidity")
		}

		let current_price = f64::from_str(&market.current_price.to_string()).unwrap_or(0.0);
		let Some(opportunity) = self.best_opportunity(current_price, market.captured_at_ms, &market.reference_prices) else {
			return TradeDecision::no_trade("no confirmed arbitrage spread among reference prices")
		};

		let direction = if opportunity.spread_pct > 0.0 { Direction::OneForZero } else { Direction::ZeroForOne };

		let size_factor = (opportunity.confidence * opportunity.spread_pct.abs() / 2.0).min(1.0);
		let amount_in = toolkit::scale_amount(cfg.min_amount_in, cfg.max_amount_in, size_factor);

		let spread_bps = (opportunity.spread_pct.abs() * 100.0).floor() as u64;
		let estimated_profit = amount_in * U256::from(spread_bps) / U256::from(10_000u64);
		let net_profit = estimated_profit.saturating_sub(cfg.estimated_gas_cost);
		if net_profit < cfg.min_net_profit {
			return TradeDecision::no_trade("estimated net profit below min_net_profit after gas")
		}

		let min_amount_out = toolkit::compute_min_amount_out(
			amount_in,
			market.price_fixed_point_1e18(),
			direction,
			cfg.max_slippage_bps,
		);

		toolkit::record_trade(state, market.captured_at_ms);
		TradeDecision::trade(direction, amount_in, min_amount_out, opportunity.confidence, "confirmed arbitrage spread")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Strategy;
	use batchswap_primitives::PoolKey;
	use bigdecimal::BigDecimal;

	fn config() -> ArbitrageConfig {
		ArbitrageConfig {
			min_spread_pct: 0.5,
			max_spread_pct: 10.0,
			estimated_gas_cost: U256::from(10u64),
			min_net_profit: U256::from(5u64),
			reference_prices: vec![ReferencePrice {
				source: "cex".into(),
				price: 2040.0,
				timestamp_ms: 1_000_000,
				confidence: 1.0,
			}],
			cooldown_s: 30,
			min_liquidity: U256::from(1_000u64),
			max_slippage_bps: 50,
			source_weights: HashMap::new(),
			enable_cross_pool: false,
			min_amount_in: U256::from(1_000u64),
			max_amount_in: U256::from(100_000u64),
		}
	}

	fn market() -> MarketData {
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
			total_liquidity: U256::from(1_000_000u64),
			liquidity0: U256::from(500_000u64),
			liquidity1: U256::from(500_000u64),
			volume_1h: U256::from(100u64),
			volume_24h: U256::from(200u64),
			recent_swaps: vec![],
			captured_at_ms: 1_000_000,
			reference_prices: vec![],
		}
	}

	#[test]
	fn trades_toward_higher_reference_price() {
		let strategy = ArbitrageStrategy::new(config());
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market(), &mut state);
		assert!(decision.should_trade);
		assert_eq!(decision.direction, Some(Direction::OneForZero));
	}

	#[test]
	fn trades_on_injected_market_reference_price_alone() {
		let mut cfg = config();
		cfg.reference_prices.clear();
		let mut market = market();
		market.reference_prices.push(ReferencePrice { source: "injected".into(), price: 2040.0, timestamp_ms: 1_000_000, confidence: 1.0 });
		let strategy = ArbitrageStrategy::new(cfg);
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market, &mut state);
		assert!(decision.should_trade);
		assert_eq!(decision.direction, Some(Direction::OneForZero));
	}

	#[test]
	fn stale_reference_prices_are_ignored() {
		let mut cfg = config();
		cfg.reference_prices[0].timestamp_ms = 0;
		let strategy = ArbitrageStrategy::new(cfg);
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market(), &mut state);
		assert!(!decision.should_trade);
	}

	#[test]
	fn insufficient_liquidity_blocks_trade() {
		let mut cfg = config();
		cfg.min_liquidity = U256::from(10_000_000u64);
		let strategy = ArbitrageStrategy::new(cfg);
		let mut state = StrategyState::new();
		let decision = strategy.should_trade(&market(), &mut state);
		assert!(!decision.should_trade);
		assert!(decision.reasoning.contains("liquidity"));
	}
}
