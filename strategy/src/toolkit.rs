use std::collections::VecDeque;

use batchswap_primitives::Direction;
use ethers::types::U256;

const WAD: u64 = 1_000_000_000_000_000_000;
const BPS_DENOMINATOR: u64 = 10_000;
const PRICE_HISTORY_CAPACITY: usize = 1000;

/// One observed (price, timestamp) pair in a mean-reversion strategy's ring buffer.
#[derive(Debug, Clone, Copy)]
pub struct PricePoint {
	pub price: f64,
	pub timestamp_ms: u64,
}

/// Per-(strategy instance, pool) mutable state (spec §3 `StrategyState`). Callers own one
/// instance per pool they trade with a given strategy.
#[derive(Debug, Clone, Default)]
pub struct StrategyState {
	pub last_trade_ts_ms: Option<u64>,
	pub price_history: VecDeque<PricePoint>,
	pub ema: Option<f64>,
	pub ema_sq: Option<f64>,
	pub last_total_liquidity: Option<U256>,
}

impl StrategyState {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push_price(&mut self, price: f64, timestamp_ms: u64) {
		if self.price_history.len() >= PRICE_HISTORY_CAPACITY {
			self.price_history.pop_front();
		}
		self.price_history.push_back(PricePoint { price, timestamp_ms });
	}

	pub fn data_points(&self) -> usize {
		self.price_history.len()
	}
}

/// A new trade is blocked while `now - last_trade_ts < cooldown_ms` (spec §4.5).
pub fn is_cooldown_active(state: &StrategyState, now_ms: u64, cooldown_ms: u64) -> bool {
	match state.last_trade_ts_ms {
		Some(last) => now_ms.saturating_sub(last) < cooldown_ms,
		None => false,
	}
}

pub fn record_trade(state: &mut StrategyState, now_ms: u64) {
	state.last_trade_ts_ms = Some(now_ms);
}

/// `min_amount_in + floor(f*100)/100 * (max_amount_in - min_amount_in)`, with `f` clamped to
/// `[0, 1]` and every intermediate kept in `U256` so precision never degrades to a float's ~15
/// significant digits (spec §4.5, §9).
pub fn scale_amount(min_amount_in: U256, max_amount_in: U256, factor: f64) -> U256 {
	let clamped = factor.clamp(0.0, 1.0);
	let basis_points = (clamped * 100.0).floor() as u64;
	let span = max_amount_in.saturating_sub(min_amount_in);
	min_amount_in + (span * U256::from(basis_points)) / U256::from(100u64)
}

pub fn clamp_amount(amount: U256, min_amount_in: U256, max_amount_in: U256) -> U256 {
	amount.clamp(min_amount_in, max_amount_in)
}

/// Spec §4.5 minimum-output formula. `price_fixed_point_1e18` is `floor(current_price * 1e18)`;
/// a zero price (or a price that floored to zero) yields a zero minimum output rather than
/// dividing by zero.
pub fn compute_min_amount_out(
	amount_in: U256,
	price_fixed_point_1e18: U256,
	direction: Direction,
	slippage_bps: u32,
) -> U256 {
	if price_fixed_point_1e18.is_zero() {
		return U256::zero()
	}
	let wad = U256::from(WAD);
	let expected_out = match direction {
		Direction::ZeroForOne => amount_in * price_fixed_point_1e18 / wad,
		Direction::OneForZero => amount_in * wad / price_fixed_point_1e18,
	};
	expected_out * U256::from(BPS_DENOMINATOR.saturating_sub(slippage_bps as u64)) / U256::from(BPS_DENOMINATOR)
}
