pub mod arbitrage;
pub mod liquidity;
pub mod mean_reversion;
pub mod momentum;
pub mod toolkit;

pub use arbitrage::{ArbitrageConfig, ArbitrageStrategy};
pub use liquidity::{LiquidityConfig, LiquidityStrategy};
pub use mean_reversion::{MeanReversionConfig, MeanReversionStrategy};
pub use momentum::{MomentumConfig, MomentumStrategy};
pub use toolkit::{clamp_amount, compute_min_amount_out, is_cooldown_active, record_trade, scale_amount, StrategyState};

use batchswap_primitives::{MarketData, TradeDecision};

/// Any component that can turn a market-data snapshot into a trade-or-no-trade decision (spec
/// §4.5). Shared helpers (validation, cooldown, clamping) live on `toolkit` and are composed in
/// rather than inherited, per Design Notes §9.
pub trait Strategy {
	fn should_trade(&self, market: &MarketData, state: &mut StrategyState) -> TradeDecision;
}
