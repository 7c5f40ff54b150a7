use batchswap_strategy::{ArbitrageStrategy, LiquidityStrategy, MeanReversionStrategy, MomentumStrategy, Strategy};

use crate::settings::StrategySettings;

/// Builds the concrete strategy a pool's config selects (spec §4.5, §4.7).
pub fn build_strategy(settings: &StrategySettings) -> Box<dyn Strategy + Send + Sync> {
	match settings {
		StrategySettings::Momentum(config) => Box::new(MomentumStrategy::new(config.clone())),
		StrategySettings::Arbitrage(config) => Box::new(ArbitrageStrategy::new(config.clone())),
		StrategySettings::Liquidity(config) => Box::new(LiquidityStrategy::new(config.clone())),
		StrategySettings::MeanReversion(config) => Box::new(MeanReversionStrategy::new(config.clone())),
	}
}
