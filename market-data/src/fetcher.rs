use async_trait::async_trait;
use batchswap_primitives::{PoolKey, RawMarketData, RecentSwap};
use ethers::types::U256;

/// The market-data ingestion collaborator, consumed as a periodic fetch (spec §1, §6). The core
/// does not implement price discovery itself — this trait is the seam a real chain-indexing
/// implementation plugs into.
#[async_trait]
pub trait MarketDataFetcher: Send + Sync {
	async fn fetch_market_data(&self, pool_key: &PoolKey) -> anyhow::Result<RawMarketData>;

	fn clear_cache(&self, pool_id: ethers::types::H256);

	fn clear_all_cache(&self);
}

fn abs_i256(value: ethers::types::I256) -> U256 {
	if value.is_negative() {
		(-value).into_raw()
	} else {
		value.into_raw()
	}
}

/// Sum of `|amount0| + |amount1|` over swaps within `window_s` seconds of `now_ms` (spec §6).
pub fn calculate_volume(swaps: &[RecentSwap], window_s: u64, now_ms: u64) -> U256 {
	let window_ms = window_s.saturating_mul(1000);
	let cutoff = now_ms.saturating_sub(window_ms);
	swaps
		.iter()
		.filter(|swap| swap.timestamp_ms >= cutoff)
		.fold(U256::zero(), |acc, swap| acc + abs_i256(swap.amount0) + abs_i256(swap.amount1))
}
