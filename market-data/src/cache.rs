use std::{
	collections::HashMap,
	sync::Mutex,
	time::{Duration, Instant},
};

use batchswap_primitives::{market::STALE_AFTER_MS, MarketData};
use ethers::types::H256;

/// Per-`pool_id` TTL cache over validated snapshots (spec §3, §5). A stale read evicts the entry
/// and returns `None`, pushing the refetch decision back to the caller rather than silently
/// serving old data.
#[derive(Default)]
pub struct MarketDataCache {
	entries: Mutex<HashMap<H256, (MarketData, Instant)>>,
}

impl MarketDataCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, data: MarketData) {
		self.entries.lock().unwrap().insert(data.pool_id, (data, Instant::now()));
	}

	/// Returns the cached snapshot unless it has exceeded the TTL, in which case it is evicted.
	pub fn get(&self, pool_id: H256) -> Option<MarketData> {
		let mut entries = self.entries.lock().unwrap();
		match entries.get(&pool_id) {
			Some((_, inserted_at))
				if inserted_at.elapsed() > Duration::from_millis(STALE_AFTER_MS) =>
			{
				entries.remove(&pool_id);
				None
			},
			Some((data, _)) => Some(data.clone()),
			None => None,
		}
	}

	pub fn clear(&self, pool_id: H256) {
		self.entries.lock().unwrap().remove(&pool_id);
	}

	pub fn clear_all(&self) {
		self.entries.lock().unwrap().clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use batchswap_primitives::PoolKey;
	use bigdecimal::BigDecimal;
	use ethers::types::U256;

	fn sample(pool_id: H256) -> MarketData {
		MarketData {
			pool_id,
			pool_key: PoolKey {
				currency0: Default::default(),
				currency1: Default::default(),
				fee_bps: 30,
				tick_spacing: 60,
				hook_address: Default::default(),
			},
			current_price: BigDecimal::from(1),
			price_change_1h_pct: 0.0,
			price_change_24h_pct: 0.0,
			total_liquidity: U256::from(1_000u64),
			liquidity0: U256::from(500u64),
			liquidity1: U256::from(500u64),
			volume_1h: U256::zero(),
			volume_24h: U256::zero(),
			recent_swaps: vec![],
			captured_at_ms: 0,
			reference_prices: vec![],
		}
	}

	#[test]
	fn insert_then_get_round_trips() {
		let cache = MarketDataCache::new();
		let pool_id = H256::repeat_byte(1);
		cache.insert(sample(pool_id));
		assert!(cache.get(pool_id).is_some());
	}

	#[test]
	fn clear_evicts() {
		let cache = MarketDataCache::new();
		let pool_id = H256::repeat_byte(2);
		cache.insert(sample(pool_id));
		cache.clear(pool_id);
		assert!(cache.get(pool_id).is_none());
	}

	#[test]
	fn clear_all_evicts_everything() {
		let cache = MarketDataCache::new();
		cache.insert(sample(H256::repeat_byte(3)));
		cache.insert(sample(H256::repeat_byte(4)));
		cache.clear_all();
		assert!(cache.get(H256::repeat_byte(3)).is_none());
		assert!(cache.get(H256::repeat_byte(4)).is_none());
	}
}
