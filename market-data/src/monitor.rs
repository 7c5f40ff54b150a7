use std::{sync::Arc, time::Duration};

use batchswap_primitives::{validate_market_data, MarketData, PoolKey};
use tokio::sync::broadcast;

use crate::{cache::MarketDataCache, fetcher::MarketDataFetcher};

/// Polls `fetch_market_data` for a configured set of pools on a fixed interval and republishes
/// validated, changed snapshots on a broadcast channel so multiple agents sharing a process can
/// observe the same pool without duplicate fetches (spec §6, supplemented per SPEC_FULL §4.6).
pub struct PoolMonitor {
	fetcher: Arc<dyn MarketDataFetcher>,
	cache: Arc<MarketDataCache>,
	pools: Vec<PoolKey>,
	poll_interval: Duration,
	sender: broadcast::Sender<MarketData>,
}

impl PoolMonitor {
	pub fn new(
		fetcher: Arc<dyn MarketDataFetcher>,
		cache: Arc<MarketDataCache>,
		pools: Vec<PoolKey>,
		poll_interval: Duration,
	) -> Self {
		let (sender, _) = broadcast::channel(256);
		Self { fetcher, cache, pools, poll_interval, sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<MarketData> {
		self.sender.subscribe()
	}

	/// Runs until `shutdown` resolves. Each tick fetches every configured pool, validates it,
	/// and — if the snapshot's `captured_at_ms` is newer than whatever is cached — stores it and
	/// broadcasts it to subscribers.
	pub async fn run(&self, mut shutdown: tokio::sync::oneshot::Receiver<()>) {
		let mut ticker = tokio::time::interval(self.poll_interval);
		loop {
			tokio::select! {
				_ = ticker.tick() => self.poll_once().await,
				_ = &mut shutdown => {
					tracing::info!("pool monitor shutting down");
					return
				}
			}
		}
	}

	pub async fn poll_once(&self) {
		for pool_key in &self.pools {
			match self.fetcher.fetch_market_data(pool_key).await {
				Ok(raw) => {
					let now_ms = raw.captured_at_ms;
					let validation = validate_market_data(&raw, now_ms);
					if !validation.is_valid {
						tracing::warn!(?validation.errors, "discarding invalid market data");
						continue
					}
					let snapshot = validation.snapshot.expect("validated");
					let is_new = self
						.cache
						.get(snapshot.pool_id)
						.map(|existing| existing.captured_at_ms < snapshot.captured_at_ms)
						.unwrap_or(true);
					if is_new {
						self.cache.insert(snapshot.clone());
						let _ = self.sender.send(snapshot);
					}
				},
				Err(error) => {
					tracing::warn!(%error, pool = ?pool_key, "market data fetch failed");
				},
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use batchswap_primitives::RawMarketData;
	use ethers::types::H256;
	use std::sync::Mutex;

	struct StaticFetcher {
		raw: Mutex<RawMarketData>,
	}

	#[async_trait]
	impl MarketDataFetcher for StaticFetcher {
		async fn fetch_market_data(&self, _pool_key: &PoolKey) -> anyhow::Result<RawMarketData> {
			Ok(self.raw.lock().unwrap().clone())
		}
		fn clear_cache(&self, _pool_id: H256) {}
		fn clear_all_cache(&self) {}
	}

	fn pool_key() -> PoolKey {
		PoolKey {
			currency0: Default::default(),
			currency1: Default::default(),
			fee_bps: 30,
			tick_spacing: 60,
			hook_address: Default::default(),
		}
	}

	fn raw_for(pool_key: &PoolKey, captured_at_ms: u64) -> RawMarketData {
		RawMarketData {
			pool_id: Some(pool_key.pool_id()),
			pool_key: Some(*pool_key),
			current_price: "100".to_string(),
			price_change_1h_pct: 0.0,
			price_change_24h_pct: 0.0,
			total_liquidity: "1000".to_string(),
			liquidity0: "500".to_string(),
			liquidity1: "500".to_string(),
			volume_1h: "0".to_string(),
			volume_24h: "0".to_string(),
			recent_swaps: vec![],
			captured_at_ms,
			reference_prices: vec![],
		}
	}

	#[tokio::test]
	async fn poll_once_caches_and_broadcasts_new_snapshot() {
		let key = pool_key();
		let fetcher = Arc::new(StaticFetcher { raw: Mutex::new(raw_for(&key, 1_000)) });
		let cache = Arc::new(MarketDataCache::new());
		let monitor =
			PoolMonitor::new(fetcher.clone(), cache.clone(), vec![key], Duration::from_millis(10));
		let mut rx = monitor.subscribe();

		monitor.poll_once().await;

		assert!(cache.get(key.pool_id()).is_some());
		let received = rx.try_recv().expect("broadcast message");
		assert_eq!(received.pool_id, key.pool_id());
	}

	#[tokio::test]
	async fn stale_duplicate_snapshot_is_not_rebroadcast() {
		let key = pool_key();
		let fetcher = Arc::new(StaticFetcher { raw: Mutex::new(raw_for(&key, 1_000)) });
		let cache = Arc::new(MarketDataCache::new());
		let monitor =
			PoolMonitor::new(fetcher.clone(), cache.clone(), vec![key], Duration::from_millis(10));
		let mut rx = monitor.subscribe();

		monitor.poll_once().await;
		rx.try_recv().expect("first broadcast");

		// same captured_at_ms again -> not newer, should not rebroadcast
		monitor.poll_once().await;
		assert!(rx.try_recv().is_err());
	}
}
