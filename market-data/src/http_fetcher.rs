use async_trait::async_trait;
use batchswap_primitives::{PoolKey, RawMarketData};
use ethers::types::H256;

use crate::fetcher::MarketDataFetcher;

/// Default `MarketDataFetcher`: polls a market-data service over HTTP rather than deriving
/// reserves from the hook contract, since the hook's ABI (spec §4.1) is scoped to the
/// commit-reveal surface and does not expose pool reserves — that lives on a separate AMM
/// pool-manager contract outside this crate's ABI. Grounded on the teacher's own use of
/// `reqwest` for non-chain HTTP collaborators (`engine/Cargo.toml`).
pub struct HttpMarketDataFetcher {
	client: reqwest::Client,
	base_url: String,
}

impl HttpMarketDataFetcher {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self { client: reqwest::Client::new(), base_url: base_url.into() }
	}

	fn pool_url(&self, pool_id: H256) -> String {
		format!("{}/pools/{:#x}", self.base_url.trim_end_matches('/'), pool_id)
	}
}

#[async_trait]
impl MarketDataFetcher for HttpMarketDataFetcher {
	async fn fetch_market_data(&self, pool_key: &PoolKey) -> anyhow::Result<RawMarketData> {
		let pool_id = pool_key.pool_id();
		let response = self.client.get(self.pool_url(pool_id)).send().await?.error_for_status()?;
		let mut raw: RawMarketData = response.json().await?;
		raw.pool_id.get_or_insert(pool_id);
		raw.pool_key.get_or_insert(*pool_key);
		Ok(raw)
	}

	fn clear_cache(&self, _pool_id: H256) {}

	fn clear_all_cache(&self) {}
}
