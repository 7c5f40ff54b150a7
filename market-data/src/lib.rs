pub mod cache;
pub mod fetcher;
pub mod http_fetcher;
pub mod monitor;

pub use cache::MarketDataCache;
pub use fetcher::{calculate_volume, MarketDataFetcher};
pub use http_fetcher::HttpMarketDataFetcher;
pub use monitor::PoolMonitor;
