use std::{collections::HashMap, path::PathBuf};

use batchswap_primitives::ConflictResolutionStrategy;
use batchswap_strategy::{ArbitrageConfig, LiquidityConfig, MeanReversionConfig, MomentumConfig};
use clap::Parser;
use config::{Config, ConfigError, Environment, Map, Source, Value};
use ethers::types::Address;
use serde::Deserialize;

/// One pool an agent trades, paired with the strategy it runs against it (spec §4.7).
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSettings {
	pub currency0: Address,
	pub currency1: Address,
	pub fee_bps: u32,
	pub tick_spacing: i32,
	pub strategy: StrategySettings,
	#[serde(default)]
	pub trading: Option<TradingSettings>,
}

/// Per-pool trading bounds and the slippage an agent advertises to the coordinator's
/// conflict-resolution step (spec §6, §4.3).
#[derive(Debug, Clone, Deserialize)]
pub struct TradingSettings {
	pub max_amount_in: Option<ethers::types::U256>,
	pub min_amount_in: Option<ethers::types::U256>,
	pub default_slippage_bps: u32,
}

/// Tagged union of the four concrete strategy configs (spec §4.5), selected per pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySettings {
	Momentum(MomentumConfig),
	Arbitrage(ArbitrageConfig),
	Liquidity(LiquidityConfig),
	MeanReversion(MeanReversionConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatorSettings {
	pub quorum: u32,
	pub min_total_commitments: u32,
	pub countdown_ms: u64,
	pub conflict_resolution: ConflictResolutionStrategy,
	pub channel_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorSettings {
	pub poll_interval_ms: u64,
	pub post_reveal_delay_ms: u64,
	pub max_retries: u32,
	pub retry_base_delay_ms: u64,
}

/// Top-level settings for one agent process (spec §6). Loaded from a TOML file, overridden by
/// `AGENT__`-prefixed environment variables, overridden in turn by CLI flags — the same
/// file-then-env-then-cli precedence as the teacher's settings modules.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
	pub agent_id: String,
	pub eth_rpc_http_endpoint: String,
	pub chain_id: u64,
	pub private_key: String,
	pub hook_address: Address,
	pub market_data_base_url: String,
	pub market_data_poll_interval_ms: u64,
	pub reveal_submission_delay_ms: Option<u64>,
	pub intent_ttl_s: u64,
	pub use_zk: bool,
	pub coordinator: CoordinatorSettings,
	pub executor: ExecutorSettings,
	pub pools: Vec<PoolSettings>,
}

/// CLI flags, parsed with `clap` and layered on top of the file/env config as a `config::Source`
/// (mirrors `TrackerOptions`/`insert_command_line_option` in the teacher's
/// `api/bin/chainflip-ingress-egress-tracker/src/settings.rs`).
#[derive(Parser, Debug, Clone, Default)]
#[clap(version, about = "Batch-swap coordination agent")]
pub struct CliOptions {
	#[clap(long = "config", default_value = "agent.toml", help = "Path to the agent's TOML config file")]
	pub config_file: PathBuf,

	#[clap(long = "agent_id", help = "Overrides the configured agent_id")]
	pub agent_id: Option<String>,

	#[clap(long = "eth.rpc.http_endpoint", help = "Overrides the configured eth_rpc_http_endpoint")]
	pub eth_rpc_http_endpoint: Option<String>,

	#[clap(long = "eth.private_key", env = "AGENT_PRIVATE_KEY", hide_env_values = true)]
	pub private_key: Option<String>,

	#[clap(long = "market_data.base_url", help = "Overrides the configured market_data_base_url")]
	pub market_data_base_url: Option<String>,
}

fn insert_override(map: &mut HashMap<String, Value>, key: &str, value: &Option<String>) {
	if let Some(value) = value {
		map.insert(key.to_string(), Value::new(Some(&key.to_string()), value.clone()));
	}
}

impl Source for CliOptions {
	fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
		Box::new((*self).clone())
	}

	fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
		let mut map: HashMap<String, Value> = HashMap::new();
		insert_override(&mut map, "agent_id", &self.agent_id);
		insert_override(&mut map, "eth_rpc_http_endpoint", &self.eth_rpc_http_endpoint);
		insert_override(&mut map, "private_key", &self.private_key);
		insert_override(&mut map, "market_data_base_url", &self.market_data_base_url);
		Ok(map)
	}
}

/// Loads settings from `opts.config_file` (if it exists), then `AGENT__`-separated environment
/// variables, then CLI overrides, in increasing precedence order.
pub fn load_settings(opts: CliOptions) -> Result<Settings, ConfigError> {
	let mut builder = Config::builder();
	if opts.config_file.exists() {
		builder = builder.add_source(config::File::from(opts.config_file.clone()));
	}
	builder
		.add_source(Environment::default().prefix("AGENT").separator("__"))
		.add_source(opts)
		.build()?
		.try_deserialize()
}
