mod errors;
mod logging;
mod runtime;
mod settings;
mod strategies;

use std::sync::Arc;

use batchswap_coordinator::{BatchCoordinator, CoordinatorConfig};
use batchswap_executor::{BatchExecutor, ExecutorConfig, ProofCache};
use batchswap_hook_client::{api::HookApi, client::EthersHookClient};
use batchswap_market_data::{HttpMarketDataFetcher, MarketDataCache, PoolMonitor};
use batchswap_primitives::PoolKey;
use batchswap_reveal_manager::RevealManager;
use clap::Parser;
use errors::AgentError;
use ethers::{
	middleware::SignerMiddleware,
	providers::{Http, Provider},
	signers::{LocalWallet, Signer},
};
use runtime::{Agent, AgentManager};
use settings::{load_settings, CliOptions, Settings};
use std::time::Duration;
use strategies::build_strategy;
use tokio::sync::oneshot;

type EthClient = SignerMiddleware<Provider<Http>, LocalWallet>;

async fn build_hook_client(settings: &Settings) -> anyhow::Result<(Arc<dyn HookApi>, ethers::types::Address)> {
	let provider = Provider::<Http>::try_from(settings.eth_rpc_http_endpoint.as_str())?;
	let wallet: LocalWallet = settings.private_key.parse::<LocalWallet>().map_err(AgentError::InvalidPrivateKey)?;
	let wallet = wallet.with_chain_id(settings.chain_id);
	let user = wallet.address();
	let client = Arc::new(SignerMiddleware::new(provider, wallet));
	let hook: Arc<dyn HookApi> = Arc::new(EthersHookClient::<EthClient>::new(settings.hook_address, client));
	Ok((hook, user))
}

fn build_agents(settings: &Settings, user: ethers::types::Address) -> anyhow::Result<Vec<Arc<Agent>>> {
	if settings.pools.is_empty() {
		return Err(AgentError::NoPoolsConfigured.into())
	}

	let mut agents = Vec::with_capacity(settings.pools.len());
	let mut seen = std::collections::HashSet::new();
	for (index, pool) in settings.pools.iter().enumerate() {
		let pool_key = PoolKey {
			currency0: pool.currency0,
			currency1: pool.currency1,
			fee_bps: pool.fee_bps,
			tick_spacing: pool.tick_spacing,
			hook_address: settings.hook_address,
		};
		let pool_id = pool_key.pool_id();
		if !seen.insert(pool_id) {
			return Err(AgentError::DuplicatePool(pool_id).into())
		}

		let agent_id = format!("{}-{index}", settings.agent_id);
		let strategy = build_strategy(&pool.strategy);
		let default_slippage_bps = pool.trading.as_ref().map(|trading| trading.default_slippage_bps);
		agents.push(Arc::new(Agent::new(agent_id, pool_key, user, strategy, settings.intent_ttl_s, default_slippage_bps)));
	}
	Ok(agents)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let opts = CliOptions::parse();
	let settings = load_settings(opts)?;

	logging::init_logging();
	tracing::info!(agent_id = %settings.agent_id, "starting batch-swap agent");

	let (hook, user) = build_hook_client(&settings).await?;
	let agents = build_agents(&settings, user)?;

	let reveal_manager = Arc::new(match settings.reveal_submission_delay_ms {
		Some(delay_ms) => RevealManager::with_submission_delay(delay_ms),
		None => RevealManager::new(),
	});
	let proof_cache = Arc::new(ProofCache::new());

	let coordinator_config = CoordinatorConfig {
		quorum: settings.coordinator.quorum,
		min_total_commitments: settings.coordinator.min_total_commitments,
		countdown_ms: settings.coordinator.countdown_ms,
		conflict_resolution: settings.coordinator.conflict_resolution,
	};
	let (coordinator, batch_events) = BatchCoordinator::new(coordinator_config, settings.coordinator.channel_capacity);

	let executor_config = ExecutorConfig {
		poll_interval_ms: settings.executor.poll_interval_ms,
		post_reveal_delay_ms: settings.executor.post_reveal_delay_ms,
		max_retries: settings.executor.max_retries,
		retry_base_delay_ms: settings.executor.retry_base_delay_ms,
	};
	let executor = Arc::new(BatchExecutor::new(executor_config, hook.clone(), reveal_manager.clone(), proof_cache));

	let fetcher = Arc::new(HttpMarketDataFetcher::new(settings.market_data_base_url.clone()));
	let cache = Arc::new(MarketDataCache::new());
	let pools: Vec<PoolKey> = agents.iter().map(|agent| agent.pool_key).collect();
	let monitor = Arc::new(PoolMonitor::new(
		fetcher,
		cache,
		pools,
		Duration::from_millis(settings.market_data_poll_interval_ms),
	));

	let manager = AgentManager::new(agents, hook, reveal_manager, coordinator, executor, monitor.clone());

	let (shutdown_tx, shutdown_rx) = oneshot::channel();
	let monitor_shutdown = {
		let (tx, rx) = oneshot::channel();
		let monitor = monitor.clone();
		tokio::spawn(async move { monitor.run(rx).await });
		tx
	};

	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::info!("received shutdown signal");
			let _ = shutdown_tx.send(());
		}
	});

	let result = manager.run(settings.use_zk, batch_events, shutdown_rx).await;
	let _ = monitor_shutdown.send(());
	result
}
