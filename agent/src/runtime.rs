use std::{
	collections::HashSet,
	sync::{
		atomic::{AtomicU64, Ordering},
		Arc, Mutex,
	},
};

use batchswap_coordinator::BatchCoordinator;
use batchswap_executor::BatchExecutor;
use batchswap_hook_client::{api::HookApi, compute_keccak_commitment_hash};
use batchswap_market_data::PoolMonitor;
use batchswap_primitives::{
	AgentReadinessSignal, BatchReadyEvent, CommitmentHash, Direction, MarketData, PoolKey, SwapIntent,
};
use batchswap_reveal_manager::RevealManager;
use batchswap_strategy::{Strategy, StrategyState};
use ethers::types::{Address, H256, U256};
use tokio::sync::{broadcast, mpsc, oneshot};

/// One strategy instance trading one pool (spec §4.7): owns its own `StrategyState` and turns
/// market-data snapshots for its pool into on-chain commitments plus a coordinator readiness
/// signal.
pub struct Agent {
	pub agent_id: String,
	pub pool_key: PoolKey,
	pub pool_id: H256,
	pub user: Address,
	strategy: Box<dyn Strategy + Send + Sync>,
	state: Mutex<StrategyState>,
	nonce: AtomicU64,
	intent_ttl_s: u64,
	default_slippage_bps: Option<u32>,
	/// Commitment hashes this agent has itself submitted and not yet seen cleared from the
	/// shared pool's reveal set — `reveal_manager` is one `Arc` shared by every agent trading
	/// the pool, so counting *its* `get_reveals_for_pool` directly would report every other
	/// agent's pending commitments too.
	own_pending: Mutex<HashSet<CommitmentHash>>,
}

impl Agent {
	pub fn new(
		agent_id: String,
		pool_key: PoolKey,
		user: Address,
		strategy: Box<dyn Strategy + Send + Sync>,
		intent_ttl_s: u64,
		default_slippage_bps: Option<u32>,
	) -> Self {
		Self {
			agent_id,
			pool_key,
			pool_id: pool_key.pool_id(),
			user,
			strategy,
			state: Mutex::new(StrategyState::new()),
			nonce: AtomicU64::new(0),
			intent_ttl_s,
			default_slippage_bps,
			own_pending: Mutex::new(HashSet::new()),
		}
	}

	/// This agent's own submitted-but-unconfirmed commitment count, not the shared pool's total
	/// (spec §4.3/§8 scenario 1: the coordinator sums each agent's own count). Hashes drop out
	/// once `reveal_manager` no longer carries them — cleared on successful batch execution.
	fn pending_commitment_count(&self, reveal_manager: &RevealManager) -> u32 {
		let still_pending: HashSet<CommitmentHash> =
			reveal_manager.get_reveals_for_pool(self.pool_id).into_iter().map(|r| r.commitment_hash).collect();
		let mut own_pending = self.own_pending.lock().unwrap();
		own_pending.retain(|hash| still_pending.contains(hash));
		own_pending.len() as u32
	}

	/// Runs the strategy against one market-data snapshot; on a trade decision, commits and
	/// buffers the reveal, then signals readiness to the coordinator (spec §4.7).
	pub async fn on_market_data(
		&self,
		market: &MarketData,
		hook: &dyn HookApi,
		reveal_manager: &RevealManager,
		coordinator: &BatchCoordinator,
	) -> anyhow::Result<()> {
		let decision = {
			let mut state = self.state.lock().unwrap();
			self.strategy.should_trade(market, &mut state)
		};

		if !decision.should_trade {
			tracing::debug!(agent_id = %self.agent_id, reasoning = %decision.reasoning, "no trade");
			return Ok(())
		}

		let direction = decision.direction.expect("trade decisions always carry a direction");
		let (token_in, token_out) = match direction {
			Direction::ZeroForOne => (self.pool_key.currency0, self.pool_key.currency1),
			Direction::OneForZero => (self.pool_key.currency1, self.pool_key.currency0),
		};

		let intent = SwapIntent {
			user: self.user,
			token_in,
			token_out,
			amount_in: decision.amount_in.expect("trade decisions always carry an amount"),
			min_amount_out: decision.min_amount_out.expect("trade decisions always carry a min amount out"),
			recipient: self.user,
			nonce: U256::from(self.nonce.fetch_add(1, Ordering::SeqCst)),
			deadline_unix: market.captured_at_ms / 1000 + self.intent_ttl_s,
		};

		let commitment_hash = compute_keccak_commitment_hash(&intent);
		hook.submit_commitment(&self.pool_key, commitment_hash).await?;
		reveal_manager.add_reveal(commitment_hash, intent, self.pool_key, self.pool_id, false);
		self.own_pending.lock().unwrap().insert(commitment_hash);

		let pending_commitments = self.pending_commitment_count(reveal_manager);
		coordinator.signal_ready(AgentReadinessSignal {
			agent_id: self.agent_id.clone(),
			pool_id: self.pool_id,
			ready: true,
			pending_commitments,
			preferred_slippage_bps: self.default_slippage_bps,
			timestamp_ms: market.captured_at_ms,
		})?;

		tracing::info!(agent_id = %self.agent_id, %commitment_hash, confidence = decision.confidence, "submitted commitment");
		Ok(())
	}
}

/// Runs N agents against a shared coordinator/executor/hook/monitor (spec §4.7): dispatches each
/// market-data snapshot to the agents trading that pool, drains `BatchReadyEvent`s for logging,
/// and drives the executor's polling loop until shut down.
pub struct AgentManager {
	agents: Vec<Arc<Agent>>,
	hook: Arc<dyn HookApi>,
	reveal_manager: Arc<RevealManager>,
	coordinator: BatchCoordinator,
	executor: Arc<BatchExecutor>,
	monitor: Arc<PoolMonitor>,
}

impl AgentManager {
	pub fn new(
		agents: Vec<Arc<Agent>>,
		hook: Arc<dyn HookApi>,
		reveal_manager: Arc<RevealManager>,
		coordinator: BatchCoordinator,
		executor: Arc<BatchExecutor>,
		monitor: Arc<PoolMonitor>,
	) -> Self {
		for agent in &agents {
			coordinator.register_agent(agent.pool_id, agent.agent_id.clone());
			executor.add_pool(agent.pool_key);
		}
		Self { agents, hook, reveal_manager, coordinator, executor, monitor }
	}

	pub async fn run(
		&self,
		use_zk: bool,
		mut batch_events: mpsc::Receiver<BatchReadyEvent>,
		mut shutdown: oneshot::Receiver<()>,
	) -> anyhow::Result<()> {
		self.executor.start_polling(use_zk);
		let mut market_rx = self.monitor.subscribe();

		loop {
			tokio::select! {
				market = market_rx.recv() => {
					match market {
						Ok(market) => self.dispatch(market),
						Err(broadcast::error::RecvError::Lagged(skipped)) => {
							tracing::warn!(skipped, "agent manager lagged behind market-data broadcast");
						},
						Err(broadcast::error::RecvError::Closed) => {
							tracing::error!("market-data broadcast closed, shutting down");
							break
						},
					}
				},
				event = batch_events.recv() => {
					match event {
						Some(event) => tracing::info!(
							pool_id = ?event.pool_id,
							agents = event.params.participating_agents.len(),
							total_commitments = event.params.total_commitments,
							"batch ready"
						),
						None => {
							tracing::error!("batch-ready channel closed, shutting down");
							break
						},
					}
				},
				_ = &mut shutdown => {
					tracing::info!("agent manager shutting down");
					break
				},
			}
		}

		self.executor.stop_polling();
		self.coordinator.destroy();
		Ok(())
	}

	fn dispatch(&self, market: MarketData) {
		let market = Arc::new(market);
		let matching: Vec<Arc<Agent>> = self.agents.iter().filter(|agent| agent.pool_id == market.pool_id).cloned().collect();
		for agent in matching {
			let hook = self.hook.clone();
			let reveal_manager = self.reveal_manager.clone();
			let coordinator = self.coordinator.clone();
			let market = market.clone();
			tokio::spawn(async move {
				if let Err(error) = agent.on_market_data(&market, hook.as_ref(), &reveal_manager, &coordinator).await {
					tracing::warn!(%error, agent_id = %agent.agent_id, "agent trade attempt failed");
				}
			});
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use batchswap_primitives::TradeDecision;

	struct NeverTrades;

	impl Strategy for NeverTrades {
		fn should_trade(&self, _market: &MarketData, _state: &mut StrategyState) -> TradeDecision {
			TradeDecision::no_trade("never trades")
		}
	}

	fn sample_pool_key() -> PoolKey {
		PoolKey {
			currency0: Address::from_low_u64_be(1),
			currency1: Address::from_low_u64_be(2),
			fee_bps: 30,
			tick_spacing: 60,
			hook_address: Address::from_low_u64_be(99),
		}
	}

	fn sample_intent(nonce: u64) -> SwapIntent {
		SwapIntent {
			user: Address::from_low_u64_be(1),
			token_in: Address::from_low_u64_be(1),
			token_out: Address::from_low_u64_be(2),
			amount_in: U256::from(1_000u64),
			min_amount_out: U256::from(900u64),
			recipient: Address::from_low_u64_be(1),
			nonce: U256::from(nonce),
			deadline_unix: 2_000_000_000,
		}
	}

	fn agent(pool_key: PoolKey) -> Agent {
		Agent::new("agent-1".into(), pool_key, Address::from_low_u64_be(1), Box::new(NeverTrades), 60, Some(50))
	}

	#[test]
	fn pending_count_ignores_other_agents_reveals_on_the_shared_pool() {
		let pool_key = sample_pool_key();
		let pool_id = pool_key.pool_id();
		let reveal_manager = RevealManager::new();

		let agent_a = agent(pool_key);
		let agent_b = agent(pool_key);

		let intent_a = sample_intent(1);
		let intent_b = sample_intent(2);
		let hash_a = compute_keccak_commitment_hash(&intent_a);
		let hash_b = compute_keccak_commitment_hash(&intent_b);
		reveal_manager.add_reveal(hash_a, intent_a, pool_key, pool_id, false);
		reveal_manager.add_reveal(hash_b, intent_b, pool_key, pool_id, false);
		agent_a.own_pending.lock().unwrap().insert(hash_a);
		agent_b.own_pending.lock().unwrap().insert(hash_b);

		assert_eq!(agent_a.pending_commitment_count(&reveal_manager), 1);
		assert_eq!(agent_b.pending_commitment_count(&reveal_manager), 1);
	}

	#[test]
	fn pending_count_drops_once_reveal_manager_clears_the_executed_hash() {
		let pool_key = sample_pool_key();
		let pool_id = pool_key.pool_id();
		let reveal_manager = RevealManager::new();
		let agent = agent(pool_key);

		let intent = sample_intent(1);
		let hash = compute_keccak_commitment_hash(&intent);
		reveal_manager.add_reveal(hash, intent, pool_key, pool_id, false);
		agent.own_pending.lock().unwrap().insert(hash);
		assert_eq!(agent.pending_commitment_count(&reveal_manager), 1);

		reveal_manager.clear_executed_reveals(&[hash]);
		assert_eq!(agent.pending_commitment_count(&reveal_manager), 0);
	}
}
