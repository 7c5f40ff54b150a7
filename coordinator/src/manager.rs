use std::{
	collections::{HashMap, HashSet},
	sync::{Arc, Mutex},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use batchswap_primitives::{AgentReadinessSignal, BatchParameters, BatchReadyEvent, ConflictResolutionStrategy};
use ethers::types::H256;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::errors::CoordinationError;

fn now_ms() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_millis() as u64
}

/// Static configuration for one `BatchCoordinator` (spec §4.3, §6).
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
	pub quorum: u32,
	pub min_total_commitments: u32,
	pub countdown_ms: u64,
	pub conflict_resolution: ConflictResolutionStrategy,
}

/// Point-in-time observable snapshot of one pool's coordination state, for introspection and
/// tests (spec §4.3).
#[derive(Debug, Clone)]
pub struct PoolStatus {
	pub total_ready: u32,
	pub ready_agents: Vec<String>,
	pub quorum_met: bool,
	pub countdown_active: bool,
	pub total_pending_commitments: u32,
	pub countdown_deadline_ms: Option<u64>,
}

struct PoolState {
	registered: HashSet<String>,
	ready: HashMap<String, AgentReadinessSignal>,
	ready_order: Vec<String>,
	countdown_active: bool,
	countdown_deadline_ms: Option<u64>,
	timer_handle: Option<JoinHandle<()>>,
	generation: u64,
}

impl PoolState {
	fn new() -> Self {
		Self {
			registered: HashSet::new(),
			ready: HashMap::new(),
			ready_order: Vec::new(),
			countdown_active: false,
			countdown_deadline_ms: None,
			timer_handle: None,
			generation: 0,
		}
	}

	fn quorum_met(&self, quorum: u32) -> bool {
		self.ready.len() as u32 >= quorum
	}

	fn total_pending(&self) -> u32 {
		self.ready.values().map(|s| s.pending_commitments).sum()
	}

	fn all_registered_ready(&self) -> bool {
		!self.registered.is_empty() && self.registered.iter().all(|id| self.ready.contains_key(id))
	}

	fn cancel_timer(&mut self) {
		if let Some(handle) = self.timer_handle.take() {
			handle.abort();
		}
		self.countdown_active = false;
		self.countdown_deadline_ms = None;
	}

	fn clear_ready(&mut self) {
		self.ready.clear();
		self.ready_order.clear();
	}
}

/// What a readiness mutation requires the caller to do once the pool lock is released: nothing,
/// arm a new countdown timer, or emit a fired batch.
enum Reaction {
	None,
	Armed { generation: u64 },
	Fired(BatchReadyEvent),
}

struct Inner {
	config: CoordinatorConfig,
	pools: Mutex<HashMap<H256, PoolState>>,
	sender: mpsc::Sender<BatchReadyEvent>,
}

/// Per-pool multi-agent readiness/quorum state machine (spec §4.3). Cheaply `Clone`-able; every
/// clone shares the same underlying pool arena and event channel.
#[derive(Clone)]
pub struct BatchCoordinator {
	inner: Arc<Inner>,
}

impl BatchCoordinator {
	pub fn new(config: CoordinatorConfig, channel_capacity: usize) -> (Self, mpsc::Receiver<BatchReadyEvent>) {
		let (sender, receiver) = mpsc::channel(channel_capacity);
		let coordinator = Self { inner: Arc::new(Inner { config, pools: Mutex::new(HashMap::new()), sender }) };
		(coordinator, receiver)
	}

	pub fn register_agent(&self, pool_id: H256, agent_id: impl Into<String>) {
		let mut pools = self.inner.pools.lock().unwrap();
		pools.entry(pool_id).or_insert_with(PoolState::new).registered.insert(agent_id.into());
	}

	/// Removes `agent_id` from every pool's registered set and ready-set, re-evaluating armed
	/// state for any pool it affected (spec §4.3: "unregister also clears that agent's
	/// ready-signal in every pool").
	pub fn unregister_agent(&self, agent_id: &str) {
		let reactions: Vec<(H256, Reaction)> = {
			let mut pools = self.inner.pools.lock().unwrap();
			let mut reactions = Vec::new();
			for (pool_id, state) in pools.iter_mut() {
				let was_registered = state.registered.remove(agent_id);
				let was_ready = state.ready.remove(agent_id).is_some();
				state.ready_order.retain(|id| id != agent_id);
				if was_registered || was_ready {
					reactions.push((*pool_id, Self::reevaluate(&self.inner.config, *pool_id, state)));
				}
			}
			reactions
		};
		for (pool_id, reaction) in reactions {
			self.handle_reaction(pool_id, reaction);
		}
	}

	/// Rejected with `UnknownAgent` (logged, no state change) if the agent is not registered for
	/// the signal's pool.
	pub fn signal_ready(&self, signal: AgentReadinessSignal) -> Result<(), CoordinationError> {
		let pool_id = signal.pool_id;
		let reaction = {
			let mut pools = self.inner.pools.lock().unwrap();
			let state = pools.entry(pool_id).or_insert_with(PoolState::new);

			if !state.registered.contains(&signal.agent_id) {
				tracing::warn!(agent_id = %signal.agent_id, ?pool_id, "readiness signal from unregistered agent");
				return Err(CoordinationError::UnknownAgent { agent_id: signal.agent_id, pool_id })
			}

			if signal.ready {
				if !state.ready.contains_key(&signal.agent_id) {
					state.ready_order.push(signal.agent_id.clone());
				}
				state.ready.insert(signal.agent_id.clone(), signal);
			} else {
				state.ready.remove(&signal.agent_id);
				state.ready_order.retain(|id| id != &signal.agent_id);
			}

			Self::reevaluate(&self.inner.config, pool_id, state)
		};

		self.handle_reaction(pool_id, reaction);
		Ok(())
	}

	pub fn withdraw_ready(&self, agent_id: &str, pool_id: H256) {
		let reaction = {
			let mut pools = self.inner.pools.lock().unwrap();
			let Some(state) = pools.get_mut(&pool_id) else { return };
			state.ready.remove(agent_id);
			state.ready_order.retain(|id| id != agent_id);
			Self::reevaluate(&self.inner.config, pool_id, state)
		};
		self.handle_reaction(pool_id, reaction);
	}

	/// Re-derives the armed/fired transition for one pool. Called with the pool's lock held.
	fn reevaluate(config: &CoordinatorConfig, pool_id: H256, state: &mut PoolState) -> Reaction {
		let should_arm = state.quorum_met(config.quorum) && state.total_pending() >= config.min_total_commitments;

		if !should_arm {
			if state.countdown_active {
				state.cancel_timer();
			}
			return Reaction::None
		}

		if state.all_registered_ready() {
			return Reaction::Fired(Self::fire(config, pool_id, state))
		}

		if !state.countdown_active {
			state.generation += 1;
			state.countdown_active = true;
			state.countdown_deadline_ms = Some(now_ms() + config.countdown_ms);
			return Reaction::Armed { generation: state.generation }
		}

		Reaction::None
	}

	fn fire(config: &CoordinatorConfig, pool_id: H256, state: &mut PoolState) -> BatchReadyEvent {
		let participating_agents = state.ready_order.clone();
		let slippage_values: Vec<u32> =
			participating_agents.iter().filter_map(|id| state.ready.get(id)?.preferred_slippage_bps).collect();
		let slippage_bps = config.conflict_resolution.resolve(&slippage_values).unwrap_or(0);
		let total_commitments = state.total_pending();

		state.cancel_timer();
		state.clear_ready();

		BatchReadyEvent {
			pool_id,
			params: BatchParameters { pool_id, participating_agents, total_commitments, slippage_bps, fire_timestamp_ms: now_ms() },
		}
	}

	fn handle_reaction(&self, pool_id: H256, reaction: Reaction) {
		match reaction {
			Reaction::None => {},
			Reaction::Fired(event) => self.emit(event),
			Reaction::Armed { generation } => self.arm_timer(pool_id, generation),
		}
	}

	fn emit(&self, event: BatchReadyEvent) {
		if self.inner.sender.try_send(event).is_err() {
			tracing::error!("batch-ready channel full or closed, dropping event");
		}
	}

	/// Spawns a background timer that, on expiry, fires `pool_id` if it is still armed under
	/// the same `generation` — a newer countdown replacing this one bumps the generation,
	/// making this timer's firing a silent no-op (Design Notes §9).
	fn arm_timer(&self, pool_id: H256, generation: u64) {
		let countdown_ms = self.inner.config.countdown_ms;
		let inner = self.inner.clone();
		let handle = tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(countdown_ms)).await;
			let event = {
				let mut pools = inner.pools.lock().unwrap();
				let Some(state) = pools.get_mut(&pool_id) else { return };
				if !state.countdown_active || state.generation != generation {
					return
				}
				Self::fire(&inner.config, pool_id, state)
			};
			if inner.sender.try_send(event).is_err() {
				tracing::error!("batch-ready channel full or closed, dropping event");
			}
		});

		let mut pools = self.inner.pools.lock().unwrap();
		match pools.get_mut(&pool_id) {
			Some(state) if state.generation == generation => state.timer_handle = Some(handle),
			_ => handle.abort(),
		}
	}

	pub fn resolve_batch_parameters(&self, pool_id: H256) -> Option<BatchParameters> {
		let pools = self.inner.pools.lock().unwrap();
		let state = pools.get(&pool_id)?;
		if state.ready.is_empty() {
			return None
		}
		let slippage_values: Vec<u32> =
			state.ready_order.iter().filter_map(|id| state.ready.get(id)?.preferred_slippage_bps).collect();
		let slippage_bps = self.inner.config.conflict_resolution.resolve(&slippage_values).unwrap_or(0);
		Some(BatchParameters {
			pool_id,
			participating_agents: state.ready_order.clone(),
			total_commitments: state.total_pending(),
			slippage_bps,
			fire_timestamp_ms: now_ms(),
		})
	}

	pub fn reset_pool(&self, pool_id: H256) {
		let mut pools = self.inner.pools.lock().unwrap();
		if let Some(state) = pools.get_mut(&pool_id) {
			state.clear_ready();
			state.cancel_timer();
		}
	}

	pub fn all_agents_ready(&self, pool_id: H256) -> bool {
		let pools = self.inner.pools.lock().unwrap();
		pools.get(&pool_id).map(|s| s.all_registered_ready()).unwrap_or(false)
	}

	pub fn get_status(&self, pool_id: H256) -> Option<PoolStatus> {
		let pools = self.inner.pools.lock().unwrap();
		pools.get(&pool_id).map(|state| PoolStatus {
			total_ready: state.ready.len() as u32,
			ready_agents: state.ready_order.clone(),
			quorum_met: state.quorum_met(self.inner.config.quorum),
			countdown_active: state.countdown_active,
			total_pending_commitments: state.total_pending(),
			countdown_deadline_ms: state.countdown_deadline_ms,
		})
	}

	/// Cancels every pending countdown timer synchronously; no further events are produced after
	/// this returns (spec §4.3, §5).
	pub fn destroy(&self) {
		let mut pools = self.inner.pools.lock().unwrap();
		for state in pools.values_mut() {
			state.cancel_timer();
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn config(quorum: u32, min_total_commitments: u32, countdown_ms: u64) -> CoordinatorConfig {
		CoordinatorConfig { quorum, min_total_commitments, countdown_ms, conflict_resolution: ConflictResolutionStrategy::Median }
	}

	fn signal(agent_id: &str, pool_id: H256, ready: bool, pending: u32, slippage: Option<u32>) -> AgentReadinessSignal {
		AgentReadinessSignal {
			agent_id: agent_id.to_string(),
			pool_id,
			ready,
			pending_commitments: pending,
			preferred_slippage_bps: slippage,
			timestamp_ms: 0,
		}
	}

	#[tokio::test(start_paused = true)]
	async fn quorum_countdown_fires_after_delay() {
		let pool_id = H256::repeat_byte(1);
		let (coordinator, mut events) = BatchCoordinator::new(config(2, 2, 50), 8);
		coordinator.register_agent(pool_id, "a1");
		coordinator.register_agent(pool_id, "a2");
		coordinator.register_agent(pool_id, "a3");

		coordinator.signal_ready(signal("a1", pool_id, true, 1, None)).unwrap();
		coordinator.signal_ready(signal("a2", pool_id, true, 1, None)).unwrap();

		let status = coordinator.get_status(pool_id).unwrap();
		assert!(status.quorum_met);
		assert!(status.countdown_active);

		tokio::time::advance(Duration::from_millis(60)).await;
		let event = tokio::time::timeout(Duration::from_millis(100), events.recv()).await.unwrap().unwrap();
		assert_eq!(event.params.participating_agents.len(), 2);
		assert_eq!(event.params.total_commitments, 2);
	}

	#[tokio::test(start_paused = true)]
	async fn all_agents_ready_short_circuits_countdown() {
		let pool_id = H256::repeat_byte(2);
		let (coordinator, mut events) = BatchCoordinator::new(config(2, 2, 50), 8);
		coordinator.register_agent(pool_id, "a1");
		coordinator.register_agent(pool_id, "a2");

		coordinator.signal_ready(signal("a1", pool_id, true, 1, None)).unwrap();
		coordinator.signal_ready(signal("a2", pool_id, true, 1, None)).unwrap();

		let event = tokio::time::timeout(Duration::from_millis(5), events.recv()).await.unwrap().unwrap();
		assert_eq!(event.params.total_commitments, 2);
	}

	#[tokio::test]
	async fn signal_ready_from_unregistered_agent_is_rejected() {
		let pool_id = H256::repeat_byte(3);
		let (coordinator, _events) = BatchCoordinator::new(config(1, 1, 50), 8);
		let result = coordinator.signal_ready(signal("ghost", pool_id, true, 1, None));
		assert!(result.is_err());
		assert!(coordinator.get_status(pool_id).is_none() || !coordinator.get_status(pool_id).unwrap().quorum_met);
	}

	#[tokio::test]
	async fn below_quorum_never_activates_countdown() {
		let pool_id = H256::repeat_byte(4);
		let (coordinator, _events) = BatchCoordinator::new(config(2, 2, 50), 8);
		coordinator.register_agent(pool_id, "a1");
		coordinator.signal_ready(signal("a1", pool_id, true, 5, None)).unwrap();

		let status = coordinator.get_status(pool_id).unwrap();
		assert!(!status.countdown_active);
	}

	#[tokio::test]
	async fn median_slippage_resolution() {
		let pool_id = H256::repeat_byte(5);
		let (coordinator, _events) = BatchCoordinator::new(config(3, 0, 1_000_000), 8);
		coordinator.register_agent(pool_id, "a1");
		coordinator.register_agent(pool_id, "a2");
		coordinator.register_agent(pool_id, "a3");
		coordinator.signal_ready(signal("a1", pool_id, true, 0, Some(30))).unwrap();
		coordinator.signal_ready(signal("a2", pool_id, true, 0, Some(50))).unwrap();
		coordinator.signal_ready(signal("a3", pool_id, true, 0, Some(100))).unwrap();

		let params = coordinator.resolve_batch_parameters(pool_id).unwrap();
		assert_eq!(params.slippage_bps, 50);
	}

	#[tokio::test]
	async fn withdraw_ready_cancels_countdown_when_quorum_lost() {
		let pool_id = H256::repeat_byte(6);
		let (coordinator, _events) = BatchCoordinator::new(config(2, 0, 10_000), 8);
		coordinator.register_agent(pool_id, "a1");
		coordinator.register_agent(pool_id, "a2");
		coordinator.register_agent(pool_id, "a3");
		coordinator.signal_ready(signal("a1", pool_id, true, 0, None)).unwrap();
		coordinator.signal_ready(signal("a2", pool_id, true, 0, None)).unwrap();
		assert!(coordinator.get_status(pool_id).unwrap().countdown_active);

		coordinator.withdraw_ready("a1", pool_id);
		assert!(!coordinator.get_status(pool_id).unwrap().countdown_active);
	}

	#[tokio::test]
	async fn unregister_agent_clears_readiness_everywhere() {
		let pool_a = H256::repeat_byte(7);
		let pool_b = H256::repeat_byte(8);
		let (coordinator, _events) = BatchCoordinator::new(config(1, 0, 10_000), 8);
		coordinator.register_agent(pool_a, "a1");
		coordinator.register_agent(pool_b, "a1");
		coordinator.signal_ready(signal("a1", pool_a, true, 0, None)).unwrap();

		coordinator.unregister_agent("a1");

		assert_eq!(coordinator.get_status(pool_a).unwrap().total_ready, 0);
		assert!(coordinator.signal_ready(signal("a1", pool_b, true, 0, None)).is_err());
	}
}
