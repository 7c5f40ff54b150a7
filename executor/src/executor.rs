use std::{
	collections::{HashMap, HashSet},
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex,
	},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use batchswap_hook_client::{api::HookApi, HookError, TransportError};
use batchswap_primitives::PoolKey;
use batchswap_reveal_manager::RevealManager;
use ethers::types::H256;
use tokio::task::JoinHandle;

use crate::{
	errors::ExecutionError,
	proof_cache::ProofCache,
	stats::{aggregate_stats, ExecutionRecord, ExecutorStats},
};

fn now_ms() -> u64 {
	SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_millis() as u64
}

/// Renders a failed hook call's decoded kind (spec §4.4 step 6, §7) rather than the raw error
/// chain, falling back to the error's own message if it was never classified as a `HookError` or
/// `TransportError` (e.g. the "pool not tracked" bookkeeping error below).
fn decoded_error_kind(error: &anyhow::Error) -> String {
	if let Some(hook_error) = error.downcast_ref::<HookError>() {
		hook_error.to_string()
	} else if let Some(transport_error) = error.downcast_ref::<TransportError>() {
		transport_error.to_string()
	} else {
		error.to_string()
	}
}

/// Static configuration for a `BatchExecutor` (spec §4.4).
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
	pub poll_interval_ms: u64,
	pub post_reveal_delay_ms: u64,
	pub max_retries: u32,
	pub retry_base_delay_ms: u64,
}

/// Result of `check_batch_readiness` (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReadiness {
	pub can_exec: bool,
	pub pending_on_chain: u32,
	pub reveals_ready: u32,
	pub meets_minimum: bool,
	pub ready: bool,
}

struct PoolEntry {
	pool_key: PoolKey,
	in_flight: Arc<AtomicBool>,
	history: Mutex<Vec<ExecutionRecord>>,
}

/// Polls for pool readiness and sequences the reveal-submission → batch-execute steps, with
/// retry/backoff and per-pool execution history (spec §4.4).
pub struct BatchExecutor {
	config: ExecutorConfig,
	hook: Arc<dyn HookApi>,
	reveal_manager: Arc<RevealManager>,
	proof_cache: Arc<ProofCache>,
	pools: Mutex<HashMap<H256, PoolEntry>>,
	polling_handle: Mutex<Option<JoinHandle<()>>>,
}

impl BatchExecutor {
	pub fn new(
		config: ExecutorConfig,
		hook: Arc<dyn HookApi>,
		reveal_manager: Arc<RevealManager>,
		proof_cache: Arc<ProofCache>,
	) -> Self {
		Self {
			config,
			hook,
			reveal_manager,
			proof_cache,
			pools: Mutex::new(HashMap::new()),
			polling_handle: Mutex::new(None),
		}
	}

	pub fn add_pool(&self, pool_key: PoolKey) {
		let pool_id = pool_key.pool_id();
		self.pools.lock().unwrap().entry(pool_id).or_insert_with(|| PoolEntry {
			pool_key,
			in_flight: Arc::new(AtomicBool::new(false)),
			history: Mutex::new(Vec::new()),
		});
	}

	pub fn remove_pool(&self, pool_id: H256) {
		self.pools.lock().unwrap().remove(&pool_id);
	}

	pub fn tracked_pools(&self) -> HashSet<H256> {
		self.pools.lock().unwrap().keys().copied().collect()
	}

	pub async fn check_batch_readiness(&self, pool_id: H256) -> anyhow::Result<BatchReadiness> {
		let can_exec = self.hook.checker(pool_id).await?.can_exec;
		let pending_on_chain = self.hook.get_pending_commitment_count(pool_id).await?;
		let reveals_ready = self.reveal_manager.get_submitted_hashes_for_pool(pool_id).len() as u32;
		let min_commitments = self.hook.get_min_commitments().await?;
		let meets_minimum = reveals_ready >= min_commitments;

		Ok(BatchReadiness { can_exec, pending_on_chain, reveals_ready, meets_minimum, ready: can_exec && meets_minimum })
	}

	/// Runs the full execution-ordering contract for one pool (spec §4.4 steps 1-6): submit
	/// buffered reveals, verify non-empty, optionally check proofs, sleep for chain propagation,
	/// call the batch execute, retry with exponential backoff on failure, and record history.
	pub async fn execute_batch(&self, pool_id: H256, use_zk: bool) -> anyhow::Result<ExecutionRecord> {
		let pool_key = {
			let pools = self.pools.lock().unwrap();
			pools.get(&pool_id).map(|entry| entry.pool_key).ok_or_else(|| anyhow::anyhow!("pool not tracked"))?
		};

		self.reveal_manager.submit_all_reveals(self.hook.as_ref(), now_ms() / 1000).await;

		let hashes = self.reveal_manager.get_submitted_hashes_for_pool(pool_id);
		if hashes.is_empty() {
			return Err(ExecutionError::NoSubmittedReveals.into())
		}

		let proofs = if use_zk {
			let mut proofs = Vec::with_capacity(hashes.len());
			for hash in &hashes {
				match self.proof_cache.get_proof(*hash) {
					Some(proof) => proofs.push(proof),
					None => return Err(ExecutionError::MissingZkProof.into()),
				}
			}
			Some(proofs)
		} else {
			None
		};

		if self.config.post_reveal_delay_ms > 0 {
			tokio::time::sleep(Duration::from_millis(self.config.post_reveal_delay_ms)).await;
		}

		let mut attempt = 0u32;
		loop {
			let outcome = match &proofs {
				Some(proofs) => self.hook.reveal_and_batch_execute_with_proofs(&pool_key, &hashes, proofs).await,
				None => self.hook.reveal_and_batch_execute(&pool_key, &hashes).await,
			};

			match outcome {
				Ok(tx) => {
					let record = ExecutionRecord {
						pool_id,
						success: true,
						tx_hash: Some(tx.tx_hash),
						block_number: tx.block_number,
						gas_used: tx.gas_used,
						batch_size: hashes.len() as u32,
						error: None,
						timestamp_ms: now_ms(),
					};
					self.reveal_manager.clear_executed_reveals(&hashes);
					self.record(pool_id, record.clone());
					return Ok(record)
				},
				Err(error) => {
					if attempt >= self.config.max_retries {
						let kind = decoded_error_kind(&error);
						let record = ExecutionRecord {
							pool_id,
							success: false,
							tx_hash: None,
							block_number: None,
							gas_used: None,
							batch_size: hashes.len() as u32,
							error: Some(kind.clone()),
							timestamp_ms: now_ms(),
						};
						self.record(pool_id, record.clone());
						return Err(ExecutionError::RetriesExhausted(kind).into())
					}
					let backoff = self.config.retry_base_delay_ms.saturating_mul(1u64 << attempt);
					tracing::warn!(%error, attempt, backoff_ms = backoff, "batch execute failed, retrying");
					tokio::time::sleep(Duration::from_millis(backoff)).await;
					attempt += 1;
				},
			}
		}
	}

	fn record(&self, pool_id: H256, record: ExecutionRecord) {
		let pools = self.pools.lock().unwrap();
		if let Some(entry) = pools.get(&pool_id) {
			entry.history.lock().unwrap().push(record);
		}
	}

	pub fn get_stats(&self, pool_id: H256) -> Option<ExecutorStats> {
		let pools = self.pools.lock().unwrap();
		let entry = pools.get(&pool_id)?;
		let history = entry.history.lock().unwrap();
		Some(aggregate_stats(&history))
	}

	/// Every `poll_interval_ms`, checks readiness for each tracked pool and launches execution
	/// for any pool that is ready and not already mid-execution (spec §4.4, §5).
	pub fn start_polling(self: &Arc<Self>, use_zk: bool) {
		let executor = self.clone();
		let mut handle_slot = self.polling_handle.lock().unwrap();
		if handle_slot.is_some() {
			return
		}
		let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
		let handle = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(poll_interval);
			loop {
				ticker.tick().await;
				let pool_ids = executor.tracked_pools();
				for pool_id in pool_ids {
					let in_flight = {
						let pools = executor.pools.lock().unwrap();
						pools.get(&pool_id).map(|e| e.in_flight.clone())
					};
					let Some(in_flight) = in_flight else { continue };
					if in_flight.swap(true, Ordering::SeqCst) {
						continue
					}

					let executor = executor.clone();
					tokio::spawn(async move {
						match executor.check_batch_readiness(pool_id).await {
							Ok(readiness) if readiness.ready => {
								if let Err(error) = executor.execute_batch(pool_id, use_zk).await {
									tracing::warn!(%error, ?pool_id, "batch execution attempt failed");
								}
							},
							Ok(_) => {},
							Err(error) => tracing::warn!(%error, ?pool_id, "readiness check failed"),
						}
						if let Some(entry) = executor.pools.lock().unwrap().get(&pool_id) {
							entry.in_flight.store(false, Ordering::SeqCst);
						}
					});
				}
			}
		});
		*handle_slot = Some(handle);
	}

	pub fn stop_polling(&self) {
		if let Some(handle) = self.polling_handle.lock().unwrap().take() {
			handle.abort();
		}
	}
}
