use ethers::types::H256;

/// One entry in a pool's execution history (spec §4.4).
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
	pub pool_id: H256,
	pub success: bool,
	pub tx_hash: Option<H256>,
	pub block_number: Option<u64>,
	pub gas_used: Option<u64>,
	pub batch_size: u32,
	pub error: Option<String>,
	pub timestamp_ms: u64,
}

/// Aggregate stats over an executor's full execution history (spec §4.4 `get_stats`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutorStats {
	pub total_batches: u64,
	pub successful_batches: u64,
	pub failed_batches: u64,
	pub total_swaps: u64,
	pub average_gas_used: Option<f64>,
}

pub fn aggregate_stats(history: &[ExecutionRecord]) -> ExecutorStats {
	let total_batches = history.len() as u64;
	let successful: Vec<&ExecutionRecord> = history.iter().filter(|r| r.success).collect();
	let successful_batches = successful.len() as u64;
	let failed_batches = total_batches - successful_batches;
	let total_swaps: u64 = successful.iter().map(|r| r.batch_size as u64).sum();

	let gas_samples: Vec<u64> = successful.iter().filter_map(|r| r.gas_used).collect();
	let average_gas_used = if gas_samples.is_empty() {
		None
	} else {
		Some(gas_samples.iter().sum::<u64>() as f64 / gas_samples.len() as f64)
	};

	ExecutorStats { total_batches, successful_batches, failed_batches, total_swaps, average_gas_used }
}
