use ethers::types::H256;
use serde::{Deserialize, Serialize};

/// One agent's readiness opinion for a pool at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReadinessSignal {
	pub agent_id: String,
	pub pool_id: H256,
	pub ready: bool,
	pub pending_commitments: u32,
	pub preferred_slippage_bps: Option<u32>,
	pub timestamp_ms: u64,
}

/// Resolved parameters for a fired batch, computed once at fire time (spec §4.3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchParameters {
	pub pool_id: H256,
	pub participating_agents: Vec<String>,
	pub total_commitments: u32,
	pub slippage_bps: u32,
	pub fire_timestamp_ms: u64,
}

/// Emitted by the Batch Coordinator when a pool fires. Delivered over a bounded channel rather
/// than a closure callback (Design Notes §9 — "callbacks with ownership").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReadyEvent {
	pub pool_id: H256,
	pub params: BatchParameters,
}

/// How the coordinator aggregates divergent `preferred_slippage_bps` values across the ready
/// set when resolving `BatchParameters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolutionStrategy {
	Median,
	Mean,
	Min,
	Max,
}

impl ConflictResolutionStrategy {
	/// `values` need not be sorted. Returns `None` for an empty slice — callers fall back to a
	/// configured default slippage in that case.
	pub fn resolve(&self, values: &[u32]) -> Option<u32> {
		if values.is_empty() {
			return None
		}
		match self {
			ConflictResolutionStrategy::Min => values.iter().copied().min(),
			ConflictResolutionStrategy::Max => values.iter().copied().max(),
			ConflictResolutionStrategy::Mean => {
				let sum: u64 = values.iter().map(|v| *v as u64).sum();
				Some((sum / values.len() as u64) as u32)
			},
			ConflictResolutionStrategy::Median => {
				let mut sorted = values.to_vec();
				sorted.sort_unstable();
				let n = sorted.len();
				// Lower-middle element for even n: the (n/2)-th element, 1-indexed, i.e.
				// `sorted[n/2 - 1]` when n is even and `sorted[n/2]` when n is odd.
				Some(if n % 2 == 0 { sorted[n / 2 - 1] } else { sorted[n / 2] })
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn median_even_takes_lower_middle() {
		assert_eq!(ConflictResolutionStrategy::Median.resolve(&[30, 50, 70, 100]), Some(50));
	}

	#[test]
	fn median_odd() {
		assert_eq!(ConflictResolutionStrategy::Median.resolve(&[30, 50, 100]), Some(50));
	}

	#[test]
	fn mean_truncates() {
		assert_eq!(ConflictResolutionStrategy::Mean.resolve(&[30, 70]), Some(50));
		assert_eq!(ConflictResolutionStrategy::Mean.resolve(&[30, 71]), Some(50));
	}

	#[test]
	fn min_max() {
		assert_eq!(ConflictResolutionStrategy::Min.resolve(&[30, 70, 10]), Some(10));
		assert_eq!(ConflictResolutionStrategy::Max.resolve(&[30, 70, 10]), Some(70));
	}
}
