use ethers::{
	abi::{self, Token},
	types::{Address, H256, U256},
	utils::keccak256,
};
use serde::{Deserialize, Serialize};

/// A user's swap intent, immutable once constructed. `nonce` is unique per `(pool_id, user)`
/// forever; `deadline_unix` is a unix-second timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapIntent {
	pub user: Address,
	pub token_in: Address,
	pub token_out: Address,
	pub amount_in: U256,
	pub min_amount_out: U256,
	pub recipient: Address,
	pub nonce: U256,
	pub deadline_unix: u64,
}

/// 32-byte digest of the ABI-encoded intent fields in a fixed order. Two intents produce equal
/// hashes iff all fields are equal, by construction of ABI encoding + keccak256.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitmentHash(pub [u8; 32]);

impl From<H256> for CommitmentHash {
	fn from(h: H256) -> Self {
		Self(h.0)
	}
}

impl From<CommitmentHash> for H256 {
	fn from(c: CommitmentHash) -> Self {
		H256(c.0)
	}
}

impl std::fmt::Display for CommitmentHash {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

/// `keccak256(abi.encode(user, token_in, token_out, amount_in, min_amount_out, recipient, nonce,
/// deadline))`, matching the on-chain hook contract's commitment hash exactly (spec §4.1, §6).
pub fn compute_commitment_hash(intent: &SwapIntent) -> CommitmentHash {
	let encoded = abi::encode(&[
		Token::Address(intent.user),
		Token::Address(intent.token_in),
		Token::Address(intent.token_out),
		Token::Uint(intent.amount_in),
		Token::Uint(intent.min_amount_out),
		Token::Address(intent.recipient),
		Token::Uint(intent.nonce),
		Token::Uint(U256::from(intent.deadline_unix)),
	]);
	CommitmentHash(keccak256(encoded))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> SwapIntent {
		SwapIntent {
			user: Address::from_low_u64_be(1),
			token_in: Address::from_low_u64_be(2),
			token_out: Address::from_low_u64_be(3),
			amount_in: U256::from(1_000u64),
			min_amount_out: U256::from(900u64),
			recipient: Address::from_low_u64_be(1),
			nonce: U256::from(7u64),
			deadline_unix: 1_800_000_000,
		}
	}

	#[test]
	fn deterministic() {
		let intent = sample();
		assert_eq!(compute_commitment_hash(&intent), compute_commitment_hash(&intent));
	}

	#[test]
	fn any_field_change_changes_hash() {
		let base = sample();
		let base_hash = compute_commitment_hash(&base);

		let mut changed = base.clone();
		changed.amount_in = U256::from(1_001u64);
		assert_ne!(compute_commitment_hash(&changed), base_hash);

		let mut changed = base.clone();
		changed.nonce = U256::from(8u64);
		assert_ne!(compute_commitment_hash(&changed), base_hash);

		let mut changed = base;
		changed.deadline_unix += 1;
		assert_ne!(compute_commitment_hash(&changed), base_hash);
	}
}
