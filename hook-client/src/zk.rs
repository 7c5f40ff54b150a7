use ethers::{
	abi::{self, Token},
	types::U256,
};
use serde::{Deserialize, Serialize};

/// An opaque Groth16-shaped proof handed to us by the proof generator collaborator. The hook
/// client never inspects these fields — it only serializes them for the on-chain call and
/// associates them with a commitment hash (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZkProof {
	pub a: [U256; 2],
	pub b: [[U256; 2]; 2],
	pub c: [U256; 2],
	pub public_signals: Vec<U256>,
}

impl ZkProof {
	/// ABI-encodes the proof into the opaque `bytes` the hook contract expects.
	pub fn to_abi_bytes(&self) -> Vec<u8> {
		abi::encode(&[
			Token::FixedArray(self.a.iter().map(|v| Token::Uint(*v)).collect()),
			Token::FixedArray(
				self.b.iter().map(|row| Token::FixedArray(row.iter().map(|v| Token::Uint(*v)).collect())).collect(),
			),
			Token::FixedArray(self.c.iter().map(|v| Token::Uint(*v)).collect()),
			Token::Array(self.public_signals.iter().map(|v| Token::Uint(*v)).collect()),
		])
	}
}
