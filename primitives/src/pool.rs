use ethers::{
	abi::{self, Token},
	types::{Address, H256, U256},
	utils::keccak256,
};
use serde::{Deserialize, Serialize};

/// Identifies an AMM pool. Immutable once constructed; `pool_id` is derived on demand rather
/// than stored, so two `PoolKey`s that compare equal always derive the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
	pub currency0: Address,
	pub currency1: Address,
	pub fee_bps: u32,
	pub tick_spacing: i32,
	pub hook_address: Address,
}

/// Two's complement encoding of a signed 32-bit value into a 256-bit ABI word, matching how
/// Solidity encodes a negative `int24`/`int32` tick spacing.
fn signed_word(value: i32) -> U256 {
	if value >= 0 {
		U256::from(value)
	} else {
		U256::MAX - U256::from((-(value as i64) - 1) as u64)
	}
}

impl PoolKey {
	/// `keccak256(abi.encode(currency0, currency1, fee, tick_spacing, hooks))`, matching the
	/// on-chain pool id derivation in spec §6.
	pub fn pool_id(&self) -> H256 {
		let encoded = abi::encode(&[
			Token::Address(self.currency0),
			Token::Address(self.currency1),
			Token::Uint(U256::from(self.fee_bps)),
			Token::Int(signed_word(self.tick_spacing)),
			Token::Address(self.hook_address),
		]);
		H256::from(keccak256(encoded))
	}
}
