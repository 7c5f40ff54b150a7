use ethers::{
	prelude::abigen,
	types::{Address, U256},
};

abigen!(IBatchHook, "abi/IBatchHook.json");

/// `(currency0, currency1, fee, tickSpacing, hooks)` — matches the `PoolKey` tuple encoding.
pub type PoolKeyTuple = (Address, Address, u32, i32, Address);

/// `(user, tokenIn, tokenOut, amountIn, minAmountOut, recipient, nonce, deadline)` — matches the
/// `SwapIntent` tuple encoding.
pub type IntentTuple = (Address, Address, Address, U256, U256, Address, U256, U256);
