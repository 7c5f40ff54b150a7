use serde::{Deserialize, Serialize};

/// Trade direction relative to a pool's two currencies.
///
/// `ZeroForOne` swaps currency0 into currency1; `OneForZero` is the inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
	ZeroForOne,
	OneForZero,
}

impl Direction {
	/// From a signed percentage price change: positive -> sell token0 (price of token0 rose),
	/// negative -> buy token0, zero -> no signal.
	pub fn from_price_change(delta_pct: f64) -> Option<Self> {
		if delta_pct > 0.0 {
			Some(Direction::ZeroForOne)
		} else if delta_pct < 0.0 {
			Some(Direction::OneForZero)
		} else {
			None
		}
	}
}

/// `max(0.1, min(|delta_pct| / 10, 1.0))`
pub fn confidence_from_magnitude(delta_pct: f64) -> f64 {
	(delta_pct.abs() / 10.0).min(1.0).max(0.1)
}
