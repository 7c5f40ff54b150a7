use bigdecimal::BigDecimal;
use ethers::types::U256;
use std::str::FromStr;

use crate::market::{MarketData, RawMarketData};

/// Outcome of validating a raw market-data snapshot (spec §4.5). `snapshot` is populated only
/// when `is_valid` is true.
#[derive(Debug, Clone)]
pub struct MarketDataValidation {
	pub is_valid: bool,
	pub errors: Vec<String>,
	pub warnings: Vec<String>,
	pub snapshot: Option<MarketData>,
}

fn parse_non_negative_big_int(field: &str, value: &str, errors: &mut Vec<String>) -> Option<U256> {
	match U256::from_dec_str(value) {
		Ok(parsed) => Some(parsed),
		Err(_) => {
			errors.push(format!("{field} is not a non-negative integer: {value:?}"));
			None
		},
	}
}

/// Validates a raw snapshot into a typed one, collecting every applicable error/warning from
/// spec §4.5 rather than failing fast on the first problem.
pub fn validate_market_data(raw: &RawMarketData, now_ms: u64) -> MarketDataValidation {
	let mut errors = Vec::new();
	let mut warnings = Vec::new();

	let pool_id = raw.pool_id;
	if pool_id.is_none() {
		errors.push("missing pool_id".to_string());
	}
	let pool_key = raw.pool_key;
	if pool_key.is_none() {
		errors.push("missing pool_key".to_string());
	}

	let price = match BigDecimal::from_str(&raw.current_price) {
		Ok(price) if price > BigDecimal::from(0) => Some(price),
		Ok(_) => {
			errors.push(format!("current_price is not positive: {:?}", raw.current_price));
			None
		},
		Err(_) => {
			errors.push(format!("current_price is not a finite number: {:?}", raw.current_price));
			None
		},
	};

	let total_liquidity = parse_non_negative_big_int("total_liquidity", &raw.total_liquidity, &mut errors);
	let liquidity0 = parse_non_negative_big_int("liquidity0", &raw.liquidity0, &mut errors);
	let liquidity1 = parse_non_negative_big_int("liquidity1", &raw.liquidity1, &mut errors);
	let volume_1h = parse_non_negative_big_int("volume_1h", &raw.volume_1h, &mut errors);
	let volume_24h = parse_non_negative_big_int("volume_24h", &raw.volume_24h, &mut errors);

	if now_ms.saturating_sub(raw.captured_at_ms) > crate::market::STALE_AFTER_MS {
		warnings.push("market data is stale (captured more than 5 minutes ago)".to_string());
	}
	if raw.price_change_1h_pct.abs() > 100.0 {
		warnings.push(format!("extreme 1h price change: {}%", raw.price_change_1h_pct));
	}
	if raw.price_change_24h_pct.abs() > 200.0 {
		warnings.push(format!("extreme 24h price change: {}%", raw.price_change_24h_pct));
	}
	if total_liquidity == Some(U256::zero()) {
		warnings.push("total liquidity is zero".to_string());
	}

	if !errors.is_empty() {
		return MarketDataValidation { is_valid: false, errors, warnings, snapshot: None }
	}

	let snapshot = MarketData {
		pool_id: pool_id.unwrap(),
		pool_key: pool_key.unwrap(),
		current_price: price.unwrap(),
		price_change_1h_pct: raw.price_change_1h_pct,
		price_change_24h_pct: raw.price_change_24h_pct,
		total_liquidity: total_liquidity.unwrap(),
		liquidity0: liquidity0.unwrap(),
		liquidity1: liquidity1.unwrap(),
		volume_1h: volume_1h.unwrap(),
		volume_24h: volume_24h.unwrap(),
		recent_swaps: raw.recent_swaps.clone(),
		captured_at_ms: raw.captured_at_ms,
		reference_prices: raw.reference_prices.clone(),
	};

	MarketDataValidation { is_valid: true, errors, warnings, snapshot: Some(snapshot) }
}
