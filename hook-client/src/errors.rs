use thiserror::Error;

/// Errors decoded from an on-chain revert selector (spec §6, §7), plus the transport failures
/// that are distinguishable from a revert.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HookError {
	#[error("invalid commitment")]
	InvalidCommitment,
	#[error("slippage exceeded for user")]
	SlippageExceededForUser,
	#[error("currency not settled")]
	CurrencyNotSettled,
	#[error("deadline expired")]
	DeadlineExpired,
	#[error("insufficient commitments")]
	InsufficientCommitments,
	#[error("batch conditions not met")]
	BatchConditionsNotMet,
	#[error("invalid nonce")]
	InvalidNonce,
	#[error("unknown revert selector 0x{}", hex::encode(.0))]
	Unknown([u8; 4]),
}

/// Network/transport-level failures, distinguished from on-chain reverts (spec §7).
#[derive(Debug, Error)]
pub enum TransportError {
	#[error("request timed out after {0:?}")]
	NetworkTimeout(std::time::Duration),
	#[error("rpc error: {0}")]
	RpcError(String),
}

/// Maps a 4-byte Solidity custom-error selector to a typed `HookError`. Unknown selectors map
/// to `Unknown(selector)` rather than failing to decode (spec §4.1, §6).
pub fn decode_error(selector: [u8; 4]) -> HookError {
	match selector {
		[0xc0, 0x67, 0x89, 0xfa] => HookError::InvalidCommitment,
		[0x56, 0xa2, 0x70, 0xff] => HookError::SlippageExceededForUser,
		[0x52, 0x12, 0xcb, 0xa1] => HookError::CurrencyNotSettled,
		[0x1a, 0xb7, 0xda, 0x6b] => HookError::DeadlineExpired,
		[0xb8, 0x9f, 0xa4, 0x06] => HookError::InsufficientCommitments,
		[0x6f, 0x47, 0xc6, 0xd1] => HookError::BatchConditionsNotMet,
		[0x75, 0x66, 0x88, 0xfe] => HookError::InvalidNonce,
		other => HookError::Unknown(other),
	}
}

/// Pulls a 4-byte Solidity custom-error selector out of a contract-call error's message, e.g.
/// `execution reverted: "0xc06789fa"`. Transport failures (timeouts, connection errors) carry no
/// such selector and fall through to `None`.
pub fn extract_revert_selector(message: &str) -> Option<[u8; 4]> {
	let after = &message[message.find("0x")? + 2..];
	let hex_digits: String = after.chars().take_while(|c| c.is_ascii_hexdigit()).collect();
	if hex_digits.len() < 8 {
		return None
	}
	let bytes = hex::decode(&hex_digits[..8]).ok()?;
	Some([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Classifies a contract-call error's message as a decoded on-chain revert or an opaque
/// transport failure (spec §4.1, §6, §7), rather than collapsing both into a string. Used both
/// by `EthersHookClient` on real RPC errors and by `MockHookApi` on its simulated reverts, so the
/// decode path is exercised the same way in production and in tests.
pub fn classify_error_message(message: &str) -> anyhow::Error {
	match extract_revert_selector(message) {
		Some(selector) => decode_error(selector).into(),
		None => TransportError::RpcError(message.to_string()).into(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_known_selectors() {
		assert_eq!(decode_error([0xc0, 0x67, 0x89, 0xfa]), HookError::InvalidCommitment);
		assert_eq!(decode_error([0x56, 0xa2, 0x70, 0xff]), HookError::SlippageExceededForUser);
		assert_eq!(decode_error([0x52, 0x12, 0xcb, 0xa1]), HookError::CurrencyNotSettled);
	}

	#[test]
	fn unknown_selector_is_preserved() {
		let selector = [0xde, 0xad, 0xbe, 0xef];
		assert_eq!(decode_error(selector), HookError::Unknown(selector));
	}

	#[test]
	fn extracts_selector_from_revert_message() {
		let selector = extract_revert_selector(r#"execution reverted: "0xc06789fa""#);
		assert_eq!(selector, Some([0xc0, 0x67, 0x89, 0xfa]));
	}

	#[test]
	fn no_selector_in_non_revert_message() {
		assert_eq!(extract_revert_selector("connection refused"), None);
	}

	#[test]
	fn classifies_non_revert_message_as_transport_error() {
		let error = classify_error_message("connection refused");
		assert!(error.downcast_ref::<TransportError>().is_some());
	}
}
