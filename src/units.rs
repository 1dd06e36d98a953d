//! Encoding helpers shared by the HTTP layer
//!
//! Chain identifiers travel to the bridge contract as null-terminated
//! `bytes32` strings, and user-facing amounts are decimal ether values that
//! the contract expects in wei.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{utils, Address, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum decimal places accepted for ether amounts
const ETHER_DECIMALS: usize = 18;

/// Errors produced by the encoding helpers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitsError {
    #[error("bytes32 string must be at most 31 bytes, got {0}")]
    StringTooLong(usize),

    #[error("invalid bytes32 string - missing null terminator")]
    MissingTerminator,

    #[error("invalid bytes32 string - not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Encode a short UTF-8 string as a right-zero-padded `bytes32`.
///
/// The last byte is always left as a null terminator, so at most 31 bytes
/// of text fit.
pub fn format_bytes32_string(text: &str) -> Result<B256, UnitsError> {
    let bytes = text.as_bytes();
    if bytes.len() > 31 {
        return Err(UnitsError::StringTooLong(bytes.len()));
    }

    let mut out = [0u8; 32];
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(out))
}

/// Decode a `bytes32` string produced by [`format_bytes32_string`].
pub fn parse_bytes32_string(value: &B256) -> Result<String, UnitsError> {
    let bytes = value.as_slice();
    if bytes[31] != 0 {
        return Err(UnitsError::MissingTerminator);
    }

    let len = bytes[..31].iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    std::str::from_utf8(&bytes[..len])
        .map(str::to_string)
        .map_err(|_| UnitsError::InvalidUtf8)
}

/// Parse an EVM address.
///
/// All-lowercase and all-uppercase hex is accepted as-is; mixed case must be
/// a valid EIP-55 checksum.
pub fn parse_address(text: &str) -> Option<Address> {
    let trimmed = text.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex_part.len() != 40 {
        return None;
    }

    let address = Address::from_str(hex_part).ok()?;

    let has_lower = hex_part.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex_part.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper && address.to_checksum(None)[2..] != *hex_part {
        return None;
    }

    Some(address)
}

/// Parse a 32-byte hex identifier (`0x` prefix optional).
pub fn parse_b256(text: &str) -> Option<B256> {
    let trimmed = text.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if hex_part.len() != 64 {
        return None;
    }
    hex::decode(hex_part).ok().map(|b| B256::from_slice(&b))
}

/// Parse a decimal ether amount into wei.
pub fn parse_ether(text: &str) -> Result<U256, UnitsError> {
    let trimmed = text.trim();
    let invalid = || UnitsError::InvalidAmount(text.to_string());

    if trimmed.is_empty() {
        return Err(invalid());
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(invalid());
    }

    utils::parse_ether(trimmed).map_err(|_| invalid())
}

/// Format wei as ether, trimming trailing fractional zeros (`1.0`, `0.01`).
pub fn format_ether(wei: U256) -> String {
    let full = utils::format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => format!("{}.0", full),
    }
}

/// Parse a base-10 integer amount (raw token units, no decimal scaling).
pub fn parse_integer(text: &str) -> Result<U256, UnitsError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UnitsError::InvalidAmount(text.to_string()));
    }
    U256::from_str_radix(trimmed, 10).map_err(|_| UnitsError::InvalidAmount(text.to_string()))
}

/// An amount as sent by API clients: either a JSON string or a JSON number.
///
/// The original textual form is kept so responses can echo it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    /// Empty strings and a numeric zero count as "not provided".
    pub fn is_blank(&self) -> bool {
        match self {
            AmountInput::Text(s) => s.trim().is_empty(),
            AmountInput::Number(n) => n.as_f64() == Some(0.0),
        }
    }

    pub fn to_ether(&self) -> Result<U256, UnitsError> {
        parse_ether(&self.to_string())
    }

    pub fn to_integer(&self) -> Result<U256, UnitsError> {
        parse_integer(&self.to_string())
    }
}

impl fmt::Display for AmountInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountInput::Text(s) => write!(f, "{}", s),
            AmountInput::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}
