//! Encodings that cross the contract boundary.
//!
//! - Bank names live in a `bytes32` slot: UTF-8, right-padded with zero bytes.
//! - Amounts are 18-decimal fixed point integers. User strings are scaled
//!   exactly, never through binary floating point.

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::{B256, U256};
use thiserror::Error;

/// Width of the contract's name slot in bytes.
pub const NAME_SLOT_LEN: usize = 32;

/// Fractional digits of the base-unit fixed point.
pub const DECIMALS: usize = 18;

/// Local encoding/decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("name is {0} bytes, the slot holds at most {NAME_SLOT_LEN}")]
    NameTooLong(usize),

    #[error("name must not contain NUL characters")]
    NameContainsNul,

    #[error("stored name is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid amount '{amount}': {reason}")]
    InvalidAmount { amount: String, reason: &'static str },

    #[error("amount '{0}' has more than {DECIMALS} fractional digits")]
    TooPrecise(String),

    #[error("amount '{0}' does not fit in 256 bits")]
    Overflow(String),
}

/// Encode a name into the fixed 32-byte slot.
pub fn encode_name(name: &str) -> Result<B256, CodecError> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_SLOT_LEN {
        return Err(CodecError::NameTooLong(bytes.len()));
    }
    // Trailing NULs would be indistinguishable from padding.
    if bytes.contains(&0) {
        return Err(CodecError::NameContainsNul);
    }

    let mut slot = [0u8; NAME_SLOT_LEN];
    slot[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(slot))
}

/// Decode a name slot, stripping the zero padding.
pub fn decode_name(raw: &B256) -> Result<String, CodecError> {
    let bytes = raw.as_slice();
    let end = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8(bytes[..end].to_vec()).map_err(|_| CodecError::InvalidUtf8)
}

/// Split a user amount into validated whole and fractional digit runs.
fn split_amount(amount: &str) -> Result<(&str, &str), CodecError> {
    let invalid = |reason| CodecError::InvalidAmount {
        amount: amount.to_string(),
        reason,
    };

    if amount.is_empty() {
        return Err(invalid("empty"));
    }
    if amount.starts_with('-') {
        return Err(invalid("must not be negative"));
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("no digits"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("only digits and a single '.' are allowed"));
    }
    if fraction.len() > DECIMALS {
        return Err(CodecError::TooPrecise(amount.to_string()));
    }

    Ok((whole, fraction))
}

/// Convert a decimal user string (e.g. `"0.5"`) into base units.
pub fn to_base_units(amount: &str) -> Result<U256, CodecError> {
    let (whole, fraction) = split_amount(amount)?;
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    };

    parse_ether(&normalized).map_err(|_| CodecError::Overflow(amount.to_string()))
}

/// Render base units as the shortest exact decimal string.
pub fn to_decimal_string(value: U256) -> String {
    trim_fraction(&format_ether(value))
}

/// Canonical spelling of a user amount: no leading zeros in the whole
/// part, no trailing zeros in the fraction, no dangling point.
pub fn canonical_form(amount: &str) -> Result<String, CodecError> {
    let (whole, fraction) = split_amount(amount)?;
    let whole = whole.trim_start_matches('0');
    let whole = if whole.is_empty() { "0" } else { whole };
    Ok(trim_fraction(&format!("{}.{}", whole, fraction)))
}

fn trim_fraction(value: &str) -> String {
    match value.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_decode_strips_padding() {
        let mut slot = [0u8; 32];
        slot[..6].copy_from_slice(b"MyBank");
        let name = decode_name(&B256::from(slot)).unwrap();
        assert_eq!(name, "MyBank");
        assert!(!name.contains('\0'));
    }

    #[test]
    fn test_name_round_trip() {
        for name in ["", "a", "MyBank", "Bänk of Ünicode", "exactly thirty-two bytes long!!!"] {
            let encoded = encode_name(name).unwrap();
            assert_eq!(decode_name(&encoded).unwrap(), name);
        }
    }

    #[test]
    fn test_encode_rejects_oversized_name() {
        let name = "x".repeat(33);
        assert_eq!(encode_name(&name), Err(CodecError::NameTooLong(33)));

        // 11 three-byte characters = 33 bytes even though only 11 chars.
        let wide = "€".repeat(11);
        assert_eq!(encode_name(&wide), Err(CodecError::NameTooLong(33)));
    }

    #[test]
    fn test_encode_rejects_nul() {
        assert_eq!(encode_name("bank\0"), Err(CodecError::NameContainsNul));
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let mut slot = [0u8; 32];
        slot[0] = 0xff;
        assert_eq!(decode_name(&B256::from(slot)), Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_to_base_units_scales_exactly() {
        assert_eq!(to_base_units("1").unwrap(), U256::from(ONE_ETHER));
        assert_eq!(to_base_units("0.5").unwrap(), U256::from(ONE_ETHER / 2));
        assert_eq!(to_base_units(".5").unwrap(), U256::from(ONE_ETHER / 2));
        assert_eq!(to_base_units("0.000000000000000001").unwrap(), U256::from(1u64));
        assert_eq!(to_base_units("0.1").unwrap(), U256::from(100_000_000_000_000_000u128));
    }

    #[test]
    fn test_to_base_units_rejects_bad_input() {
        assert!(matches!(to_base_units(""), Err(CodecError::InvalidAmount { .. })));
        assert!(matches!(to_base_units("-1"), Err(CodecError::InvalidAmount { .. })));
        assert!(matches!(to_base_units("1.2.3"), Err(CodecError::InvalidAmount { .. })));
        assert!(matches!(to_base_units("1e18"), Err(CodecError::InvalidAmount { .. })));
        assert!(matches!(to_base_units("."), Err(CodecError::InvalidAmount { .. })));
        assert!(matches!(
            to_base_units("0.0000000000000000001"),
            Err(CodecError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_to_base_units_rejects_whitespace() {
        for amount in [" 1", "1 ", " 1 ", "0. 5", "\t0.5", " "] {
            assert!(
                matches!(to_base_units(amount), Err(CodecError::InvalidAmount { .. })),
                "accepted {:?}",
                amount
            );
        }
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(to_decimal_string(U256::ZERO), "0");
        assert_eq!(to_decimal_string(U256::from(ONE_ETHER)), "1");
        assert_eq!(to_decimal_string(U256::from(ONE_ETHER + ONE_ETHER / 2)), "1.5");
        assert_eq!(to_decimal_string(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn test_monetary_round_trip_matches_canonical_form() {
        for amount in ["0", "000.000", "1", "01.50", "0.5", ".25", "12345.678900", "7."] {
            let units = to_base_units(amount).unwrap();
            assert_eq!(
                to_decimal_string(units),
                canonical_form(amount).unwrap(),
                "amount {amount}"
            );
        }
    }
}
