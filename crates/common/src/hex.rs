use num_bigint::BigUint;
use revm_primitives::{Address, Bytes, B256};

/// A trait for converting ledger primitives to lowercase hexadecimal strings.
pub trait ToLowerHex {
    /// Converts the value to a lowercase hexadecimal string.
    ///
    /// ```
    /// use ledger_sim_common::ToLowerHex;
    /// use revm_primitives::Address;
    ///
    /// let value = Address::ZERO;
    /// assert_eq!(value.to_lower_hex(), "0x0000000000000000000000000000000000000000");
    /// ```
    fn to_lower_hex(&self) -> String;
}

impl ToLowerHex for B256 {
    fn to_lower_hex(&self) -> String {
        format!("{:#032x}", self)
    }
}

impl ToLowerHex for Address {
    fn to_lower_hex(&self) -> String {
        format!("{:#020x}", self)
    }
}

impl ToLowerHex for Bytes {
    fn to_lower_hex(&self) -> String {
        format!("{:#x}", self)
    }
}

/// Quantities are encoded without leading zeroes, `0x0` for zero.
impl ToLowerHex for BigUint {
    fn to_lower_hex(&self) -> String {
        format!("{:#x}", self)
    }
}

impl ToLowerHex for u64 {
    fn to_lower_hex(&self) -> String {
        format!("{:#x}", self)
    }
}

/// Parses a block height from either a `0x`-prefixed hex quantity or a decimal string.
///
/// Returns `None` for empty input, stray characters, or a bare `0x`.
pub fn parse_quantity(value: &str) -> Option<BigUint> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) => {
            BigUint::parse_bytes(digits.as_bytes(), 16)
        }
        Some(_) => None,
        None if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
            BigUint::parse_bytes(value.as_bytes(), 10)
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_encoding() {
        assert_eq!(BigUint::default().to_lower_hex(), "0x0");
        assert_eq!(BigUint::from(18870001u64).to_lower_hex(), "0x11feef1");
        assert_eq!(26u64.to_lower_hex(), "0x1a");
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x11feef1"), Some(BigUint::from(18870001u64)));
        assert_eq!(parse_quantity("18870001"), Some(BigUint::from(18870001u64)));
        assert_eq!(parse_quantity("0x0"), Some(BigUint::default()));

        // wider than any machine word
        let huge = parse_quantity("0x1000000000000000000000000000000000").unwrap();
        assert_eq!(huge.bits(), 133);

        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("0x"), None);
        assert_eq!(parse_quantity("0xzz"), None);
        assert_eq!(parse_quantity("-1"), None);
        assert_eq!(parse_quantity("latest"), None);
    }
}
