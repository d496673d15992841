//! Fixed-point token amounts

use serde::{Serialize, Serializer};
use std::fmt;
use crate::errors::{StakerError, StakerResult};

/// A non-negative token amount in raw base units together with the mint's
/// decimal exponent. `raw / 10^decimals` is the amount in whole tokens.
///
/// Amounts are never converted to floating point; sums are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: u64,
    decimals: u8,
}

impl TokenAmount {
    /// Amount from raw base units
    pub fn from_raw(raw: u64, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    /// Zero tokens of a mint with the given decimals
    pub fn zero(decimals: u8) -> Self {
        Self::from_raw(0, decimals)
    }

    /// Raw base units
    pub fn raw(&self) -> u64 {
        self.raw
    }

    /// Decimal exponent of the mint
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn is_zero(&self) -> bool {
        self.raw == 0
    }

    /// Add another amount of the same mint
    pub fn checked_add(self, other: TokenAmount) -> StakerResult<TokenAmount> {
        if self.decimals != other.decimals {
            return Err(StakerError::DecimalsMismatch {
                amount: self.decimals,
                balance: other.decimals,
            });
        }
        let raw = self.raw.checked_add(other.raw).ok_or(StakerError::AmountOverflow)?;
        Ok(Self::from_raw(raw, self.decimals))
    }

    /// Exact decimal rendering in whole tokens, e.g. `12.5`
    pub fn to_ui_string(&self) -> String {
        let decimals = self.decimals as usize;
        let digits = format!("{:0>width$}", self.raw, width = decimals + 1);
        let (whole, fraction) = digits.split_at(digits.len() - decimals);
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, fraction)
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ui_string())
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_ui_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ui_string() {
        assert_eq!(TokenAmount::from_raw(12_500_000, 6).to_ui_string(), "12.5");
        assert_eq!(TokenAmount::from_raw(1, 6).to_ui_string(), "0.000001");
        assert_eq!(TokenAmount::from_raw(7_000_000, 6).to_ui_string(), "7");
        assert_eq!(TokenAmount::from_raw(42, 0).to_ui_string(), "42");
        assert_eq!(TokenAmount::zero(9).to_ui_string(), "0");
    }

    #[test]
    fn test_ui_string_with_large_decimals() {
        assert_eq!(TokenAmount::from_raw(5, 39).to_string(), format!("0.{}5", "0".repeat(38)));
        assert_eq!(TokenAmount::from_raw(u64::MAX, 255).to_string().len(), 2 + 255);
        assert_eq!(TokenAmount::zero(u8::MAX).to_string(), "0");
    }

    #[test]
    fn test_many_small_credits_sum_exactly() {
        // 0.1 summed ten times is exactly 1 token
        let tenth = TokenAmount::from_raw(100_000, 6);
        let mut total = TokenAmount::zero(6);
        for _ in 0..10 {
            total = total.checked_add(tenth).unwrap();
        }
        assert_eq!(total.raw(), 1_000_000);
        assert_eq!(total.to_string(), "1");
    }

    #[test]
    fn test_add_rejects_mixed_decimals_and_overflow() {
        let a = TokenAmount::from_raw(1, 6);
        let b = TokenAmount::from_raw(1, 9);
        assert!(matches!(a.checked_add(b), Err(StakerError::DecimalsMismatch { .. })));

        let max = TokenAmount::from_raw(u64::MAX, 6);
        assert!(matches!(max.checked_add(a), Err(StakerError::AmountOverflow)));
    }
}
