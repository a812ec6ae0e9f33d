//! Exact conversion between user-entered decimal amounts and the ledger's smallest unit.
//!
//! Amounts never go through floating point. The decimal string is parsed as a
//! [`BigDecimal`] and scaled with integer arithmetic, the same way fee amounts are scaled
//! before being sent to the chain.

use std::str::FromStr;

use alloy_primitives::U256;
use bigdecimal::num_bigint::BigUint;
use bigdecimal::{BigDecimal, Zero};
use tracing::trace;

pub(crate) const LOG_TARGET: &str = "ledger_utils::units";

/// Number of decimals of the native currency (1 ether = 10^18 wei).
pub const ETHER_DECIMALS: u8 = 18;

/// A `uint256` holds at most 78 decimal digits, anything shifted further can't be represented.
const MAX_SHIFT: u32 = 96;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    #[error("`{0}` is not a decimal number")]
    InvalidNumber(String),
    #[error("amount cannot be negative")]
    Negative,
    #[error("too many decimal places")]
    TooManyDecimals,
    #[error("amount does not fit in 256 bits")]
    Overflow,
}

/// Converts a decimal string into an integer amount of the smallest unit.
pub fn parse_units(value: &str, decimals: u8) -> Result<U256, UnitsError> {
    let dec = BigDecimal::from_str(value.trim())
        .map_err(|_| UnitsError::InvalidNumber(value.to_string()))?;

    let (bigint, exponent) = dec.as_bigint_and_exponent();
    let biguint = bigint.to_biguint().ok_or(UnitsError::Negative)?;

    if biguint.is_zero() {
        return Ok(U256::ZERO);
    }

    let shift = i64::from(decimals).checked_sub(exponent).ok_or(UnitsError::Overflow)?;

    let scaled = if shift >= 0 {
        let shift = u32::try_from(shift).map_err(|_| UnitsError::Overflow)?;
        if shift > MAX_SHIFT {
            return Err(UnitsError::Overflow);
        }
        biguint * BigUint::from(10u32).pow(shift)
    } else {
        let shift = u32::try_from(shift.unsigned_abs()).map_err(|_| UnitsError::TooManyDecimals)?;
        if shift > MAX_SHIFT {
            return Err(UnitsError::TooManyDecimals);
        }

        let factor = BigUint::from(10u32).pow(shift);
        if !(&biguint % &factor).is_zero() {
            trace!(target: LOG_TARGET, %value, decimals, "Found non-zero remainder during scaling down.");
            return Err(UnitsError::TooManyDecimals);
        }
        biguint / factor
    };

    U256::try_from_be_slice(&scaled.to_bytes_be()).ok_or(UnitsError::Overflow)
}

/// Renders an integer amount of the smallest unit as a decimal string, without trailing zeros.
pub fn format_units(value: U256, decimals: u8) -> String {
    let base = U256::from(10u64).pow(U256::from(decimals));
    let integer = value / base;
    let fraction = value % base;

    if fraction.is_zero() {
        return integer.to_string();
    }

    let fraction = format!("{:0>width$}", fraction.to_string(), width = usize::from(decimals));
    format!("{integer}.{}", fraction.trim_end_matches('0'))
}

pub fn parse_ether(value: &str) -> Result<U256, UnitsError> {
    parse_units(value, ETHER_DECIMALS)
}

pub fn format_ether(value: U256) -> String {
    format_units(value, ETHER_DECIMALS)
}
