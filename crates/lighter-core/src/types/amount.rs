//! Conversion from human-readable decimal amounts to integer base units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::{Error, Result};

/// USDC carries six decimals.
pub const USDC_DECIMALS: u32 = 6;

/// Convert `value` into base units with `decimals` places.
///
/// Rejects negative values and values with more precision than the unit
/// supports; amounts are never silently rounded.
#[allow(clippy::result_large_err)]
pub fn to_base_units(field: &'static str, value: Decimal, decimals: u32) -> Result<u64> {
    if value.is_sign_negative() {
        return Err(Error::validation(field, format!("must not be negative, got {}", value)));
    }

    let scale = 10u64
        .checked_pow(decimals)
        .map(Decimal::from)
        .ok_or_else(|| Error::validation(field, format!("{} decimals is out of range", decimals)))?;
    let scaled = value
        .checked_mul(scale)
        .ok_or_else(|| Error::validation(field, format!("{} overflows", value)))?;

    if scaled.fract() != Decimal::ZERO {
        return Err(Error::validation(
            field,
            format!("{} has more than {} decimal places", value, decimals),
        ));
    }

    scaled
        .to_u64()
        .ok_or_else(|| Error::validation(field, format!("{} does not fit in u64", value)))
}

/// Convert a USDC amount (e.g. `1.5`) into base units.
#[allow(clippy::result_large_err)]
pub fn usdc_to_base_units(value: Decimal) -> Result<u64> {
    to_base_units("usdc_amount", value, USDC_DECIMALS)
}
