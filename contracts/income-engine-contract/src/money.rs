//! Cent-exact money helpers.
//!
//! Every amount in the contract is an `i128` count of cents and every rate
//! is in basis points, so rounding happens in exactly one place.

use crate::types::IncomeConfig;
use core::fmt;

pub const BPS_DENOMINATOR: i128 = 10_000;
pub const CENTS_PER_UNIT: u128 = 100;

/// Divides and rounds half away from zero. A zero denominator yields 0.
pub fn round_half_away(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    let (n, d) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    let quotient = n / d;
    let remainder = n % d;
    if remainder.abs() * 2 >= d {
        quotient + n.signum()
    } else {
        quotient
    }
}

pub fn safe_add(amounts: &[i128]) -> i128 {
    amounts.iter().sum()
}

pub fn safe_subtract(a: i128, b: i128) -> i128 {
    a - b
}

/// `amount * multiplier_bps / 10_000`, rounded
pub fn safe_multiply(amount: i128, multiplier_bps: i128) -> i128 {
    round_half_away(amount * multiplier_bps, BPS_DENOMINATOR)
}

/// Returns 0 when `divisor` is 0 rather than failing.
pub fn safe_divide(amount: i128, divisor: i128) -> i128 {
    round_half_away(amount, divisor)
}

pub fn percent_of(amount: i128, bps: u32) -> i128 {
    safe_multiply(amount, bps as i128)
}

pub fn calculate_referral_income(activation_amount: i128, config: &IncomeConfig) -> i128 {
    percent_of(activation_amount, config.referral_bps)
}

/// Re-topup commissions use the referral rate.
pub fn calculate_retopup_income(activation_amount: i128, config: &IncomeConfig) -> i128 {
    calculate_referral_income(activation_amount, config)
}

/// Level 1 is the immediate sponsor. Levels outside the table pay nothing.
pub fn calculate_level_income(level: u32, activation_amount: i128, config: &IncomeConfig) -> i128 {
    if level == 0 {
        return 0;
    }
    config
        .level_bps
        .get(level - 1)
        .map_or(0, |bps| percent_of(activation_amount, bps))
}

/// Equal split of `total_amount` across `total_levels`; `level` only gates
/// the range.
pub fn calculate_global_income(total_amount: i128, level: u32, total_levels: u32) -> i128 {
    if level == 0 || level > total_levels {
        return 0;
    }
    safe_divide(total_amount, total_levels as i128)
}

/// Renders cents as `$1,234.50`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Amount(pub i128);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let cents = self.0.unsigned_abs();
        f.write_str("$")?;
        write_grouped(f, cents / CENTS_PER_UNIT)?;
        write!(f, ".{:02}", cents % CENTS_PER_UNIT)
    }
}

fn write_grouped(f: &mut fmt::Formatter<'_>, units: u128) -> fmt::Result {
    if units < 1000 {
        return write!(f, "{}", units);
    }
    write_grouped(f, units / 1000)?;
    write!(f, ",{:03}", units % 1000)
}
