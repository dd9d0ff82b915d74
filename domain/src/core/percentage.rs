//! Fixed-point percentages.
//!
//! A [`Percentage`] holds hundredths of a percent, so `12.34%` is stored as
//! `1234`. All threshold comparisons happen on these integers.

use super::amount::Amount;
use super::error::ArithmeticError;
use serde::{Serialize, Serializer};

/// `numerator * PERCENT_SCALE / denominator` yields hundredths of a percent.
pub const PERCENT_SCALE: u64 = 10_000;

/// Percentage with two decimal digits of precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(u64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HUNDRED: Percentage = Percentage(PERCENT_SCALE);

    /// Whole percent, e.g. `from_whole(30)` is 30.00%. Saturates at `u64::MAX` hundredths.
    pub const fn from_whole(percent: u64) -> Self {
        Self(percent.saturating_mul(100))
    }

    /// Whole percent in `0..=100`, `None` above that.
    pub fn checked_from_whole(percent: u64) -> Option<Self> {
        (percent <= 100).then(|| Self::from_whole(percent))
    }

    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> u64 {
        self.0
    }

    /// Display-only conversion.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `100% - self`, floored at zero.
    pub fn complement(self) -> Self {
        Self(PERCENT_SCALE.saturating_sub(self.0))
    }

    /// Apply this percentage to an amount: `amount * self / 100%`.
    pub fn of(self, amount: Amount) -> Result<Amount, ArithmeticError> {
        let scaled = amount
            .checked_mul(Amount::from(self.0))
            .ok_or(ArithmeticError::Overflow("percentage of amount"))?;
        Ok(scaled / Amount::from(PERCENT_SCALE))
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// `numerator / denominator` as a percentage, truncated to two decimals.
///
/// Returns zero when the denominator is zero. Fails rather than saturating
/// when the scaled numerator or the result does not fit.
///
/// ```
/// use proposal_domain::core::amount::Amount;
/// use proposal_domain::core::percentage::safe_percentage;
///
/// let p = safe_percentage(Amount::from(1u64), Amount::from(3u64)).unwrap();
/// assert_eq!(p.to_string(), "33.33%");
/// ```
pub fn safe_percentage(numerator: Amount, denominator: Amount) -> Result<Percentage, ArithmeticError> {
    if denominator.is_zero() {
        return Ok(Percentage::ZERO);
    }
    let scaled = numerator
        .checked_mul(Amount::from(PERCENT_SCALE))
        .ok_or(ArithmeticError::Overflow("percentage numerator"))?;
    let result = scaled / denominator;
    if result > Amount::from(u64::MAX) {
        return Err(ArithmeticError::OutOfRange("percentage"));
    }
    Ok(Percentage(result.low_u64()))
}
