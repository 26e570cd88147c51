//! Peso amounts using decimal arithmetic.
//!
//! The shop sells in Philippine pesos only, so `Money` carries no currency
//! code. Amounts are kept as `Decimal` end to end; floats never touch prices.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// An amount in Philippine pesos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Currency symbol used for display.
    pub const SYMBOL: &'static str = "₱";

    /// Zero pesos.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create an amount from a decimal value.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create an amount from centavos (e.g. `125_050` is ₱1,250.50).
    #[must_use]
    pub fn from_centavos(centavos: i64) -> Self {
        Self(Decimal::new(centavos, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` when the amount is above zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display, e.g. `₱1,250.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{}{grouped}.{fraction}", Self::SYMBOL)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Self> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_centavos(125_050).display(), "₱1,250.50");
        assert_eq!(Money::from_centavos(123_456_789).display(), "₱1,234,567.89");
        assert_eq!(Money::from_centavos(99_900).display(), "₱999.00");
        assert_eq!(Money::ZERO.display(), "₱0.00");
    }

    #[test]
    fn test_display_rounds_to_centavos() {
        let money = Money::new("10.005".parse().unwrap());
        assert_eq!(money.display(), "₱10.01");
    }

    #[test]
    fn test_times_and_sum() {
        let unit = Money::from_centavos(2_500);
        assert_eq!(unit.times(3), Money::from_centavos(7_500));

        let total: Money = [unit, unit.times(2)].iter().sum();
        assert_eq!(total, Money::from_centavos(7_500));
    }

    #[test]
    fn test_deserializes_from_string_amount() {
        let money: Money = serde_json::from_str("\"1899.00\"").unwrap();
        assert_eq!(money, Money::from_centavos(189_900));
    }
}
