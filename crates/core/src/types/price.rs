//! Type-safe price representation using decimal arithmetic.
//!
//! The backend serializes every amount as a decimal string (`"1250.00"`) in
//! Mexican pesos. Prices never go through `f64`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in Mexican pesos (MXN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero pesos.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an integer number of centavos.
    #[must_use]
    pub fn from_centavos(centavos: i64) -> Self {
        Self(Decimal::new(centavos, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Format for display, e.g. `$1,234.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.0.round_dp(2);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        if negative {
            format!("-${grouped}.{cents}")
        } else {
            format!("${grouped}.{cents}")
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Saturates at `Decimal::MAX` instead of overflowing.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

/// Saturates at `Decimal::MAX` instead of overflowing.
impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_centavos(123_450).display(), "$1,234.50");
        assert_eq!(Price::from_centavos(100_000_000).display(), "$1,000,000.00");
        assert_eq!(Price::from_centavos(999).display(), "$9.99");
        assert_eq!(Price::ZERO.display(), "$0.00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Price::from_centavos(-150_000).display(), "-$1,500.00");
    }

    #[test]
    fn test_deserializes_backend_decimal_string() {
        let price: Price = serde_json::from_str("\"1250.00\"").unwrap();
        assert_eq!(price, Price::from_centavos(125_000));
    }

    #[test]
    fn test_mul_and_sum() {
        let total: Price = [Price::from_centavos(10_000) * 2, Price::from_centavos(5_000)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_centavos(25_000));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Price::new(Decimal::MAX);
        assert_eq!(huge * 2, huge);
        assert_eq!(huge + Price::from_centavos(100), huge);
    }
}
