//! Money type for monetary values.
//!
//! Amounts are stored as an integer count of minor units (hundredths) to
//! avoid floating-point drift in cart arithmetic. Display always renders
//! a fixed-point string with two fraction digits, which is the form the
//! cart API exposes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies the storefront deals in. ISK is the shop currency; the
/// rest exist so catalog imports don't have to lie about their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    ISK,
    EUR,
    USD,
    GBP,
}

impl Currency {
    /// Get the ISO currency code (e.g. "ISK").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::ISK => "ISK",
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "ISK" => Some(Currency::ISK),
            "EUR" => Some(Currency::EUR),
            "USD" => Some(Currency::USD),
            "GBP" => Some(Currency::GBP),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
///
/// `amount_minor` is the amount in hundredths of the main unit, so
/// `Money::from_major(1000, Currency::ISK)` is 1000 kr. exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in minor units (hundredths).
    pub amount_minor: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a Money value from minor units.
    pub fn new(amount_minor: i64, currency: Currency) -> Self {
        Self {
            amount_minor,
            currency,
        }
    }

    /// Create a Money value from whole main units.
    ///
    /// ```
    /// use strand_commerce::money::{Currency, Money};
    /// let price = Money::from_major(1000, Currency::ISK);
    /// assert_eq!(price.amount_minor, 100_000);
    /// ```
    pub fn from_major(amount: i64, currency: Currency) -> Self {
        Self::new(amount.saturating_mul(100), currency)
    }

    /// Create a Money value from a decimal amount, rounded to the
    /// nearest minor unit.
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        Self::new((amount * 100.0).round() as i64, currency)
    }

    /// A zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.amount_minor > 0
    }

    /// Convert to a decimal value. Only for interfaces that demand a
    /// number; cart math stays in minor units.
    pub fn to_decimal(&self) -> f64 {
        self.amount_minor as f64 / 100.0
    }

    /// Try to add another Money value. `None` on currency mismatch or
    /// overflow.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        self.amount_minor
            .checked_add(other.amount_minor)
            .map(|sum| Money::new(sum, self.currency))
    }

    /// Try to multiply by a scalar. `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        self.amount_minor
            .checked_mul(factor)
            .map(|product| Money::new(product, self.currency))
    }

    /// Sum an iterator of Money values, starting at zero in `currency`.
    /// `None` on mismatch or overflow.
    pub fn try_sum<'a>(
        iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        let mut acc = Money::zero(currency);
        for m in iter {
            acc = acc.try_add(m)?;
        }
        Some(acc)
    }

    /// Format as a fixed-point amount string with two fraction digits
    /// (e.g. "2000.00").
    pub fn display_amount(&self) -> String {
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.display_amount(), self.currency.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_major() {
        let m = Money::from_major(1000, Currency::ISK);
        assert_eq!(m.amount_minor, 100_000);
        assert_eq!(m.display_amount(), "1000.00");
    }

    #[test]
    fn test_money_from_decimal_rounds() {
        let m = Money::from_decimal(49.995, Currency::EUR);
        assert_eq!(m.amount_minor, 5000);
    }

    #[test]
    fn test_money_display_amount_fractions() {
        assert_eq!(Money::new(38_710, Currency::ISK).display_amount(), "387.10");
        assert_eq!(Money::new(5, Currency::ISK).display_amount(), "0.05");
        assert_eq!(Money::new(-150, Currency::ISK).display_amount(), "-1.50");
    }

    #[test]
    fn test_money_try_add_mismatch() {
        let isk = Money::from_major(100, Currency::ISK);
        let eur = Money::from_major(100, Currency::EUR);
        assert!(isk.try_add(&eur).is_none());
    }

    #[test]
    fn test_money_try_multiply_overflow() {
        let m = Money::new(i64::MAX, Currency::ISK);
        assert!(m.try_multiply(2).is_none());
    }

    #[test]
    fn test_money_try_sum() {
        let values = [
            Money::from_major(100, Currency::ISK),
            Money::from_major(250, Currency::ISK),
        ];
        let sum = Money::try_sum(values.iter(), Currency::ISK).unwrap();
        assert_eq!(sum.display_amount(), "350.00");
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("isk"), Some(Currency::ISK));
        assert_eq!(Currency::from_code("XYZ"), None);
    }
}
