//! Money and percentage display types
//!
//! Amounts echoed back by the prediction service are shown to the applicant
//! with a currency symbol and thousands separators. rust_decimal keeps the
//! rounding of fractional amounts exact instead of going through binary floats.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum fraction digits shown for an amount
const MAX_FRACTION_DIGITS: u32 = 3;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    INR,
    JPY,
}

impl Currency {
    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
            Currency::JPY => "¥",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
            Currency::JPY => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "INR" => Ok(Currency::INR),
            "JPY" => Ok(Currency::JPY),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur while building display amounts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),
}

/// A monetary amount with associated currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Parses an amount from its decimal or scientific text form
    pub fn parse(text: &str, currency: Currency) -> Result<Self, MoneyError> {
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(|amount| Self::new(amount, currency))
            .map_err(|_| MoneyError::InvalidAmount(text.to_string()))
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grouped = group_thousands(self.amount.abs());
        if self.amount.is_sign_negative() && grouped != "0" {
            write!(f, "-{}{}", self.currency.symbol(), grouped)
        } else {
            write!(f, "{}{}", self.currency.symbol(), grouped)
        }
    }
}

/// Formats an amount with comma thousands separators
///
/// At most three fraction digits are kept (half away from zero) and trailing
/// zeros are dropped, so `5849` renders as `5,849` and `1234.5` as `1,234.5`.
pub fn group_thousands(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let digits = rounded.abs().to_string();
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits.as_str(), None),
    };

    let mut grouped = String::with_capacity(digits.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// A ratio shown as a percentage with one decimal place
///
/// Built from a fraction (`0.8532`) and displayed as `85.3%`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage {
    fraction: f64,
}

impl Percentage {
    /// Creates a percentage from a fraction (e.g., 0.05 for 5%)
    pub fn from_fraction(fraction: f64) -> Self {
        Self { fraction }
    }

    /// Returns the underlying fraction
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Returns the value scaled to percent
    pub fn as_percent(&self) -> f64 {
        self.fraction * 100.0
    }

    /// Returns the fraction clamped to [0, 1], for drawing bars
    pub fn fill_fraction(&self) -> f64 {
        if self.fraction.is_nan() {
            return 0.0;
        }
        self.fraction.clamp(0.0, 1.0)
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.as_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_group_thousands_integer() {
        assert_eq!(group_thousands(dec!(5849)), "5,849");
        assert_eq!(group_thousands(dec!(1000000)), "1,000,000");
        assert_eq!(group_thousands(dec!(146)), "146");
        assert_eq!(group_thousands(dec!(0)), "0");
    }

    #[test]
    fn test_group_thousands_fraction() {
        assert_eq!(group_thousands(dec!(1234.5)), "1,234.5");
        assert_eq!(group_thousands(dec!(1234.56789)), "1,234.568");
        assert_eq!(group_thousands(dec!(5849.000)), "5,849");
    }

    #[test]
    fn test_group_thousands_negative() {
        assert_eq!(group_thousands(dec!(-1234567)), "-1,234,567");
        assert_eq!(group_thousands(dec!(-0.0001)), "0");
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(dec!(5849), Currency::USD);
        assert_eq!(m.to_string(), "$5,849");

        let m = Money::new(dec!(-2500.5), Currency::GBP);
        assert_eq!(m.to_string(), "-£2,500.5");
    }

    #[test]
    fn test_money_parse() {
        assert_eq!(Money::parse("146", Currency::USD).unwrap().amount(), dec!(146));
        assert_eq!(Money::parse("1e3", Currency::USD).unwrap().amount(), dec!(1000));
        assert!(Money::parse("abc", Currency::USD).is_err());
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(" INR ".parse::<Currency>().unwrap(), Currency::INR);
        assert!(matches!("XYZ".parse::<Currency>(), Err(MoneyError::UnknownCurrency(_))));
    }

    #[test]
    fn test_percentage_display() {
        assert_eq!(Percentage::from_fraction(0.8532).to_string(), "85.3%");
        assert_eq!(Percentage::from_fraction(0.91).to_string(), "91.0%");
        assert_eq!(Percentage::from_fraction(1.0).to_string(), "100.0%");
        assert_eq!(Percentage::from_fraction(0.0).to_string(), "0.0%");
    }

    #[test]
    fn test_percentage_fill_is_clamped() {
        assert_eq!(Percentage::from_fraction(1.7).fill_fraction(), 1.0);
        assert_eq!(Percentage::from_fraction(-0.2).fill_fraction(), 0.0);
        assert_eq!(Percentage::from_fraction(0.4).fill_fraction(), 0.4);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn grouping_preserves_integer_digits(value in 0i64..1_000_000_000_000i64) {
            let grouped = group_thousands(Decimal::from(value));
            prop_assert_eq!(grouped.replace(',', ""), value.to_string());
        }

        #[test]
        fn groups_are_three_digits(value in 1_000i64..1_000_000_000_000i64) {
            let grouped = group_thousands(Decimal::from(value));
            for group in grouped.split(',').skip(1) {
                prop_assert_eq!(group.len(), 3);
            }
        }
    }
}
