//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are kept exact while they accumulate; rounding to the currency's
//! minor unit happens once, when a [`Price`] is produced for display.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dong or dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price without rounding.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price rounded to the currency's minor unit.
    ///
    /// Midpoints round away from zero, the convention used on receipts.
    #[must_use]
    pub fn rounded(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount: amount.round_dp_with_strategy(
                currency_code.minor_units(),
                RoundingStrategy::MidpointAwayFromZero,
            ),
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Format for display, e.g. `"25,000₫"` or `"$19.99"`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = Self::rounded(self.amount, self.currency_code);
        let digits = format!(
            "{:.*}",
            self.currency_code.minor_units() as usize,
            rounded.amount.abs()
        );
        let (whole, fraction) = digits
            .split_once('.')
            .map_or((digits.as_str(), None), |(w, f)| (w, Some(f)));
        let mut grouped = group_thousands(whole);
        if let Some(fraction) = fraction {
            grouped.push('.');
            grouped.push_str(fraction);
        }
        let sign = if rounded.amount.is_sign_negative() && !rounded.amount.is_zero() {
            "-"
        } else {
            ""
        };

        match self.currency_code {
            CurrencyCode::VND => format!("{sign}{grouped}{}", self.currency_code.symbol()),
            _ => format!("{sign}{}{grouped}", self.currency_code.symbol()),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    VND,
    USD,
    EUR,
    GBP,
    SGD,
}

impl CurrencyCode {
    /// Number of decimal places in the currency's minor unit.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::VND => 0,
            Self::USD | Self::EUR | Self::GBP | Self::SGD => 2,
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::VND => "₫",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::SGD => "S$",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::VND => "VND",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::SGD => "SGD",
        }
    }
}

impl core::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VND" => Ok(Self::VND),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "SGD" => Ok(Self::SGD),
            other => Err(format!("unsupported currency code: {other}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_uses_minor_units() {
        let vnd = Price::rounded(Decimal::new(125_005, 1), CurrencyCode::VND);
        assert_eq!(vnd.amount, Decimal::from(12_501));

        let usd = Price::rounded(Decimal::new(19_995, 3), CurrencyCode::USD);
        assert_eq!(usd.amount, Decimal::new(2_000, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Price::new(Decimal::from(25_000), CurrencyCode::VND).display(),
            "25,000₫"
        );
        assert_eq!(
            Price::new(Decimal::new(1_234_567, 2), CurrencyCode::USD).display(),
            "$12,345.67"
        );
        assert_eq!(Price::zero(CurrencyCode::EUR).display(), "€0.00");
        assert_eq!(
            Price::new(Decimal::from(-500), CurrencyCode::VND).display(),
            "-500₫"
        );
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!("vnd".parse::<CurrencyCode>().unwrap(), CurrencyCode::VND);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
