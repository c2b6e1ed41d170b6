use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A non-negative amount expressed in the minor unit of its currency (cents for `usd`).
///
/// All arithmetic is integral; sums saturate rather than wrap. Decoding accepts
/// a fractional number and rounds it to the nearest unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct MinorUnits(pub u64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Add for MinorUnits {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for MinorUnits {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a MinorUnits> for MinorUnits {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<u64> for MinorUnits {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct MinorUnitsVisitor;

impl Visitor<'_> for MinorUnitsVisitor {
    type Value = MinorUnits;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative amount in minor units")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<MinorUnits, E> {
        Ok(MinorUnits(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<MinorUnits, E> {
        u64::try_from(value)
            .map(MinorUnits)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<MinorUnits, E> {
        if !value.is_finite() || value < 0.0 {
            return Err(E::invalid_value(de::Unexpected::Float(value), &self));
        }
        // Saturating cast.
        Ok(MinorUnits(value.round() as u64))
    }
}

impl<'de> Deserialize<'de> for MinorUnits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(MinorUnitsVisitor)
    }
}

/// Currencies the payment platform charges without a fractional unit.
const ZERO_DECIMAL: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

const THREE_DECIMAL: &[&str] = &["bhd", "jod", "kwd", "omr", "tnd"];

/// An ISO-4217-like currency code, stored lower-case.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub const DEFAULT_CODE: &'static str = "usd";

    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_lowercase())
    }

    /// The stored, lower-case code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Upper-cased code for display.
    pub fn display_code(&self) -> String {
        self.0.to_ascii_uppercase()
    }

    /// Number of decimal places between the minor and the major unit.
    pub fn minor_exponent(&self) -> u32 {
        let code = self.0.as_str();
        if ZERO_DECIMAL.contains(&code) {
            0
        } else if THREE_DECIMAL.contains(&code) {
            3
        } else {
            2
        }
    }

    /// Converts a minor-unit amount into a major-unit decimal (`1700` cents -> `17.00`).
    pub fn to_major(&self, amount: MinorUnits) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(amount.value()), self.minor_exponent())
    }

    /// Renders an amount for display, e.g. `17.00 USD`.
    pub fn format_amount(&self, amount: MinorUnits) -> String {
        format!("{} {}", self.to_major(amount), self.display_code())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CODE)
    }
}

impl From<String> for Currency {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Currency {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_minor_units_sum() {
        let amounts = [MinorUnits(500), MinorUnits(300), MinorUnits(900)];
        assert_eq!(amounts.iter().sum::<MinorUnits>(), MinorUnits(1700));
        assert_eq!(Vec::<MinorUnits>::new().into_iter().sum::<MinorUnits>(), MinorUnits::ZERO);
    }

    #[test]
    fn test_minor_units_saturate() {
        assert_eq!(MinorUnits(u64::MAX) + MinorUnits(1), MinorUnits(u64::MAX));
    }

    #[test]
    fn test_minor_units_decoding() {
        assert_eq!(serde_json::from_str::<MinorUnits>("500").unwrap(), MinorUnits(500));
        assert_eq!(serde_json::from_str::<MinorUnits>("12.6").unwrap(), MinorUnits(13));
        assert!(serde_json::from_str::<MinorUnits>("-1").is_err());
        assert!(serde_json::from_str::<MinorUnits>("-0.5").is_err());
        assert!(serde_json::from_str::<MinorUnits>("\"5\"").is_err());
    }

    #[test]
    fn test_currency_is_stored_lowercase() {
        let currency: Currency = serde_json::from_str("\"USD\"").unwrap();
        assert_eq!(currency.code(), "usd");
        assert_eq!(currency.display_code(), "USD");
        assert_eq!(serde_json::to_string(&currency).unwrap(), "\"usd\"");
    }

    #[test]
    fn test_to_major_respects_exponent() {
        assert_eq!(Currency::new("usd").to_major(MinorUnits(1700)), dec!(17.00));
        assert_eq!(Currency::new("jpy").to_major(MinorUnits(1700)), dec!(1700));
        assert_eq!(Currency::new("kwd").to_major(MinorUnits(1500)), dec!(1.500));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(Currency::new("usd").format_amount(MinorUnits(1700)), "17.00 USD");
        assert_eq!(Currency::new("eur").format_amount(MinorUnits(5)), "0.05 EUR");
        assert_eq!(Currency::new("jpy").format_amount(MinorUnits(300)), "300 JPY");
    }
}
