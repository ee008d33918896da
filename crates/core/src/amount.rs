use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid amount: '{0}'")]
pub struct InvalidAmount(pub String);

/// A strictly positive transaction amount as printed on a slip.
///
/// Keeps the cleaned digit string (grouping commas removed, decimal point and
/// leading zeros preserved) alongside its parsed value. No currency symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    digits: String,
    value: Decimal,
}

impl Amount {
    /// Strip grouping commas and parse. Returns `None` unless the value is > 0.
    ///
    /// Digit runs too long for `Decimal` are still accepted when well formed;
    /// their [`value`](Self::value) saturates at `Decimal::MAX`.
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = strip_grouping(raw);
        let value = match Decimal::from_str(&digits) {
            Ok(value) => value,
            Err(_) if is_plain_positive(&digits) => Decimal::MAX,
            Err(_) => return None,
        };
        if value <= Decimal::ZERO {
            return None;
        }
        Some(Amount { digits, value })
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn value(&self) -> Decimal {
        self.value
    }
}

/// `digits[.digits]` with at least one non-zero digit.
fn is_plain_positive(s: &str) -> bool {
    let (int, frac) = s.split_once('.').unwrap_or((s, ""));
    !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
        && s.bytes().any(|b| (b'1'..=b'9').contains(&b))
}

/// Remove `,` thousands separators.
pub fn strip_grouping(raw: &str) -> String {
    raw.replace(',', "")
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

impl FromStr for Amount {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s).ok_or_else(|| InvalidAmount(s.to_string()))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.digits)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_grouping_separators() {
        let a = Amount::parse("1,234,567").unwrap();
        assert_eq!(a.as_str(), "1234567");
        assert_eq!(a.value(), Decimal::from(1_234_567));
    }

    #[test]
    fn keeps_decimal_point() {
        let a = Amount::parse("869,000.50").unwrap();
        assert_eq!(a.to_string(), "869000.50");
    }

    #[test]
    fn rejects_zero_and_empty() {
        assert!(Amount::parse("0").is_none());
        assert!(Amount::parse("0,000").is_none());
        assert!(Amount::parse(",,,").is_none());
        assert!(Amount::parse("").is_none());
    }

    #[test]
    fn overlong_digit_run_is_kept_with_saturated_value() {
        let raw = "1234567890123456789012345678901";
        let a = Amount::parse(raw).unwrap();
        assert_eq!(a.as_str(), raw);
        assert_eq!(a.value(), Decimal::MAX);

        let grouped = "999,999,999,999,999,999,999,999,999,999,999,999.50";
        assert_eq!(Amount::parse(grouped).unwrap().as_str(), "999999999999999999999999999999999999.50");
    }

    #[test]
    fn overlong_zero_or_malformed_runs_are_rejected() {
        assert!(Amount::parse("0000000000000000000000000000000000").is_none());
        assert!(Amount::parse("12345678901234567890123456789012.3.4").is_none());
    }

    #[test]
    fn output_is_stable_under_restripping() {
        for raw in ["150,000", "25,000", "1,000.00", "869000"] {
            let a = Amount::parse(raw).unwrap();
            assert_eq!(strip_grouping(a.as_str()), a.as_str());
        }
    }

    #[test]
    fn serializes_as_string() {
        let a = Amount::parse("500,000").unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"500000\"");
        let back: Amount = serde_json::from_str("\"500000\"").unwrap();
        assert_eq!(back, a);
    }
}
