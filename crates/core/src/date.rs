use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Two-digit years at or below this map to the 2000s, above it to the 1900s.
pub const PIVOT_YEAR: u32 = 50;

const MIN_YEAR: u32 = 1900;
const MAX_YEAR: u32 = 2100;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid slip date: '{0}'")]
pub struct InvalidDate(pub String);

/// A plausibility-checked slip date. Displays as `MM/DD/YYYY`.
///
/// Only ranges are checked (month 1–12, day 1–31), not per-month day counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlipDate {
    year: u32,
    month: u32,
    day: u32,
}

impl SlipDate {
    /// Interpret a `/`, `-` or `.` delimited triple.
    ///
    /// A first component above 1900 is read as `Y-M-D`; anything else as
    /// `D-M-Y`, with two-digit years expanded around [`PIVOT_YEAR`].
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(['/', '-', '.']).collect();
        let [first, second, third] = parts.as_slice() else {
            return None;
        };
        let first: u32 = first.parse().ok()?;
        let second: u32 = second.parse().ok()?;
        let third: u32 = third.parse().ok()?;

        if first > MIN_YEAR {
            let date = SlipDate { year: first, month: second, day: third };
            return date.has_valid_month_day().then_some(date);
        }

        let date = SlipDate { year: expand_year(third), month: second, day: first };
        (date.has_valid_month_day() && (MIN_YEAR..=MAX_YEAR).contains(&date.year))
            .then_some(date)
    }

    pub fn year(self) -> u32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    fn has_valid_month_day(self) -> bool {
        (1..=12).contains(&self.month) && (1..=31).contains(&self.day)
    }
}

/// Expand a two-digit year; larger values pass through unchanged.
pub fn expand_year(year: u32) -> u32 {
    match year {
        y if y >= 100 => y,
        y if y <= PIVOT_YEAR => 2000 + y,
        y => 1900 + y,
    }
}

impl fmt::Display for SlipDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.month, self.day, self.year)
    }
}

impl FromStr for SlipDate {
    type Err = InvalidDate;

    /// Parses the canonical `MM/DD/YYYY` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidDate(s.to_string());
        let mut it = s.split('/');
        let (Some(m), Some(d), Some(y), None) = (it.next(), it.next(), it.next(), it.next())
        else {
            return Err(invalid());
        };
        if m.len() != 2 || d.len() != 2 || y.len() != 4 {
            return Err(invalid());
        }
        let date = SlipDate {
            month: m.parse().map_err(|_| invalid())?,
            day: d.parse().map_err(|_| invalid())?,
            year: y.parse().map_err(|_| invalid())?,
        };
        date.has_valid_month_day().then_some(date).ok_or_else(invalid)
    }
}

impl Serialize for SlipDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlipDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
