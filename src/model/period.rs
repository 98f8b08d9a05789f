//! Calendar periods: the `Year` selector, month labels and the date key extractors that decide
//! whether a record belongs to a year, month or day.

use anyhow::bail;
use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Short month labels, indexed by 0-based month.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A four-digit calendar year, kept as a string because years are matched by string equality
/// against the leading characters of a `YYYY-MM-DD` date.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Year(String);

impl Year {
    /// The current year in local time.
    pub fn current() -> Self {
        Self(format!("{:04}", chrono::Local::now().year()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Year {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
            bail!("Year must be a 4-digit value.");
        }
        Ok(Self(value.to_string()))
    }
}

impl Display for Year {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Year {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Year {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Year {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Year::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// The month key of a date: its year component and 0-based month index.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct YearMonth<'a> {
    pub year: &'a str,
    pub month_index: usize,
}

/// The day key of a date: its year component plus the full date string, which is the grouping key
/// for a single day.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct YearDay<'a> {
    pub year: &'a str,
    pub date: &'a str,
}

/// True if `value` has the exact shape `DDDD-DD-DD` (ASCII digits). Calendar validity is not
/// checked here.
pub fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(ix, b)| match ix {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Splits a `YYYY-MM-DD` string into its year slice, month number and day number.
fn split_date(value: &str) -> Option<(&str, u32, u32)> {
    if !is_iso_date(value) {
        return None;
    }
    let month = value[5..7].parse().ok()?;
    let day = value[8..10].parse().ok()?;
    Some((&value[0..4], month, day))
}

/// Returns the month key for `date`, or `None` if it is not `YYYY-MM-DD` or the month is outside
/// `01..=12`.
pub fn year_month_key(date: &str) -> Option<YearMonth<'_>> {
    let (year, month, _) = split_date(date)?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(YearMonth {
        year,
        month_index: (month - 1) as usize,
    })
}

/// Returns the day key for `date`, or `None` if it is not `YYYY-MM-DD`, the month is outside
/// `01..=12` or the day is outside `01..=31`.
pub fn year_day_key(date: &str) -> Option<YearDay<'_>> {
    let (year, month, day) = split_date(date)?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(YearDay { year, date })
}
