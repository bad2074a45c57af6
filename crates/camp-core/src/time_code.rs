//! Time-of-day normalization.
//!
//! Every chronological list in the program (schedule items, shifts, class
//! slots) orders by [`TimeCode`], a count of minutes since midnight.
//!
//! # Accepted input
//!
//! - 24-hour `"HH:MM"` (the canonical persisted form)
//! - 12-hour `"h:mm am/pm"`, case-insensitive, with or without periods and
//!   spaces in the marker (`8:30am`, `8:30 PM`, `8:30 p.m.`)
//! - 12-hour `"h am/pm"` with no minutes
//!
//! Without a marker the hour is read as 24-hour, so `"12:00"` is noon.
//!
//! # Lenient fallback
//!
//! [`parse`] maps malformed input to `0` (midnight) instead of failing so that
//! sorting stays total. Callers that need strictness use [`TimeCode::try_parse`]
//! or `str::parse::<TimeCode>()`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Minutes in a day.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})(?::(\d{2}))?\s*(?:([ap])\.?\s*m\.?)?\s*$").unwrap()
});

/// A time of day as minutes since midnight, in `0..1440`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeCode(u16);

impl TimeCode {
    /// Midnight.
    pub const MIDNIGHT: Self = Self(0);

    /// Builds a time from hour and minute. Out-of-range parts are rejected.
    #[must_use]
    pub const fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(hour * 60 + minute))
        } else {
            None
        }
    }

    /// Builds a time from minutes since midnight.
    #[must_use]
    pub const fn from_minutes(minutes: u16) -> Option<Self> {
        if minutes < MINUTES_PER_DAY {
            Some(Self(minutes))
        } else {
            None
        }
    }

    /// Strict parse; `None` for anything the grammar rejects.
    #[must_use]
    pub fn try_parse(text: &str) -> Option<Self> {
        let caps = TIME_RE.captures(text)?;
        let hour: u16 = caps[1].parse().ok()?;
        let minute: u16 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if minute > 59 {
            return None;
        }

        let hour = match caps.get(3) {
            None => {
                // Bare "14" is too ambiguous to accept without a marker.
                caps.get(2)?;
                hour
            }
            Some(marker) => {
                if !(1..=12).contains(&hour) {
                    return None;
                }
                let pm = marker.as_str().eq_ignore_ascii_case("p");
                match (pm, hour) {
                    (false, 12) => 0,
                    (true, 12) => 12,
                    (true, h) => h + 12,
                    (false, h) => h,
                }
            }
        };

        Self::from_hm(hour, minute)
    }

    /// Lenient parse; malformed input becomes midnight.
    #[must_use]
    pub fn lenient(text: &str) -> Self {
        Self::try_parse(text).unwrap_or(Self::MIDNIGHT)
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    /// Canonical 24-hour `"HH:MM"` form used for persistence.
    #[must_use]
    pub fn canonical(self) -> String {
        format!("{:02}:{:02}", self.0 / 60, self.0 % 60)
    }

    /// Display form `"h:mm AM/PM"`.
    #[must_use]
    pub fn twelve_hour(self) -> String {
        let hour = self.0 / 60;
        let minute = self.0 % 60;
        let meridiem = if hour < 12 { "AM" } else { "PM" };
        let hour = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{hour}:{minute:02} {meridiem}")
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.twelve_hour())
    }
}

impl FromStr for TimeCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s).ok_or_else(|| ValidationError::InvalidTime {
            value: s.to_string(),
        })
    }
}

impl Serialize for TimeCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for TimeCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        // Legacy documents may hold "h:mm AM/PM"; bad values sort as midnight.
        Ok(Self::lenient(&text))
    }
}

/// Parses a time-of-day string into minutes since midnight (lenient).
pub fn parse(text: &str) -> u16 {
    TimeCode::lenient(text).minutes()
}

/// Formats minutes since midnight as `"h:mm AM/PM"`, wrapping past midnight.
pub fn format(minutes: u16) -> String {
    TimeCode(minutes % MINUTES_PER_DAY).twelve_hour()
}

/// Orders two time-of-day strings by their parsed minutes.
pub fn compare(a: &str, b: &str) -> Ordering {
    parse(a).cmp(&parse(b))
}
