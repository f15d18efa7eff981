use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, SecondsFormat, Utc,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, ShelterError};

/// Report window, always ending on the reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportRange {
    Day,
    Week,
    Month,
    Year,
}

impl ReportRange {
    pub fn days(self) -> u32 {
        match self {
            ReportRange::Day => 1,
            ReportRange::Week => 7,
            ReportRange::Month => 30,
            ReportRange::Year => 365,
        }
    }
}

impl fmt::Display for ReportRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportRange::Day => "day",
            ReportRange::Week => "week",
            ReportRange::Month => "month",
            ReportRange::Year => "year",
        };
        f.write_str(label)
    }
}

/// Which time zone turns timestamps into calendar days.
///
/// The same policy must define "today" and every transaction's day, otherwise
/// rows near midnight land in the wrong bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPolicy {
    Local,
    Fixed(FixedOffset),
}

impl DayPolicy {
    pub fn utc() -> Self {
        DayPolicy::Fixed(Utc.fix())
    }

    /// Parse "local", "utc" or an offset like "+05:30", "-0800", "+02"
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(DayPolicy::Local),
            "utc" | "z" => return Ok(DayPolicy::utc()),
            _ => {}
        }

        parse_offset(trimmed)
            .map(DayPolicy::Fixed)
            .ok_or_else(|| ShelterError::InvalidTimezone(input.to_string()))
    }

    pub fn today(&self) -> NaiveDate {
        match self {
            DayPolicy::Local => Local::now().date_naive(),
            DayPolicy::Fixed(offset) => Utc::now().with_timezone(offset).date_naive(),
        }
    }

    /// Current instant as an RFC 3339 timestamp in this zone
    pub fn now_timestamp(&self) -> String {
        match self {
            DayPolicy::Local => Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            DayPolicy::Fixed(offset) => Utc::now()
                .with_timezone(offset)
                .to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }

    /// Calendar day of a timestamp, or None when it cannot be parsed.
    ///
    /// Timestamps carrying an offset are converted into this zone. Naive
    /// timestamps and bare dates are taken as already being in it.
    pub fn day_of(&self, timestamp: &str) -> Option<NaiveDate> {
        let ts = timestamp.trim();
        if ts.is_empty() {
            return None;
        }

        let zoned = DateTime::parse_from_rfc3339(ts)
            .or_else(|_| DateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S%.f%#z"));
        if let Ok(dt) = zoned {
            return Some(self.localize(dt));
        }

        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(ts, format) {
                return Some(naive.date());
            }
        }

        NaiveDate::parse_from_str(ts, "%Y-%m-%d").ok()
    }

    fn localize(&self, dt: DateTime<FixedOffset>) -> NaiveDate {
        match self {
            DayPolicy::Local => dt.with_timezone(&Local).date_naive(),
            DayPolicy::Fixed(offset) => dt.with_timezone(offset).date_naive(),
        }
    }
}

fn parse_offset(input: &str) -> Option<FixedOffset> {
    let (sign, rest) = match input.as_bytes().first()? {
        b'+' => (1, &input[1..]),
        b'-' => (-1, &input[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// The `range_days` calendar days ending at `today`, oldest first
pub fn build_day_keys(range_days: u32, today: NaiveDate) -> Vec<NaiveDate> {
    (0..range_days)
        .rev()
        .filter_map(|back| today.checked_sub_signed(Duration::days(i64::from(back))))
        .collect()
}
