//! Time range parsing for `--since` / `--before`.
//!
//! # Syntax
//!
//! ```text
//! relative := integer [space] unit [space "ago"]
//! unit     := m | min | mins | minute | minutes
//!           | h | hr | hrs | hour | hours
//!           | d | day | days
//!           | w | week | weeks
//!           | mo | month | months        (30 days)
//!           | y | yr | yrs | year | years (365 days)
//! absolute := YYYY-MM-DD | YYYY-MM-DD HH:MM | YYYY-MM-DD HH:MM:SS
//!           | YYYY-MM-DDTHH:MM:SS | MM/DD/YYYY | MM/DD/YYYY HH:MM
//! ```
//!
//! Units match case-insensitively and only as whole words, so `3mo` is three months
//! and `3m` three minutes. Relative expressions resolve to `now - duration`; absolute
//! ones are read in the caller's UTC offset. `since` is inclusive and `before`
//! exclusive, so `--before 2026-01-01` excludes all of January 1st.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::Serialize;

use crate::error::{Error, Result};

/// The single "now" used for one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReference {
    pub now: DateTime<Utc>,
    /// Offset used to interpret absolute dates
    pub offset: FixedOffset,
}

impl TimeReference {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    /// Fixed instant with absolute dates read as UTC
    pub fn utc(now: DateTime<Utc>) -> Self {
        Self { now, offset: Utc.fix() }
    }

    /// Current wall-clock time in the local timezone
    pub fn local() -> Self {
        let now = Local::now();
        Self { now: now.with_timezone(&Utc), offset: *now.offset() }
    }
}

/// Half-open interval `[since, before)`; a missing bound is unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Build a range, rejecting `since >= before`
    pub fn new(since: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(since), Some(before)) = (since, before)
            && since >= before
        {
            return Err(Error::InvalidTimeRange { since, before });
        }
        Ok(Self { since, before })
    }

    /// Parse optional `--since` / `--before` expressions against one reference time
    pub fn parse(since: Option<&str>, before: Option<&str>, reference: &TimeReference) -> Result<Self> {
        let since = since.map(|s| parse_time_expression(s, reference)).transpose()?;
        let before = before.map(|s| parse_time_expression(s, reference)).transpose()?;
        Self::new(since, before)
    }

    pub fn is_bounded(&self) -> bool {
        self.since.is_some() || self.before.is_some()
    }

    /// Whether a timestamp falls inside the range
    ///
    /// An unknown timestamp is inside only an unbounded range.
    pub fn contains(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        let Some(ts) = timestamp else {
            return !self.is_bounded();
        };
        self.since.is_none_or(|since| ts >= since) && self.before.is_none_or(|before| ts < before)
    }
}

/// Parse a relative or absolute time expression into an instant
pub fn parse_time_expression(input: &str, reference: &TimeReference) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidTimeExpression(input.to_string()));
    }

    if let Some(duration) = parse_relative_duration(trimmed) {
        let duration = duration.ok_or_else(|| Error::InvalidTimeExpression(input.to_string()))?;
        return reference
            .now
            .checked_sub_signed(duration)
            .ok_or_else(|| Error::InvalidTimeExpression(input.to_string()));
    }

    parse_absolute(trimmed, reference.offset).ok_or_else(|| Error::InvalidTimeExpression(input.to_string()))
}

/// `None` if the input is not relative syntax; `Some(None)` if it is but overflows
fn parse_relative_duration(input: &str) -> Option<Option<Duration>> {
    let lower = input.to_lowercase();
    let body = match lower.strip_suffix("ago") {
        Some(rest) if rest.ends_with(char::is_whitespace) => rest.trim_end(),
        _ => lower.as_str(),
    };

    let digits_end = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
    if digits_end == 0 {
        return None;
    }
    let unit = body[digits_end..].trim_start();
    let minutes_per_unit = unit_minutes(unit)?;

    let Ok(amount) = body[..digits_end].parse::<i64>() else {
        return Some(None);
    };
    Some(amount.checked_mul(minutes_per_unit).and_then(Duration::try_minutes))
}

fn unit_minutes(unit: &str) -> Option<i64> {
    const HOUR: i64 = 60;
    const DAY: i64 = 24 * HOUR;

    match unit {
        "m" | "min" | "mins" | "minute" | "minutes" => Some(1),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(HOUR),
        "d" | "day" | "days" => Some(DAY),
        "w" | "week" | "weeks" => Some(7 * DAY),
        "mo" | "month" | "months" => Some(30 * DAY),
        "y" | "yr" | "yrs" | "year" | "years" => Some(365 * DAY),
        _ => None,
    }
}

fn parse_absolute(input: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    const DATETIME_FORMATS: &[&str] =
        &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    offset.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc))
}
