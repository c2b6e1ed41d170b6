use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Rendering used when an account has no transfers yet.
pub const NOT_AVAILABLE: &str = "N/A";

/// The moment a transfer happened, as reported by the backend.
///
/// The raw string is kept alongside the parsed instant so that a date the
/// backend formats unexpectedly never fails decoding of the whole ledger.
/// Such a date renders as-is and orders before every parsed instant. A missing
/// date is an empty raw string and renders as [`NOT_AVAILABLE`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferDate {
    raw: String,
    instant: Option<DateTime<Utc>>,
}

impl TransferDate {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let instant = parse_instant(raw.trim());
        Self { raw, instant }
    }

    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            raw: instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            instant: Some(instant),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // Offset-less timestamps are taken as UTC.
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(raw, pattern).ok())
        .map(|naive| naive.and_utc())
}

impl From<&str> for TransferDate {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<DateTime<Utc>> for TransferDate {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_instant(value)
    }
}

impl fmt::Display for TransferDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for TransferDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for TransferDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)
            .map(|raw| Self::parse(raw.unwrap_or_default()))
    }
}

/// Human-readable timestamp rendering: day first, `DD.MM.YYYY, HH:MM:SS`,
/// shifted into a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampStyle {
    offset: FixedOffset,
}

impl TimestampStyle {
    const PATTERN: &'static str = "%d.%m.%Y, %H:%M:%S";

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn render_instant(&self, instant: DateTime<Utc>) -> String {
        instant
            .with_timezone(&self.offset)
            .format(Self::PATTERN)
            .to_string()
    }

    /// Renders a transfer date, falling back to the raw backend string when it
    /// could not be parsed.
    pub fn render(&self, date: &TransferDate) -> String {
        match date.instant() {
            Some(instant) => self.render_instant(instant),
            None if date.as_str().trim().is_empty() => NOT_AVAILABLE.to_string(),
            None => date.as_str().to_string(),
        }
    }

    /// Renders an optional last transfer, using [`NOT_AVAILABLE`] when absent.
    pub fn render_optional(&self, date: Option<&TransferDate>) -> String {
        date.map(|d| self.render(d))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

impl Default for TimestampStyle {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for TimestampStyle {
    type Err = String;

    /// Accepts `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `+HHMM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
            return Ok(Self::utc());
        }
        let invalid = || format!("invalid UTC offset '{s}', expected e.g. +03:00");
        let (sign, rest) = match s.split_at_checked(1) {
            Some(("+", rest)) => (1, rest),
            Some(("-", rest)) => (-1, rest),
            _ => return Err(invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if minutes >= 60 {
            return Err(invalid());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::with_offset)
            .ok_or_else(invalid)
    }
}
