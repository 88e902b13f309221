// Telemetry value models and conversions
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A chart point, serialized as `[time_ms, value]`
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

impl Serialize for TimeSeriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.time_ms, self.value).serialize(serializer)
    }
}

/// A sample as it appears in a data payload.
///
/// The backend emits numbers, but older producers sent numeric strings, so both
/// are accepted. Non-finite floats reach the wire as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl RawValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse().ok(),
            RawValue::Missing => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Missing => f.write_str("-"),
        }
    }
}

/// Convert a seconds value into a millisecond timestamp.
/// Sub-millisecond fractions are truncated.
pub fn timestamp_ms(raw: &RawValue) -> Option<i64> {
    let seconds = raw.as_f64()?;
    let millis = (seconds * 1000.0).trunc();
    if !millis.is_finite() {
        return None;
    }
    Some(millis as i64)
}

/// Resolve a millisecond timestamp in the given timezone
pub fn date_in<Tz: TimeZone>(time_ms: i64, tz: &Tz) -> Option<DateTime<Tz>> {
    tz.timestamp_millis_opt(time_ms).single()
}

/// Human readable date for the schematic clock, without the timezone suffix.
/// Example: `Mon Oct 19 2026 14:00:00`
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    date.format("%a %b %d %Y %H:%M:%S").to_string()
}
