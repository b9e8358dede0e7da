use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Timestamp as found in a store payload, before normalization
///
/// Composer records use epoch milliseconds; message records use either epoch
/// milliseconds or ISO-8601 text depending on the Cursor version that wrote them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl RawTimestamp {
    /// Convert to UTC. Returns `None` for zero, out-of-range, or unparseable values.
    pub fn normalize(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => from_millis(*ms),
            Self::FractionalMillis(ms) if ms.is_finite() => from_millis(ms.trunc() as i64),
            Self::FractionalMillis(_) => None,
            Self::Text(s) => {
                let s = s.trim();
                if let Ok(ms) = s.parse::<i64>() {
                    return from_millis(ms);
                }
                if let Ok(dt) = s.parse::<DateTime<Utc>>() {
                    return Some(dt);
                }
                // ISO-8601 without an offset is taken as UTC
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|dt| dt.and_utc())
            }
        }
    }
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    if ms <= 0 {
        return None;
    }
    DateTime::from_timestamp_millis(ms)
}

/// Deserializer for optional timestamps that never fails the surrounding record
///
/// Numbers are read as epoch milliseconds, strings as either numeric milliseconds or
/// ISO-8601. Anything else (null, objects, garbage text) becomes `None`.
pub fn deserialize_lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value::<RawTimestamp>(v).ok()).and_then(|ts| ts.normalize()))
}
