use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Days between the 1900 spreadsheet epoch (serial day 1 is
/// 1900-01-01, with the phantom leap day baked in) and the Unix epoch.
const UNIX_EPOCH_SERIAL_DAYS: f64 = 25569.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A decoded cell value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    DateTime(DateTime<Local>),
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_owned())
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<DateTime<Local>> for CellValue {
    fn from(v: DateTime<Local>) -> Self {
        CellValue::DateTime(v)
    }
}

/// Convert a 1900-system serial day count to a local timestamp.
///
/// The fractional part carries the time of day; the result is rounded
/// to the nearest whole second. Returns `None` for non-finite input or
/// serial values whose timestamp falls outside chrono's representable
/// range.
pub fn serial_to_datetime(serial: f64) -> Option<DateTime<Local>> {
    let seconds = (serial - UNIX_EPOCH_SERIAL_DAYS) * SECONDS_PER_DAY;
    if !seconds.is_finite() {
        return None;
    }
    let seconds = seconds.round();
    if seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
        return None;
    }
    Local.timestamp_opt(seconds as i64, 0).single()
}
