//! Typed records produced by the loaders and the report row produced by the join.
//!
//! Coercion is best-effort except for amounts: an amount that is not a plain
//! decimal number aborts the load.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::{canonical_number, EmployeeId, OrderId};

/// Order status code as written by the till software.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    /// Numeric status columns (`1.0`) compare equal to text ones (`"1"`).
    pub fn from_number(v: f64) -> Self {
        Self(canonical_number(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Order timestamp: the exact source text plus a best-effort parse.
///
/// `raw` is what the report carries through; `parsed` only decides whether a
/// writer can emit a native date cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTimestamp {
    pub raw: String,
    pub parsed: Option<NaiveDateTime>,
}

impl OrderTimestamp {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_timestamp(raw.trim());
        Self { raw, parsed }
    }

    /// Used by typed sources holding a calendar date without a time of day.
    pub fn from_date(d: NaiveDate) -> Self {
        Self {
            raw: d.format("%Y-%m-%d").to_string(),
            parsed: d.and_hms_opt(0, 0, 0),
        }
    }

    /// Used by typed sources that already hold a date-time value.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self {
            raw: dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            parsed: Some(dt),
        }
    }
}

impl fmt::Display for OrderTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse an amount as a decimal number.
///
/// Accepts an optional sign, digits with an optional fraction, or scientific
/// notation. Thousands separators and currency symbols are rejected.
pub fn parse_amount(text: &str) -> std::result::Result<Decimal, String> {
    let t = text.trim();
    if t.is_empty() {
        return Err("empty amount".into());
    }
    let unsigned = t.strip_prefix(&['+', '-'][..]).unwrap_or(t);
    if unsigned.is_empty() || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return Err("not a decimal number".into());
    }
    if !unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return Err("not a decimal number".into());
    }
    let t = t.strip_prefix('+').unwrap_or(t);
    if unsigned.contains(&['e', 'E'][..]) {
        return Decimal::from_scientific(t).map_err(|e| e.to_string());
    }
    Decimal::from_str(t).map_err(|e| e.to_string())
}

/// [`parse_amount`] with the error located in its source.
pub fn parse_amount_field(
    source_name: &str,
    record: usize,
    field: &str,
    text: &str,
) -> Result<Decimal> {
    parse_amount(text).map_err(|reason| Error::Parse {
        source_name: source_name.to_string(),
        record,
        field: field.to_string(),
        value: text.to_string(),
        reason,
    })
}

/// One row of the order source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub customer_name: String,
    pub amount_due: Decimal,
    pub employee_id: EmployeeId,
    pub ordered_at: OrderTimestamp,
    pub status: StatusCode,
}

/// One row of the employee source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub employee_id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
}

/// One report row: an open order credited to the cashier who took it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditorEntry {
    pub order_id: OrderId,
    pub creditor_name: String,
    pub amount_credited: Decimal,
    pub cashier: String,
    pub credited_at: OrderTimestamp,
}
