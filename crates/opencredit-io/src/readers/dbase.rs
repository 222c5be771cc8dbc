//! Legacy desktop-database tables stored as dBase (`.dbf`) files.
//!
//! dBase caps field names at 10 characters and usually upper-cases them, so
//! schema fields are matched case-insensitively and against their 10-character
//! truncation (`SpecificCustomerName` is stored as `SPECIFICCU`).
//!
//! Character fields are decoded with the configured code page; legacy tables
//! rarely carry UTF-8.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dbase::yore::code_pages::{CP1251, CP1252, CP437, CP850};
use dbase::{FieldValue, Record};
use opencredit_core::config::SourceEncoding;
use opencredit_core::id::canonical_number;
use opencredit_core::schema::{resolve_fields, AMOUNT_DUE, EMPLOYEE_FIELDS, ORDER_FIELDS};
use opencredit_core::types::{
    parse_amount_field, EmployeeRecord, OrderRecord, OrderTimestamp, StatusCode,
};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::source::RecordSource;

const DBASE_NAME_LEN: usize = 10;

/// Reads the order and employee tables from two `.dbf` files.
pub struct DbaseSource {
    orders: PathBuf,
    employees: PathBuf,
    encoding: SourceEncoding,
}

impl DbaseSource {
    pub fn from_paths(orders: impl Into<PathBuf>, employees: impl Into<PathBuf>) -> Self {
        Self {
            orders: orders.into(),
            employees: employees.into(),
            encoding: SourceEncoding::Cp1252,
        }
    }

    pub fn with_encoding(mut self, encoding: SourceEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

impl RecordSource for DbaseSource {
    fn name(&self) -> &'static str {
        "dbase"
    }

    fn load_orders(&self) -> Result<Vec<OrderRecord>> {
        let (source_name, table) = read_table(&self.orders, self.encoding, &ORDER_FIELDS)?;
        let mut out = Vec::with_capacity(table.records.len());
        for (i, rec) in table.records.iter().enumerate() {
            let value = |k: usize| rec.get(&table.columns[k]);
            out.push(OrderRecord {
                order_id: text(value(0)).into(),
                customer_name: text(value(1)),
                amount_due: amount(&source_name, i + 1, value(2))?,
                employee_id: text(value(3)).into(),
                ordered_at: timestamp(value(4)),
                status: StatusCode::new(text(value(5))),
            });
        }
        tracing::debug!(source = %source_name, rows = out.len(), "read order table");
        Ok(out)
    }

    fn load_employees(&self) -> Result<Vec<EmployeeRecord>> {
        let (source_name, table) = read_table(&self.employees, self.encoding, &EMPLOYEE_FIELDS)?;
        let out: Vec<EmployeeRecord> = table
            .records
            .iter()
            .map(|rec| {
                let value = |k: usize| rec.get(&table.columns[k]);
                EmployeeRecord {
                    employee_id: text(value(0)).into(),
                    first_name: text(value(1)),
                    last_name: text(value(2)),
                }
            })
            .collect();
        tracing::debug!(source = %source_name, rows = out.len(), "read employee table");
        Ok(out)
    }
}

struct Table {
    /// Stored field name for each required schema field, in schema order.
    columns: Vec<String>,
    records: Vec<Record>,
}

fn read_table(path: &Path, encoding: SourceEncoding, required: &[&str]) -> Result<(String, Table)> {
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let dbase_err = |e: dbase::Error| Error::Dbase {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    // Each code page is its own type, so every arm builds its own reader.
    macro_rules! read_all {
        ($reader:expr) => {{
            let mut reader = $reader.map_err(dbase_err)?;
            let stored: Vec<String> =
                reader.fields().iter().map(|f| f.name().to_string()).collect();
            let records = reader.read().map_err(dbase_err)?;
            (stored, records)
        }};
    }

    let (stored, records) = match encoding {
        SourceEncoding::Utf8 => read_all!(dbase::Reader::from_path(path)),
        SourceEncoding::Cp1252 => read_all!(dbase::Reader::from_path_with_encoding(path, CP1252)),
        SourceEncoding::Cp1251 => read_all!(dbase::Reader::from_path_with_encoding(path, CP1251)),
        SourceEncoding::Cp850 => read_all!(dbase::Reader::from_path_with_encoding(path, CP850)),
        SourceEncoding::Cp437 => read_all!(dbase::Reader::from_path_with_encoding(path, CP437)),
    };
    let columns = match_columns(&source_name, &stored, required)?;
    Ok((source_name, Table { columns, records }))
}

/// Map schema field names onto the names actually stored in the table.
fn match_columns(source_name: &str, stored: &[String], required: &[&str]) -> Result<Vec<String>> {
    // Normalize stored names to the schema spelling so the shared resolver
    // can report every missing field at once.
    let normalized: Vec<String> = stored
        .iter()
        .map(|s| {
            required
                .iter()
                .find(|r| stored_matches(s, r))
                .map(|r| r.to_string())
                .unwrap_or_else(|| s.clone())
        })
        .collect();
    let positions = resolve_fields(source_name, &normalized, required)?;
    Ok(positions.into_iter().map(|p| stored[p].clone()).collect())
}

fn stored_matches(stored: &str, wanted: &str) -> bool {
    let stored = stored.trim();
    stored.eq_ignore_ascii_case(wanted)
        || (wanted.len() > DBASE_NAME_LEN
            && stored.eq_ignore_ascii_case(&wanted[..DBASE_NAME_LEN]))
}

fn format_date(d: &dbase::Date) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(d.year() as i32, d.month(), d.day())
}

/// Best-effort text rendering of any field value; nulls become empty text.
fn text(value: Option<&FieldValue>) -> String {
    match value {
        Some(FieldValue::Character(Some(s))) => s.trim().to_string(),
        Some(FieldValue::Memo(s)) => s.trim().to_string(),
        Some(FieldValue::Numeric(Some(n))) => canonical_number(*n),
        Some(FieldValue::Float(Some(f))) => canonical_number(*f as f64),
        Some(FieldValue::Double(d)) => canonical_number(*d),
        Some(FieldValue::Currency(c)) => canonical_number(*c),
        Some(FieldValue::Integer(i)) => i.to_string(),
        Some(FieldValue::Logical(Some(b))) => b.to_string(),
        Some(FieldValue::Date(Some(d))) => format_date(d)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn amount(source_name: &str, record: usize, value: Option<&FieldValue>) -> Result<Decimal> {
    let bad = |value: String, reason: &str| {
        Error::Core(opencredit_core::Error::Parse {
            source_name: source_name.to_string(),
            record,
            field: AMOUNT_DUE.to_string(),
            value,
            reason: reason.to_string(),
        })
    };
    let from_f64 = |n: f64| Decimal::from_f64(n).ok_or_else(|| bad(n.to_string(), "not a finite decimal"));

    match value {
        Some(FieldValue::Numeric(Some(n))) => from_f64(*n),
        Some(FieldValue::Double(n)) | Some(FieldValue::Currency(n)) => from_f64(*n),
        Some(FieldValue::Float(Some(f))) => from_f64(*f as f64),
        Some(FieldValue::Integer(i)) => Ok(Decimal::from(*i)),
        Some(FieldValue::Character(Some(s))) => {
            Ok(parse_amount_field(source_name, record, AMOUNT_DUE, s)?)
        }
        Some(other) => Err(bad(format!("{other:?}"), "null or non-numeric amount")),
        None => Err(bad(String::new(), "missing amount")),
    }
}

fn timestamp(value: Option<&FieldValue>) -> OrderTimestamp {
    match value {
        Some(FieldValue::Date(Some(d))) => match format_date(d) {
            Some(date) => OrderTimestamp::from_date(date),
            None => OrderTimestamp::from_raw(""),
        },
        Some(FieldValue::DateTime(dt)) => {
            let date = dt.date();
            let time = dt.time();
            match format_date(&date)
                .and_then(|d| d.and_hms_opt(time.hours(), time.minutes(), time.seconds()))
            {
                Some(dt) => OrderTimestamp::from_datetime(dt),
                None => OrderTimestamp::from_raw(""),
            }
        }
        other => OrderTimestamp::from_raw(text(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_upper_case_names_match_schema() {
        let stored: Vec<String> = [
            "ORDERID", "SPECIFICCU", "AMOUNTDUE", "EMPLOYEEID", "ORDERDATET", "ORDERSTATU",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let cols = match_columns("OrderHeaders.dbf", &stored, &ORDER_FIELDS).unwrap();
        assert_eq!(cols, stored);
    }

    #[test]
    fn missing_dbase_column_is_reported_by_schema_name() {
        let stored = vec!["EMPLOYEEID".to_string(), "FIRSTNAME".to_string()];
        let err = match_columns("EmployeeFiles.dbf", &stored, &EMPLOYEE_FIELDS).unwrap_err();
        assert!(err.to_string().contains("LastName"));
    }

    #[test]
    fn numeric_keys_render_like_text_keys() {
        assert_eq!(text(Some(&FieldValue::Numeric(Some(7.0)))), "7");
        assert_eq!(text(Some(&FieldValue::Character(Some("  Jane ".into())))), "Jane");
        assert_eq!(text(Some(&FieldValue::Character(None))), "");
        assert_eq!(text(None), "");
    }

    #[test]
    fn amounts_coerce_from_numeric_and_text() {
        assert_eq!(
            amount("t", 1, Some(&FieldValue::Numeric(Some(12.5)))).unwrap(),
            Decimal::new(125, 1)
        );
        assert_eq!(
            amount("t", 1, Some(&FieldValue::Character(Some("10.00".into())))).unwrap(),
            Decimal::new(1000, 2)
        );
        assert!(amount("t", 4, Some(&FieldValue::Numeric(None))).is_err());
        assert!(amount("t", 4, Some(&FieldValue::Character(Some("abc".into())))).is_err());
    }

    #[test]
    fn date_fields_keep_date_only_text() {
        let ts = timestamp(Some(&FieldValue::Date(Some(dbase::Date::new(3, 3, 2024)))));
        assert_eq!(ts.raw, "2024-03-03");
        assert_eq!(
            ts.parsed,
            NaiveDate::from_ymd_opt(2024, 3, 3).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
    }

    fn write_employees(path: &Path, rows: &[(&str, &str, &str)]) {
        let records: Vec<Record> = rows
            .iter()
            .map(|(id, first, last)| {
                let mut map = std::collections::HashMap::new();
                map.insert("EMPLOYEEID".to_string(), FieldValue::Character(Some(id.to_string())));
                map.insert("FIRSTNAME".to_string(), FieldValue::Character(Some(first.to_string())));
                map.insert("LASTNAME".to_string(), FieldValue::Character(Some(last.to_string())));
                Record::from(map)
            })
            .collect();
        let writer = dbase::TableWriterBuilder::with_encoding(CP1252)
            .add_character_field("EMPLOYEEID".try_into().unwrap(), 10)
            .add_character_field("FIRSTNAME".try_into().unwrap(), 20)
            .add_character_field("LASTNAME".try_into().unwrap(), 20)
            .build_with_file_dest(path)
            .unwrap();
        writer.write_records(&records).unwrap();
    }

    #[test]
    fn code_page_names_decode_to_unicode() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("EmployeeFiles.dbf");
        write_employees(&path, &[("E1", "José", "Müller")]);

        let raw = std::fs::read(&path).unwrap();
        assert!(raw.windows(4).any(|w| w == [0x4A, 0x6F, 0x73, 0xE9]));

        let source = DbaseSource::from_paths(tmp.path().join("unused.dbf"), &path);
        let employees = source.load_employees().unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].employee_id.as_str(), "E1");
        assert_eq!(employees[0].first_name, "José");
        assert_eq!(employees[0].last_name, "Müller");
    }

    #[test]
    fn explicit_encoding_is_used_for_reading() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("EmployeeFiles.dbf");
        write_employees(&path, &[("E1", "Zoë", "Ångström")]);

        let employees = DbaseSource::from_paths(tmp.path().join("unused.dbf"), &path)
            .with_encoding(SourceEncoding::Cp1252)
            .load_employees()
            .unwrap();
        assert_eq!(employees[0].first_name, "Zoë");
        assert_eq!(employees[0].last_name, "Ångström");
    }

    #[test]
    fn text_timestamps_are_carried_through() {
        let ts = timestamp(Some(&FieldValue::Character(Some("2024-01-01".into()))));
        assert_eq!(ts.raw, "2024-01-01");
        assert!(ts.parsed.is_some());
    }
}
