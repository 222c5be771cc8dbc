//! XLSX report writer: one worksheet, one row per creditor.
//!
//! Amounts are written as numbers and parsed timestamps as Excel date-times so
//! the sheet sorts and sums; unparsed timestamps fall back to their raw text.

use chrono::{NaiveDate, NaiveDateTime};
use opencredit_core::schema::REPORT_COLUMNS;
use opencredit_core::table::CreditorTable;
use opencredit_core::types::OrderTimestamp;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{Error, Result};
use crate::writers::TableWriter;

const SHEET_NAME: &str = "Creditors";
const COLUMN_WIDTHS: [f64; 5] = [12.0, 32.0, 16.0, 24.0, 20.0];

pub struct XlsxWriter {
    include_header: bool,
}

impl XlsxWriter {
    pub fn new(include_header: bool) -> Self {
        Self { include_header }
    }
}

impl TableWriter for XlsxWriter {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn render(&self, table: &CreditorTable) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let amount_fmt = Format::new().set_num_format("0.00");
        let date_fmt = Format::new().set_num_format("dd-mm-yyyy hh:mm:ss");
        let header_fmt = Format::new().set_bold();

        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
        }

        let mut row: u32 = 0;
        if self.include_header {
            for (col, name) in REPORT_COLUMNS.iter().enumerate() {
                sheet.write_string_with_format(row, col as u16, *name, &header_fmt)?;
            }
            row += 1;
        }

        for entry in table {
            let amount = entry.amount_credited.to_f64().ok_or_else(|| {
                Error::Output(format!(
                    "amount {} of order {} does not fit a spreadsheet number",
                    entry.amount_credited, entry.order_id
                ))
            })?;

            sheet.write_string(row, 0, entry.order_id.as_str())?;
            sheet.write_string(row, 1, &entry.creditor_name)?;
            sheet.write_number_with_format(row, 2, amount, &amount_fmt)?;
            sheet.write_string(row, 3, &entry.cashier)?;
            match excel_datetime(&entry.credited_at) {
                Some(dt) => {
                    sheet.write_datetime_with_format(row, 4, dt, &date_fmt)?;
                }
                None => {
                    sheet.write_string(row, 4, &entry.credited_at.raw)?;
                }
            }
            row += 1;
        }

        Ok(workbook.save_to_buffer()?)
    }
}

/// The parsed timestamp, if Excel's 1900 date system can hold it.
fn excel_datetime(ts: &OrderTimestamp) -> Option<&NaiveDateTime> {
    let dt = ts.parsed.as_ref()?;
    let first = NaiveDate::from_ymd_opt(1900, 1, 1)?;
    let last = NaiveDate::from_ymd_opt(9999, 12, 31)?;
    (first..=last).contains(&dt.date()).then_some(dt)
}
