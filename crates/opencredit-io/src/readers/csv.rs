//! Delimited-text tables with a header row.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use opencredit_core::schema::{
    resolve_fields, AMOUNT_DUE, EMPLOYEE_FIELDS, ORDER_FIELDS,
};
use opencredit_core::types::{
    parse_amount_field, EmployeeRecord, OrderRecord, OrderTimestamp, StatusCode,
};

use crate::error::Result;
use crate::source::RecordSource;

/// Where one table's text comes from.
enum TableInput {
    Path(PathBuf),
    /// Text already pulled from a reader, kept so every load sees the same rows.
    Buffered { name: String, text: Vec<u8> },
}

impl TableInput {
    fn name(&self) -> String {
        match self {
            TableInput::Path(p) => table_name(p),
            TableInput::Buffered { name, .. } => name.clone(),
        }
    }

    fn open(&self) -> Result<Box<dyn Read + '_>> {
        Ok(match self {
            TableInput::Path(p) => Box::new(File::open(p)?),
            TableInput::Buffered { text, .. } => Box::new(Cursor::new(text.as_slice())),
        })
    }
}

/// Reads the order and employee tables from CSV text.
pub struct CsvSource {
    orders: TableInput,
    employees: TableInput,
    delimiter: u8,
}

impl CsvSource {
    pub fn from_paths(orders: impl Into<PathBuf>, employees: impl Into<PathBuf>) -> Self {
        Self {
            orders: TableInput::Path(orders.into()),
            employees: TableInput::Path(employees.into()),
            delimiter: b',',
        }
    }

    /// Read both tables from arbitrary readers. The text is drained up front.
    pub fn from_readers(mut orders: impl Read, mut employees: impl Read) -> Result<Self> {
        let mut order_text = Vec::new();
        orders.read_to_end(&mut order_text)?;
        let mut employee_text = Vec::new();
        employees.read_to_end(&mut employee_text)?;
        Ok(Self {
            orders: TableInput::Buffered {
                name: "orders".to_string(),
                text: order_text,
            },
            employees: TableInput::Buffered {
                name: "employees".to_string(),
                text: employee_text,
            },
            delimiter: b',',
        })
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl RecordSource for CsvSource {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn load_orders(&self) -> Result<Vec<OrderRecord>> {
        read_orders(self.orders.open()?, &self.orders.name(), self.delimiter)
    }

    fn load_employees(&self) -> Result<Vec<EmployeeRecord>> {
        read_employees(self.employees.open()?, &self.employees.name(), self.delimiter)
    }
}

fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn reader<R: Read>(input: R, delimiter: u8) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(input)
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

/// Parse an order table. Any bad amount aborts the whole table.
pub fn read_orders<R: Read>(input: R, source_name: &str, delimiter: u8) -> Result<Vec<OrderRecord>> {
    let mut rdr = reader(input, delimiter);
    let headers = rdr.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let pos = resolve_fields(source_name, &names, &ORDER_FIELDS)?;

    let mut out = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        let amount_due = parse_amount_field(source_name, i + 1, AMOUNT_DUE, field(&row, pos[2]))?;
        out.push(OrderRecord {
            order_id: field(&row, pos[0]).into(),
            customer_name: field(&row, pos[1]).to_string(),
            amount_due,
            employee_id: field(&row, pos[3]).into(),
            ordered_at: OrderTimestamp::from_raw(field(&row, pos[4])),
            status: StatusCode::new(field(&row, pos[5])),
        });
    }
    tracing::debug!(source = source_name, rows = out.len(), "read order table");
    Ok(out)
}

pub fn read_employees<R: Read>(
    input: R,
    source_name: &str,
    delimiter: u8,
) -> Result<Vec<EmployeeRecord>> {
    let mut rdr = reader(input, delimiter);
    let headers = rdr.headers()?.clone();
    let names: Vec<&str> = headers.iter().collect();
    let pos = resolve_fields(source_name, &names, &EMPLOYEE_FIELDS)?;

    let mut out = Vec::new();
    for row in rdr.records() {
        let row = row?;
        out.push(EmployeeRecord {
            employee_id: field(&row, pos[0]).into(),
            first_name: field(&row, pos[1]).to_string(),
            last_name: field(&row, pos[2]).to_string(),
        });
    }
    tracing::debug!(source = source_name, rows = out.len(), "read employee table");
    Ok(out)
}
