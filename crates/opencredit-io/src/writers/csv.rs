//! CSV report writer.

use csv::WriterBuilder;
use opencredit_core::schema::REPORT_COLUMNS;
use opencredit_core::table::CreditorTable;

use crate::error::{Error, Result};
use crate::writers::TableWriter;

pub struct CsvTableWriter {
    include_header: bool,
    delimiter: u8,
}

impl CsvTableWriter {
    pub fn new(include_header: bool) -> Self {
        Self {
            include_header,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl TableWriter for CsvTableWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn render(&self, table: &CreditorTable) -> Result<Vec<u8>> {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        if self.include_header {
            wtr.write_record(REPORT_COLUMNS)?;
        }
        for row in table.rows() {
            wtr.write_record(&row)?;
        }
        wtr.into_inner().map_err(|e| Error::Io(e.into_error()))
    }
}
