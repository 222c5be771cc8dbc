//! Report writers.
//!
//! A writer renders the whole table in memory, hashes it, and replaces the
//! target file in one step. A failed render leaves no file behind.

pub mod csv;
pub mod xlsx;

use std::path::{Path, PathBuf};

use opencredit_core::config::{OutputConfig, OutputFormat};
use opencredit_core::hash::{hash_bytes, Hash256};
use opencredit_core::table::CreditorTable;

use crate::error::Result;

/// What a writer put on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub bytes: usize,
    pub digest: Hash256,
}

pub trait TableWriter: Send + Sync {
    /// Stable writer name for logs.
    fn name(&self) -> &'static str;

    /// Render the table to the bytes of a complete report file.
    fn render(&self, table: &CreditorTable) -> Result<Vec<u8>>;

    /// Render and replace `path` with the result.
    fn write_table(&self, table: &CreditorTable, path: &Path) -> Result<WriteSummary> {
        let bytes = self.render(table)?;
        crate::fs::write_replace(path, &bytes)?;
        tracing::debug!(writer = self.name(), path = %path.display(), rows = table.len(), "report written");
        Ok(WriteSummary {
            path: path.to_path_buf(),
            rows: table.len(),
            bytes: bytes.len(),
            digest: hash_bytes(&bytes),
        })
    }
}

/// Writer for the configured output format.
pub fn writer_for(cfg: &OutputConfig) -> Box<dyn TableWriter> {
    match cfg.format {
        OutputFormat::Xlsx => Box::new(xlsx::XlsxWriter::new(cfg.include_header)),
        OutputFormat::Csv => Box::new(
            csv::CsvTableWriter::new(cfg.include_header).with_delimiter(cfg.delimiter as u8),
        ),
    }
}
