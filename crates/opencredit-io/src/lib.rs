#![forbid(unsafe_code)]
//! opencredit-io: the Loader adapters and the report writers.
//!
//! - `readers::csv` / `readers::dbase`: turn the two legacy tables into typed
//!   records, failing the whole load on a missing field or a bad amount.
//! - `source`: resolve the location the operator picked into a `RecordSource`.
//! - `writers`: emit a `CreditorTable` as XLSX or CSV, replacing any previous
//!   report atomically.

pub mod error;
pub mod fs;
pub mod naming;
pub mod readers;
pub mod source;
pub mod writers;

pub use error::{Error, Result};
pub use source::{RecordSource, SourceLocation};
pub use writers::{writer_for, TableWriter, WriteSummary};
