//! Convenient re-exports for downstream crates.

pub use crate::config::{OutputFormat, ReportConfig, SourceEncoding, SourceFormat};
pub use crate::error::{Error, Result};
pub use crate::id::{EmployeeId, OrderId};
pub use crate::manifest::{JoinStats, ManifestId, RunManifest};
pub use crate::table::CreditorTable;
pub use crate::types::{CreditorEntry, EmployeeRecord, OrderRecord, OrderTimestamp, StatusCode};
