//! Run manifest for audit: what was read, what was written, and how long it took.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SourceFormat;
use crate::hash::Hash256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(pub Uuid);

/// Counters gathered while joining one run's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    pub orders_seen: usize,
    pub employees_seen: usize,
    pub open_orders: usize,
    pub matched: usize,
    /// Open orders skipped because no employee carried their employee id.
    pub missing_employee: usize,
    /// Matched orders whose id replaced an earlier row.
    pub overwritten: usize,
    /// Employee records shadowed by an earlier record with the same id.
    pub duplicate_employees: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub id: ManifestId,

    /// Version string for provenance.
    pub engine_version: String,

    /// Directory the source tables were read from.
    pub source_dir: PathBuf,

    /// Adapter that actually read the tables (never `Auto`).
    pub source_format: SourceFormat,

    pub output_path: Option<PathBuf>,
    pub rows_written: usize,
    pub stats: JoinStats,

    /// BLAKE3 digest of the effective configuration.
    pub config_digest: Option<Hash256>,

    /// BLAKE3 digest of the written report file.
    pub outputs_digest: Option<Hash256>,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl RunManifest {
    pub fn new(source_dir: PathBuf, source_format: SourceFormat, started_ms: u64) -> Self {
        Self {
            id: ManifestId(Uuid::new_v4()),
            engine_version: crate::VERSION.to_string(),
            source_dir,
            source_format,
            output_path: None,
            rows_written: 0,
            stats: JoinStats::default(),
            config_digest: None,
            outputs_digest: None,
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(mut self, finished_ms: u64, outputs_digest: Option<Hash256>) -> Self {
        self.finished_ms = finished_ms;
        self.outputs_digest = outputs_digest;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips_through_json() {
        let m = RunManifest::new(PathBuf::from("/data"), SourceFormat::Csv, 10).finish(25, None);
        assert_eq!(m.duration_ms(), 15);
        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains("\"source_format\":\"csv\""));
        let back: RunManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, m.id);
        assert_eq!(back.stats, JoinStats::default());
    }
}
