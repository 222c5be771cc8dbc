//! Runtime: resolve the picked location, load both tables, join, write the
//! report, and return a `RunManifest`.
//!
//! Any load or write failure ends the run with nothing written; soft join
//! misses only show up in the logs and the manifest counters.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use thiserror::Error;

use opencredit_core::config::ReportConfig;
use opencredit_core::hash::{hash_serde, Hash256};
use opencredit_core::manifest::RunManifest;
use opencredit_core::types::{EmployeeRecord, OrderRecord};

use opencredit_io::naming::output_path;
use opencredit_io::source::{RecordSource, SourceLocation};
use opencredit_io::writers::writer_for;

use opencredit_operators::{join_and_project, JoinOutput};

use crate::metrics::StageTimer;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("load failed: {0}")]
    Load(#[source] opencredit_io::Error),
    #[error("write failed: {0}")]
    Write(#[source] opencredit_io::Error),
    #[error("report failed: {0}")]
    Failed(String),
    #[error("worker: {0}")]
    Worker(String),
}

/// Coarse pipeline stages, reported in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolved,
    Loaded,
    Joined,
    Written,
}

/// Engine owns the validated configuration for a report run.
#[derive(Debug, Clone)]
pub struct Engine {
    cfg: ReportConfig,
    cfg_digest: Hash256,
    run_date: Option<NaiveDate>,
}

impl Engine {
    pub fn new(cfg: ReportConfig) -> Result<Self, ExecError> {
        cfg.validate().map_err(|e| ExecError::Config(e.to_string()))?;
        let cfg_digest = hash_serde(&cfg).map_err(|e| ExecError::Config(e.to_string()))?;
        Ok(Self {
            cfg,
            cfg_digest,
            run_date: None,
        })
    }

    /// Pin the date embedded in the report name (defaults to today, local time).
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = Some(date);
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.cfg
    }

    /// Run the report for the picked location.
    pub fn run(&self, picked: &Path) -> Result<RunManifest, ExecError> {
        self.run_with(picked, |_| {})
    }

    /// Same as [`Engine::run`], calling `on_stage` after each stage completes.
    pub fn run_with(
        &self,
        picked: &Path,
        mut on_stage: impl FnMut(Stage),
    ) -> Result<RunManifest, ExecError> {
        let started = now_millis();

        let location = self.resolve(picked)?;
        on_stage(Stage::Resolved);

        let source = location.open(&self.cfg.source);
        let (orders, employees) = self.load(source.as_ref())?;
        on_stage(Stage::Loaded);

        let joined = self.join(&orders, &employees);
        // Records are not needed past the join.
        drop(orders);
        drop(employees);
        on_stage(Stage::Joined);

        let run_date = self
            .run_date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let target =
            output_path(&location.dir, &self.cfg.output, run_date).map_err(ExecError::Write)?;

        let timer = StageTimer::start("write");
        let writer = writer_for(&self.cfg.output);
        let summary = writer
            .write_table(&joined.table, &target)
            .map_err(ExecError::Write)?;
        timer.finish(&[
            ("writer", writer.name().to_string()),
            ("rows", summary.rows.to_string()),
            ("bytes", summary.bytes.to_string()),
        ]);
        on_stage(Stage::Written);

        let mut manifest = RunManifest::new(location.dir.clone(), location.format, started);
        manifest.config_digest = Some(self.cfg_digest);
        manifest.stats = joined.stats;
        manifest.rows_written = summary.rows;
        manifest.output_path = Some(summary.path.clone());
        let manifest = manifest.finish(now_millis(), Some(summary.digest));

        tracing::info!(
            path = %summary.path.display(),
            rows = summary.rows,
            skipped = manifest.stats.missing_employee,
            "report generated"
        );
        Ok(manifest)
    }

    /// Resolve, load and join without writing anything.
    pub fn check(&self, picked: &Path) -> Result<(SourceLocation, JoinOutput), ExecError> {
        let location = self.resolve(picked)?;
        let source = location.open(&self.cfg.source);
        let (orders, employees) = self.load(source.as_ref())?;
        Ok((location, self.join(&orders, &employees)))
    }

    fn resolve(&self, picked: &Path) -> Result<SourceLocation, ExecError> {
        let location = SourceLocation::resolve(picked, &self.cfg.source).map_err(ExecError::Load)?;
        tracing::info!(
            dir = %location.dir.display(),
            format = ?location.format,
            "source resolved"
        );
        Ok(location)
    }

    /// Load both tables. Both must be complete before the join starts.
    pub fn load(
        &self,
        source: &dyn RecordSource,
    ) -> Result<(Vec<OrderRecord>, Vec<EmployeeRecord>), ExecError> {
        let timer = StageTimer::start("load");
        let orders = source.load_orders().map_err(ExecError::Load)?;
        let employees = source.load_employees().map_err(ExecError::Load)?;
        timer.finish(&[
            ("source", source.name().to_string()),
            ("orders", orders.len().to_string()),
            ("employees", employees.len().to_string()),
        ]);
        Ok((orders, employees))
    }

    fn join(&self, orders: &[OrderRecord], employees: &[EmployeeRecord]) -> JoinOutput {
        let timer = StageTimer::start("join");
        let out = join_and_project(orders, employees, &self.cfg.open_status);
        if out.stats.missing_employee > 0 {
            tracing::warn!(
                skipped = out.stats.missing_employee,
                "open orders without a matching employee were skipped"
            );
        }
        timer.finish(&[
            ("open", out.stats.open_orders.to_string()),
            ("rows", out.table.len().to_string()),
        ]);
        out
    }
}

// --- helpers ---

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
