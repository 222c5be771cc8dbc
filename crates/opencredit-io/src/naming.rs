//! Dated report file names.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use opencredit_core::config::OutputConfig;

use crate::error::{Error, Result};

/// `"<prefix>-<date>.<ext>"`, e.g. `creditors-18-10-2026.xlsx`.
pub fn output_file_name(prefix: &str, date: NaiveDate, date_format: &str, ext: &str) -> Result<String> {
    let mut stamp = String::new();
    write!(stamp, "{}", date.format(date_format))
        .map_err(|_| Error::Output(format!("invalid date format '{date_format}'")))?;
    Ok(format!("{prefix}-{stamp}.{ext}"))
}

/// Full report path for a run on `date`. `source_dir` is used unless the
/// config names an output directory.
pub fn output_path(source_dir: &Path, cfg: &OutputConfig, date: NaiveDate) -> Result<PathBuf> {
    let dir = cfg.directory.as_deref().unwrap_or(source_dir);
    let name = output_file_name(&cfg.file_prefix, date, &cfg.date_format, cfg.format.extension())?;
    Ok(dir.join(name))
}
