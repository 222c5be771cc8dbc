//! The `RecordSource` seam and resolution of the location the operator picked.

use std::path::{Path, PathBuf};

use opencredit_core::config::{SourceConfig, SourceFormat};
use opencredit_core::types::{EmployeeRecord, OrderRecord};

use crate::error::{Error, Result};
use crate::readers::csv::CsvSource;
use crate::readers::dbase::DbaseSource;

/// Produces the two record sets the join consumes.
///
/// Implementations return fully materialized sequences in source order, and
/// fail the whole load on the first missing field or malformed amount.
pub trait RecordSource: Send + Sync {
    /// Stable adapter name, used in logs and manifests.
    fn name(&self) -> &'static str;

    fn load_orders(&self) -> Result<Vec<OrderRecord>>;

    fn load_employees(&self) -> Result<Vec<EmployeeRecord>>;
}

/// A resolved source location: the directory holding both tables and the
/// adapter that reads them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub dir: PathBuf,
    pub format: SourceFormat,
    pub orders: PathBuf,
    pub employees: PathBuf,
}

impl SourceLocation {
    /// Resolve a picked path (a directory, or any file inside it such as the
    /// database file itself) into the two table files.
    ///
    /// With `SourceFormat::Auto`, CSV tables win over dBase tables.
    pub fn resolve(picked: &Path, cfg: &SourceConfig) -> Result<Self> {
        let dir = if picked.is_dir() {
            picked.to_path_buf()
        } else if picked.exists() {
            match picked.parent() {
                Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
                _ => PathBuf::from("."),
            }
        } else {
            return Err(Error::SourceNotFound(format!(
                "{} does not exist",
                picked.display()
            )));
        };

        let candidates: &[SourceFormat] = match cfg.format {
            SourceFormat::Auto => &[SourceFormat::Csv, SourceFormat::Dbase],
            SourceFormat::Csv => &[SourceFormat::Csv],
            SourceFormat::Dbase => &[SourceFormat::Dbase],
        };

        for &format in candidates {
            let ext = match format {
                SourceFormat::Dbase => "dbf",
                _ => "csv",
            };
            let orders = find_table(&dir, &cfg.orders_table, ext)?;
            let employees = find_table(&dir, &cfg.employees_table, ext)?;
            if let (Some(orders), Some(employees)) = (orders, employees) {
                tracing::debug!(dir = %dir.display(), ?format, "resolved source tables");
                return Ok(Self {
                    dir,
                    format,
                    orders,
                    employees,
                });
            }
        }

        Err(Error::SourceNotFound(format!(
            "no {} / {} tables ({}) in {}",
            cfg.orders_table,
            cfg.employees_table,
            candidates
                .iter()
                .map(|f| match f {
                    SourceFormat::Dbase => "dbf",
                    _ => "csv",
                })
                .collect::<Vec<_>>()
                .join(" or "),
            dir.display()
        )))
    }

    /// Build the adapter for this location.
    pub fn open(&self, cfg: &SourceConfig) -> Box<dyn RecordSource> {
        match self.format {
            SourceFormat::Dbase => Box::new(
                DbaseSource::from_paths(&self.orders, &self.employees).with_encoding(cfg.encoding),
            ),
            _ => Box::new(
                CsvSource::from_paths(&self.orders, &self.employees)
                    .with_delimiter(cfg.delimiter as u8),
            ),
        }
    }
}

/// Find `<stem>.<ext>` in `dir`; exact spelling first, then case-insensitively.
fn find_table(dir: &Path, stem: &str, ext: &str) -> Result<Option<PathBuf>> {
    let exact = dir.join(format!("{stem}.{ext}"));
    if exact.is_file() {
        return Ok(Some(exact));
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let stem_ok = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.eq_ignore_ascii_case(stem));
        let ext_ok = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.eq_ignore_ascii_case(ext));
        if stem_ok && ext_ok {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn picked_file_resolves_to_its_directory() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "shop.mdb");
        touch(tmp.path(), "OrderHeaders.csv");
        touch(tmp.path(), "EmployeeFiles.csv");

        let loc = SourceLocation::resolve(&tmp.path().join("shop.mdb"), &SourceConfig::default())
            .unwrap();
        assert_eq!(loc.dir, tmp.path());
        assert_eq!(loc.format, SourceFormat::Csv);
        assert_eq!(loc.orders, tmp.path().join("OrderHeaders.csv"));
    }

    #[test]
    fn auto_falls_back_to_dbase_tables_case_insensitively() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "ORDERHEADERS.DBF");
        touch(tmp.path(), "employeefiles.dbf");

        let loc = SourceLocation::resolve(tmp.path(), &SourceConfig::default()).unwrap();
        assert_eq!(loc.format, SourceFormat::Dbase);
        assert_eq!(loc.orders, tmp.path().join("ORDERHEADERS.DBF"));
        assert_eq!(loc.employees, tmp.path().join("employeefiles.dbf"));
    }

    #[test]
    fn forced_format_ignores_other_tables() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "OrderHeaders.csv");
        touch(tmp.path(), "EmployeeFiles.csv");

        let cfg = SourceConfig {
            format: SourceFormat::Dbase,
            ..SourceConfig::default()
        };
        let err = SourceLocation::resolve(tmp.path(), &cfg).unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[test]
    fn half_a_source_is_not_a_source() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "OrderHeaders.csv");
        let err = SourceLocation::resolve(tmp.path(), &SourceConfig::default()).unwrap_err();
        assert!(err.to_string().contains("EmployeeFiles"));
    }

    #[test]
    fn missing_path_is_not_found() {
        let err = SourceLocation::resolve(Path::new("/definitely/not/here.mdb"), &SourceConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }
}
