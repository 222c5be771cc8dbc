//! Report configuration that downstream crates can serialize/deserialize.
//!
//! Layering, lowest to highest precedence: `Default`, environment
//! (`ReportConfig::from_env`), a YAML file (`apply_file_config`), then
//! whatever the binary applies from its flags.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which loader adapter reads the source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// CSV tables if present, otherwise dBase tables.
    Auto,
    Csv,
    Dbase,
}

impl FromStr for SourceFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "csv" => Ok(Self::Csv),
            "dbase" | "dbf" => Ok(Self::Dbase),
            other => Err(Error::Config(format!("unknown source format '{other}'"))),
        }
    }
}

/// Code page of character fields in dBase tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceEncoding {
    Utf8,
    /// Windows Western European, the usual code page of legacy desktop tables.
    Cp1252,
    Cp1251,
    Cp850,
    Cp437,
}

impl FromStr for SourceEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "utf8" => Ok(Self::Utf8),
            "cp1252" | "windows1252" => Ok(Self::Cp1252),
            "cp1251" | "windows1251" => Ok(Self::Cp1251),
            "cp850" => Ok(Self::Cp850),
            "cp437" => Ok(Self::Cp437),
            other => Err(Error::Config(format!("unknown source encoding '{other}'"))),
        }
    }
}

/// Report file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(Error::Config(format!("unknown output format '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub format: SourceFormat,

    /// Table (file stem) holding the order records.
    pub orders_table: String,

    /// Table (file stem) holding the employee records.
    pub employees_table: String,

    /// Field delimiter for CSV tables.
    pub delimiter: char,

    /// Code page of dBase character fields.
    pub encoding: SourceEncoding,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            format: SourceFormat::Auto,
            orders_table: "OrderHeaders".to_string(),
            employees_table: "EmployeeFiles".to_string(),
            delimiter: ',',
            encoding: SourceEncoding::Cp1252,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Report directory; `None` writes next to the source tables.
    pub directory: Option<PathBuf>,

    pub file_prefix: String,

    /// `chrono` format of the run date embedded in the file name.
    pub date_format: String,

    /// Write a column header row before the data.
    pub include_header: bool,

    /// Field delimiter of CSV reports.
    pub delimiter: char,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Xlsx,
            directory: None,
            file_prefix: "creditors".to_string(),
            date_format: "%d-%m-%Y".to_string(),
            include_header: false,
            delimiter: ',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub source: SourceConfig,

    /// Status code marking an order as open.
    pub open_status: String,

    pub output: OutputConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            open_status: "1".to_string(),
            output: OutputConfig::default(),
        }
    }
}

/// YAML file shape: every key optional, applied over the current config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialReportConfig {
    #[serde(default)]
    pub source: Option<PartialSourceConfig>,
    #[serde(default)]
    pub open_status: Option<String>,
    #[serde(default)]
    pub output: Option<PartialOutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialSourceConfig {
    pub format: Option<SourceFormat>,
    pub orders_table: Option<String>,
    pub employees_table: Option<String>,
    pub delimiter: Option<char>,
    pub encoding: Option<SourceEncoding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialOutputConfig {
    pub format: Option<OutputFormat>,
    pub directory: Option<PathBuf>,
    pub file_prefix: Option<String>,
    pub date_format: Option<String>,
    pub include_header: Option<bool>,
    pub delimiter: Option<char>,
}

impl ReportConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `OPENCREDIT_SOURCE_FORMAT`: `auto`, `csv` or `dbase`
    /// - `OPENCREDIT_ORDERS_TABLE` / `OPENCREDIT_EMPLOYEES_TABLE`: table names
    /// - `OPENCREDIT_DELIMITER`: single-character CSV delimiter
    /// - `OPENCREDIT_ENCODING`: dBase code page (`cp1252`, `cp1251`, `cp850`, `cp437`, `utf8`)
    /// - `OPENCREDIT_OPEN_STATUS`: status code of open orders
    /// - `OPENCREDIT_OUTPUT_FORMAT`: `xlsx` or `csv`
    /// - `OPENCREDIT_OUTPUT_DIR`: report directory
    /// - `OPENCREDIT_FILE_PREFIX` / `OPENCREDIT_DATE_FORMAT`: report file name parts
    /// - `OPENCREDIT_INCLUDE_HEADER`: `true`/`false`
    /// - `OPENCREDIT_OUTPUT_DELIMITER`: single-character delimiter of CSV reports
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ReportConfig::from_env`] over an arbitrary lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(s) = var("OPENCREDIT_SOURCE_FORMAT") {
            if let Ok(v) = s.parse::<SourceFormat>() {
                cfg.source.format = v;
            }
        }

        if let Some(s) = var("OPENCREDIT_ORDERS_TABLE") {
            cfg.source.orders_table = s;
        }

        if let Some(s) = var("OPENCREDIT_EMPLOYEES_TABLE") {
            cfg.source.employees_table = s;
        }

        if let Some(s) = var("OPENCREDIT_DELIMITER") {
            if let Ok(v) = s.parse::<char>() {
                cfg.source.delimiter = v;
            }
        }

        if let Some(s) = var("OPENCREDIT_ENCODING") {
            if let Ok(v) = s.parse::<SourceEncoding>() {
                cfg.source.encoding = v;
            }
        }

        if let Some(s) = var("OPENCREDIT_OPEN_STATUS") {
            cfg.open_status = s;
        }

        if let Some(s) = var("OPENCREDIT_OUTPUT_FORMAT") {
            if let Ok(v) = s.parse::<OutputFormat>() {
                cfg.output.format = v;
            }
        }

        if let Some(s) = var("OPENCREDIT_OUTPUT_DIR") {
            cfg.output.directory = Some(PathBuf::from(s));
        }

        if let Some(s) = var("OPENCREDIT_FILE_PREFIX") {
            cfg.output.file_prefix = s;
        }

        if let Some(s) = var("OPENCREDIT_DATE_FORMAT") {
            cfg.output.date_format = s;
        }

        if let Some(s) = var("OPENCREDIT_INCLUDE_HEADER") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.output.include_header = v;
            }
        }

        if let Some(s) = var("OPENCREDIT_OUTPUT_DELIMITER") {
            if let Ok(v) = s.parse::<char>() {
                cfg.output.delimiter = v;
            }
        }

        cfg
    }

    pub fn from_yaml_str(yaml: &str) -> Result<PartialReportConfig> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: &Path) -> Result<PartialReportConfig> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("read {}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }

    /// Overlay the keys present in a config file.
    pub fn apply_file_config(&mut self, doc: &PartialReportConfig) {
        if let Some(src) = &doc.source {
            if let Some(format) = src.format {
                self.source.format = format;
            }
            if let Some(t) = &src.orders_table {
                self.source.orders_table = t.clone();
            }
            if let Some(t) = &src.employees_table {
                self.source.employees_table = t.clone();
            }
            if let Some(d) = src.delimiter {
                self.source.delimiter = d;
            }
            if let Some(e) = src.encoding {
                self.source.encoding = e;
            }
        }
        if let Some(status) = &doc.open_status {
            self.open_status = status.clone();
        }
        if let Some(out) = &doc.output {
            if let Some(format) = out.format {
                self.output.format = format;
            }
            if let Some(dir) = &out.directory {
                self.output.directory = Some(dir.clone());
            }
            if let Some(p) = &out.file_prefix {
                self.output.file_prefix = p.clone();
            }
            if let Some(f) = &out.date_format {
                self.output.date_format = f.clone();
            }
            if let Some(h) = out.include_header {
                self.output.include_header = h;
            }
            if let Some(d) = out.delimiter {
                self.output.delimiter = d;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.open_status.trim().is_empty() {
            return Err(Error::Config("open_status must not be empty".into()));
        }
        if self.source.orders_table.trim().is_empty()
            || self.source.employees_table.trim().is_empty()
        {
            return Err(Error::Config("table names must not be empty".into()));
        }
        if !self.source.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "delimiter {:?} is not a single-byte character",
                self.source.delimiter
            )));
        }
        if !self.output.delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "output.delimiter {:?} is not a single-byte character",
                self.output.delimiter
            )));
        }
        if self.output.file_prefix.trim().is_empty() {
            return Err(Error::Config("output.file_prefix must not be empty".into()));
        }
        if self.output.date_format.contains('/') {
            return Err(Error::Config(
                "output.date_format must not produce path separators".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_legacy_report() {
        let cfg = ReportConfig::default();
        assert_eq!(cfg.open_status, "1");
        assert_eq!(cfg.source.orders_table, "OrderHeaders");
        assert_eq!(cfg.source.employees_table, "EmployeeFiles");
        assert_eq!(cfg.output.format, OutputFormat::Xlsx);
        assert_eq!(cfg.output.date_format, "%d-%m-%Y");
        assert!(!cfg.output.include_header);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_overrides_and_ignores_garbage() {
        let vars: HashMap<&str, &str> = [
            ("OPENCREDIT_SOURCE_FORMAT", "dbase"),
            ("OPENCREDIT_OPEN_STATUS", "O"),
            ("OPENCREDIT_DELIMITER", ";;"),
            ("OPENCREDIT_INCLUDE_HEADER", "yes please"),
            ("OPENCREDIT_OUTPUT_FORMAT", "csv"),
        ]
        .into_iter()
        .collect();
        let cfg = ReportConfig::from_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.source.format, SourceFormat::Dbase);
        assert_eq!(cfg.open_status, "O");
        assert_eq!(cfg.source.delimiter, ',');
        assert!(!cfg.output.include_header);
        assert_eq!(cfg.output.format, OutputFormat::Csv);
    }

    #[test]
    fn file_config_overlays_only_present_keys() {
        let doc = ReportConfig::from_yaml_str(
            r#"
open_status: "2"
source:
  delimiter: ";"
output:
  include_header: true
  directory: /tmp/reports
"#,
        )
        .unwrap();
        let mut cfg = ReportConfig::default();
        cfg.apply_file_config(&doc);
        assert_eq!(cfg.open_status, "2");
        assert_eq!(cfg.source.delimiter, ';');
        assert_eq!(cfg.source.orders_table, "OrderHeaders");
        assert!(cfg.output.include_header);
        assert_eq!(cfg.output.directory, Some(PathBuf::from("/tmp/reports")));
    }

    #[test]
    fn encoding_defaults_to_cp1252_and_layers() {
        assert_eq!(ReportConfig::default().source.encoding, SourceEncoding::Cp1252);

        let vars: HashMap<&str, &str> = [
            ("OPENCREDIT_ENCODING", "Windows-1251"),
            ("OPENCREDIT_OUTPUT_DELIMITER", ";"),
        ]
        .into_iter()
        .collect();
        let mut cfg = ReportConfig::from_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.source.encoding, SourceEncoding::Cp1251);
        assert_eq!(cfg.output.delimiter, ';');

        let doc = ReportConfig::from_yaml_str("source:\n  encoding: utf8\n").unwrap();
        cfg.apply_file_config(&doc);
        assert_eq!(cfg.source.encoding, SourceEncoding::Utf8);
        assert!("latin9".parse::<SourceEncoding>().is_err());
    }

    #[test]
    fn validate_rejects_multibyte_output_delimiter() {
        let mut cfg = ReportConfig::default();
        cfg.output.delimiter = '§';
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let err = ReportConfig::from_yaml_str("opne_status: \"1\"\n").unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn validate_rejects_empty_status() {
        let mut cfg = ReportConfig::default();
        cfg.open_status = "  ".into();
        assert!(cfg.validate().is_err());
    }
}
