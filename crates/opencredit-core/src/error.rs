use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A source does not expose every field the fixed schema requires.
    #[error("Schema error in {source_name}: missing field(s) {}", missing.join(", "))]
    Schema {
        source_name: String,
        missing: Vec<String>,
    },

    /// A field value could not be coerced to its record type.
    #[error("Parse error in {source_name} record {record}, field {field}: {reason} (value {value:?})")]
    Parse {
        source_name: String,
        /// 1-based position of the record within its source.
        record: usize,
        field: String,
        value: String,
        reason: String,
    },

    #[error("Hashing error: {0}")]
    Hash(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Hash(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}
