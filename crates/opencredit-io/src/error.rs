use thiserror::Error;

/// Result type local to opencredit-io.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dbase error in {path}: {reason}")]
    Dbase { path: String, reason: String },

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("source not found: {0}")]
    SourceNotFound(String),

    #[error("invalid output: {0}")]
    Output(String),

    #[error(transparent)]
    Core(#[from] opencredit_core::Error),
}
