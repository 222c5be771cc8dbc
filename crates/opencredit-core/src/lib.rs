#![forbid(unsafe_code)]
//! opencredit-core: record types, field schema, configuration, run manifests
//! and hashing shared by every other crate in the workspace.
//!
//! Pure data and coercion only. File formats live in `opencredit-io`, the join
//! in `opencredit-operators`, and orchestration in `opencredit-exec`.

pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod manifest;
pub mod prelude;
pub mod schema;
pub mod table;
pub mod types;

pub use error::{Error, Result};

/// Version string stamped into every run manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
