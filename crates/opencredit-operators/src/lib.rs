#![forbid(unsafe_code)]
//! opencredit-operators: the join-and-project core.
//!
//! Design intent:
//! - Pure and synchronous: records in, `CreditorTable` out, no IO.
//! - A missing employee is a per-order skip logged at warn level, never an error.
//! - Source order decides ties: first employee wins, last order wins.

pub mod filter;
pub mod join;
pub mod project;

pub use filter::OpenOrderFilter;
pub use join::lookup::{EmployeeIndex, LookupJoin};
pub use join::{join_and_project, JoinOutput};
pub use project::{cashier_name, project};
