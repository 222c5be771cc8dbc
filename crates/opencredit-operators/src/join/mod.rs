//! Order → employee lookup join.

pub mod lookup;

use opencredit_core::manifest::JoinStats;
use opencredit_core::table::CreditorTable;
use opencredit_core::types::{EmployeeRecord, OrderRecord};

use crate::filter::OpenOrderFilter;
use lookup::LookupJoin;

/// Result of one join: the report table plus what happened on the way.
#[derive(Debug, Clone, Default)]
pub struct JoinOutput {
    pub table: CreditorTable,
    pub stats: JoinStats,
}

/// Filter `orders` to `open_status`, resolve each one's cashier, and project
/// the matches into the report table.
pub fn join_and_project(
    orders: &[OrderRecord],
    employees: &[EmployeeRecord],
    open_status: &str,
) -> JoinOutput {
    LookupJoin::new(OpenOrderFilter::new(open_status)).run(orders, employees)
}
