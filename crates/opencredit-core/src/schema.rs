//! Fixed field schema of the two record sources and of the report.
//!
//! Field names match the legacy tables column-for-column; adapters look
//! fields up by these names, never by position.

use crate::error::{Error, Result};

pub const ORDER_ID: &str = "OrderID";
pub const CUSTOMER_NAME: &str = "SpecificCustomerName";
pub const AMOUNT_DUE: &str = "AmountDue";
pub const EMPLOYEE_ID: &str = "EmployeeID";
pub const ORDER_DATE_TIME: &str = "OrderDateTime";
pub const ORDER_STATUS: &str = "OrderStatus";

pub const FIRST_NAME: &str = "FirstName";
pub const LAST_NAME: &str = "LastName";

/// Fields every order source must expose.
pub const ORDER_FIELDS: [&str; 6] = [
    ORDER_ID,
    CUSTOMER_NAME,
    AMOUNT_DUE,
    EMPLOYEE_ID,
    ORDER_DATE_TIME,
    ORDER_STATUS,
];

/// Fields every employee source must expose.
pub const EMPLOYEE_FIELDS: [&str; 3] = [EMPLOYEE_ID, FIRST_NAME, LAST_NAME];

/// Report columns, in output order.
pub const REPORT_COLUMNS: [&str; 5] = [
    "OrderID",
    "Creditor Name",
    "Amount Credited",
    "Cashier",
    "Date Credited",
];

/// Resolve each required field to its position in `available`.
///
/// Every missing field is reported at once. Extra fields are ignored.
pub fn resolve_fields<S: AsRef<str>>(
    source_name: &str,
    available: &[S],
    required: &[&str],
) -> Result<Vec<usize>> {
    let mut positions = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for name in required {
        match available.iter().position(|a| a.as_ref() == *name) {
            Some(idx) => positions.push(idx),
            None => missing.push((*name).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(Error::Schema {
            source_name: source_name.to_string(),
            missing,
        });
    }
    Ok(positions)
}
