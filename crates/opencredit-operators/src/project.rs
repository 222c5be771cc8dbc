//! Projection of a matched (order, employee) pair onto a report row.

use opencredit_core::types::{CreditorEntry, EmployeeRecord, OrderRecord};

/// `"<first> <last>"`.
pub fn cashier_name(first: &str, last: &str) -> String {
    format!("{first} {last}")
}

pub fn project(order: &OrderRecord, employee: &EmployeeRecord) -> CreditorEntry {
    CreditorEntry {
        order_id: order.order_id.clone(),
        creditor_name: order.customer_name.clone(),
        amount_credited: order.amount_due,
        cashier: cashier_name(&employee.first_name, &employee.last_name),
        credited_at: order.ordered_at.clone(),
    }
}
