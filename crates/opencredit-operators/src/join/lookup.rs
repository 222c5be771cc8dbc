//! Hash lookup join.
//!
//! Employees are indexed once (first record per id wins), then orders stream
//! through the open filter in source order and look each one up in the index.

use std::collections::HashMap;

use opencredit_core::id::EmployeeId;
use opencredit_core::manifest::JoinStats;
use opencredit_core::table::CreditorTable;
use opencredit_core::types::{EmployeeRecord, OrderRecord};

use crate::filter::OpenOrderFilter;
use crate::join::JoinOutput;
use crate::project::project;

/// Employee id → first employee record carrying it.
#[derive(Debug)]
pub struct EmployeeIndex<'a> {
    by_id: HashMap<&'a EmployeeId, &'a EmployeeRecord>,
    duplicates: usize,
}

impl<'a> EmployeeIndex<'a> {
    pub fn build(employees: &'a [EmployeeRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(employees.len());
        let mut duplicates = 0;
        for e in employees {
            if by_id.contains_key(&e.employee_id) {
                duplicates += 1;
                tracing::debug!(employee_id = %e.employee_id, "duplicate employee id; keeping first record");
                continue;
            }
            by_id.insert(&e.employee_id, e);
        }
        Self { by_id, duplicates }
    }

    pub fn lookup(&self, id: &EmployeeId) -> Option<&'a EmployeeRecord> {
        self.by_id.get(id).copied()
    }

    /// Records shadowed by an earlier record with the same id.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LookupJoin {
    pub filter: OpenOrderFilter,
}

impl LookupJoin {
    pub fn new(filter: OpenOrderFilter) -> Self {
        Self { filter }
    }

    pub fn run(&self, orders: &[OrderRecord], employees: &[EmployeeRecord]) -> JoinOutput {
        let index = EmployeeIndex::build(employees);
        if index.is_empty() && !orders.is_empty() {
            tracing::warn!("employee table is empty; every open order will be skipped");
        } else {
            tracing::debug!(employees = index.len(), "employee index built");
        }
        let mut table = CreditorTable::new();
        let mut stats = JoinStats {
            orders_seen: orders.len(),
            employees_seen: employees.len(),
            duplicate_employees: index.duplicates(),
            ..JoinStats::default()
        };

        for order in self.filter.apply(orders) {
            stats.open_orders += 1;
            let Some(employee) = index.lookup(&order.employee_id) else {
                stats.missing_employee += 1;
                tracing::warn!(
                    order_id = %order.order_id,
                    employee_id = %order.employee_id,
                    "employee not found; order skipped"
                );
                continue;
            };
            stats.matched += 1;
            if table.upsert(project(order, employee)).is_some() {
                stats.overwritten += 1;
                tracing::debug!(order_id = %order.order_id, "order id repeated; later record wins");
            }
        }

        tracing::debug!(
            open = stats.open_orders,
            matched = stats.matched,
            missing = stats.missing_employee,
            rows = table.len(),
            "join finished"
        );
        JoinOutput { table, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::join_and_project;
    use opencredit_core::types::{OrderTimestamp, StatusCode};
    use rust_decimal::Decimal;

    fn order(id: &str, name: &str, cents: i64, emp: &str, ts: &str, status: &str) -> OrderRecord {
        OrderRecord {
            order_id: id.into(),
            customer_name: name.into(),
            amount_due: Decimal::new(cents, 2),
            employee_id: emp.into(),
            ordered_at: OrderTimestamp::from_raw(ts),
            status: StatusCode::new(status),
        }
    }

    fn employee(id: &str, first: &str, last: &str) -> EmployeeRecord {
        EmployeeRecord {
            employee_id: id.into(),
            first_name: first.into(),
            last_name: last.into(),
        }
    }

    #[test]
    fn closed_orders_are_excluded() {
        let orders = vec![
            order("O1", "Acme", 10000, "E1", "2024-01-01", "1"),
            order("O2", "Beta", 5000, "E2", "2024-01-02", "0"),
        ];
        let employees = vec![employee("E1", "Jane", "Doe"), employee("E2", "Sam", "Lee")];

        let out = join_and_project(&orders, &employees, "1");
        assert_eq!(out.table.len(), 1);
        let e = out.table.get(&"O1".into()).unwrap();
        assert_eq!(e.creditor_name, "Acme");
        assert_eq!(e.amount_credited, Decimal::new(10000, 2));
        assert_eq!(e.cashier, "Jane Doe");
        assert_eq!(e.credited_at.raw, "2024-01-01");
        assert!(!out.table.contains(&"O2".into()));
        assert_eq!(out.stats.open_orders, 1);
    }

    #[test]
    fn missing_employee_is_skipped_not_fatal() {
        let orders = vec![order("O3", "Corp", 1000, "E9", "2024-02-01", "1")];
        let out = join_and_project(&orders, &[], "1");
        assert!(out.table.is_empty());
        assert_eq!(out.stats.missing_employee, 1);
        assert_eq!(out.stats.matched, 0);
    }

    #[test]
    fn later_order_with_same_id_wins() {
        let orders = vec![
            order("O1", "Acme", 100, "E1", "2024-01-01", "1"),
            order("O2", "Beta", 200, "E1", "2024-01-02", "1"),
            order("O1", "Acme Ltd", 300, "E2", "2024-01-03", "1"),
        ];
        let employees = vec![employee("E1", "Jane", "Doe"), employee("E2", "Sam", "Lee")];
        let out = join_and_project(&orders, &employees, "1");

        assert_eq!(out.table.len(), 2);
        let e = out.table.get(&"O1".into()).unwrap();
        assert_eq!(e.creditor_name, "Acme Ltd");
        assert_eq!(e.cashier, "Sam Lee");
        assert_eq!(e.credited_at.raw, "2024-01-03");
        assert_eq!(out.stats.overwritten, 1);
        let ids: Vec<_> = out.table.iter().map(|e| e.order_id.as_str()).collect();
        assert_eq!(ids, vec!["O1", "O2"]);
    }

    #[test]
    fn a_closed_repeat_does_not_erase_an_open_row() {
        let orders = vec![
            order("O1", "Acme", 100, "E1", "2024-01-01", "1"),
            order("O1", "Acme", 100, "E1", "2024-01-05", "0"),
        ];
        let employees = vec![employee("E1", "Jane", "Doe")];
        let out = join_and_project(&orders, &employees, "1");
        assert_eq!(out.table.get(&"O1".into()).unwrap().credited_at.raw, "2024-01-01");
    }

    #[test]
    fn first_duplicate_employee_wins() {
        let employees = vec![employee("E1", "Jane", "Doe"), employee("E1", "John", "Roe")];
        let index = EmployeeIndex::build(&employees);
        assert_eq!(index.len(), 1);
        assert_eq!(index.duplicates(), 1);
        assert_eq!(index.lookup(&"E1".into()).unwrap().first_name, "Jane");

        let orders = vec![order("O1", "Acme", 100, "E1", "2024-01-01", "1")];
        let out = join_and_project(&orders, &employees, "1");
        assert_eq!(out.table.get(&"O1".into()).unwrap().cashier, "Jane Doe");
        assert_eq!(out.stats.duplicate_employees, 1);
    }

    #[test]
    fn n_distinct_open_orders_yield_n_rows() {
        let n = 25;
        let employees: Vec<_> = (0..n)
            .map(|i| employee(&format!("E{i}"), &format!("First{i}"), &format!("Last{i}")))
            .collect();
        let orders: Vec<_> = (0..n)
            .map(|i| order(&format!("O{i}"), &format!("Cust{i}"), i as i64 * 100, &format!("E{i}"), "2024-01-01", "1"))
            .collect();

        let out = join_and_project(&orders, &employees, "1");
        assert_eq!(out.table.len(), n);
        for (o, e) in orders.iter().zip(out.table.iter()) {
            assert_eq!(e.order_id, o.order_id);
            assert_eq!(e.creditor_name, o.customer_name);
            assert_eq!(e.amount_credited, o.amount_due);
            assert_eq!(e.credited_at, o.ordered_at);
        }
        assert_eq!(out.stats.matched, n);
    }
}
