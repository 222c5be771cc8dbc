//! Open-order predicate.

use opencredit_core::types::{OrderRecord, StatusCode};

/// Keeps orders whose status equals the configured open status.
#[derive(Debug, Clone)]
pub struct OpenOrderFilter {
    pub open_status: StatusCode,
}

impl Default for OpenOrderFilter {
    fn default() -> Self {
        Self {
            open_status: StatusCode::new("1"),
        }
    }
}

impl OpenOrderFilter {
    pub fn new(open_status: impl Into<String>) -> Self {
        Self {
            open_status: StatusCode::new(open_status),
        }
    }

    pub fn is_open(&self, order: &OrderRecord) -> bool {
        order.status == self.open_status
    }

    /// Open orders, in source order.
    pub fn apply<'a>(&'a self, orders: &'a [OrderRecord]) -> impl Iterator<Item = &'a OrderRecord> + 'a {
        orders.iter().filter(move |o| self.is_open(o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencredit_core::types::OrderTimestamp;
    use rust_decimal::Decimal;

    fn order(id: &str, status: &str) -> OrderRecord {
        OrderRecord {
            order_id: id.into(),
            customer_name: "Acme".into(),
            amount_due: Decimal::ONE,
            employee_id: "E1".into(),
            ordered_at: OrderTimestamp::from_raw("2024-01-01"),
            status: StatusCode::new(status),
        }
    }

    #[test]
    fn only_exact_open_status_passes() {
        let f = OpenOrderFilter::default();
        let orders = vec![order("O1", "1"), order("O2", "0"), order("O3", "10"), order("O4", "1")];
        let open: Vec<_> = f.apply(&orders).map(|o| o.order_id.as_str()).collect();
        assert_eq!(open, vec!["O1", "O4"]);
    }

    #[test]
    fn open_status_is_configurable() {
        let f = OpenOrderFilter::new("OPEN");
        assert!(f.is_open(&order("O1", "OPEN")));
        assert!(!f.is_open(&order("O1", "1")));
    }
}
