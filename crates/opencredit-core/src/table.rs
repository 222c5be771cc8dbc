//! Insertion-ordered report table keyed by order id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::OrderId;
use crate::types::CreditorEntry;

/// Report rows keyed by order id.
///
/// Re-inserting an order id replaces that row in place: the row keeps the
/// position of its first insertion and carries the data of the last write.
///
/// Serializes as the plain list of rows; deserializing replays the rows
/// through [`CreditorTable::upsert`] so the key index is rebuilt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CreditorEntry>", into = "Vec<CreditorEntry>")]
pub struct CreditorTable {
    entries: Vec<CreditorEntry>,
    index: HashMap<OrderId, usize>,
}

impl CreditorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the replaced entry, if any.
    pub fn upsert(&mut self, entry: CreditorEntry) -> Option<CreditorEntry> {
        match self.index.get(&entry.order_id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], entry)),
            None => {
                self.index.insert(entry.order_id.clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&CreditorEntry> {
        self.index.get(order_id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CreditorEntry> {
        self.entries.iter()
    }

    /// Rows as text, one cell per report column.
    pub fn rows(&self) -> impl Iterator<Item = [String; 5]> + '_ {
        self.entries.iter().map(|e| {
            [
                e.order_id.to_string(),
                e.creditor_name.clone(),
                e.amount_credited.to_string(),
                e.cashier.clone(),
                e.credited_at.raw.clone(),
            ]
        })
    }

}

impl From<Vec<CreditorEntry>> for CreditorTable {
    fn from(entries: Vec<CreditorEntry>) -> Self {
        let mut table = Self::new();
        for e in entries {
            table.upsert(e);
        }
        table
    }
}

impl From<CreditorTable> for Vec<CreditorEntry> {
    fn from(table: CreditorTable) -> Self {
        table.entries
    }
}

impl<'a> IntoIterator for &'a CreditorTable {
    type Item = &'a CreditorEntry;
    type IntoIter = std::slice::Iter<'a, CreditorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderTimestamp;
    use rust_decimal::Decimal;

    fn entry(id: &str, name: &str, cents: i64) -> CreditorEntry {
        CreditorEntry {
            order_id: id.into(),
            creditor_name: name.into(),
            amount_credited: Decimal::new(cents, 2),
            cashier: "Jane Doe".into(),
            credited_at: OrderTimestamp::from_raw("2024-01-01"),
        }
    }

    #[test]
    fn overwrite_keeps_first_position_and_last_data() {
        let mut t = CreditorTable::new();
        assert!(t.upsert(entry("O1", "Acme", 100)).is_none());
        assert!(t.upsert(entry("O2", "Beta", 200)).is_none());
        let old = t.upsert(entry("O1", "Acme Ltd", 300)).unwrap();

        assert_eq!(old.creditor_name, "Acme");
        assert_eq!(t.len(), 2);
        let order: Vec<_> = t.iter().map(|e| e.order_id.as_str()).collect();
        assert_eq!(order, vec!["O1", "O2"]);
        assert_eq!(t.get(&"O1".into()).unwrap().creditor_name, "Acme Ltd");
    }

    #[test]
    fn rows_follow_report_columns() {
        let mut t = CreditorTable::new();
        t.upsert(entry("O1", "Acme", 10000));
        let rows: Vec<_> = t.rows().collect();
        assert_eq!(
            rows,
            vec![[
                "O1".to_string(),
                "Acme".to_string(),
                "100.00".to_string(),
                "Jane Doe".to_string(),
                "2024-01-01".to_string(),
            ]]
        );
    }

    #[test]
    fn deserialized_table_supports_lookups() {
        let mut t = CreditorTable::new();
        t.upsert(entry("O9", "Corp", 1));
        t.upsert(entry("O3", "Acme", 2));
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.starts_with('['));
        let back: CreditorTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.get(&"O3".into()).unwrap().creditor_name, "Acme");
    }
}
