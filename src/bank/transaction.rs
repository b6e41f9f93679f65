use std::collections::HashSet;

use rust_decimal::Decimal;

use super::{AccountDescriptor, TransactionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: TransactionId,
    pub from: AccountDescriptor,
    pub to: AccountDescriptor,
    pub amount: Decimal,
}

/// Append-only transfer log.
///
/// Ids are issued here, starting at 1, so the log is always sorted by id.
/// Cancelling never touches a record, it is only remembered on the side.
#[derive(Debug)]
pub struct TransactionHistory {
    records: Vec<Transaction>,
    cancelled: HashSet<TransactionId>,
    next_id: TransactionId,
}

impl Default for TransactionHistory {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            cancelled: HashSet::new(),
            next_id: 1,
        }
    }
}

impl TransactionHistory {
    pub fn append(
        &mut self,
        from: AccountDescriptor,
        to: AccountDescriptor,
        amount: Decimal,
    ) -> TransactionId {
        let id = self.next_id;
        self.next_id += 1;
        self.records.push(Transaction {
            id,
            from,
            to,
            amount,
        });
        id
    }

    pub fn find(&self, id: TransactionId) -> Option<&Transaction> {
        self.records
            .binary_search_by_key(&id, |tx| tx.id)
            .ok()
            .map(|idx| &self.records[idx])
    }

    pub fn is_cancelled(&self, id: TransactionId) -> bool {
        self.cancelled.contains(&id)
    }

    /// Returns `false` if the id was already marked.
    pub fn mark_cancelled(&mut self, id: TransactionId) -> bool {
        self.cancelled.insert(id)
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    #[test]
    fn ids_increase_and_lookup_works() {
        let mut history = TransactionHistory::default();
        let a = AccountDescriptor::new(1, 1);
        let b = AccountDescriptor::new(2, 2);
        assert_eq!(history.append(a, b, Decimal::from_u32(10).unwrap()), 1);
        assert_eq!(history.append(b, a, Decimal::from_u32(3).unwrap()), 2);
        assert_eq!(history.append(a, a, Decimal::from_u32(1).unwrap()), 3);

        let tx = history.find(2).unwrap();
        assert_eq!(tx.from, b);
        assert_eq!(tx.amount, Decimal::from_u32(3).unwrap());
        assert!(history.find(0).is_none());
        assert!(history.find(4).is_none());
        assert_eq!(history.records().len(), 3);
    }

    #[test]
    fn cancel_marks_once() {
        let mut history = TransactionHistory::default();
        let id = history.append(
            AccountDescriptor::new(1, 1),
            AccountDescriptor::new(1, 2),
            Decimal::from_u32(5).unwrap(),
        );
        assert!(!history.is_cancelled(id));
        assert!(history.mark_cancelled(id));
        assert!(!history.mark_cancelled(id));
        assert!(history.is_cancelled(id));
        // the record itself is kept as is
        assert_eq!(history.find(id).unwrap().amount, Decimal::from_u32(5).unwrap());
    }
}
