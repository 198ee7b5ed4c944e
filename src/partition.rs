//! Per-customer slicing of the event and transaction tables.

use crate::schema::{OfferEvent, OfferEventKind, Transaction};
use std::collections::HashMap;

/// Everything the join needs to know about one customer, borrowed from the
/// input tables. Each list keeps table order.
#[derive(Debug, Clone, Default)]
pub struct CustomerSlice<'a> {
    pub customer_id: &'a str,
    pub received: Vec<&'a OfferEvent>,
    pub viewed: Vec<&'a OfferEvent>,
    pub completed: Vec<&'a OfferEvent>,
    pub transactions: Vec<&'a Transaction>,
}

impl<'a> CustomerSlice<'a> {
    fn new(customer_id: &'a str) -> Self {
        Self {
            customer_id,
            ..Self::default()
        }
    }

    fn push_event(&mut self, event: &'a OfferEvent) {
        match event.kind {
            OfferEventKind::Received => self.received.push(event),
            OfferEventKind::Viewed => self.viewed.push(event),
            OfferEventKind::Completed => self.completed.push(event),
        }
    }
}

/// Group events and transactions by customer.
///
/// Customers appear in the order they are first encountered in `events`.
/// Transactions of customers with no offer events are dropped, since they
/// cannot fall inside any validity window.
pub fn partition_by_customer<'a>(
    events: &'a [OfferEvent],
    transactions: &'a [Transaction],
) -> Vec<CustomerSlice<'a>> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut slices: Vec<CustomerSlice<'a>> = Vec::new();

    for event in events {
        let i = *index.entry(event.customerid.as_str()).or_insert_with(|| {
            slices.push(CustomerSlice::new(&event.customerid));
            slices.len() - 1
        });
        slices[i].push_event(event);
    }

    for txn in transactions {
        if let Some(&i) = index.get(txn.customerid.as_str()) {
            slices[i].transactions.push(txn);
        }
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use OfferEventKind::*;

    #[test]
    fn keeps_first_encounter_order() {
        let events = vec![
            OfferEvent::new(Received, "b", "o1", 0.0),
            OfferEvent::new(Received, "a", "o2", 0.0),
            OfferEvent::new(Viewed, "b", "o1", 1.0),
            OfferEvent::new(Received, "b", "o3", 2.0),
            OfferEvent::new(Completed, "a", "o2", 3.0),
        ];
        let txns = vec![
            Transaction::new("a", 1.0, 5.0),
            Transaction::new("z", 1.0, 9.0),
        ];
        let slices = partition_by_customer(&events, &txns);

        let ids: Vec<&str> = slices.iter().map(|s| s.customer_id).collect();
        assert_eq!(ids, vec!["b", "a"]);

        let b = &slices[0];
        let b_received: Vec<&str> = b.received.iter().map(|e| e.offerid.as_str()).collect();
        assert_eq!(b_received, vec!["o1", "o3"]);
        assert_eq!(b.viewed.len(), 1);
        assert!(b.completed.is_empty());
        assert!(b.transactions.is_empty());

        let a = &slices[1];
        assert_eq!(a.completed.len(), 1);
        assert_eq!(a.transactions.len(), 1);
    }

    #[test]
    fn empty_inputs_give_no_slices() {
        assert!(partition_by_customer(&[], &[Transaction::new("a", 0.0, 1.0)]).is_empty());
    }
}
