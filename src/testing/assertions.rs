//! Assertions over join output.

use crate::schema::{OfferEvent, OfferEventKind, OutputRow};
use std::collections::HashMap;

/// Assert one output row per received event of each customer.
///
/// # Panics
/// If any customer's row count differs from its received-event count.
pub fn assert_rows_per_customer(events: &[OfferEvent], rows: &[OutputRow]) {
    let mut expected: HashMap<&str, usize> = HashMap::new();
    for e in events.iter().filter(|e| e.kind == OfferEventKind::Received) {
        *expected.entry(e.customerid.as_str()).or_default() += 1;
    }
    let mut actual: HashMap<&str, usize> = HashMap::new();
    for r in rows {
        *actual.entry(r.customer_id()).or_default() += 1;
    }
    assert_eq!(
        actual, expected,
        "rows per customer differ from received events per customer"
    );
}

/// Assert the three label columns of `row`.
///
/// # Panics
/// On any mismatch. Amounts are compared exactly.
pub fn assert_labels(row: &OutputRow, time: f64, total_amount: f64, offer_successful: u8) {
    assert_eq!(
        (row.time, row.total_amount, row.offer_successful),
        (time, total_amount, offer_successful),
        "labels of {}/{}",
        row.customer_id(),
        row.offer_id()
    );
}

/// Assert two outputs are identical down to the bit patterns of their floats.
///
/// # Panics
/// On the first differing row.
pub fn assert_bitwise_identical(left: &[OutputRow], right: &[OutputRow]) {
    assert_eq!(left.len(), right.len(), "row counts differ");
    for (i, (l, r)) in left.iter().zip(right).enumerate() {
        assert_eq!(l, r, "row {i} differs");
        assert_eq!(l.time.to_bits(), r.time.to_bits(), "row {i} time bits differ");
        assert_eq!(
            l.total_amount.to_bits(),
            r.total_amount.to_bits(),
            "row {i} total_amount bits differ"
        );
    }
}
