use crate::schema::{Days, OfferEvent, Transaction};

/// A closed time range: [start, end], in days.
///
/// Both bounds are inclusive, so an event at exactly `start + duration` still
/// falls inside the validity window of an offer received at `start`. A
/// window with `end < start` contains nothing; the offer catalog refuses
/// durations that would produce one.
#[derive(Copy, Clone, Debug)]
pub struct ValidityWindow {
    pub start: Days,
    pub end: Days,
}

impl ValidityWindow {
    #[inline]
    pub const fn new(start: Days, end: Days) -> Self {
        Self { start, end }
    }

    /// Window of an offer received at `received_at` that stays valid for `duration`.
    #[inline]
    pub fn for_offer(received_at: Days, duration: Days) -> Self {
        Self::new(received_at, received_at + duration)
    }

    #[inline]
    pub fn contains(&self, t: Days) -> bool {
        t >= self.start && t <= self.end
    }

    /// Items whose timestamp lies inside the window, in input order.
    pub fn select<'s, 'a: 's, T: Timed>(
        &self,
        items: &'s [&'a T],
    ) -> impl Iterator<Item = &'a T> + 's {
        let w = *self;
        items.iter().copied().filter(move |it| w.contains(it.time()))
    }
}

/// Anything with an event time.
pub trait Timed {
    fn time(&self) -> Days;
}

impl Timed for OfferEvent {
    #[inline] fn time(&self) -> Days { self.time }
}

impl Timed for Transaction {
    #[inline] fn time(&self) -> Days { self.time }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        let w = ValidityWindow::for_offer(2.0, 5.0);
        assert!(w.contains(2.0));
        assert!(w.contains(7.0));
        assert!(!w.contains(7.0 + f64::EPSILON * 8.0));
        assert!(!w.contains(1.999));
    }

    #[test]
    fn select_keeps_input_order() {
        let txns = [
            Transaction::new("c", 3.0, 1.0),
            Transaction::new("c", 9.0, 2.0),
            Transaction::new("c", 2.5, 4.0),
        ];
        let refs: Vec<&Transaction> = txns.iter().collect();
        let w = ValidityWindow::new(2.0, 4.0);
        let amounts: Vec<f64> = w.select(&refs).map(|t| t.amount).collect();
        assert_eq!(amounts, vec![1.0, 4.0]);
    }
}
