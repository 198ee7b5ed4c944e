//! Fluent builders for join scenarios.

use crate::preprocess::CleanTables;
use crate::schema::{
    Channel, Days, Gender, Offer, OfferEvent, OfferEventKind, OfferType, Profile, Transaction,
};
use chrono::NaiveDate;

/// Builds [`CleanTables`] one event at a time, in table order.
///
/// Offers get no channels and zero difficulty/reward unless set with
/// [`ScenarioBuilder::add_offer`]; customers added with
/// [`ScenarioBuilder::customer`] get a fixed placeholder profile.
///
/// # Example
///
/// ```
/// use offer_merge::testing::ScenarioBuilder;
///
/// let tables = ScenarioBuilder::new()
///     .offer("o1", 5.0)
///     .customer("c1")
///     .received("c1", "o1", 2.0)
///     .transaction("c1", 3.0, 10.0)
///     .build();
///
/// assert_eq!(tables.offer_events.len(), 1);
/// assert_eq!(tables.transactions.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ScenarioBuilder {
    tables: CleanTables,
}

impl ScenarioBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discount offer valid for `duration` days.
    #[must_use]
    pub fn offer(self, id: &str, duration: Days) -> Self {
        self.add_offer(Offer {
            offerid: id.to_string(),
            offer_type: OfferType::Discount,
            difficulty: 0.0,
            reward: 0.0,
            duration,
            channels: [Channel::Web].into_iter().collect(),
        })
    }

    #[must_use]
    pub fn add_offer(mut self, offer: Offer) -> Self {
        self.tables.offers.push(offer);
        self
    }

    /// Add a customer with a placeholder profile.
    #[must_use]
    pub fn customer(self, id: &str) -> Self {
        let since = NaiveDate::from_ymd_opt(2017, 5, 1).unwrap_or_default();
        self.add_profile(Profile::new(id, Gender::F, 40, 50_000.0, since))
    }

    #[must_use]
    pub fn add_profile(mut self, profile: Profile) -> Self {
        self.tables.profiles.push(profile);
        self
    }

    #[must_use]
    pub fn event(mut self, kind: OfferEventKind, customer: &str, offer: &str, time: Days) -> Self {
        self.tables
            .offer_events
            .push(OfferEvent::new(kind, customer, offer, time));
        self
    }

    #[must_use]
    pub fn received(self, customer: &str, offer: &str, time: Days) -> Self {
        self.event(OfferEventKind::Received, customer, offer, time)
    }

    #[must_use]
    pub fn viewed(self, customer: &str, offer: &str, time: Days) -> Self {
        self.event(OfferEventKind::Viewed, customer, offer, time)
    }

    #[must_use]
    pub fn completed(self, customer: &str, offer: &str, time: Days) -> Self {
        self.event(OfferEventKind::Completed, customer, offer, time)
    }

    #[must_use]
    pub fn transaction(mut self, customer: &str, time: Days, amount: f64) -> Self {
        self.tables
            .transactions
            .push(Transaction::new(customer, time, amount));
        self
    }

    #[must_use]
    pub fn build(self) -> CleanTables {
        self.tables
    }
}
