//! The windowed join.
//!
//! For every customer, each received offer instance gets a validity window
//! `[received_at, received_at + duration]`. The instance is labelled
//! successful when at least one viewed and at least one completed event fall
//! inside that window, and its spend is the sum of the customer's transactions
//! inside the window. Transactions are not attributed exclusively: when two
//! windows overlap, a transaction counts towards both.
//!
//! ```
//! use offer_merge::merge::windowed_join;
//! use offer_merge::runner::Runner;
//! use offer_merge::testing::scenario_viewed_and_completed;
//!
//! let s = scenario_viewed_and_completed();
//! let out = windowed_join(&s, &Default::default(), &Runner::sequential()).unwrap();
//! assert_eq!(out.rows.len(), 1);
//! assert_eq!(out.rows[0].total_amount, 10.0);
//! assert_eq!(out.rows[0].offer_successful, 1);
//! ```

use crate::config::{EventMatching, LookupPolicy, MergeConfig};
use crate::error::{MergeError, MergeResult};
use crate::lookup::{OfferCatalog, ProfileRegistry};
use crate::partition::{CustomerSlice, partition_by_customer};
use crate::preprocess::CleanTables;
use crate::runner::Runner;
use crate::schema::{Days, OfferEvent, OutputRow, Transaction};
use crate::window::ValidityWindow;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinOptions {
    pub event_matching: EventMatching,
    pub lookup_policy: LookupPolicy,
}

impl From<&MergeConfig> for JoinOptions {
    fn from(cfg: &MergeConfig) -> Self {
        Self {
            event_matching: cfg.event_matching,
            lookup_policy: cfg.lookup_policy,
        }
    }
}

/// Labels computed for one received offer instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfferLabel {
    pub start_time: Days,
    pub total_amount: f64,
    pub offer_successful: u8,
}

/// Label the offer instance started by `received`, valid for `duration`.
pub fn label_offer(
    slice: &CustomerSlice<'_>,
    received: &OfferEvent,
    duration: Days,
    matching: EventMatching,
) -> OfferLabel {
    let window = ValidityWindow::for_offer(received.time, duration);
    let eligible = |e: &&OfferEvent| match matching {
        EventMatching::SameOffer => e.offerid == received.offerid,
        EventMatching::AnyOffer => true,
    };

    let viewed = window.select(&slice.viewed).any(|e| eligible(&e));
    let completed = window.select(&slice.completed).any(|e| eligible(&e));

    // fold from +0.0: an empty window must read as 0, not -0
    let total_amount = window
        .select(&slice.transactions)
        .fold(0.0, |acc, t| acc + t.amount);

    OfferLabel {
        start_time: received.time,
        total_amount,
        offer_successful: u8::from(viewed && completed),
    }
}

/// Rows produced for one customer.
#[derive(Debug, Clone, Default)]
pub struct CustomerBatch {
    pub rows: Vec<OutputRow>,
    pub received: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub customers: usize,
    pub received: usize,
    pub emitted: usize,
    pub skipped: usize,
    pub successful: usize,
}

#[derive(Debug, Clone, Default)]
pub struct JoinOutput {
    pub rows: Vec<OutputRow>,
    pub stats: JoinStats,
}

/// Join engine over a fixed offer catalog and profile registry.
#[derive(Debug, Clone)]
pub struct WindowedJoin {
    offers: OfferCatalog,
    profiles: ProfileRegistry,
    options: JoinOptions,
}

impl WindowedJoin {
    #[must_use]
    pub fn new(offers: OfferCatalog, profiles: ProfileRegistry) -> Self {
        Self {
            offers,
            profiles,
            options: JoinOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: JoinOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub const fn options(&self) -> JoinOptions {
        self.options
    }

    /// Apply the lookup policy to a failed lookup that would have produced `rows` rows.
    fn on_lookup_error(&self, err: MergeError, rows: usize) -> MergeResult<()> {
        match self.options.lookup_policy {
            LookupPolicy::Abort => Err(err),
            LookupPolicy::SkipAndWarn => {
                warn!(error = %err, rows, "skipping rows after failed lookup");
                Ok(())
            }
            LookupPolicy::Skip => Ok(()),
        }
    }

    /// Emit one row per received event of this customer, in table order.
    ///
    /// # Errors
    /// A lookup error when the policy is [`LookupPolicy::Abort`].
    pub fn join_customer(&self, slice: &CustomerSlice<'_>) -> MergeResult<CustomerBatch> {
        let mut batch = CustomerBatch {
            received: slice.received.len(),
            ..CustomerBatch::default()
        };
        if slice.received.is_empty() {
            return Ok(batch);
        }

        let profile = match self.profiles.profile(slice.customer_id) {
            Ok(p) => p,
            Err(err) => {
                self.on_lookup_error(err, slice.received.len())?;
                batch.skipped = slice.received.len();
                return Ok(batch);
            }
        };

        batch.rows.reserve(slice.received.len());
        for received in &slice.received {
            let offer = match self
                .offers
                .offer(&received.offerid, slice.customer_id, received.time)
            {
                Ok(o) => o,
                Err(err) => {
                    self.on_lookup_error(err, 1)?;
                    batch.skipped += 1;
                    continue;
                }
            };
            let label = label_offer(slice, received, offer.duration, self.options.event_matching);
            batch.rows.push(OutputRow {
                time: label.start_time,
                total_amount: label.total_amount,
                offer_successful: label.offer_successful,
                offer: offer.clone(),
                profile: profile.clone(),
            });
        }
        Ok(batch)
    }

    /// Join all customers. Output follows customer first-encounter order in
    /// `events`, then received-event order within a customer, whatever the
    /// runner's execution mode.
    ///
    /// # Errors
    /// A lookup error under [`LookupPolicy::Abort`], or a worker pool failure.
    #[tracing::instrument(skip_all, fields(events = events.len(), transactions = transactions.len()))]
    pub fn run(
        &self,
        events: &[OfferEvent],
        transactions: &[Transaction],
        runner: &Runner,
    ) -> MergeResult<JoinOutput> {
        let slices = partition_by_customer(events, transactions);
        debug!(customers = slices.len(), mode = ?runner.mode, "partitioned events by customer");

        let batches = runner.map_ordered(&slices, |slice| self.join_customer(slice))?;

        let mut stats = JoinStats {
            customers: slices.len(),
            ..JoinStats::default()
        };
        let mut rows = Vec::with_capacity(batches.iter().map(|b| b.rows.len()).sum());
        for batch in batches {
            stats.received += batch.received;
            stats.skipped += batch.skipped;
            stats.successful += batch.rows.iter().filter(|r| r.is_successful()).count();
            rows.extend(batch.rows);
        }
        stats.emitted = rows.len();

        if rows.is_empty() {
            info!("no received offer events; training table is empty");
        }
        info!(
            customers = stats.customers,
            received = stats.received,
            emitted = stats.emitted,
            skipped = stats.skipped,
            successful = stats.successful,
            "windowed join finished"
        );
        Ok(JoinOutput { rows, stats })
    }
}

/// Build the lookup tables from `tables` and run the join in one call.
///
/// # Errors
/// Duplicate offer or profile keys, or any error from [`WindowedJoin::run`].
pub fn windowed_join(
    tables: &CleanTables,
    options: &JoinOptions,
    runner: &Runner,
) -> MergeResult<JoinOutput> {
    let offers = OfferCatalog::from_rows(tables.offers.iter().cloned())?;
    let profiles = ProfileRegistry::from_rows(tables.profiles.iter().cloned())?;
    WindowedJoin::new(offers, profiles)
        .with_options(*options)
        .run(&tables.offer_events, &tables.transactions, runner)
}
