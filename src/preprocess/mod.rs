//! Cleaning of the raw datasets into the typed tables the join consumes.
//!
//! * offers: `id` becomes `offerid`, offer type and channels are parsed into
//!   their enums;
//! * profiles: `id` becomes `customerid`, customers without income are
//!   dropped (a blank gender alone is kept as `None`), the membership date is
//!   parsed and its calendar fields and the age bin are derived;
//! * transcript: `person` becomes `customerid`, hours become days, events of
//!   customers without a profile are dropped, and each payload is decoded once
//!   into an [`EventPayload`] before the log is split into offer events and
//!   transactions.

pub mod raw;

pub use raw::*;

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::schema::{
    Channel, ChannelSet, Gender, Offer, OfferEvent, OfferType, Profile, Transaction,
};
use crate::validation::{ErrorCollector, ValidationMode, validate_records};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};
use tracing::info;

/// Counts describing what preprocessing kept and dropped.
#[derive(Debug, Clone, Default)]
pub struct PreprocessReport {
    pub profiles_without_income: usize,
    /// Kept profiles whose gender is blank.
    pub profiles_without_gender: usize,
    pub events_unknown_customer: usize,
    /// Records rejected by validation (empty under `SkipInvalid`).
    pub rejected: ErrorCollector,
}

/// The four cleaned tables.
#[derive(Debug, Clone, Default)]
pub struct CleanTables {
    pub offers: Vec<Offer>,
    pub profiles: Vec<Profile>,
    pub offer_events: Vec<OfferEvent>,
    pub transactions: Vec<Transaction>,
    pub report: PreprocessReport,
}

impl CleanTables {
    /// Sorted distinct membership years of all profiles.
    #[must_use]
    pub fn member_years(&self) -> Vec<i32> {
        self.profiles
            .iter()
            .map(|p| p.year_became_member)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    hours_per_day: f64,
    validation_mode: ValidationMode,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::from_config(&MergeConfig::default())
    }
}

impl Preprocessor {
    #[must_use]
    pub const fn new(hours_per_day: f64, validation_mode: ValidationMode) -> Self {
        Self {
            hours_per_day,
            validation_mode,
        }
    }

    #[must_use]
    pub const fn from_config(cfg: &MergeConfig) -> Self {
        Self::new(cfg.hours_per_day, cfg.validation_mode)
    }

    /// # Errors
    /// Unknown offer type or channel, or an invalid offer under `FailFast`.
    pub fn clean_offers(
        &self,
        raw: &[RawOffer],
        rejected: &mut ErrorCollector,
    ) -> MergeResult<Vec<Offer>> {
        let offers = raw
            .iter()
            .map(|r| {
                let channels = r
                    .channels
                    .iter()
                    .map(|c| c.parse::<Channel>())
                    .collect::<MergeResult<ChannelSet>>()?;
                Ok(Offer {
                    offerid: r.id.clone(),
                    offer_type: r.offer_type.parse::<OfferType>()?,
                    difficulty: r.difficulty,
                    reward: r.reward,
                    duration: r.duration,
                    channels,
                })
            })
            .collect::<MergeResult<Vec<_>>>()?;
        validate_records(offers, self.validation_mode, rejected)
    }

    /// # Errors
    /// Unknown gender, an impossible membership date, or an invalid profile
    /// under `FailFast`.
    pub fn clean_profiles(
        &self,
        raw: &[RawProfile],
        report: &mut PreprocessReport,
    ) -> MergeResult<Vec<Profile>> {
        let mut profiles = Vec::with_capacity(raw.len());
        for r in raw {
            let Some(income) = r.income else {
                report.profiles_without_income += 1;
                continue;
            };
            let gender = r.gender.as_deref().map(str::parse::<Gender>).transpose()?;
            if gender.is_none() {
                report.profiles_without_gender += 1;
            }
            let date = parse_member_date(r.became_member_on)?;
            profiles.push(Profile::new(r.id.clone(), gender, r.age, income, date));
        }
        validate_records(profiles, self.validation_mode, &mut report.rejected)
    }

    /// Split the transcript into offer events and transactions of known customers.
    ///
    /// # Errors
    /// A payload that does not fit its event kind, or an invalid record under
    /// `FailFast`.
    pub fn clean_transcript(
        &self,
        raw: &[RawTranscriptEntry],
        customers: &HashSet<&str>,
        report: &mut PreprocessReport,
    ) -> MergeResult<(Vec<OfferEvent>, Vec<Transaction>)> {
        let mut events = Vec::new();
        let mut transactions = Vec::new();
        for entry in raw {
            if !customers.contains(entry.person.as_str()) {
                report.events_unknown_customer += 1;
                continue;
            }
            let time = entry.time / self.hours_per_day;
            match (entry.event.offer_kind(), entry.payload()?) {
                (Some(kind), EventPayload::Offer { offer_id, .. }) => {
                    events.push(OfferEvent::new(kind, entry.person.clone(), offer_id, time));
                }
                (None, EventPayload::Transaction { amount }) => {
                    transactions.push(Transaction::new(entry.person.clone(), time, amount));
                }
                // decode() keys the payload variant off the event kind
                (kind, payload) => {
                    return Err(MergeError::schema(
                        "transcript",
                        format!("payload {payload:?} does not match event {kind:?}"),
                    ));
                }
            }
        }
        let events = validate_records(events, self.validation_mode, &mut report.rejected)?;
        let transactions =
            validate_records(transactions, self.validation_mode, &mut report.rejected)?;
        Ok((events, transactions))
    }

    /// Clean all three datasets.
    ///
    /// # Errors
    /// See the individual `clean_*` methods.
    #[tracing::instrument(skip_all, fields(
        offers = raw.offers.len(),
        profiles = raw.profiles.len(),
        transcript = raw.transcript.len(),
    ))]
    pub fn run(&self, raw: &RawTables) -> MergeResult<CleanTables> {
        let mut report = PreprocessReport::default();
        let offers = self.clean_offers(&raw.offers, &mut report.rejected)?;
        let profiles = self.clean_profiles(&raw.profiles, &mut report)?;
        let customers: HashSet<&str> = profiles.iter().map(|p| p.customerid.as_str()).collect();
        let (offer_events, transactions) =
            self.clean_transcript(&raw.transcript, &customers, &mut report)?;

        info!(
            offers = offers.len(),
            profiles = profiles.len(),
            profiles_without_income = report.profiles_without_income,
            profiles_without_gender = report.profiles_without_gender,
            offer_events = offer_events.len(),
            transactions = transactions.len(),
            events_unknown_customer = report.events_unknown_customer,
            rejected = report.rejected.error_count(),
            "preprocessing finished"
        );
        Ok(CleanTables {
            offers,
            profiles,
            offer_events,
            transactions,
            report,
        })
    }
}

/// Parse a `YYYYMMDD` integer date.
///
/// # Errors
/// [`MergeError::Schema`] if the digits do not form a calendar date.
pub fn parse_member_date(yyyymmdd: u32) -> MergeResult<NaiveDate> {
    let year = i32::try_from(yyyymmdd / 10_000)
        .map_err(|_| MergeError::schema("profiles", format!("bad date {yyyymmdd}")))?;
    NaiveDate::from_ymd_opt(year, (yyyymmdd / 100) % 100, yyyymmdd % 100).ok_or_else(|| {
        MergeError::schema(
            "profiles",
            format!("became_member_on {yyyymmdd} is not a YYYYMMDD date"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_dates_parse() -> MergeResult<()> {
        assert_eq!(
            parse_member_date(20170212)?,
            NaiveDate::from_ymd_opt(2017, 2, 12).unwrap()
        );
        assert!(parse_member_date(20171332).is_err());
        assert!(parse_member_date(2017).is_err());
        Ok(())
    }

    #[test]
    fn member_years_are_sorted_and_distinct() {
        let d = |y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap();
        let tables = CleanTables {
            profiles: vec![
                Profile::new("a", Gender::F, 30, 1.0, d(2018)),
                Profile::new("b", Gender::M, 30, 1.0, d(2013)),
                Profile::new("c", Gender::O, 30, 1.0, d(2018)),
            ],
            ..CleanTables::default()
        };
        assert_eq!(tables.member_years(), vec![2013, 2018]);
    }
}
