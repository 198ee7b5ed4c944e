//! Typed tables produced by preprocessing and consumed by the windowed join.
//!
//! Categorical columns are closed enums so that one-hot expansion can be
//! resolved from the type rather than from whatever values a run happens to
//! see. The one exception is the membership year, whose universe comes from
//! the profile table (see [`crate::table::TrainingTable`]).

use crate::error::{MergeError, MergeResult};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type CustomerId = String;
pub type OfferId = String;

/// Days since the start of the experiment.
pub type Days = f64;

macro_rules! categorical {
    ($(#[$meta:meta])* $name:ident in $table:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = MergeError;

            fn from_str(s: &str) -> MergeResult<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        MergeError::schema(
                            $table,
                            format!(concat!("unknown ", stringify!($name), " '{}'"), s),
                        )
                    })
            }
        }
    };
}

categorical!(Gender in "profiles" { F => "F", M => "M", O => "O" });

categorical!(OfferType in "offers" {
    Bogo => "bogo",
    Discount => "discount",
    Informational => "informational",
});

categorical!(
    /// Delivery channel an offer was advertised on.
    Channel in "offers" {
        Email => "email",
        Mobile => "mobile",
        Social => "social",
        Web => "web",
    }
);

pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Set of channels an offer is delivered through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelSet {
    pub email: bool,
    pub mobile: bool,
    pub social: bool,
    pub web: bool,
}

impl ChannelSet {
    pub fn insert(&mut self, channel: Channel) {
        match channel {
            Channel::Email => self.email = true,
            Channel::Mobile => self.mobile = true,
            Channel::Social => self.social = true,
            Channel::Web => self.web = true,
        }
    }

    #[must_use]
    pub const fn contains(&self, channel: Channel) -> bool {
        match channel {
            Channel::Email => self.email,
            Channel::Mobile => self.mobile,
            Channel::Social => self.social,
            Channel::Web => self.web,
        }
    }
}

impl FromIterator<Channel> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = Channel>>(iter: I) -> Self {
        let mut set = Self::default();
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}

/// Ten-year age bucket over right-closed intervals `(10, 20]` .. `(100, 110]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgeBin(u8);

impl AgeBin {
    const LABELS: [&'static str; 10] = [
        "11-20", "21-30", "31-40", "41-50", "51-60", "61-70", "71-80", "81-90", "91-100",
        "100-110",
    ];

    /// Bin for `age`, or `None` outside `(10, 110]`.
    #[must_use]
    pub fn from_age(age: u32) -> Option<Self> {
        if age <= 10 || age > 110 {
            return None;
        }
        u8::try_from((age - 11) / 10).ok().map(Self)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::LABELS.len() as u8).map(Self)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        Self::LABELS[usize::from(self.0)]
    }
}

impl From<AgeBin> for String {
    fn from(bin: AgeBin) -> Self {
        bin.label().to_string()
    }
}

impl TryFrom<String> for AgeBin {
    type Error = MergeError;

    fn try_from(label: String) -> MergeResult<Self> {
        Self::all()
            .find(|bin| bin.label() == label)
            .ok_or_else(|| MergeError::schema("profiles", format!("unknown age bin '{label}'")))
    }
}

/// An entry of the offer catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub offerid: OfferId,
    pub offer_type: OfferType,
    pub difficulty: f64,
    pub reward: f64,
    /// Validity period, in the same unit as event times.
    pub duration: Days,
    pub channels: ChannelSet,
}

/// A customer profile with its calendar fields already derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub customerid: CustomerId,
    /// `None` when the customer left it blank.
    pub gender: Option<Gender>,
    pub age: u32,
    pub income: f64,
    pub became_member_on: NaiveDate,
    pub year_became_member: i32,
    pub month_became_member: u32,
    /// Monday is 0.
    pub weekday_became_member: u32,
    pub age_bin: Option<AgeBin>,
}

impl Profile {
    pub fn new(
        customerid: impl Into<CustomerId>,
        gender: impl Into<Option<Gender>>,
        age: u32,
        income: f64,
        became_member_on: NaiveDate,
    ) -> Self {
        Self {
            customerid: customerid.into(),
            gender: gender.into(),
            age,
            income,
            became_member_on,
            year_became_member: became_member_on.year(),
            month_became_member: became_member_on.month(),
            weekday_became_member: became_member_on.weekday().num_days_from_monday(),
            age_bin: AgeBin::from_age(age),
        }
    }

    #[must_use]
    pub fn weekday_label(&self) -> &'static str {
        WEEKDAY_LABELS[self.weekday_became_member as usize % WEEKDAY_LABELS.len()]
    }

    #[must_use]
    pub fn month_label(&self) -> &'static str {
        MONTH_LABELS[(self.month_became_member as usize + 11) % MONTH_LABELS.len()]
    }
}

/// Lifecycle stage of an offer event. Exactly one per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OfferEventKind {
    #[serde(rename = "offer received")]
    Received,
    #[serde(rename = "offer viewed")]
    Viewed,
    #[serde(rename = "offer completed")]
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferEvent {
    pub offerid: OfferId,
    pub customerid: CustomerId,
    pub time: Days,
    pub kind: OfferEventKind,
}

impl OfferEvent {
    pub fn new(
        kind: OfferEventKind,
        customerid: impl Into<CustomerId>,
        offerid: impl Into<OfferId>,
        time: Days,
    ) -> Self {
        Self {
            offerid: offerid.into(),
            customerid: customerid.into(),
            time,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub customerid: CustomerId,
    pub time: Days,
    pub amount: f64,
}

impl Transaction {
    pub fn new(customerid: impl Into<CustomerId>, time: Days, amount: f64) -> Self {
        Self {
            customerid: customerid.into(),
            time,
            amount,
        }
    }
}

/// One row of the training table: the labels of a single received offer
/// instance followed by the static offer and profile attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    /// Time the offer was received, i.e. the start of its validity window.
    pub time: Days,
    pub total_amount: f64,
    pub offer_successful: u8,
    #[serde(flatten)]
    pub offer: Offer,
    #[serde(flatten)]
    pub profile: Profile,
}

impl OutputRow {
    #[must_use]
    pub fn customer_id(&self) -> &str {
        &self.profile.customerid
    }

    #[must_use]
    pub fn offer_id(&self) -> &str {
        &self.offer.offerid
    }

    #[must_use]
    pub const fn is_successful(&self) -> bool {
        self.offer_successful == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_bins_are_right_closed() {
        assert_eq!(AgeBin::from_age(10), None);
        assert_eq!(AgeBin::from_age(11).map(AgeBin::label), Some("11-20"));
        assert_eq!(AgeBin::from_age(20).map(AgeBin::label), Some("11-20"));
        assert_eq!(AgeBin::from_age(21).map(AgeBin::label), Some("21-30"));
        assert_eq!(AgeBin::from_age(101).map(AgeBin::label), Some("100-110"));
        assert_eq!(AgeBin::from_age(110).map(AgeBin::label), Some("100-110"));
        assert_eq!(AgeBin::from_age(118), None);
        assert_eq!(AgeBin::all().count(), 10);
    }

    #[test]
    fn categories_parse_from_raw_labels() -> MergeResult<()> {
        assert_eq!("bogo".parse::<OfferType>()?, OfferType::Bogo);
        assert_eq!("social".parse::<Channel>()?, Channel::Social);
        assert_eq!("O".parse::<Gender>()?, Gender::O);
        let err = "bogus".parse::<OfferType>().unwrap_err();
        assert_eq!(err.to_string(), "schema error in offers: unknown OfferType 'bogus'");
        Ok(())
    }

    #[test]
    fn profile_derives_calendar_fields() {
        let date = NaiveDate::from_ymd_opt(2017, 7, 15).unwrap();
        let p = Profile::new("c1", Gender::F, 55, 112_000.0, date);
        assert_eq!(p.year_became_member, 2017);
        assert_eq!(p.month_became_member, 7);
        assert_eq!(p.month_label(), "Jul");
        // 2017-07-15 was a Saturday
        assert_eq!(p.weekday_became_member, 5);
        assert_eq!(p.weekday_label(), "Sat");
        assert_eq!(p.age_bin.map(AgeBin::label), Some("51-60"));
    }

    #[test]
    fn channel_set_collects() {
        let set: ChannelSet = [Channel::Web, Channel::Email].into_iter().collect();
        assert!(set.contains(Channel::Web));
        assert!(set.contains(Channel::Email));
        assert!(!set.contains(Channel::Mobile));
    }
}
