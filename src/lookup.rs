//! Read-only keyed side tables shared by every join worker.
//!
//! The offer catalog and the profile registry are built once, wrapped in an
//! `Arc`, and cloned cheaply into each worker. Nothing mutates them during a
//! run, so no locking is involved.

use crate::error::{MergeError, MergeResult};
use crate::schema::{Days, Offer, Profile};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

/// Rows that carry their own unique key.
pub trait Keyed {
    /// Table name used in error messages.
    const TABLE: &'static str;

    fn key(&self) -> &str;

    /// Reject rows the join cannot use.
    fn check(&self) -> MergeResult<()> {
        Ok(())
    }
}

impl Keyed for Offer {
    const TABLE: &'static str = "offers";

    fn key(&self) -> &str {
        &self.offerid
    }

    /// The validity window needs a finite, non-negative duration.
    fn check(&self) -> MergeResult<()> {
        if self.duration.is_finite() && self.duration >= 0.0 {
            return Ok(());
        }
        Err(MergeError::schema(
            Self::TABLE,
            format!("offer {} has invalid duration {}", self.offerid, self.duration),
        ))
    }
}

impl Keyed for Profile {
    const TABLE: &'static str = "profiles";

    fn key(&self) -> &str {
        &self.customerid
    }
}

/// Immutable key → row map.
#[derive(Debug)]
pub struct SideTable<T>(Arc<HashMap<String, T>>);

impl<T> Clone for SideTable<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

pub type OfferCatalog = SideTable<Offer>;
pub type ProfileRegistry = SideTable<Profile>;

impl<T: Keyed> SideTable<T> {
    /// Build from rows, rejecting any key that appears twice.
    ///
    /// # Errors
    /// [`MergeError::DuplicateKey`] on the first repeated key, or whatever
    /// [`Keyed::check`] returns for an unusable row.
    pub fn from_rows(rows: impl IntoIterator<Item = T>) -> MergeResult<Self> {
        let mut map = HashMap::new();
        for row in rows {
            row.check()?;
            match map.entry(row.key().to_string()) {
                Entry::Occupied(e) => {
                    return Err(MergeError::DuplicateKey {
                        table: T::TABLE,
                        key: e.key().clone(),
                    });
                }
                Entry::Vacant(e) => {
                    e.insert(row);
                }
            }
        }
        Ok(Self(Arc::new(map)))
    }
}

impl<T> SideTable<T> {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.values()
    }
}

impl OfferCatalog {
    /// Offer received by `customer_id` at `time`.
    ///
    /// # Errors
    /// [`MergeError::UnknownOffer`] if the catalog has no such offer.
    pub fn offer(&self, offer_id: &str, customer_id: &str, time: Days) -> MergeResult<&Offer> {
        self.get(offer_id).ok_or_else(|| MergeError::UnknownOffer {
            offer_id: offer_id.to_string(),
            customer_id: customer_id.to_string(),
            time,
        })
    }
}

impl ProfileRegistry {
    /// # Errors
    /// [`MergeError::UnknownCustomer`] if no profile has this id.
    pub fn profile(&self, customer_id: &str) -> MergeResult<&Profile> {
        self.get(customer_id)
            .ok_or_else(|| MergeError::UnknownCustomer {
                customer_id: customer_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ChannelSet, OfferType};

    fn offer(id: &str, duration: Days) -> Offer {
        Offer {
            offerid: id.into(),
            offer_type: OfferType::Discount,
            difficulty: 10.0,
            reward: 2.0,
            duration,
            channels: ChannelSet::default(),
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = OfferCatalog::from_rows(vec![offer("o1", 5.0), offer("o1", 7.0)]).unwrap_err();
        assert!(matches!(
            err,
            MergeError::DuplicateKey { table: "offers", ref key } if key == "o1"
        ));
    }

    #[test]
    fn unusable_durations_are_rejected() {
        for duration in [-1.0, f64::NAN, f64::INFINITY] {
            let err = OfferCatalog::from_rows(vec![offer("o1", duration)]).unwrap_err();
            assert!(matches!(err, MergeError::Schema { table: "offers", .. }));
        }
        assert!(OfferCatalog::from_rows(vec![offer("o1", 0.0)]).is_ok());
    }

    #[test]
    fn clones_share_storage() -> MergeResult<()> {
        let catalog = OfferCatalog::from_rows(vec![offer("o1", 5.0), offer("o2", 3.0)])?;
        let worker_copy = catalog.clone();
        assert_eq!(worker_copy.len(), 2);
        assert!(std::ptr::eq(
            catalog.get("o1").unwrap(),
            worker_copy.get("o1").unwrap()
        ));
        Ok(())
    }

    #[test]
    fn missing_offer_is_a_lookup_error() -> MergeResult<()> {
        let catalog = OfferCatalog::from_rows(vec![offer("o1", 5.0)])?;
        let err = catalog.offer("o2", "c1", 4.0).unwrap_err();
        assert!(err.is_lookup());
        assert_eq!(catalog.offer("o1", "c1", 4.0)?.duration, 5.0);
        Ok(())
    }
}
