//! Error types shared by preprocessing, lookup tables and the windowed join.
//!
//! File and pipeline entry points return [`anyhow::Result`] with path context;
//! everything below them returns [`MergeResult`] so callers can match on the
//! failure kind (for example to tell a lookup miss from a schema problem).

use thiserror::Error;

pub type MergeResult<T> = Result<T, MergeError>;

#[derive(Debug, Error)]
pub enum MergeError {
    /// A received event names an offer the catalog does not contain.
    #[error("unknown offer '{offer_id}' received by customer '{customer_id}' at t={time}")]
    UnknownOffer {
        offer_id: String,
        customer_id: String,
        time: f64,
    },

    /// An event names a customer the profile registry does not contain.
    #[error("unknown customer '{customer_id}'")]
    UnknownCustomer { customer_id: String },

    #[error("duplicate key '{key}' in {table} table")]
    DuplicateKey { table: &'static str, key: String },

    /// Missing or malformed column, unknown category, or a payload that does
    /// not fit its event kind.
    #[error("schema error in {table}: {message}")]
    Schema { table: &'static str, message: String },

    #[error("invalid record in {table}: {message}")]
    Invalid { table: &'static str, message: String },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl MergeError {
    pub fn schema(table: &'static str, message: impl Into<String>) -> Self {
        Self::Schema {
            table,
            message: message.into(),
        }
    }

    /// True for the two lookup failures the join's lookup policy may skip.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(self, Self::UnknownOffer { .. } | Self::UnknownCustomer { .. })
    }
}
