//! # offer-merge
//!
//! Builds a per-offer training table from three datasets of a promotional
//! offer experiment: the offer portfolio, customer profiles and an event log
//! of offers received, viewed and completed plus purchase transactions.
//!
//! Every received offer becomes one output row carrying two labels computed
//! over the offer's validity window `[received, received + duration]`:
//!
//! - `total_amount`: the customer's spend inside the window
//! - `offer_successful`: `1` when the offer was both viewed and completed
//!   inside the window
//!
//! The row is then enriched with the offer's attributes and the customer's
//! profile, including one-hot indicator columns.
//!
//! ## Quick Start
//!
//! ```
//! use offer_merge::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let pipeline = OfferPipeline::new(MergeConfig::default());
//! let table = pipeline.run(&offer_merge::testing::raw_sample())?;
//!
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.rows[0].offer_successful, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Stages
//!
//! 1. **Load** ([`preprocess::RawTables::load`]): JSON Lines, optionally gzip.
//! 2. **Preprocess** ([`preprocess::Preprocessor`]): rename keys, convert
//!    hours to days, drop profiles without income and events of unknown
//!    customers, derive calendar fields and age bins.
//! 3. **Join** ([`merge::WindowedJoin`]): partition events by customer and
//!    label each received offer, sequentially or on a rayon pool. Output
//!    order is the same in both modes.
//! 4. **Write** ([`table::TrainingTable`]): CSV with the flat one-hot layout,
//!    or JSON Lines of the typed rows.
//!
//! ## Execution Modes
//!
//! ```
//! use offer_merge::{ExecMode, MergeConfig};
//!
//! let cfg = MergeConfig {
//!     exec_mode: ExecMode::Parallel { threads: Some(4) },
//!     ..MergeConfig::default()
//! };
//! assert!(matches!(cfg.exec_mode, ExecMode::Parallel { .. }));
//! ```
//!
//! ## Feature Flags
//!
//! - `io-jsonl` (default): JSON Lines reading and writing
//! - `io-csv` (default): CSV output of the training table
//! - `compression-gzip` (default): transparent `.gz` support
//! - `metrics` (default): stage counters on [`OfferPipeline`]
//!
//! The library emits `tracing` events and never installs a subscriber.

pub mod config;
pub mod error;
pub mod io;
pub mod lookup;
pub mod merge;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod partition;
pub mod pipeline;
pub mod preprocess;
pub mod runner;
pub mod schema;
pub mod table;
pub mod testing;
pub mod validation;
pub mod window;

pub use config::{EventMatching, LookupPolicy, MergeConfig};
pub use error::{MergeError, MergeResult};
pub use merge::{JoinOptions, JoinOutput, JoinStats, WindowedJoin, windowed_join};
pub use pipeline::OfferPipeline;
pub use runner::{ExecMode, Runner};
pub use table::TrainingTable;

#[cfg(feature = "io-jsonl")]
pub use io::jsonl::{read_jsonl_vec, write_jsonl_vec};

#[cfg(feature = "io-csv")]
pub use io::csv::{read_csv_vec, write_csv_vec, write_training_csv};

pub mod prelude {
    pub use crate::config::{EventMatching, LookupPolicy, MergeConfig};
    pub use crate::error::{MergeError, MergeResult};
    pub use crate::merge::{JoinOptions, windowed_join};
    pub use crate::pipeline::OfferPipeline;
    pub use crate::preprocess::{CleanTables, DatasetPaths, Preprocessor, RawTables};
    pub use crate::runner::{ExecMode, Runner};
    pub use crate::schema::{Offer, OfferEvent, OfferEventKind, OutputRow, Profile, Transaction};
    pub use crate::table::TrainingTable;
    pub use crate::validation::ValidationMode;
}
