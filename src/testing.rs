//! Helpers for testing merge runs.
//!
//! - **Builders**: [`ScenarioBuilder`] assembles cleaned tables event by event
//! - **Fixtures**: small scenarios with known labels, and a raw sample in
//!   the shape of the source files
//! - **Assertions**: row counts per customer, exact labels, bit-identical output
//! - **Mock I/O**: raw datasets written to a temporary directory
//!
//! # Quick Start
//!
//! ```
//! use offer_merge::merge::windowed_join;
//! use offer_merge::runner::Runner;
//! use offer_merge::testing::*;
//!
//! let tables = scenario_unviewed_offer();
//! let out = windowed_join(&tables, &Default::default(), &Runner::sequential()).unwrap();
//! assert_rows_per_customer(&tables.offer_events, &out.rows);
//! assert_labels(&out.rows[0], 1.0, 20.0, 0);
//! ```

pub mod assertions;
pub mod builders;
pub mod fixtures;

#[cfg(feature = "io-jsonl")]
pub mod mock_io;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

#[cfg(feature = "io-jsonl")]
pub use mock_io::*;
