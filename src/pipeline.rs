//! End-to-end driver: load, preprocess, join, write.

use crate::config::MergeConfig;
use crate::error::MergeResult;
use crate::merge::{JoinOptions, JoinStats, windowed_join};
use crate::preprocess::{CleanTables, PreprocessReport, Preprocessor, RawTables};
use crate::runner::Runner;
use crate::table::TrainingTable;
#[cfg(feature = "io-jsonl")]
use crate::preprocess::DatasetPaths;
#[cfg(feature = "metrics")]
use crate::metrics::{GaugeMetric, MetricsCollector};
#[cfg(any(feature = "io-jsonl", feature = "io-csv", feature = "metrics"))]
use std::path::Path;

/// Owns a [`MergeConfig`] and runs the stages with it.
///
/// With the `metrics` feature every run adds its stage counts to
/// [`OfferPipeline::metrics`]: `profiles_dropped_no_income`,
/// `profiles_without_gender`, `events_dropped_unknown_customer`,
/// `records_rejected`, `customers`, `offers_received`, `rows_emitted`,
/// `rows_skipped` and `offers_successful`. The `success_rate` gauge holds the
/// share of successful rows over the counters so far.
#[derive(Clone, Default)]
pub struct OfferPipeline {
    config: MergeConfig,
    #[cfg(feature = "metrics")]
    metrics: MetricsCollector,
}

impl OfferPipeline {
    #[must_use]
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            #[cfg(feature = "metrics")]
            metrics: MetricsCollector::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &MergeConfig {
        &self.config
    }

    #[cfg(feature = "metrics")]
    #[must_use]
    pub const fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    #[must_use]
    pub const fn runner(&self) -> Runner {
        Runner::new(self.config.exec_mode)
    }

    /// Read the three raw datasets.
    ///
    /// # Errors
    /// Missing files or malformed lines.
    #[cfg(feature = "io-jsonl")]
    pub fn load(&self, paths: &DatasetPaths) -> anyhow::Result<RawTables> {
        RawTables::load(paths)
    }

    /// # Errors
    /// Schema errors, or invalid records under `FailFast`.
    pub fn preprocess(&self, raw: &RawTables) -> MergeResult<CleanTables> {
        let clean = Preprocessor::from_config(&self.config).run(raw)?;
        self.record_preprocess(&clean.report);
        Ok(clean)
    }

    /// Join cleaned tables into the training table.
    ///
    /// # Errors
    /// Duplicate keys, a lookup error under `Abort`, or a pool failure.
    pub fn merge(&self, clean: &CleanTables) -> MergeResult<TrainingTable> {
        let out = windowed_join(clean, &JoinOptions::from(&self.config), &self.runner())?;
        self.record_join(&out.stats);
        Ok(TrainingTable::new(out.rows, clean.member_years()))
    }

    /// Preprocess and merge.
    ///
    /// # Errors
    /// See [`Self::preprocess`] and [`Self::merge`].
    pub fn run(&self, raw: &RawTables) -> MergeResult<TrainingTable> {
        #[cfg(feature = "metrics")]
        self.metrics.record_start();
        let clean = self.preprocess(raw)?;
        let table = self.merge(&clean);
        #[cfg(feature = "metrics")]
        {
            self.metrics.record_end();
            tracing::info!(metrics = %self.metrics, "run finished");
        }
        table
    }

    /// Load the datasets from disk and run.
    ///
    /// # Errors
    /// I/O errors, or anything [`Self::run`] returns.
    #[cfg(feature = "io-jsonl")]
    pub fn run_files(&self, paths: &DatasetPaths) -> anyhow::Result<TrainingTable> {
        let raw = self.load(paths)?;
        Ok(self.run(&raw)?)
    }

    /// Write the table as CSV with a header row.
    ///
    /// # Errors
    /// I/O failures or a duplicated column name.
    #[cfg(feature = "io-csv")]
    pub fn write_csv(&self, table: &TrainingTable, path: impl AsRef<Path>) -> anyhow::Result<usize> {
        let n = crate::io::csv::write_training_csv(path.as_ref(), table)?;
        tracing::info!(rows = n, path = %path.as_ref().display(), "wrote training table");
        Ok(n)
    }

    /// Write the typed rows as JSONL, one nested object per row.
    ///
    /// # Errors
    /// I/O failures.
    #[cfg(feature = "io-jsonl")]
    pub fn write_jsonl(&self, table: &TrainingTable, path: impl AsRef<Path>) -> anyhow::Result<usize> {
        let n = crate::io::jsonl::write_jsonl_vec(path.as_ref(), &table.rows)?;
        tracing::info!(rows = n, path = %path.as_ref().display(), "wrote training rows");
        Ok(n)
    }

    /// Save the collected metrics as pretty JSON.
    ///
    /// # Errors
    /// I/O failures.
    #[cfg(feature = "metrics")]
    pub fn write_metrics(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.metrics.save_to_file(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), "wrote metrics");
        Ok(())
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn record_preprocess(&self, report: &PreprocessReport) {
        #[cfg(feature = "metrics")]
        {
            let m = &self.metrics;
            m.increment_counter("profiles_dropped_no_income", report.profiles_without_income as u64);
            m.increment_counter("profiles_without_gender", report.profiles_without_gender as u64);
            m.increment_counter(
                "events_dropped_unknown_customer",
                report.events_unknown_customer as u64,
            );
            m.increment_counter("records_rejected", report.rejected.error_count() as u64);
        }
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn record_join(&self, stats: &JoinStats) {
        #[cfg(feature = "metrics")]
        {
            let m = &self.metrics;
            m.increment_counter("customers", stats.customers as u64);
            m.increment_counter("offers_received", stats.received as u64);
            m.increment_counter("rows_emitted", stats.emitted as u64);
            m.increment_counter("rows_skipped", stats.skipped as u64);
            m.increment_counter("offers_successful", stats.successful as u64);

            let emitted = m.counter("rows_emitted").unwrap_or(0);
            if emitted > 0 {
                let successful = m.counter("offers_successful").unwrap_or(0);
                m.register(Box::new(
                    GaugeMetric::new("success_rate", successful as f64 / emitted as f64)
                        .with_description("share of emitted rows labelled successful"),
                ));
            }
        }
    }
}
