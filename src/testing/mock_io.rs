//! Raw datasets on disk, in a temporary directory.

use crate::io::jsonl::write_jsonl_vec;
use crate::preprocess::{DatasetPaths, RawTables};
use anyhow::{Context, Result};
use std::path::Path;
use tempfile::TempDir;

/// A temporary directory holding `portfolio.json`, `profile.json` and
/// `transcript.json`. Removed on drop.
pub struct RawDatasetDir {
    dir: TempDir,
    paths: DatasetPaths,
}

impl RawDatasetDir {
    /// Write `raw` as JSON Lines into a fresh temporary directory.
    ///
    /// # Errors
    /// If the directory or any file cannot be written.
    pub fn new(raw: &RawTables) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let paths = write_raw_dataset(dir.path(), raw)?;
        Ok(Self { dir, paths })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub const fn paths(&self) -> &DatasetPaths {
        &self.paths
    }
}

/// Write the three raw datasets under `dir` with their usual file names.
///
/// # Errors
/// If any file cannot be written.
pub fn write_raw_dataset(dir: impl AsRef<Path>, raw: &RawTables) -> Result<DatasetPaths> {
    let paths = DatasetPaths::in_dir(dir);
    write_jsonl_vec(&paths.portfolio, &raw.offers)?;
    write_jsonl_vec(&paths.profile, &raw.profiles)?;
    write_jsonl_vec(&paths.transcript, &raw.transcript)?;
    Ok(paths)
}
