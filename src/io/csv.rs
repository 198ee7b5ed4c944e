//! CSV reading and writing, gzip-aware.
//!
//! [`read_csv_vec`] and [`write_csv_vec`] are Serde-backed and suit flat
//! records. The training table has a data-dependent column set, so it is
//! written from its rendered records with [`write_training_csv`].

use crate::io::compression::{auto_detect_reader, auto_detect_writer};
use crate::io::ensure_parent_dir;
use crate::table::TrainingTable;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;

/// Read a CSV file into a typed `Vec<T>`.
///
/// # Errors
/// If the file cannot be opened or a record fails to deserialize; the error
/// carries the 1-based record number.
pub fn read_csv_vec<T: DeserializeOwned>(
    path: impl AsRef<Path>,
    has_headers: bool,
) -> Result<Vec<T>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(has_headers)
        .from_reader(rdr);
    let mut out = Vec::<T>::new();
    for (i, rec) in rdr.deserialize::<T>().enumerate() {
        let v = rec.with_context(|| format!("parse CSV record #{} in {}", i + 1, path.display()))?;
        out.push(v);
    }
    Ok(out)
}

/// Write a typed slice as CSV. Returns the number of rows written.
///
/// # Errors
/// If the file cannot be created or a row fails to serialize.
pub fn write_csv_vec<T: Serialize>(
    path: impl AsRef<Path>,
    has_headers: bool,
    data: &[T],
) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = auto_detect_writer(f, path)?;
    let mut wtr = WriterBuilder::new()
        .has_headers(has_headers)
        .from_writer(w);
    for (i, row) in data.iter().enumerate() {
        wtr.serialize(row)
            .with_context(|| format!("serialize CSV row #{}", i + 1))?;
    }
    finish(wtr, path)?;
    Ok(data.len())
}

/// Write the training table with its header row. Returns the number of data
/// rows written.
///
/// # Errors
/// If the header has duplicate columns, or the file cannot be written.
pub fn write_training_csv(path: impl AsRef<Path>, table: &TrainingTable) -> Result<usize> {
    let path = path.as_ref();
    let header = table.header()?;
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let w = auto_detect_writer(f, path)?;
    let mut wtr = WriterBuilder::new().from_writer(w);
    wtr.write_record(&header)
        .with_context(|| format!("write header to {}", path.display()))?;
    for (i, record) in table.records().enumerate() {
        wtr.write_record(&record)
            .with_context(|| format!("write CSV row #{}", i + 1))?;
    }
    finish(wtr, path)?;
    Ok(table.len())
}

fn finish<W: std::io::Write>(
    wtr: csv::Writer<crate::io::compression::CompressedWriter<W>>,
    path: &Path,
) -> Result<()> {
    let inner = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flush {}: {}", path.display(), e.error()))?;
    inner
        .finish()
        .with_context(|| format!("finish {}", path.display()))
}
