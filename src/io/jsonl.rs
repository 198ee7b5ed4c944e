//! JSON Lines reading and writing, gzip-aware.
//!
//! The raw datasets are one JSON object per line; blank lines are skipped.
//! Parse errors name the file and the 1-based line.

use crate::io::compression::{auto_detect_reader, auto_detect_writer};
use crate::io::ensure_parent_dir;
use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Read a JSONL file into a `Vec<T>`.
///
/// # Errors
/// If the file cannot be opened, a line cannot be read, or a line does not
/// deserialize into `T`.
pub fn read_jsonl_vec<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(
        auto_detect_reader(f, path)
            .with_context(|| format!("setup decompression for {}", path.display()))?,
    );

    let mut out = Vec::<T>::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read line {} in {}", idx + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let v: T = serde_json::from_str(&line).with_context(|| {
            format!("parse JSONL line {} in {}: {}", idx + 1, path.display(), line)
        })?;
        out.push(v);
    }
    Ok(out)
}

/// Write `data` as JSONL, one compact value per line. Creates parent
/// directories. Returns the number of lines written.
///
/// # Errors
/// If the file cannot be created or an item fails to serialize.
pub fn write_jsonl_vec<T: Serialize>(path: impl AsRef<Path>, data: &[T]) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = auto_detect_writer(f, path)?;

    for (i, item) in data.iter().enumerate() {
        serde_json::to_writer(&mut w, item)
            .with_context(|| format!("serialize item #{} to {}", i, path.display()))?;
        w.write_all(b"\n")?;
    }
    w.finish()
        .with_context(|| format!("finish {}", path.display()))?;
    Ok(data.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        name: String,
    }

    #[test]
    fn blank_lines_are_skipped() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("rows.jsonl");
        std::fs::write(&path, "{\"id\":1,\"name\":\"a\"}\n\n  \n{\"id\":2,\"name\":\"b\"}\n")?;
        let rows: Vec<Row> = read_jsonl_vec(&path)?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].name, "b");
        Ok(())
    }

    #[test]
    fn parse_error_names_the_line() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"id\":1,\"name\":\"a\"}\n{\"id\":\"x\"}\n")?;
        let err = read_jsonl_vec::<Row>(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        Ok(())
    }

    #[test]
    fn writes_into_missing_directories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/deeper/rows.jsonl");
        let rows = vec![Row { id: 7, name: "x".into() }];
        assert_eq!(write_jsonl_vec(&path, &rows)?, 1);
        assert_eq!(read_jsonl_vec::<Row>(&path)?, rows);
        Ok(())
    }
}
