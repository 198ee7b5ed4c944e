//! JSONL and CSV files, with and without gzip.
#![cfg(all(feature = "io-jsonl", feature = "io-csv"))]

use offer_merge::preprocess::{RawProfile, RawTranscriptEntry, TranscriptEvent};
use offer_merge::testing::{scenario_busy_customers, write_raw_dataset, raw_sample};
use offer_merge::{
    JoinOptions, Runner, TrainingTable, read_csv_vec, read_jsonl_vec, windowed_join,
    write_csv_vec, write_training_csv,
};
use serde::{Deserialize, Serialize};

#[test]
fn raw_transcript_lines_parse() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("transcript.json");
    std::fs::write(
        &path,
        concat!(
            r#"{"person":"p","event":"offer received","value":{"offer id":"o"},"time":0}"#,
            "\n",
            r#"{"person":"p","event":"offer completed","value":{"offer_id":"o","reward":2},"time":6}"#,
            "\n",
        ),
    )?;
    let entries: Vec<RawTranscriptEntry> = read_jsonl_vec(&path)?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].event, TranscriptEvent::OfferCompleted);
    Ok(())
}

#[test]
fn null_profile_fields_parse() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("profile.json");
    std::fs::write(
        &path,
        r#"{"gender":null,"age":118,"id":"x","became_member_on":20170212,"income":null}"#,
    )?;
    let profiles: Vec<RawProfile> = read_jsonl_vec(&path)?;
    assert_eq!(profiles[0].gender, None);
    assert_eq!(profiles[0].income, None);
    Ok(())
}

#[test]
fn raw_dataset_survives_the_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let raw = raw_sample();
    let paths = write_raw_dataset(dir.path(), &raw)?;
    assert!(paths.transcript.ends_with("transcript.json"));
    let back = offer_merge::preprocess::RawTables::load(&paths)?;
    assert_eq!(back, raw);
    Ok(())
}

#[test]
fn training_csv_is_rectangular() -> anyhow::Result<()> {
    let tables = scenario_busy_customers();
    let out = windowed_join(&tables, &JoinOptions::default(), &Runner::sequential())?;
    let table = TrainingTable::new(out.rows, tables.member_years());

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("train.csv.gz");
    assert_eq!(write_training_csv(&path, &table)?, 5);

    // gzip magic on disk, readable through the auto-detecting reader
    let bytes = std::fs::read(&path)?;
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    let rows: Vec<Vec<String>> = read_csv_vec(&path, false)?;
    assert_eq!(rows.len(), 6);
    let width = table.header()?.len();
    assert!(rows.iter().all(|r| r.len() == width));
    assert_eq!(rows[1][0], "0");
    assert_eq!(rows[1][1], "13.5");
    Ok(())
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Summary {
    customerid: String,
    received: u32,
    spend: f64,
}

#[test]
fn typed_csv_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested/summary.csv");
    let rows = vec![
        Summary { customerid: "a".into(), received: 2, spend: 7.75 },
        Summary { customerid: "b".into(), received: 0, spend: 0.0 },
    ];
    assert_eq!(write_csv_vec(&path, true, &rows)?, 2);
    assert_eq!(read_csv_vec::<Summary>(&path, true)?, rows);
    Ok(())
}
