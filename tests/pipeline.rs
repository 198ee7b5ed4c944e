//! End-to-end runs through files.
#![cfg(all(feature = "io-jsonl", feature = "io-csv"))]

use offer_merge::prelude::*;
use offer_merge::schema::OutputRow;
use offer_merge::testing::{RawDatasetDir, assert_labels, raw_sample};
use offer_merge::{read_jsonl_vec, write_jsonl_vec};

const MALE: &str = "78afa995795e4d85b5d9ceeca43f5fef";
const FEMALE: &str = "0610b486422d4921ae7d2bf64640c50b";

#[test]
fn sample_runs_from_files_to_csv() -> anyhow::Result<()> {
    let data = RawDatasetDir::new(&raw_sample())?;
    let pipeline = OfferPipeline::new(MergeConfig::default());

    let table = pipeline.run_files(data.paths())?;
    assert_eq!(table.len(), 2);
    assert_eq!(table.member_years, vec![2017]);

    // first-encounter order: the male customer's offer was received first
    assert_eq!(table.rows[0].customer_id(), MALE);
    assert_labels(&table.rows[0], 0.0, 19.89, 1);
    assert_eq!(table.rows[1].customer_id(), FEMALE);
    assert_labels(&table.rows[1], 0.0, 5.5, 0);

    let out = data.path().join("out/training.csv");
    assert_eq!(pipeline.write_csv(&table, &out)?, 2);

    let mut rdr = csv::Reader::from_path(&out)?;
    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    assert_eq!(header, table.header()?);
    let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>()?;
    assert_eq!(rows.len(), 2);
    let col = |name: &str| header.iter().position(|h| h == name).expect(name);
    assert_eq!(&rows[0][col("offer_successful")], "1");
    assert_eq!(&rows[0][col("offer_bogo")], "1");
    assert_eq!(&rows[0][col("channel_web")], "0");
    assert_eq!(&rows[1][col("offer_informational")], "1");
    assert_eq!(&rows[1][col("gender_F")], "1");
    assert_eq!(&rows[1][col("year_bm_2017")], "1");
    assert_eq!(&rows[1][col("51-60")], "1");
    Ok(())
}

#[test]
fn gzipped_inputs_and_outputs_work() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let raw = raw_sample();
    let paths = DatasetPaths {
        portfolio: dir.path().join("portfolio.json.gz"),
        profile: dir.path().join("profile.json.gz"),
        transcript: dir.path().join("transcript.json.gz"),
    };
    write_jsonl_vec(&paths.portfolio, &raw.offers)?;
    write_jsonl_vec(&paths.profile, &raw.profiles)?;
    write_jsonl_vec(&paths.transcript, &raw.transcript)?;

    let pipeline = OfferPipeline::default();
    let table = pipeline.run_files(&paths)?;
    assert_eq!(table.len(), 2);

    let out = dir.path().join("rows.jsonl.gz");
    pipeline.write_jsonl(&table, &out)?;
    let back: Vec<OutputRow> = read_jsonl_vec(&out)?;
    assert_eq!(back, table.rows);
    Ok(())
}

#[test]
fn missing_dataset_names_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = OfferPipeline::default()
        .run_files(&DatasetPaths::in_dir(dir.path()))
        .unwrap_err();
    assert!(format!("{err:#}").contains("portfolio.json"));
}

#[test]
fn sequential_config_gives_the_same_table() -> anyhow::Result<()> {
    let raw = raw_sample();
    let par = OfferPipeline::default().run(&raw)?;
    let seq = OfferPipeline::new(MergeConfig {
        exec_mode: ExecMode::Sequential,
        ..MergeConfig::default()
    })
    .run(&raw)?;
    assert_eq!(par, seq);
    Ok(())
}

#[cfg(feature = "metrics")]
#[test]
fn stage_counts_reach_the_metrics() -> anyhow::Result<()> {
    let pipeline = OfferPipeline::default();
    pipeline.run(&raw_sample())?;

    let m = pipeline.metrics();
    assert_eq!(m.counter("profiles_dropped_no_income"), Some(1));
    assert_eq!(m.counter("events_dropped_unknown_customer"), Some(2));
    assert_eq!(m.counter("records_rejected"), Some(0));
    assert_eq!(m.counter("customers"), Some(2));
    assert_eq!(m.counter("offers_received"), Some(2));
    assert_eq!(m.counter("rows_emitted"), Some(2));
    assert_eq!(m.counter("rows_skipped"), Some(0));
    assert_eq!(m.counter("offers_successful"), Some(1));
    assert_eq!(m.counter("profiles_without_gender"), Some(0));
    assert_eq!(m.gauge("success_rate"), Some(0.5));
    assert!(m.elapsed().is_some());

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out/metrics.json");
    pipeline.write_metrics(&path)?;
    let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(saved["rows_emitted"]["value"], serde_json::json!(2));
    assert_eq!(
        saved["success_rate"]["description"],
        serde_json::json!("share of emitted rows labelled successful")
    );
    assert!(m.to_string().contains("success_rate=0.5"));
    Ok(())
}
