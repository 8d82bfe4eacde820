//! End-to-end tests over on-disk scan files.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use reflscan::{
    load, merge_files, parse_file, revolver_labels, Error, MetadataValue, ReflectivityPipeline,
    Wavelength, SCAN_INFO_KEY,
};

fn write_scan(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// The two-slot scenario: a "no sample" reference at slot 0 and one
/// sample at slot 1, both measured at 500 nm.
const TWO_SLOT_SCAN: &str = "\
Run: 7
Active: Rev.Pos:0, Label:No sample
Active: Rev.Pos:1, Label:Sample A
UNIXTime,RevPos,SamplePos,PmtPos,Wavelength,Current,CurrentStd,DC,DCStd,Temp,Humidity
100.0,0,0.0,30.0,500.0,10.0,1.0,0.05,0.0,21.0,38.0
102.0,1,0.0,30.0,500.0,4.0,0.0,0.05,0.0,21.0,38.0
";

#[test]
fn parse_single_file_yields_flat_metadata_and_records() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_scan(dir.path(), "run7.txt", TWO_SLOT_SCAN);

    let dataset = parse_file(&path)?;
    assert_eq!(dataset.len(), 2);
    assert_eq!(
        dataset.metadata().get("Run").and_then(MetadataValue::as_text),
        Some("7")
    );
    assert_eq!(dataset.scan_info().len(), 2);

    // Token 6 feeds both the signal deviation and the dark current.
    let first = &dataset.records()[0];
    assert_eq!(first.signal, 10.0);
    assert_eq!(first.signal_stddev, 1.0);
    assert_eq!(first.dark_current, 1.0);
    Ok(())
}

#[test]
fn load_single_path_is_flat_load_many_is_nested() -> Result<()> {
    let dir = TempDir::new()?;
    let a = write_scan(dir.path(), "a.txt", TWO_SLOT_SCAN);
    let b = write_scan(dir.path(), "b.txt", TWO_SLOT_SCAN);

    let flat = load(&[&a])?;
    assert!(flat.metadata().contains_key("Run"));
    assert!(!flat.metadata().contains_key("a.txt"));

    let merged = load(&[&a, &b])?;
    assert!(!merged.metadata().contains_key("Run"));
    let nested = merged
        .metadata()
        .get("a.txt")
        .and_then(MetadataValue::as_file)
        .unwrap();
    assert_eq!(nested.get("Run").and_then(MetadataValue::as_text), Some("7"));
    assert!(merged.metadata().contains_key("b.txt"));
    Ok(())
}

#[test]
fn merge_concatenates_records_in_path_order() -> Result<()> {
    let dir = TempDir::new()?;
    let a = write_scan(dir.path(), "a.txt", TWO_SLOT_SCAN);
    let b = write_scan(
        dir.path(),
        "b.txt",
        "UNIXTime,...\n200.0,2,0.0,30.0,600.0,5.0,0.1,0.01,0.0,21.0,38.0\n",
    );

    let (da, db) = (parse_file(&a)?, parse_file(&b)?);
    let merged = merge_files(&[&a, &b])?;
    assert_eq!(merged.len(), da.len() + db.len());

    let mut expected = da.records().to_vec();
    expected.extend(db.records().to_vec());
    assert_eq!(merged.records(), expected.as_slice());
    Ok(())
}

#[test]
fn same_basename_metadata_is_last_wins() -> Result<()> {
    let dir_a = TempDir::new()?;
    let dir_b = TempDir::new()?;
    let a = write_scan(dir_a.path(), "run.txt", "Run: 1\nUNIXTime\n");
    let b = write_scan(dir_b.path(), "run.txt", "Run: 2\nUNIXTime\n");

    let merged = merge_files(&[&a, &b])?;
    assert_eq!(merged.metadata().len(), 1);
    let nested = merged
        .metadata()
        .get("run.txt")
        .and_then(MetadataValue::as_file)
        .unwrap();
    assert_eq!(nested.get("Run").and_then(MetadataValue::as_text), Some("2"));
    Ok(())
}

#[test]
fn unreadable_file_aborts_the_whole_merge() {
    let dir = TempDir::new().unwrap();
    let a = write_scan(dir.path(), "a.txt", TWO_SLOT_SCAN);
    let missing = dir.path().join("missing.txt");

    let err = merge_files(&[&a, &missing]).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn ten_token_rows_are_dropped_eleven_token_rows_kept() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_scan(
        dir.path(),
        "short.txt",
        "UNIXTime\n\
         1.0,0,0.0,0.0,500.0,1.0,0.1,0.01,0.0,21.0\n\
         1.0,0,0.0,0.0,500.0,1.0,0.1,0.01,0.0,21.0,38.0\n",
    );
    let dataset = parse_file(&path)?;
    assert_eq!(dataset.len(), 1);
    Ok(())
}

#[test]
fn non_numeric_token_aborts_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_scan(
        dir.path(),
        "bad.txt",
        "UNIXTime\n1.0,0,0.0,0.0,abc,1.0,0.1,0.01,0.0,21.0,38.0\n",
    );
    let err = parse_file(&path).unwrap_err();
    match err {
        Error::Parse { row, field, value, .. } => {
            assert_eq!(row, 1);
            assert_eq!(field, "wavelength");
            assert_eq!(value, "abc");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn full_pipeline_derives_the_expected_ratio() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_scan(dir.path(), "run7.txt", TWO_SLOT_SCAN);

    let mut pipeline = ReflectivityPipeline::new();
    pipeline.read_input(&[&path])?;
    pipeline.analyze()?;

    let grouped = pipeline.grouped()?;
    let total: usize = grouped
        .iter()
        .flat_map(|(_, by_wl)| by_wl.values())
        .map(Vec::len)
        .sum();
    assert_eq!(total, pipeline.dataset()?.len());

    let integrated = pipeline.integrated()?;
    assert_eq!(integrated.get(0, Wavelength(500.0)), Some(10.0));
    assert_eq!(integrated.get(1, Wavelength(500.0)), Some(4.0));

    let labels = pipeline.labels()?;
    assert_eq!(labels.get(0), Some("No sample"));

    let ratios = pipeline.reflectivity()?.expect("reference slot present");
    assert_eq!(ratios.reference(), 0);
    assert_eq!(
        ratios.by_position(1),
        Some(&[(Wavelength(500.0), 0.4)][..])
    );
    Ok(())
}

#[test]
fn missing_reference_label_short_circuits_only_reflectivity() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_scan(
        dir.path(),
        "nosref.txt",
        "Active: Rev.Pos:1, Label:Sample A\n\
         UNIXTime\n\
         100.0,1,0.0,30.0,500.0,4.0,0.0,0.05,0.0,21.0,38.0\n",
    );

    let mut pipeline = ReflectivityPipeline::new();
    pipeline.read_input(&[&path])?;
    pipeline.analyze()?;

    assert!(pipeline.reflectivity()?.is_none());
    // Earlier stages stay usable.
    assert_eq!(pipeline.dataset()?.len(), 1);
    assert_eq!(pipeline.integrated()?.get(1, Wavelength(500.0)), Some(4.0));
    Ok(())
}

#[test]
fn merged_metadata_has_no_top_level_scan_info() -> Result<()> {
    // Label resolution reads the top-level ScanInfo key only; merged
    // datasets nest it per file, so no labels resolve.
    let dir = TempDir::new()?;
    let a = write_scan(dir.path(), "a.txt", TWO_SLOT_SCAN);
    let b = write_scan(dir.path(), "b.txt", TWO_SLOT_SCAN);

    let merged = load(&[&a, &b])?;
    assert!(!merged.metadata().contains_key(SCAN_INFO_KEY));
    assert!(revolver_labels(merged.metadata()).is_empty());
    Ok(())
}
