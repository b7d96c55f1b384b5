//! Tests for the `Pandect` handle.

use std::path::Path;

use pandect::{LoadError, LoadOptions, MatchCase, Metadata, Pandect, SaveOutcome, Source};
use tempfile::TempDir;

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_open_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "id,name\n1,Alice\n2,Bob\n").unwrap();

    let dataset = Pandect::open(path_str(&path), LoadOptions::default()).unwrap();
    assert_eq!(dataset.data().shape(), (2, 2));
    assert!(dataset.metadata().is_empty());
    assert_eq!(dataset.source(), &Source::Path(path_str(&path)));
}

#[test]
fn test_open_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.sav");

    let err = Pandect::open(path_str(&path), LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::FileNotFound { .. }));
}

#[test]
fn test_save_keeps_metadata_through_sav() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("data.csv");
    std::fs::write(&csv, "sex,age\n1,30\n2,41\n").unwrap();

    let first = dir.path().join("first.sav");
    let second = dir.path().join("second.sav");

    // Attach labels by saving through the free function first.
    let (mut df, _) = pandect::load(path_str(&csv), &LoadOptions::default()).unwrap();
    let meta = Metadata::new()
        .with_label("sex", "Sex")
        .with_value_label("sex", 1.0, "Male");
    pandect::save(&mut df, &path_str(&first), Some(&meta), MatchCase::Insensitive).unwrap();

    let dataset = Pandect::open(path_str(&first), LoadOptions::default()).unwrap();
    let outcome = dataset.save(&path_str(&second)).unwrap();
    assert!(outcome.is_written());

    let reloaded = Pandect::open(path_str(&second), LoadOptions::default()).unwrap();
    assert_eq!(reloaded.metadata().label_for("sex"), Some("Sex"));
    assert_eq!(reloaded.metadata(), dataset.metadata());
    assert_eq!(reloaded.data().shape(), (2, 2));
}

#[test]
fn test_save_unknown_destination() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("data.csv");
    std::fs::write(&csv, "a\n1\n").unwrap();

    let dataset = Pandect::open(path_str(&csv), LoadOptions::default()).unwrap();
    let dest = dir.path().join("data.parquet");
    let outcome = dataset.save(&path_str(&dest)).unwrap();
    assert!(matches!(outcome, SaveOutcome::Skipped { .. }));
    assert!(!dest.exists());
}

#[test]
fn test_save_uses_load_case_policy() {
    let dir = TempDir::new().unwrap();
    let csv = dir.path().join("data.csv");
    std::fs::write(&csv, "a\n1\n").unwrap();

    let options = LoadOptions::default().with_match_case(MatchCase::Sensitive);
    let dataset = Pandect::open(path_str(&csv), options).unwrap();
    let outcome = dataset.save(&path_str(&dir.path().join("OUT.TSV"))).unwrap();
    assert!(outcome.is_skipped());

    let (data, meta) = dataset.into_parts();
    assert_eq!(data.height(), 1);
    assert!(meta.is_empty());
}
