//! End-to-end saving tests, read back through the loader.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pandect_ingest::{LoadOptions, load};
use pandect_model::{MatchCase, MeasureLevel, Metadata, ValueCode};
use pandect_output::{SaveOutcome, save};
use polars::prelude::*;
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}

fn path_str(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn sample_frame() -> DataFrame {
    df! {
        "id" => [1i64, 2, 3],
        "score" => [Some(1.5), None, Some(3.25)],
        "name" => [Some("Alice"), Some("Bob"), None],
    }
    .unwrap()
}

#[test]
fn test_unknown_suffix_is_skipped() {
    let dir = TempDir::new().unwrap();
    for name in ["out.xyz", "out.sqlite3", "out.csv.bak"] {
        let path = dir.path().join(name);
        let mut df = sample_frame();

        let (result, logs) = capture_logs(|| {
            save(&mut df, &path_str(&path), None, MatchCase::Insensitive)
        });

        let outcome = result.unwrap();
        assert!(outcome.is_skipped(), "{name} should be skipped");
        assert!(!path.exists());
        assert!(logs.contains("ERROR"), "no error event for {name}: {logs}");
        assert!(logs.contains("unknown output format"));
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_case_sensitive_destination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("OUT.CSV");
    let mut df = sample_frame();

    let outcome = save(&mut df, &path_str(&path), None, MatchCase::Sensitive).unwrap();
    assert!(outcome.is_skipped());

    let outcome = save(&mut df, &path_str(&path), None, MatchCase::Insensitive).unwrap();
    assert_eq!(
        outcome,
        SaveOutcome::Written {
            path: path.clone(),
            format: pandect_model::FileFormat::Csv,
        }
    );
}

#[test]
fn test_csv_to_tsv_example() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("data.csv");
    std::fs::write(&source, "id,name\n1,Alice\n2,Bob\n").unwrap();

    let (mut df, meta) = load(path_str(&source), &LoadOptions::default()).unwrap();
    let dest = dir.path().join("data.tsv");
    let outcome = save(&mut df, &path_str(&dest), Some(&meta), MatchCase::Insensitive).unwrap();
    assert!(outcome.is_written());

    let text = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(text, "id\tname\n1\tAlice\n2\tBob\n");
}

#[test]
fn test_shape_preserved_for_every_writer() {
    let dir = TempDir::new().unwrap();
    for suffix in [".csv", ".tsv", ".xlsx", ".sav", ".dta"] {
        let path = dir.path().join(format!("out{suffix}"));
        let mut df = sample_frame();

        let outcome = save(&mut df, &path_str(&path), None, MatchCase::Insensitive).unwrap();
        assert!(outcome.is_written(), "{suffix} not written");

        let (back, _) = load(path_str(&path), &LoadOptions::default()).unwrap();
        assert_eq!(back.shape(), (3, 3), "shape changed for {suffix}");
        assert_eq!(
            back.get_column_names_str(),
            vec!["id", "score", "name"],
            "names changed for {suffix}"
        );
    }
}

#[test]
fn test_xlsx_cell_types() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");
    let mut df = df! {
        "n" => [1i64, 2],
        "flag" => [true, false],
        "text" => [Some("a"), None],
    }
    .unwrap();

    save(&mut df, &path_str(&path), None, MatchCase::Insensitive).unwrap();
    let (back, _) = load(path_str(&path), &LoadOptions::default()).unwrap();
    assert_eq!(back.column("n").unwrap().dtype(), &DataType::Int64);
    assert_eq!(back.column("flag").unwrap().dtype(), &DataType::Boolean);
    assert_eq!(back.column("text").unwrap().null_count(), 1);
}

#[test]
fn test_sav_metadata_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("labelled.sav");
    let mut df = sample_frame();
    let meta = Metadata::new()
        .with_label("id", "Respondent id")
        .with_value_label("id", 1.0, "First")
        .with_value_label("name", "Alice", "The first")
        .with_measure("score", MeasureLevel::Continuous)
        .with_file_label("Sample");

    save(&mut df, &path_str(&path), Some(&meta), MatchCase::Insensitive).unwrap();
    let (back, loaded) = load(path_str(&path), &LoadOptions::default()).unwrap();

    assert_eq!(back.height(), 3);
    assert_eq!(loaded.label_for("id"), Some("Respondent id"));
    assert_eq!(
        loaded
            .value_labels_for("id")
            .and_then(|labels| labels.get(&ValueCode::Number(1.0))),
        Some(&"First".to_string())
    );
    assert_eq!(
        loaded
            .value_labels_for("name")
            .and_then(|labels| labels.get(&ValueCode::from("Alice"))),
        Some(&"The first".to_string())
    );
    assert_eq!(loaded.measure_for("score"), MeasureLevel::Continuous);
    assert_eq!(loaded.file_label.as_deref(), Some("Sample"));
}

#[test]
fn test_dta_metadata_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("labelled.dta");
    let mut df = sample_frame();
    let meta = Metadata::new()
        .with_label("id", "Respondent id")
        .with_value_label("id", 2.0, "Second")
        .with_measure("score", MeasureLevel::Continuous);

    save(&mut df, &path_str(&path), Some(&meta), MatchCase::Insensitive).unwrap();
    let (back, loaded) = load(path_str(&path), &LoadOptions::default()).unwrap();

    assert_eq!(back.height(), 3);
    assert_eq!(loaded.label_for("id"), Some("Respondent id"));
    assert_eq!(
        loaded
            .value_labels_for("id")
            .and_then(|labels| labels.get(&ValueCode::Number(2.0))),
        Some(&"Second".to_string())
    );
    assert!(loaded.measures.is_empty());
}

#[test]
fn test_writer_failure_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no-such-dir").join("out.csv");
    let mut df = sample_frame();

    let (result, logs) = capture_logs(|| {
        save(&mut df, &path_str(&path), None, MatchCase::Insensitive)
    });
    assert!(result.is_err());
    assert!(logs.contains("save failed"));
}

#[test]
fn test_rejected_frame_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    for name in ["out.dta", "out.sav"] {
        let path = dir.path().join(name);
        let mut df = df! {
            "first name" => [1i64],
            "1x" => [2i64],
        }
        .unwrap();

        let (result, logs) = capture_logs(|| {
            save(&mut df, &path_str(&path), None, MatchCase::Insensitive)
        });
        assert!(result.is_err(), "{name} should be rejected");
        assert!(logs.contains("save failed"));
        assert!(!path.exists(), "{name} was left on disk");
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_dta_shared_label_set_roundtrip() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.dta");
    let second = dir.path().join("second.dta");
    let mut df = df! {
        "smoker" => [1i64, 0],
        "drinker" => [0i64, 1],
    }
    .unwrap();
    let meta = Metadata::new()
        .with_value_label("smoker", 0.0, "No")
        .with_value_label("smoker", 1.0, "Yes")
        .with_label_set("smoker", "yesno")
        .with_value_label("drinker", 0.0, "No")
        .with_value_label("drinker", 1.0, "Yes")
        .with_label_set("drinker", "yesno");

    save(&mut df, &path_str(&first), Some(&meta), MatchCase::Insensitive).unwrap();
    let (mut back, loaded) = load(path_str(&first), &LoadOptions::default()).unwrap();
    assert_eq!(loaded.label_set_for("smoker"), Some("yesno"));
    assert_eq!(loaded.label_set_for("drinker"), Some("yesno"));

    save(&mut back, &path_str(&second), Some(&loaded), MatchCase::Insensitive).unwrap();
    let raw = pandect_dta::read_dta(&second).unwrap();
    assert_eq!(raw.label_sets.len(), 1);
    assert_eq!(raw.label_sets[0].name, "yesno");
}
