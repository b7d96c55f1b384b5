//! Write-then-read tests for `.sav` files.

use std::io::Cursor;

use pandect_sav::{
    Compression, LabelValue, Measure, MissingValues, SavDataset, SavError, SavReader,
    SavReaderOptions, SavValue, SavVariable, SavWriter, SavWriterOptions, VarWidth, read_sav,
    write_sav,
};
use proptest::prelude::*;

fn roundtrip_with(dataset: &SavDataset, compression: Compression) -> SavDataset {
    let mut buffer = Vec::new();
    let options = SavWriterOptions::default().with_compression(compression);
    SavWriter::with_options(Cursor::new(&mut buffer), options)
        .write_dataset(dataset)
        .unwrap();
    SavReader::new(Cursor::new(&buffer)).read_dataset().unwrap()
}

fn roundtrip(dataset: &SavDataset) -> SavDataset {
    roundtrip_with(dataset, Compression::Bytecode)
}

fn survey() -> SavDataset {
    let mut ds = SavDataset::with_variables(vec![
        SavVariable::numeric("respondent_id").with_measure(Measure::Scale),
        SavVariable::numeric("sex")
            .with_label("Sex of respondent")
            .with_value_label(1.0, "Male")
            .with_value_label(2.0, "Female")
            .with_measure(Measure::Nominal),
        SavVariable::string("city", 12).with_label("City of residence"),
        SavVariable::numeric("income").with_measure(Measure::Scale),
    ])
    .with_file_label("Household survey 2024");
    ds.add_row(vec![
        SavValue::numeric(1.0),
        SavValue::numeric(1.0),
        SavValue::text("Lisbon"),
        SavValue::numeric(41250.75),
    ]);
    ds.add_row(vec![
        SavValue::numeric(2.0),
        SavValue::numeric(2.0),
        SavValue::text("Zürich"),
        SavValue::missing(),
    ]);
    ds
}

#[test]
fn test_basic_roundtrip_compressed() {
    let back = roundtrip(&survey());

    assert_eq!(back.file_label.as_deref(), Some("Household survey 2024"));
    assert_eq!(back.encoding.as_deref(), Some("UTF-8"));
    let names: Vec<&str> = back.variables.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, ["respondent_id", "sex", "city", "income"]);
    assert_eq!(back.rows, survey().rows);
}

#[test]
fn test_basic_roundtrip_uncompressed() {
    let back = roundtrip_with(&survey(), Compression::None);
    assert_eq!(back.rows, survey().rows);
}

#[test]
fn test_labels_and_measures_survive() {
    let back = roundtrip(&survey());

    let sex = back.variable("sex").unwrap();
    assert_eq!(sex.label.as_deref(), Some("Sex of respondent"));
    assert_eq!(sex.measure, Measure::Nominal);
    assert_eq!(sex.value_labels.len(), 2);
    assert_eq!(sex.value_labels[0].value, LabelValue::Number(1.0));
    assert_eq!(sex.value_labels[1].label, "Female");

    assert_eq!(back.variable("income").unwrap().measure, Measure::Scale);
    assert_eq!(back.variable("city").unwrap().measure, Measure::Unknown);
    assert_eq!(
        back.variable("city").unwrap().label.as_deref(),
        Some("City of residence")
    );
}

#[test]
fn test_string_value_labels() {
    let mut ds = SavDataset::with_variables(vec![
        SavVariable::string("code", 2).with_value_label("NA", "Not applicable"),
        SavVariable::string("category", 20).with_value_label("agriculture", "Primary sector"),
    ]);
    ds.add_row(vec![SavValue::text("NA"), SavValue::text("agriculture")]);

    let back = roundtrip(&ds);
    assert_eq!(
        back.variables[0].value_labels[0].value,
        LabelValue::Text("NA".to_string())
    );
    assert_eq!(
        back.variables[1].value_labels[0].value,
        LabelValue::Text("agriculture".to_string())
    );
    assert_eq!(back.variables[1].value_labels[0].label, "Primary sector");
}

#[test]
fn test_very_long_string() {
    let text: String = ('a'..='z').cycle().take(700).collect();
    let mut ds = SavDataset::with_variables(vec![
        SavVariable::numeric("before"),
        SavVariable::string("essay", 700),
        SavVariable::numeric("after"),
    ]);
    ds.add_row(vec![
        SavValue::numeric(1.0),
        SavValue::text(text.clone()),
        SavValue::numeric(2.0),
    ]);
    ds.add_row(vec![
        SavValue::numeric(3.0),
        SavValue::text("short"),
        SavValue::numeric(4.0),
    ]);

    for compression in [Compression::None, Compression::Bytecode] {
        let back = roundtrip_with(&ds, compression);
        assert_eq!(back.variables.len(), 3);
        assert_eq!(back.variables[1].width, VarWidth::String(700));
        assert_eq!(back.rows[0][1], SavValue::Text(text.clone()));
        assert_eq!(back.rows[1][1], SavValue::text("short"));
        assert_eq!(back.rows[1][2], SavValue::numeric(4.0));
    }
}

#[test]
fn test_long_names_preserved() {
    let mut ds = SavDataset::with_variables(vec![
        SavVariable::numeric("first_visit_systolic_pressure"),
        SavVariable::numeric("first_visit_diastolic_pressure"),
    ]);
    ds.add_row(vec![SavValue::numeric(120.0), SavValue::numeric(80.0)]);

    let back = roundtrip(&ds);
    assert_eq!(back.variables[0].name, "first_visit_systolic_pressure");
    assert_eq!(back.variables[1].name, "first_visit_diastolic_pressure");
    assert_eq!(back.rows[0], ds.rows[0]);
}

#[test]
fn test_user_missing_becomes_null() {
    let mut ds = SavDataset::with_variables(vec![
        SavVariable::numeric("q1").with_missing(MissingValues::Discrete(vec![
            LabelValue::Number(-9.0),
        ])),
        SavVariable::numeric("q2").with_missing(MissingValues::Range {
            low: 97.0,
            high: 99.0,
        }),
    ]);
    ds.add_row(vec![SavValue::numeric(-9.0), SavValue::numeric(98.0)]);
    ds.add_row(vec![SavValue::numeric(3.0), SavValue::numeric(5.0)]);

    let back = roundtrip(&ds);
    assert_eq!(back.rows[0], vec![SavValue::missing(), SavValue::missing()]);
    assert_eq!(back.rows[1], ds.rows[1]);
    assert_eq!(back.variables[1].missing, ds.variables[1].missing);

    let mut buffer = Vec::new();
    SavWriter::new(Cursor::new(&mut buffer))
        .write_dataset(&ds)
        .unwrap();
    let kept = SavReader::with_options(
        Cursor::new(&buffer),
        SavReaderOptions::new().keep_user_missing(),
    )
    .read_dataset()
    .unwrap();
    assert_eq!(kept.rows[0], ds.rows[0]);
}

#[test]
fn test_empty_dataset() {
    let ds = SavDataset::with_variables(vec![SavVariable::numeric("x")]);
    let back = roundtrip(&ds);
    assert_eq!(back.num_variables(), 1);
    assert_eq!(back.num_rows(), 0);
    assert_eq!(back.file_label, None);
}

#[test]
fn test_file_roundtrip_and_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("survey.sav");
    write_sav(&path, &survey()).unwrap();
    assert_eq!(read_sav(&path).unwrap().rows, survey().rows);

    let missing = dir.path().join("absent.sav");
    assert!(matches!(
        read_sav(&missing),
        Err(SavError::FileNotFound { .. })
    ));
}

#[test]
fn test_truncated_file_is_an_error() {
    let mut buffer = Vec::new();
    SavWriter::new(Cursor::new(&mut buffer))
        .write_dataset(&survey())
        .unwrap();
    buffer.truncate(300);
    assert!(SavReader::new(Cursor::new(&buffer)).read_dataset().is_err());
}

#[test]
fn test_not_a_sav_file() {
    let data = vec![b'x'; 512];
    let err = SavReader::new(Cursor::new(&data)).read_dataset().unwrap_err();
    assert!(matches!(err, SavError::InvalidFormat { .. }));
}

proptest! {
    #[test]
    fn prop_numeric_values_roundtrip(values in proptest::collection::vec(
        prop_oneof![
            Just(None),
            (-1000i32..1000).prop_map(|v| Some(f64::from(v))),
            (-1.0e9f64..1.0e9).prop_map(Some),
        ],
        0..40,
    )) {
        let mut ds = SavDataset::with_variables(vec![SavVariable::numeric("x")]);
        for value in &values {
            ds.add_row(vec![SavValue::Number(*value)]);
        }
        let back = roundtrip(&ds);
        prop_assert_eq!(back.rows, ds.rows);
    }

    #[test]
    fn prop_strings_roundtrip(values in proptest::collection::vec("[a-zA-Z0-9 ]{0,30}[a-z]", 1..20)) {
        let width = values.iter().map(String::len).max().unwrap_or(1) as u16;
        let mut ds = SavDataset::with_variables(vec![SavVariable::string("s", width)]);
        for value in &values {
            ds.add_row(vec![SavValue::text(value.clone())]);
        }
        let back = roundtrip(&ds);
        prop_assert_eq!(back.rows, ds.rows);
    }
}
