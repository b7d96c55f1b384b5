//! Write-then-read tests for `.dta` files.

use std::io::Cursor;

use chrono::NaiveDate;
use pandect_dta::{
    DtaDataset, DtaError, DtaReader, DtaType, DtaValue, DtaVariable, DtaWriter, DtaWriterOptions,
    LabelSet, read_dta, write_dta,
};

fn roundtrip(dataset: &DtaDataset) -> DtaDataset {
    let mut buffer = Vec::new();
    let created = NaiveDate::from_ymd_opt(2024, 3, 7)
        .unwrap()
        .and_hms_opt(9, 5, 0)
        .unwrap();
    DtaWriter::with_options(
        Cursor::new(&mut buffer),
        DtaWriterOptions::new().with_created(created),
    )
    .write_dataset(dataset)
    .unwrap();
    DtaReader::new(Cursor::new(&buffer)).read_dataset().unwrap()
}

fn panel() -> DtaDataset {
    let mut ds = DtaDataset::with_variables(vec![
        DtaVariable::new("id", DtaType::Long),
        DtaVariable::new("sex", DtaType::Byte)
            .with_label("Sex of respondent")
            .with_value_label("sexlbl"),
        DtaVariable::new("wave", DtaType::Int),
        DtaVariable::new("weight", DtaType::Float),
        DtaVariable::new("income", DtaType::Double),
        DtaVariable::new("city", DtaType::Str(12)),
    ])
    .with_label("Panel study")
    .with_label_set(
        LabelSet::new("sexlbl")
            .with_entry(1, "Male")
            .with_entry(2, "Female"),
    );
    ds.add_row(vec![
        DtaValue::numeric(100_001.0),
        DtaValue::numeric(1.0),
        DtaValue::numeric(2019.0),
        DtaValue::numeric(1.25),
        DtaValue::numeric(41250.75),
        DtaValue::text("Lisbon"),
    ]);
    ds.add_row(vec![
        DtaValue::numeric(100_002.0),
        DtaValue::missing(),
        DtaValue::missing(),
        DtaValue::missing(),
        DtaValue::missing(),
        DtaValue::text("Zürich"),
    ]);
    ds
}

#[test]
fn test_basic_roundtrip() {
    let back = roundtrip(&panel());
    assert_eq!(back.release, 118);
    assert_eq!(back.label.as_deref(), Some("Panel study"));
    assert_eq!(back.timestamp.as_deref(), Some("07 Mar 2024 09:05"));
    assert_eq!(back.variables, panel().variables);
    assert_eq!(back.rows, panel().rows);
}

#[test]
fn test_value_labels_roundtrip() {
    let back = roundtrip(&panel());
    let sex = back.variable("sex").unwrap();
    assert_eq!(sex.label.as_deref(), Some("Sex of respondent"));
    let set = back.labels_for(sex).unwrap();
    assert_eq!(
        set.entries,
        vec![(1, "Male".to_string()), (2, "Female".to_string())]
    );
    assert!(back.labels_for(back.variable("id").unwrap()).is_none());
}

#[test]
fn test_strl_roundtrip() {
    let long = "lorem ipsum ".repeat(300);
    let mut ds = DtaDataset::with_variables(vec![
        DtaVariable::new("n", DtaType::Byte),
        DtaVariable::new("notes", DtaType::StrL),
    ]);
    ds.add_row(vec![DtaValue::numeric(1.0), DtaValue::text(long.clone())]);
    ds.add_row(vec![DtaValue::numeric(2.0), DtaValue::text("")]);
    ds.add_row(vec![DtaValue::numeric(3.0), DtaValue::text("short")]);

    let back = roundtrip(&ds);
    assert_eq!(back.rows[0][1], DtaValue::Text(long));
    assert_eq!(back.rows[1][1], DtaValue::text(""));
    assert_eq!(back.rows[2][1], DtaValue::text("short"));
}

#[test]
fn test_empty_dataset() {
    let ds = DtaDataset::with_variables(vec![DtaVariable::new("x", DtaType::Double)]);
    let back = roundtrip(&ds);
    assert_eq!(back.variables.len(), 1);
    assert_eq!(back.num_rows(), 0);
    assert_eq!(back.label, None);
}

#[test]
fn test_invalid_name_rejected() {
    let ds = DtaDataset::with_variables(vec![DtaVariable::new("first name", DtaType::Double)]);
    let err = DtaWriter::new(Cursor::new(Vec::new()))
        .write_dataset(&ds)
        .unwrap_err();
    assert!(matches!(err, DtaError::InvalidVariableName { .. }));
}

#[test]
fn test_file_roundtrip_and_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.dta");
    write_dta(&path, &panel()).unwrap();
    assert_eq!(read_dta(&path).unwrap().rows, panel().rows);

    assert!(matches!(
        read_dta(&dir.path().join("absent.dta")),
        Err(DtaError::FileNotFound { .. })
    ));
}

#[test]
fn test_truncated_file_is_an_error() {
    let mut buffer = Vec::new();
    DtaWriter::new(Cursor::new(&mut buffer))
        .write_dataset(&panel())
        .unwrap();
    buffer.truncate(buffer.len() - 40);
    assert!(DtaReader::new(Cursor::new(&buffer)).read_dataset().is_err());
}
