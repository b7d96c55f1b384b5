//! Stata data file writing with metadata.

use std::path::Path;

use pandect_dta::{DtaDataset, LabelSet, write_dta};
use pandect_model::{Metadata, ValueCode};
use polars::prelude::DataFrame;

use crate::error::Result;

/// Builds a Stata dataset from `df`, applying variable labels, integer value
/// labels and the dataset label from `meta`.
///
/// Labelled numeric variables use the set name recorded in `meta`, so
/// variables that shared a set when loaded share it again; variables without
/// one get a set named after them. Stata labels integers only, so text codes
/// and non-integral or out-of-range numbers are dropped.
pub fn dta_dataset(df: &DataFrame, meta: &Metadata) -> Result<DtaDataset> {
    let mut dataset = DtaDataset::from_dataframe(df)?;
    dataset.label = meta.file_label.clone();

    let mut label_sets: Vec<LabelSet> = Vec::new();
    for variable in &mut dataset.variables {
        if let Some(label) = meta.label_for(&variable.name) {
            variable.label = Some(label.to_string());
        }

        let Some(labels) = meta.value_labels_for(&variable.name) else {
            continue;
        };
        if !variable.dtype.is_numeric() {
            tracing::debug!(variable = %variable.name, "skipping value labels on string variable");
            continue;
        }

        let entries: Vec<(i32, String)> = labels
            .iter()
            .filter_map(|(code, label)| match integer_code(code) {
                Some(value) => Some((value, label.clone())),
                None => {
                    tracing::debug!(
                        variable = %variable.name,
                        code = %code,
                        "skipping value label that is not an integer"
                    );
                    None
                }
            })
            .collect();
        if entries.is_empty() {
            continue;
        }

        let shared = meta
            .label_set_for(&variable.name)
            .unwrap_or(&variable.name)
            .to_string();
        let name = match label_sets.iter().find(|set| set.name == shared) {
            None => shared,
            Some(set) if set.entries == entries => {
                variable.value_label = Some(shared);
                continue;
            }
            // Same set name, different labels: give this variable its own set.
            Some(_) if !label_sets.iter().any(|set| set.name == variable.name) => {
                variable.name.clone()
            }
            Some(_) => {
                tracing::debug!(
                    variable = %variable.name,
                    set = %shared,
                    "skipping value labels that conflict with an existing set"
                );
                continue;
            }
        };
        let mut set = LabelSet::new(name.clone());
        set.entries = entries;
        label_sets.push(set);
        variable.value_label = Some(name);
    }
    dataset.label_sets = label_sets;
    Ok(dataset)
}

fn integer_code(code: &ValueCode) -> Option<i32> {
    let n = code.as_number()?;
    let fits = n.fract() == 0.0 && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX);
    fits.then_some(n as i32)
}

/// Writes `df` to a Stata data file.
pub fn write_dta_file(df: &DataFrame, path: &Path, meta: &Metadata) -> Result<()> {
    let dataset = dta_dataset(df, meta)?;
    write_dta(path, &dataset)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_metadata_applied() {
        let df = df! {
            "sex" => [1i64, 2],
            "city" => ["NY", "LA"],
        }
        .unwrap();
        let meta = Metadata::new()
            .with_label("sex", "Sex")
            .with_value_label("sex", 1.0, "Male")
            .with_value_label("sex", 1.5, "Half")
            .with_value_label("sex", "x", "Text")
            .with_value_label("city", "NY", "New York")
            .with_file_label("Survey");

        let dataset = dta_dataset(&df, &meta).unwrap();
        let sex = dataset.variable("sex").unwrap();
        assert_eq!(sex.label.as_deref(), Some("Sex"));
        assert_eq!(sex.value_label.as_deref(), Some("sex"));
        assert_eq!(
            dataset.labels_for(sex).map(|set| set.entries.clone()),
            Some(vec![(1, "Male".to_string())])
        );
        assert!(dataset.variable("city").unwrap().value_label.is_none());
        assert_eq!(dataset.label_sets.len(), 1);
        assert_eq!(dataset.label.as_deref(), Some("Survey"));
    }

    #[test]
    fn test_shared_label_set_written_once() {
        let df = df! {
            "smoker" => [1i64, 0],
            "drinker" => [0i64, 1],
            "urban" => [1i64, 1],
        }
        .unwrap();
        let meta = Metadata::new()
            .with_value_label("smoker", 0.0, "No")
            .with_value_label("smoker", 1.0, "Yes")
            .with_label_set("smoker", "yesno")
            .with_value_label("drinker", 0.0, "No")
            .with_value_label("drinker", 1.0, "Yes")
            .with_label_set("drinker", "yesno")
            .with_value_label("urban", 1.0, "Town")
            .with_label_set("urban", "yesno");

        let dataset = dta_dataset(&df, &meta).unwrap();
        let names: Vec<&str> = dataset.label_sets.iter().map(|set| set.name.as_str()).collect();
        assert_eq!(names, vec!["yesno", "urban"]);
        assert_eq!(dataset.variable("smoker").unwrap().value_label.as_deref(), Some("yesno"));
        assert_eq!(dataset.variable("drinker").unwrap().value_label.as_deref(), Some("yesno"));
        assert_eq!(dataset.variable("urban").unwrap().value_label.as_deref(), Some("urban"));
    }

    #[test]
    fn test_integer_code() {
        assert_eq!(integer_code(&ValueCode::Number(3.0)), Some(3));
        assert_eq!(integer_code(&ValueCode::Number(3.5)), None);
        assert_eq!(integer_code(&ValueCode::Number(1e12)), None);
        assert_eq!(integer_code(&ValueCode::from("3")), None);
    }
}
