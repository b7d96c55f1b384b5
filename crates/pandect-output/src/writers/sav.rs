//! SPSS system file writing with metadata.

use std::path::Path;

use pandect_model::{MeasureLevel, Metadata, ValueCode};
use pandect_sav::{LabelValue, Measure, SavDataset, ValueLabel, write_sav};
use polars::prelude::DataFrame;

use crate::error::Result;

/// Maps a shared measurement level to the SPSS measure.
pub fn sav_measure(level: MeasureLevel) -> Measure {
    match level {
        MeasureLevel::Nominal => Measure::Nominal,
        MeasureLevel::Ordinal => Measure::Ordinal,
        MeasureLevel::Continuous => Measure::Scale,
        MeasureLevel::Unknown => Measure::Unknown,
    }
}

/// Builds an SPSS dataset from `df`, applying variable labels, value labels,
/// measures and the file label from `meta`.
///
/// Value labels whose code type does not match the variable (a text code on
/// a numeric variable or the reverse) are dropped.
pub fn sav_dataset(df: &DataFrame, meta: &Metadata) -> Result<SavDataset> {
    let mut dataset = SavDataset::from_dataframe(df)?;
    dataset.file_label = meta.file_label.clone();

    for variable in &mut dataset.variables {
        if let Some(label) = meta.label_for(&variable.name) {
            variable.label = Some(label.to_string());
        }
        variable.measure = sav_measure(meta.measure_for(&variable.name));

        let Some(labels) = meta.value_labels_for(&variable.name) else {
            continue;
        };
        let numeric = variable.is_numeric();
        variable.value_labels = labels
            .iter()
            .filter_map(|(code, label)| {
                let value = match code {
                    ValueCode::Number(n) if numeric => LabelValue::Number(*n),
                    ValueCode::Text(t) if !numeric => LabelValue::Text(t.clone()),
                    _ => {
                        tracing::debug!(
                            variable = %variable.name,
                            code = %code,
                            "value label code does not match variable type"
                        );
                        return None;
                    }
                };
                Some(ValueLabel {
                    value,
                    label: label.clone(),
                })
            })
            .collect();
    }
    Ok(dataset)
}

/// Writes `df` to an SPSS system file.
pub fn write_sav_file(df: &DataFrame, path: &Path, meta: &Metadata) -> Result<()> {
    let dataset = sav_dataset(df, meta)?;
    write_sav(path, &dataset)?;
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
            .with_value_label("sex", "bogus", "Ignored")
            .with_value_label("city", "NY", "New York")
            .with_measure("sex", MeasureLevel::Nominal)
            .with_file_label("Survey");

        let dataset = sav_dataset(&df, &meta).unwrap();
        let sex = dataset.variable("sex").unwrap();
        assert_eq!(sex.label.as_deref(), Some("Sex"));
        assert_eq!(sex.measure, Measure::Nominal);
        assert_eq!(sex.value_labels.len(), 1);
        let city = dataset.variable("city").unwrap();
        assert_eq!(city.value_labels[0].value, LabelValue::Text("NY".to_string()));
        assert_eq!(dataset.file_label.as_deref(), Some("Survey"));
    }

    #[test]
    fn test_continuous_is_scale() {
        assert_eq!(sav_measure(MeasureLevel::Continuous), Measure::Scale);
    }
}
