//! SPSS system file reading.

use std::path::Path;

use pandect_model::{MeasureLevel, Metadata, ValueCode, ValueLabels};
use pandect_sav::{LabelValue, Measure, SavDataset, read_sav};
use polars::prelude::DataFrame;

use crate::error::Result;

/// Reads a `.sav` file into a DataFrame plus its dictionary metadata.
///
/// User-missing values are loaded as nulls.
pub fn read_sav_file(path: &Path) -> Result<(DataFrame, Metadata)> {
    let dataset = read_sav(path)?;
    let df = dataset.to_dataframe()?;
    Ok((df, metadata_from_sav(&dataset)))
}

/// Maps an SPSS measure to the shared measurement level.
pub fn measure_level(measure: Measure) -> MeasureLevel {
    match measure {
        Measure::Nominal => MeasureLevel::Nominal,
        Measure::Ordinal => MeasureLevel::Ordinal,
        Measure::Scale => MeasureLevel::Continuous,
        Measure::Unknown => MeasureLevel::Unknown,
    }
}

/// Collects variable labels, value labels and declared measures.
/// Undeclared measures are not recorded.
pub fn metadata_from_sav(dataset: &SavDataset) -> Metadata {
    let mut meta = Metadata::new();
    meta.file_label = dataset.file_label.clone().filter(|label| !label.is_empty());
    meta.file_encoding = dataset.encoding.clone();

    for variable in &dataset.variables {
        if let Some(label) = &variable.label {
            meta.column_labels
                .insert(variable.name.clone(), label.clone());
        }

        if !variable.value_labels.is_empty() {
            let labels: ValueLabels = variable
                .value_labels
                .iter()
                .map(|vl| {
                    let code = match &vl.value {
                        LabelValue::Number(n) => ValueCode::Number(*n),
                        LabelValue::Text(t) => ValueCode::Text(t.trim_end().to_string()),
                    };
                    (code, vl.label.clone())
                })
                .collect();
            meta.value_labels.insert(variable.name.clone(), labels);
        }

        let level = measure_level(variable.measure);
        if level != MeasureLevel::Unknown {
            meta.measures.insert(variable.name.clone(), level);
        }
    }
    meta
}
