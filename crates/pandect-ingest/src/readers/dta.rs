//! Stata data file reading.

use std::path::Path;

use pandect_dta::{DtaDataset, read_dta};
use pandect_model::{Metadata, ValueCode, ValueLabels};
use polars::prelude::DataFrame;

use crate::error::Result;

/// Reads a `.dta` file into a DataFrame plus its variable and value labels.
pub fn read_dta_file(path: &Path) -> Result<(DataFrame, Metadata)> {
    let dataset = read_dta(path)?;
    let df = dataset.to_dataframe()?;
    Ok((df, metadata_from_dta(&dataset)))
}

/// Collects variable labels, attached value-label sets (with their set
/// names) and the dataset label. Stata has no measurement levels.
pub fn metadata_from_dta(dataset: &DtaDataset) -> Metadata {
    let mut meta = Metadata::new();
    meta.file_label = dataset.label.clone();
    meta.file_encoding = Some(
        if dataset.release >= 118 {
            "UTF-8"
        } else {
            "windows-1252"
        }
        .to_string(),
    );

    for variable in &dataset.variables {
        if let Some(label) = &variable.label {
            meta.column_labels
                .insert(variable.name.clone(), label.clone());
        }
        if let Some(set) = dataset.labels_for(variable) {
            let labels: ValueLabels = set
                .entries
                .iter()
                .map(|(value, label)| (ValueCode::from(*value), label.clone()))
                .collect();
            meta.value_labels.insert(variable.name.clone(), labels);
            meta.label_sets
                .insert(variable.name.clone(), set.name.clone());
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use pandect_dta::{DtaType, DtaVariable, LabelSet};

    #[test]
    fn test_metadata_from_dta() {
        let dataset = DtaDataset::with_variables(vec![
            DtaVariable::new("sex", DtaType::Byte)
                .with_label("Sex")
                .with_value_label("sexlbl"),
            DtaVariable::new("name", DtaType::Str(10)),
        ])
        .with_label("Survey")
        .with_label_set(LabelSet::new("sexlbl").with_entry(1, "Male").with_entry(2, "Female"));

        let meta = metadata_from_dta(&dataset);
        assert_eq!(meta.label_for("sex"), Some("Sex"));
        assert_eq!(meta.value_labels_for("sex").map(ValueLabels::len), Some(2));
        assert!(meta.value_labels_for("name").is_none());
        assert_eq!(meta.label_set_for("sex"), Some("sexlbl"));
        assert!(meta.measures.is_empty());
        assert_eq!(meta.file_label.as_deref(), Some("Survey"));
        assert_eq!(meta.file_encoding.as_deref(), Some("UTF-8"));
    }
}
