//! Conversion between [`SavDataset`] and polars `DataFrame`.

use pandect_common::{ColumnKind, column_f64_values, column_kind, column_string_values};
use polars::prelude::{Column, DataFrame};

use crate::error::Result;
use crate::types::{SavDataset, SavFormat, SavValue, SavVariable, VarWidth};

impl SavDataset {
    /// Build a DataFrame: numeric variables become `Float64` columns,
    /// string variables `String` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns = self
            .variables
            .iter()
            .enumerate()
            .map(|(idx, variable)| match variable.width {
                VarWidth::Numeric => {
                    let values: Vec<Option<f64>> = self.column(idx).map(SavValue::as_f64).collect();
                    Column::new(variable.name.as_str().into(), values)
                }
                VarWidth::String(_) => {
                    let values: Vec<Option<&str>> =
                        self.column(idx).map(SavValue::as_str).collect();
                    Column::new(variable.name.as_str().into(), values)
                }
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Build a dataset from a DataFrame. Integer and float columns become
    /// numeric variables; booleans are stored as 0/1; everything else is a
    /// string sized to its longest value.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut variables = Vec::with_capacity(df.width());
        let mut columns: Vec<Vec<SavValue>> = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let name = column.name().to_string();
            match column_kind(column.dtype()) {
                ColumnKind::Numeric | ColumnKind::Boolean => {
                    let decimals = if column.dtype().is_float() { 2 } else { 0 };
                    variables.push(
                        SavVariable::numeric(name).with_format(SavFormat::numeric(8, decimals)),
                    );
                    columns.push(
                        column_f64_values(column)
                            .into_iter()
                            .map(SavValue::Number)
                            .collect(),
                    );
                }
                ColumnKind::Text => {
                    let values: Vec<String> = column_string_values(column)
                        .into_iter()
                        .map(Option::unwrap_or_default)
                        .collect();
                    let width = values
                        .iter()
                        .map(String::len)
                        .max()
                        .unwrap_or(1)
                        .clamp(1, usize::from(VarWidth::MAX_STRING));
                    variables.push(SavVariable::string(name, width as u16));
                    columns.push(values.into_iter().map(SavValue::Text).collect());
                }
            }
        }

        let rows = (0..df.height())
            .map(|row| columns.iter().map(|column| column[row].clone()).collect())
            .collect();

        Ok(Self {
            file_label: None,
            encoding: Some("UTF-8".to_string()),
            variables,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataframe_roundtrip() {
        let df = DataFrame::new(vec![
            Column::new("id".into(), [1i64, 2, 3]),
            Column::new("name".into(), [Some("Alice"), None, Some("Bob")]),
            Column::new("score".into(), [Some(1.5), None, Some(3.0)]),
        ])
        .unwrap();

        let ds = SavDataset::from_dataframe(&df).unwrap();
        assert_eq!(ds.variables[0].format, SavFormat::numeric(8, 0));
        assert_eq!(ds.variables[1].width, VarWidth::String(5));
        assert_eq!(ds.rows[1][1], SavValue::text(""));
        assert_eq!(ds.rows[1][2], SavValue::missing());

        let back = ds.to_dataframe().unwrap();
        assert_eq!(back.shape(), (3, 3));
        let score = back.column("score").unwrap();
        assert_eq!(column_f64_values(score), vec![Some(1.5), None, Some(3.0)]);
    }
}
