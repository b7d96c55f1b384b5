//! Conversion between [`DtaDataset`] and polars `DataFrame`.

use pandect_common::{ColumnKind, column_f64_values, column_kind, column_string_values};
use polars::prelude::{Column, DataFrame};

use crate::error::Result;
use crate::types::{DtaDataset, DtaType, DtaValue, DtaVariable};

impl DtaDataset {
    /// Build a DataFrame: numeric variables become `Float64` columns,
    /// string variables `String` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let columns = self
            .variables
            .iter()
            .enumerate()
            .map(|(idx, variable)| {
                if variable.dtype.is_numeric() {
                    let values: Vec<Option<f64>> = self.column(idx).map(DtaValue::as_f64).collect();
                    Column::new(variable.name.as_str().into(), values)
                } else {
                    let values: Vec<Option<&str>> =
                        self.column(idx).map(DtaValue::as_str).collect();
                    Column::new(variable.name.as_str().into(), values)
                }
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Build a dataset from a DataFrame.
    ///
    /// Integer columns get the smallest Stata integer type that holds them,
    /// floats become `double`, booleans `byte`. Strings longer than 2045
    /// bytes are stored as `strL`.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let mut variables = Vec::with_capacity(df.width());
        let mut columns: Vec<Vec<DtaValue>> = Vec::with_capacity(df.width());

        for column in df.get_columns() {
            let name = column.name().to_string();
            match column_kind(column.dtype()) {
                ColumnKind::Numeric | ColumnKind::Boolean => {
                    let values = column_f64_values(column);
                    let dtype = if column.dtype().is_float() {
                        DtaType::Double
                    } else {
                        integer_type(&values)
                    };
                    variables.push(DtaVariable::new(name, dtype));
                    columns.push(values.into_iter().map(DtaValue::Number).collect());
                }
                ColumnKind::Text => {
                    let values: Vec<String> = column_string_values(column)
                        .into_iter()
                        .map(Option::unwrap_or_default)
                        .collect();
                    let width = values.iter().map(String::len).max().unwrap_or(1).max(1);
                    let dtype = if width > usize::from(DtaType::MAX_STR) {
                        DtaType::StrL
                    } else {
                        DtaType::Str(width as u16)
                    };
                    variables.push(DtaVariable::new(name, dtype));
                    columns.push(values.into_iter().map(DtaValue::Text).collect());
                }
            }
        }

        let rows = (0..df.height())
            .map(|row| columns.iter().map(|column| column[row].clone()).collect())
            .collect();

        Ok(Self {
            rows,
            ..Self::with_variables(variables)
        })
    }
}

fn integer_type(values: &[Option<f64>]) -> DtaType {
    let present = values.iter().flatten().copied();
    let (min, max) = present.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    DtaType::smallest_integer(min, max).unwrap_or(DtaType::Double)
}
