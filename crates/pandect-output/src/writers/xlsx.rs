//! Workbook writing via rust_xlsxwriter.

use std::path::Path;

use pandect_common::{ColumnKind, column_f64_values, column_kind, column_string_values};
use polars::prelude::{AnyValue, Column, DataFrame};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::error::{Result, SaveError};

/// Writes `df` to a single-worksheet workbook.
///
/// Row 0 holds the column names. Numbers and booleans keep their cell type;
/// nulls leave the cell empty.
pub fn write_workbook(df: &DataFrame, path: &Path) -> Result<()> {
    let spreadsheet_error = |e: XlsxError| SaveError::Spreadsheet {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, column) in df.get_columns().iter().enumerate() {
        let col = u16::try_from(col).map_err(|_| SaveError::Spreadsheet {
            path: path.to_path_buf(),
            message: format!("too many columns: {}", df.width()),
        })?;
        write_column(sheet, col, column).map_err(spreadsheet_error)?;
    }
    workbook.save(path).map_err(spreadsheet_error)?;
    Ok(())
}

fn write_column(sheet: &mut Worksheet, col: u16, column: &Column) -> std::result::Result<(), XlsxError> {
    sheet.write_string(0, col, column.name().as_str())?;

    let rows = (1u32..).zip(0..column.len());
    match column_kind(column.dtype()) {
        ColumnKind::Numeric => {
            let values = column_f64_values(column);
            for (row, idx) in rows {
                if let Some(value) = values[idx] {
                    sheet.write_number(row, col, value)?;
                }
            }
        }
        ColumnKind::Boolean => {
            for (row, idx) in rows {
                if let Ok(AnyValue::Boolean(value)) = column.get(idx) {
                    sheet.write_boolean(row, col, value)?;
                }
            }
        }
        ColumnKind::Text => {
            let values = column_string_values(column);
            for (row, idx) in rows {
                if let Some(value) = &values[idx] {
                    sheet.write_string(row, col, value)?;
                }
            }
        }
    }
    Ok(())
}
