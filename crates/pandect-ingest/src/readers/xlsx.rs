//! Workbook reading via calamine.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, XlsxError, open_workbook};
use polars::prelude::*;

use crate::error::{LoadError, Result};

/// Storage class inferred for one worksheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Empty,
    Int,
    Float,
    Bool,
    Text,
}

impl CellKind {
    fn of(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellKind::Empty,
            Data::Int(_) => CellKind::Int,
            Data::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => CellKind::Int,
            Data::Float(_) | Data::DateTime(_) => CellKind::Float,
            Data::Bool(_) => CellKind::Bool,
            _ => CellKind::Text,
        }
    }

    /// Widens two observations to a kind that holds both.
    fn merge(self, other: CellKind) -> CellKind {
        match (self, other) {
            (a, b) if a == b => a,
            (CellKind::Empty, b) => b,
            (a, CellKind::Empty) => a,
            (CellKind::Int, CellKind::Float) | (CellKind::Float, CellKind::Int) => CellKind::Float,
            _ => CellKind::Text,
        }
    }
}

/// Reads the first worksheet of an `.xlsx` workbook.
///
/// The first non-blank row holds column names. Blank columns to the left of
/// the data are kept as all-null columns, and a blank worksheet gives an
/// empty DataFrame. Column dtypes are inferred from the cells below the
/// header: all integral numbers give `Int64`, any other numbers `Float64`,
/// all booleans `Boolean`, anything mixed `String`. Empty cells are null.
pub fn read_first_worksheet(path: &Path) -> Result<DataFrame> {
    let spreadsheet_error = |message: String| LoadError::Spreadsheet {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook: Xlsx<BufReader<File>> =
        open_workbook(path).map_err(|e: XlsxError| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::EmptyWorksheet {
            path: path.to_path_buf(),
        })?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    // The used range starts at the first non-empty cell.
    let lead = range.start().map_or(0, |(_, col)| col as usize);
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let header: Vec<Data> = std::iter::repeat_n(Data::Empty, lead)
        .chain(header.iter().cloned())
        .collect();
    let names = column_names(&header);
    let body: Vec<&[Data]> = rows.collect();

    let columns = names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| {
                    idx.checked_sub(lead)
                        .and_then(|idx| row.get(idx))
                        .unwrap_or(&Data::Empty)
                })
                .collect();
            build_column(name, &cells)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Header cells rendered as names. Blank headers become `column_N` and
/// repeats get a numeric suffix so names stay unique.
fn column_names(header: &[Data]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let base = match cell {
            Data::Empty => format!("column_{}", idx + 1),
            Data::Float(v) => number_name(*v),
            other => other.to_string(),
        };
        let mut name = base.clone();
        let mut n = 1;
        while names.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        names.push(name);
    }
    names
}

fn number_name(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

fn build_column(name: &str, cells: &[&Data]) -> Column {
    let kind = cells
        .iter()
        .fold(CellKind::Empty, |kind, cell| kind.merge(CellKind::of(cell)));

    match kind {
        CellKind::Int => {
            let values: Vec<Option<i64>> = cells.iter().map(|cell| cell_i64(cell)).collect();
            Column::new(name.into(), values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|cell| cell_f64(cell)).collect();
            Column::new(name.into(), values)
        }
        CellKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Column::new(name.into(), values)
        }
        CellKind::Text | CellKind::Empty => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|cell| match cell {
                    Data::Empty => None,
                    other => Some(other.to_string()),
                })
                .collect();
            Column::new(name.into(), values)
        }
    }
}

fn cell_i64(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(v) => Some(*v),
        Data::Float(v) => Some(*v as i64),
        _ => None,
    }
}

fn cell_f64(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(v) => Some(*v as f64),
        Data::Float(v) => Some(*v),
        Data::DateTime(dt) => Some(dt.as_f64()),
        _ => None,
    }
}
