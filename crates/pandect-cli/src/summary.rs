//! Table rendering for `pandect info`.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use pandect::{MeasureLevel, Metadata};
use polars::prelude::DataFrame;

/// What `info` reports about one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub nulls: usize,
    pub label: Option<String>,
    pub measure: MeasureLevel,
    pub value_labels: usize,
}

/// Collect per-column information in frame order.
pub fn describe_columns(df: &DataFrame, meta: &Metadata) -> Vec<ColumnInfo> {
    df.get_columns()
        .iter()
        .map(|column| {
            let name = column.name().to_string();
            ColumnInfo {
                dtype: column.dtype().to_string(),
                nulls: column.null_count(),
                label: meta.label_for(&name).map(str::to_string),
                measure: meta.measure_for(&name),
                value_labels: meta.value_labels_for(&name).map_or(0, pandect::ValueLabels::len),
                name,
            }
        })
        .collect()
}

/// Build the column table.
pub fn info_table(columns: &[ColumnInfo]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Nulls"),
        header_cell("Label"),
        header_cell("Measure"),
        header_cell("Value labels"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    for column in columns {
        table.add_row(vec![
            Cell::new(&column.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&column.dtype),
            count_cell(column.nulls),
            column
                .label
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            match column.measure {
                MeasureLevel::Unknown => dim_cell("-"),
                measure => Cell::new(measure),
            },
            count_cell(column.value_labels),
        ]);
    }
    table
}

/// Print the dataset summary and column table to stdout.
pub fn print_info(source: &str, df: &DataFrame, meta: &Metadata) {
    println!("Source: {source}");
    println!("Shape: {} rows x {} columns", df.height(), df.width());
    if let Some(label) = &meta.file_label {
        println!("Label: {label}");
    }
    if let Some(encoding) = &meta.file_encoding {
        println!("Encoding: {encoding}");
    }
    let columns = describe_columns(df, meta);
    println!("{}", info_table(&columns));
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
