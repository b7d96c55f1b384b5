//! Delimited text writing.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use polars::prelude::*;

use crate::error::{Result, SaveError};

/// Writes `df` as delimited text with a header row and no index column.
/// Nulls are written as empty fields.
pub fn write_delimited(df: &mut DataFrame, path: &Path, separator: u8) -> Result<()> {
    let file = File::create(path)?;
    CsvWriter::new(BufWriter::new(file))
        .include_header(true)
        .with_separator(separator)
        .finish(df)
        .map_err(|e| SaveError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_tab_separated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tsv");
        let mut df = df! {
            "id" => [1i64, 2],
            "name" => [Some("Alice"), None],
        }
        .unwrap();

        write_delimited(&mut df, &path, b'\t').unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "id\tname\n1\tAlice\n2\t\n");
    }
}
