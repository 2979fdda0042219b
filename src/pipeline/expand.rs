//! Fan-out of multi-allelic rows into one row per allele.

use crate::error::{AnnotateError, Result};
use crate::table::Table;

/// Expands every row of `table` into one row per value of the `columns` cells.
///
/// Each named cell is split on `sep`; all of them must yield the same number of
/// values `k` on a given row. Row `i` of the fan-out takes the `i`-th value of
/// each named column and copies every other cell verbatim. Source row order and
/// value order are preserved.
pub fn expand_rows(table: &Table, columns: &[&str], sep: char) -> Result<Table> {
    let indices = columns
        .iter()
        .map(|name| table.require_column(name))
        .collect::<Result<Vec<_>>>()?;

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(table.len());
    let mut splits: Vec<Vec<&str>> = Vec::with_capacity(indices.len());

    for (row_idx, row) in table.rows().iter().enumerate() {
        splits.clear();
        splits.extend(indices.iter().map(|&i| row[i].split(sep).collect::<Vec<_>>()));

        let k = splits.first().map_or(1, Vec::len);
        if let Some((pos, found)) = splits
            .iter()
            .enumerate()
            .find(|(_, values)| values.len() != k)
        {
            return Err(AnnotateError::CardinalityMismatch {
                row: row_idx,
                column: columns[pos].to_string(),
                expected: k,
                found: found.len(),
            });
        }

        if k == 1 {
            rows.push(row.clone());
            continue;
        }

        rows.reserve(k);
        for value_idx in 0..k {
            let mut expanded = row.clone();
            for (split, &col) in splits.iter().zip(indices.iter()) {
                expanded[col] = split[value_idx].to_string();
            }
            rows.push(expanded);
        }
    }

    Table::from_rows(table.columns().to_vec(), rows)
}
