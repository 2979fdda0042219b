//! Decoding of packed `key=value;key=value` columns such as VCF INFO.

use crate::error::{AnnotateError, Result};
use crate::table::Table;
use std::collections::HashMap;

/// Splits one packed string into its `(key, value)` pairs, in source order.
///
/// An entry without `kv_sep` is a flag and decodes to `(key, "")`.
pub fn decode_packed(packed: &str, entry_sep: char, kv_sep: char) -> Result<Vec<(String, String)>> {
    if packed.is_empty() {
        return Err(AnnotateError::MalformedInput("empty packed field".into()));
    }

    packed
        .split(entry_sep)
        .map(|entry| {
            let (key, value) = entry.split_once(kv_sep).unwrap_or((entry, ""));
            if key.is_empty() {
                return Err(AnnotateError::MalformedInput(format!(
                    "entry '{}' has an empty key",
                    entry
                )));
            }
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Inverse of [`decode_packed`]; empty values are written back as flags.
pub fn encode_packed(pairs: &[(String, String)], entry_sep: char, kv_sep: char) -> String {
    let mut out = String::new();
    for (i, (key, value)) in pairs.iter().enumerate() {
        if i > 0 {
            out.push(entry_sep);
        }
        out.push_str(key);
        if !value.is_empty() {
            out.push(kv_sep);
            out.push_str(value);
        }
    }
    out
}

/// Decodes `column` of `table` into a new table with one column per key.
///
/// Column order follows the keys of the first row. Every other row must carry
/// the same key set; values are placed by key name, so rows listing their keys
/// in a different order still line up.
pub fn decode_column(table: &Table, column: &str, entry_sep: char, kv_sep: char) -> Result<Table> {
    let packed = table.column(column)?;
    let Some(first) = packed.first() else {
        return Ok(Table::new(Vec::new()));
    };

    let header: Vec<String> = decode_packed(first, entry_sep, kv_sep)
        .map_err(|e| row_error(0, e))?
        .into_iter()
        .map(|(k, _)| k)
        .collect();
    let slots: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();
    if slots.len() != header.len() {
        return Err(AnnotateError::MalformedInput(format!(
            "row 0: duplicate key in {} field",
            column
        )));
    }

    let mut decoded = Table::with_capacity(header.clone(), packed.len());
    for (row_idx, value) in packed.iter().enumerate() {
        let pairs = decode_packed(value, entry_sep, kv_sep).map_err(|e| row_error(row_idx, e))?;
        if pairs.len() != header.len() {
            return Err(key_set_mismatch(row_idx, column, &header, &pairs));
        }

        let mut row: Vec<Option<String>> = vec![None; header.len()];
        for (key, val) in pairs.iter() {
            match slots.get(key.as_str()) {
                Some(&slot) if row[slot].is_none() => row[slot] = Some(val.clone()),
                _ => return Err(key_set_mismatch(row_idx, column, &header, &pairs)),
            }
        }
        // Lengths match and no slot was filled twice, so every slot is set
        decoded.push_row(row.into_iter().map(Option::unwrap_or_default).collect())?;
    }

    Ok(decoded)
}

fn row_error(row: usize, err: AnnotateError) -> AnnotateError {
    match err {
        AnnotateError::MalformedInput(msg) => {
            AnnotateError::MalformedInput(format!("row {}: {}", row, msg))
        }
        other => other,
    }
}

fn key_set_mismatch(
    row: usize,
    column: &str,
    header: &[String],
    pairs: &[(String, String)],
) -> AnnotateError {
    let found: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    AnnotateError::MalformedInput(format!(
        "row {}: {} keys [{}] differ from first row keys [{}]",
        row,
        column,
        found.join(","),
        header.join(",")
    ))
}
