//! Reading of tab-separated VCF text into a [`Table`].

use crate::constants::{
    ALT_COLUMN, CHROM_COLUMN, INFO_COLUMN, META_LINE_PREFIX, POS_COLUMN, REF_COLUMN,
};
use crate::error::{AnnotateError, Result};
use crate::table::Table;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Columns every input file must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [CHROM_COLUMN, POS_COLUMN, REF_COLUMN, ALT_COLUMN, INFO_COLUMN];

pub fn read_vcf(path: &Path, header_rows: Option<usize>) -> Result<Table> {
    let file = File::open(path).map_err(|e| {
        AnnotateError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open '{}': {}", path.display(), e),
        ))
    })?;
    let table = parse_vcf(BufReader::new(file), header_rows)?;
    info!("Loaded {} variant lines from {}", table.len(), path.display());
    Ok(table)
}

/// Parses VCF text.
///
/// With `header_rows = Some(n)` the first `n` lines are skipped and the next
/// line is the column header. With `None`, all leading `##` meta lines are
/// skipped instead.
pub fn parse_vcf<R: BufRead>(reader: R, header_rows: Option<usize>) -> Result<Table> {
    let mut lines = reader.lines().enumerate();

    let mut header_line = None;
    for (line_no, line) in lines.by_ref() {
        let line = line?;
        let skip = match header_rows {
            Some(n) => line_no < n,
            None => line.starts_with(META_LINE_PREFIX),
        };
        if !skip {
            header_line = Some(line);
            break;
        }
    }
    let header_line = header_line
        .ok_or_else(|| AnnotateError::MalformedInput("no header line found".into()))?;

    let columns: Vec<String> = split_fields(&header_line).map(str::to_string).collect();
    for required in REQUIRED_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            return Err(AnnotateError::MalformedInput(format!(
                "required column '{}' is missing from header [{}]",
                required,
                columns.join(", ")
            )));
        }
    }
    debug!("Header columns: {:?}", columns);

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: Vec<String> = split_fields(&line).map(str::to_string).collect();
        if row.len() != columns.len() {
            return Err(AnnotateError::MalformedInput(format!(
                "line {} has {} fields, header has {}",
                line_no + 1,
                row.len(),
                columns.len()
            )));
        }
        rows.push(row);
    }

    Table::from_rows(columns, rows)
}

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.trim_end_matches('\r').split('\t')
}
