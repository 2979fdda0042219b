use crate::constants::{output_columns, ANNOTATED_SUFFIX};
use crate::error::Result;
use crate::table::Table;
use crate::types::{AlleleFrequency, AnnotatedVariant};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// `<output_dir>/<input stem>_annotated.vcf`
pub fn annotated_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "variants".to_string());
    output_dir.join(format!("{stem}{ANNOTATED_SUFFIX}"))
}

/// Lays annotated variants out in the fixed output column order.
pub fn reorder(variants: &[AnnotatedVariant], missing_value: &str) -> Result<Table> {
    let columns = output_columns().into_iter().map(String::from).collect();
    let rows = variants
        .iter()
        .map(|v| {
            let r = &v.record;
            vec![
                r.chromosome.clone(),
                r.position.to_string(),
                r.reference.clone(),
                r.alternate.clone(),
                r.variant_type.clone(),
                r.depth.clone(),
                r.observation_count.clone(),
                r.allele_frequency.clone(),
                format_frequency(&v.population_frequency, missing_value),
            ]
        })
        .collect();
    Table::from_rows(columns, rows)
}

fn format_frequency(freq: &AlleleFrequency, missing_value: &str) -> String {
    match freq {
        AlleleFrequency::Known(v) => v.to_string(),
        AlleleFrequency::NotFound => missing_value.to_string(),
    }
}

/// Writes `table` as TSV to `path`, creating the parent directory.
///
/// Content goes to a sibling temporary file that is renamed into place once
/// fully written.
pub fn write_tsv(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("vcf.partial");
    let written = write_rows(table, &tmp_path).and_then(|_| fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

fn write_rows(table: &Table, path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{}", table.columns().join("\t"))?;
    for row in table.rows() {
        writeln!(out, "{}", row.join("\t"))?;
    }
    out.flush()
}
