use crate::constants::{
    ALLELE_FREQUENCY_KEY, ALT_COLUMN, CHROM_COLUMN, COMPOSITE_KEY_SEPARATOR, DEPTH_KEY,
    MULTI_VALUE_SEPARATOR, OBSERVATION_COUNT_KEY, POS_COLUMN, REF_COLUMN, VARIANT_TYPE_KEY,
};
use crate::error::{AnnotateError, Result};
use crate::table::Table;
use crate::types::{CompositeKey, VariantRecord};

impl CompositeKey {
    /// Joins the four identifying fields with `-`.
    pub fn new(chromosome: &str, position: u64, reference: &str, alternate: &str) -> Result<Self> {
        for (name, value) in [
            (CHROM_COLUMN, chromosome),
            (REF_COLUMN, reference),
            (ALT_COLUMN, alternate),
        ] {
            if value.is_empty() {
                return Err(AnnotateError::MalformedInput(format!(
                    "cannot build composite key: {} is empty",
                    name
                )));
            }
        }
        if alternate.contains(MULTI_VALUE_SEPARATOR) {
            return Err(AnnotateError::MalformedInput(format!(
                "cannot build composite key from unexpanded alternate '{}'",
                alternate
            )));
        }

        Ok(CompositeKey::from_joined(format!(
            "{chromosome}{sep}{position}{sep}{reference}{sep}{alternate}",
            sep = COMPOSITE_KEY_SEPARATOR
        )))
    }

    pub fn for_record(record: &VariantRecord) -> Result<Self> {
        Self::new(
            &record.chromosome,
            record.position,
            &record.reference,
            &record.alternate,
        )
    }
}

/// Builds the composite key of every record, in record order.
pub fn build_keys(records: &[VariantRecord]) -> Result<Vec<CompositeKey>> {
    records.iter().map(CompositeKey::for_record).collect()
}

/// Parses a POS cell into its canonical integer form.
///
/// Only ASCII digits are accepted; leading zeros are dropped.
pub fn parse_position(raw: &str) -> Result<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AnnotateError::MalformedInput(format!(
            "invalid position '{}': expected digits only",
            raw
        )));
    }
    raw.parse::<u64>()
        .map_err(|e| AnnotateError::MalformedInput(format!("invalid position '{}': {}", raw, e)))
}

/// Converts an expanded, projected table into typed records.
pub fn records_from_table(table: &Table) -> Result<Vec<VariantRecord>> {
    let chrom = table.require_column(CHROM_COLUMN)?;
    let pos = table.require_column(POS_COLUMN)?;
    let reference = table.require_column(REF_COLUMN)?;
    let alternate = table.require_column(ALT_COLUMN)?;
    let depth = table.require_column(DEPTH_KEY)?;
    let observations = table.require_column(OBSERVATION_COUNT_KEY)?;
    let frequency = table.require_column(ALLELE_FREQUENCY_KEY)?;
    let variant_type = table.require_column(VARIANT_TYPE_KEY)?;

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let position = parse_position(&row[pos]).map_err(|e| match e {
                AnnotateError::MalformedInput(msg) => {
                    AnnotateError::MalformedInput(format!("row {}: {}", i, msg))
                }
                other => other,
            })?;
            Ok(VariantRecord {
                chromosome: row[chrom].clone(),
                position,
                reference: row[reference].clone(),
                alternate: row[alternate].clone(),
                depth: row[depth].clone(),
                observation_count: row[observations].clone(),
                allele_frequency: row[frequency].clone(),
                variant_type: row[variant_type].clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(alternate: &str, depth: &str) -> VariantRecord {
        VariantRecord {
            chromosome: "1".into(),
            position: 100,
            reference: "A".into(),
            alternate: alternate.into(),
            depth: depth.into(),
            observation_count: "20".into(),
            allele_frequency: "0.4".into(),
            variant_type: "snp".into(),
        }
    }

    #[test]
    fn test_key_format() {
        let key = CompositeKey::new("X", 1234, "AT", "A").unwrap();
        assert_eq!(key.as_str(), "X-1234-AT-A");
        assert_eq!(key.to_string(), "X-1234-AT-A");
    }

    #[test]
    fn test_key_ignores_non_identifying_fields() {
        let a = CompositeKey::for_record(&record("T", "50")).unwrap();
        let b = CompositeKey::for_record(&record("T", "999")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "1-100-A-T");
    }

    #[test]
    fn test_position_is_canonical() {
        assert_eq!(parse_position("00100").unwrap(), 100);
        assert!(parse_position("100.0").is_err());
        assert!(parse_position("-5").is_err());
        assert!(parse_position("").is_err());
    }

    #[test]
    fn test_position_rejects_sign_and_padding() {
        for raw in ["+100", " 100", "100 ", "1e3", "99999999999999999999"] {
            let err = parse_position(raw).unwrap_err();
            assert!(matches!(err, AnnotateError::MalformedInput(_)), "{raw}");
        }
    }

    #[test]
    fn test_unexpanded_alternate_rejected() {
        let err = CompositeKey::new("1", 100, "A", "T,G").unwrap_err();
        assert!(matches!(err, AnnotateError::MalformedInput(_)));
    }

    #[test]
    fn test_empty_component_rejected() {
        assert!(CompositeKey::new("", 100, "A", "T").is_err());
        assert!(CompositeKey::new("1", 100, "A", "").is_err());
    }

    #[test]
    fn test_build_keys_in_order() {
        let keys = build_keys(&[record("T", "1"), record("G", "1")]).unwrap();
        let keys: Vec<&str> = keys.iter().map(CompositeKey::as_str).collect();
        assert_eq!(keys, vec!["1-100-A-T", "1-100-A-G"]);
    }

    #[test]
    fn test_records_from_table() {
        let columns = ["#CHROM", "POS", "REF", "ALT", "DP", "AO", "AF", "TYPE"];
        let table = Table::from_rows(
            columns.iter().map(|s| s.to_string()).collect(),
            vec![["2", "007", "C", "CT", "12", "4", "0.33", "ins"]
                .iter()
                .map(|s| s.to_string())
                .collect()],
        )
        .unwrap();

        let records = records_from_table(&table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, 7);
        assert_eq!(records[0].alternate, "CT");
        assert_eq!(records[0].variant_type, "ins");
    }

    #[test]
    fn test_records_from_table_bad_position() {
        let columns = ["#CHROM", "POS", "REF", "ALT", "DP", "AO", "AF", "TYPE"];
        let table = Table::from_rows(
            columns.iter().map(|s| s.to_string()).collect(),
            vec![["2", "abc", "C", "T", "1", "1", "1", "snp"]
                .iter()
                .map(|s| s.to_string())
                .collect()],
        )
        .unwrap();

        let err = records_from_table(&table).unwrap_err();
        match err {
            AnnotateError::MalformedInput(msg) => assert!(msg.starts_with("row 0")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
