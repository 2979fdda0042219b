use crate::error::{AnnotateError, Result};
use crate::types::{AnnotatedVariant, CompositeKey, LookupResult, VariantRecord};
use std::collections::HashSet;

/// Joins each record with the lookup entry for its composite key.
///
/// `records` and `keys` are parallel. Rows sharing a key all take that key's
/// single entry; a key with no entry fails the merge.
pub fn merge_frequencies(
    records: Vec<VariantRecord>,
    keys: &[CompositeKey],
    lookup: &LookupResult,
) -> Result<Vec<AnnotatedVariant>> {
    if records.len() != keys.len() {
        return Err(AnnotateError::MalformedInput(format!(
            "{} records but {} composite keys",
            records.len(),
            keys.len()
        )));
    }

    records
        .into_iter()
        .zip(keys)
        .map(|(record, key)| {
            let population_frequency = *lookup
                .get(key)
                .ok_or_else(|| AnnotateError::UnmatchedKey(key.to_string()))?;
            Ok(AnnotatedVariant {
                record,
                population_frequency,
            })
        })
        .collect()
}

/// Number of keys that repeat an earlier key in `keys`.
pub fn count_duplicate_keys(keys: &[CompositeKey]) -> usize {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter().filter(|k| !seen.insert(*k)).count()
}
