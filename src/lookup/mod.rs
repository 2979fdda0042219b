//! Remote allele-frequency lookup.

pub mod exac;

use crate::error::{AnnotateError, Result};
use crate::types::{AlleleFrequency, CompositeKey, LookupResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub use exac::ExacClient;

/// Bulk frequency lookup keyed by composite key.
///
/// Implementations return an entry for every submitted key, using
/// [`AlleleFrequency::NotFound`] when the source has no frequency for it.
#[async_trait]
pub trait FrequencySource: Send + Sync {
    async fn lookup(&self, keys: &[CompositeKey]) -> Result<LookupResult>;
}

/// Per-variant object in a bulk response; everything but `allele_freq` is ignored
#[derive(Debug, Deserialize)]
struct VariantEntry {
    #[serde(default)]
    allele_freq: Option<f64>,
}

/// Parses a bulk response body into entries for the `submitted` keys.
pub fn parse_response(body: &str, submitted: &[CompositeKey]) -> Result<LookupResult> {
    let entries: HashMap<String, Option<VariantEntry>> = serde_json::from_str(body)
        .map_err(|e| AnnotateError::lookup(format!("unparseable response body: {}", e)))?;

    let mut result = LookupResult::with_capacity(submitted.len());
    for key in submitted {
        let frequency = match entries.get(key.as_str()) {
            Some(Some(VariantEntry {
                allele_freq: Some(freq),
            })) => AlleleFrequency::Known(*freq),
            Some(_) => AlleleFrequency::NotFound,
            None => {
                debug!(key = %key, "key absent from lookup response");
                AlleleFrequency::NotFound
            }
        };
        result.insert(key.clone(), frequency);
    }

    let requested: HashSet<&str> = submitted.iter().map(CompositeKey::as_str).collect();
    let unrequested = entries
        .keys()
        .filter(|k| !requested.contains(k.as_str()))
        .count();
    if unrequested > 0 {
        warn!("Ignoring {} unrequested keys in lookup response", unrequested);
    }

    Ok(result)
}
