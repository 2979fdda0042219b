use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One expanded variant call: a single alternate allele with its INFO statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub chromosome: String,
    /// 1-based
    pub position: u64,
    pub reference: String,
    pub alternate: String,
    pub depth: String,
    pub observation_count: String,
    pub allele_frequency: String,
    pub variant_type: String,
}

/// `CHROM-POS-REF-ALT` identifier used to correlate local rows with remote results
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey(String);

impl CompositeKey {
    pub(crate) fn from_joined(joined: String) -> Self {
        CompositeKey(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Population frequency reported by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AlleleFrequency {
    Known(f64),
    NotFound,
}

impl AlleleFrequency {
    pub fn value(&self) -> Option<f64> {
        match self {
            AlleleFrequency::Known(v) => Some(*v),
            AlleleFrequency::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, AlleleFrequency::Known(_))
    }
}

pub type LookupResult = HashMap<CompositeKey, AlleleFrequency>;

/// A variant joined with its remote frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedVariant {
    pub record: VariantRecord,
    pub population_frequency: AlleleFrequency,
}
