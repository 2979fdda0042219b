// Variant annotation pipeline:
// load → decode INFO → project → expand → build keys → lookup → merge → reorder → write

pub mod expand;
pub mod info;
pub mod key;
pub mod merge;

use crate::config::OutputConfig;
use crate::constants::{
    per_allele_columns, projected_columns, INFO_COLUMN, INFO_ENTRY_SEPARATOR,
    INFO_KEY_VALUE_SEPARATOR, MULTI_VALUE_SEPARATOR, SITE_COLUMN_COUNT,
};
use crate::error::Result;
use crate::lookup::FrequencySource;
use crate::output;
use crate::table::Table;
use crate::types::AnnotatedVariant;
use crate::vcf;
use metrics::{counter, histogram};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    DecodeInfo,
    Project,
    Expand,
    BuildKey,
    Lookup,
    Merge,
    Reorder,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "LOAD",
            Stage::DecodeInfo => "DECODE_INFO",
            Stage::Project => "PROJECT",
            Stage::Expand => "EXPAND",
            Stage::BuildKey => "BUILD_KEY",
            Stage::Lookup => "LOOKUP",
            Stage::Merge => "MERGE",
            Stage::Reorder => "REORDER",
            Stage::Write => "WRITE",
        };
        f.write_str(name)
    }
}

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub source_rows: usize,
    pub expanded_rows: usize,
    pub frequencies_found: usize,
    pub frequencies_missing: usize,
    pub duplicate_keys: usize,
}

/// In-memory output of the annotation stages
#[derive(Debug, Clone)]
pub struct Annotation {
    pub variants: Vec<AnnotatedVariant>,
    pub source_rows: usize,
    pub duplicate_keys: usize,
}

pub struct Pipeline {
    source: Arc<dyn FrequencySource>,
    output: OutputConfig,
}

impl Pipeline {
    pub fn new(source: Arc<dyn FrequencySource>, output: OutputConfig) -> Self {
        Self { source, output }
    }

    /// Runs every stage for one input file and writes the annotated TSV.
    #[instrument(skip(self, input), fields(input = %input.display()))]
    pub async fn run(&self, input: &Path, header_rows: Option<usize>) -> Result<PipelineResult> {
        let started = std::time::Instant::now();
        counter!("var_annot_pipeline_runs_total").increment(1);

        info!(stage = %Stage::Load, "Reading VCF");
        let table = vcf::read_vcf(input, header_rows)?;

        let annotation = self.annotate(&table).await?;

        info!(stage = %Stage::Reorder, "Ordering output columns");
        let ordered = output::reorder(&annotation.variants, &self.output.missing_value)?;

        let output_file = output::annotated_path(input, &self.output.dir);
        info!(stage = %Stage::Write, "Writing annotated VCF to {}", output_file.display());
        output::write_tsv(&ordered, &output_file)?;

        let found = annotation
            .variants
            .iter()
            .filter(|v| v.population_frequency.is_found())
            .count();
        histogram!("var_annot_pipeline_duration_seconds").record(started.elapsed().as_secs_f64());

        Ok(PipelineResult {
            input_file: input.to_path_buf(),
            output_file,
            source_rows: annotation.source_rows,
            expanded_rows: annotation.variants.len(),
            frequencies_found: found,
            frequencies_missing: annotation.variants.len() - found,
            duplicate_keys: annotation.duplicate_keys,
        })
    }

    /// Runs DECODE_INFO through MERGE on an already loaded VCF table.
    pub async fn annotate(&self, table: &Table) -> Result<Annotation> {
        let source_rows = table.len();
        if table.is_empty() {
            info!("No variant lines to annotate");
            return Ok(Annotation {
                variants: Vec::new(),
                source_rows,
                duplicate_keys: 0,
            });
        }

        info!(stage = %Stage::DecodeInfo, "Decoding {} INFO fields", source_rows);
        let decoded = info::decode_column(
            table,
            INFO_COLUMN,
            INFO_ENTRY_SEPARATOR,
            INFO_KEY_VALUE_SEPARATOR,
        )?;

        info!(stage = %Stage::Project, "Projecting variant columns");
        let columns = projected_columns();
        let (site_columns, info_columns) = columns.split_at(SITE_COLUMN_COUNT);
        let projected = table
            .select(site_columns)?
            .hconcat(decoded.select(info_columns)?)?;

        info!(stage = %Stage::Expand, "Expanding multi-allelic sites");
        let expanded = expand::expand_rows(&projected, &per_allele_columns(), MULTI_VALUE_SEPARATOR)?;
        counter!("var_annot_rows_expanded_total").increment(expanded.len() as u64);
        info!("Expanded {} sites into {} alleles", source_rows, expanded.len());

        info!(stage = %Stage::BuildKey, "Building composite keys");
        let records = key::records_from_table(&expanded)?;
        let keys = key::build_keys(&records)?;
        let duplicate_keys = merge::count_duplicate_keys(&keys);
        if duplicate_keys > 0 {
            warn!(
                "{} rows repeat an earlier composite key; they will share one frequency",
                duplicate_keys
            );
        }

        info!(stage = %Stage::Lookup, "Looking up {} allele frequencies", keys.len());
        let lookup = self.source.lookup(&keys).await?;

        info!(stage = %Stage::Merge, "Merging frequencies");
        let variants = merge::merge_frequencies(records, &keys, &lookup)?;

        Ok(Annotation {
            variants,
            source_rows,
            duplicate_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnotateError;
    use crate::types::{AlleleFrequency, CompositeKey, LookupResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Answers from a fixed map and records what it was asked
    struct StaticSource {
        frequencies: HashMap<String, f64>,
        requested: Mutex<Vec<String>>,
    }

    impl StaticSource {
        fn new(frequencies: &[(&str, f64)]) -> Self {
            Self {
                frequencies: frequencies
                    .iter()
                    .map(|(k, v)| (k.to_string(), *v))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FrequencySource for StaticSource {
        async fn lookup(&self, keys: &[CompositeKey]) -> Result<LookupResult> {
            let mut requested = self.requested.lock().unwrap();
            requested.extend(keys.iter().map(|k| k.to_string()));
            Ok(keys
                .iter()
                .map(|k| {
                    let freq = self
                        .frequencies
                        .get(k.as_str())
                        .map(|v| AlleleFrequency::Known(*v))
                        .unwrap_or(AlleleFrequency::NotFound);
                    (k.clone(), freq)
                })
                .collect())
        }
    }

    /// Drops every answer, breaking the one-entry-per-key contract
    struct ForgetfulSource;

    #[async_trait]
    impl FrequencySource for ForgetfulSource {
        async fn lookup(&self, _keys: &[CompositeKey]) -> Result<LookupResult> {
            Ok(LookupResult::new())
        }
    }

    fn table(text: &str) -> Table {
        vcf::parse_vcf(Cursor::new(text), None).unwrap()
    }

    fn pipeline(source: Arc<dyn FrequencySource>) -> Pipeline {
        Pipeline::new(source, OutputConfig::default())
    }

    #[tokio::test]
    async fn test_two_allele_site() {
        let source = Arc::new(StaticSource::new(&[("1-100-A-T", 0.0042)]));
        let vcf = table(
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
             1\t100\t.\tA\tT,G\t50\t.\tDP=50;AO=20,5;AF=0.4,0.1;TYPE=snp,snp\n",
        );

        let annotation = pipeline(source.clone()).annotate(&vcf).await.unwrap();

        assert_eq!(annotation.source_rows, 1);
        assert_eq!(annotation.variants.len(), 2);
        let first = &annotation.variants[0];
        assert_eq!(first.record.alternate, "T");
        assert_eq!(first.record.depth, "50");
        assert_eq!(first.record.observation_count, "20");
        assert_eq!(first.record.allele_frequency, "0.4");
        assert_eq!(first.population_frequency, AlleleFrequency::Known(0.0042));
        let second = &annotation.variants[1];
        assert_eq!(second.record.alternate, "G");
        assert_eq!(second.record.observation_count, "5");
        assert_eq!(second.record.allele_frequency, "0.1");
        assert_eq!(second.population_frequency, AlleleFrequency::NotFound);

        assert_eq!(
            *source.requested.lock().unwrap(),
            vec!["1-100-A-T".to_string(), "1-100-A-G".to_string()]
        );
    }

    #[tokio::test]
    async fn test_info_keys_in_any_order() {
        let source = Arc::new(StaticSource::new(&[]));
        let vcf = table(
            "#CHROM\tPOS\tREF\tALT\tINFO\n\
             1\t10\tA\tC\tDP=5;AO=2;AF=0.4;TYPE=snp;AB=0.5\n\
             1\t20\tG\tT\tTYPE=snp;AF=1;AB=0;AO=9;DP=9\n",
        );

        let annotation = pipeline(source).annotate(&vcf).await.unwrap();
        assert_eq!(annotation.variants[1].record.depth, "9");
        assert_eq!(annotation.variants[1].record.allele_frequency, "1");
    }

    #[tokio::test]
    async fn test_info_flags_are_tolerated() {
        let source = Arc::new(StaticSource::new(&[("1-10-A-C", 0.2)]));
        let vcf = table(
            "#CHROM\tPOS\tREF\tALT\tINFO\n\
             1\t10\tA\tC\tDP=5;AO=2;AF=0.4;TYPE=snp;DB\n",
        );

        let annotation = pipeline(source).annotate(&vcf).await.unwrap();
        assert_eq!(annotation.variants.len(), 1);
        assert_eq!(annotation.variants[0].record.depth, "5");
        assert_eq!(
            annotation.variants[0].population_frequency,
            AlleleFrequency::Known(0.2)
        );
    }

    #[tokio::test]
    async fn test_projection_keeps_only_variant_columns() {
        let source = Arc::new(StaticSource::new(&[]));
        let vcf = table(
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tINFO\n\
             7\t55\trs9\tG\tA\t99\tAB=0.5;DP=31;AO=12;AF=0.5;TYPE=snp\n",
        );

        let annotation = pipeline(source).annotate(&vcf).await.unwrap();
        let record = &annotation.variants[0].record;
        assert_eq!(record.chromosome, "7");
        assert_eq!(record.position, 55);
        assert_eq!(record.reference, "G");
        assert_eq!(record.alternate, "A");
        assert_eq!(record.depth, "31");
        assert_eq!(record.observation_count, "12");
        assert_eq!(record.allele_frequency, "0.5");
        assert_eq!(record.variant_type, "snp");
    }

    #[tokio::test]
    async fn test_missing_info_key_aborts() {
        let source = Arc::new(StaticSource::new(&[]));
        let vcf = table("#CHROM\tPOS\tREF\tALT\tINFO\n1\t10\tA\tC\tDP=5;AO=2;AF=0.4\n");

        let err = pipeline(source.clone()).annotate(&vcf).await.unwrap_err();
        assert!(matches!(err, AnnotateError::MalformedInput(_)));
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cardinality_mismatch_aborts_before_lookup() {
        let source = Arc::new(StaticSource::new(&[]));
        let vcf = table(
            "#CHROM\tPOS\tREF\tALT\tINFO\n\
             1\t10\tA\tC,G\tDP=5;AO=2,1;AF=0.4;TYPE=snp,snp\n",
        );

        let err = pipeline(source.clone()).annotate(&vcf).await.unwrap_err();
        assert!(matches!(err, AnnotateError::CardinalityMismatch { .. }));
        assert!(source.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_records_share_frequency() {
        let source = Arc::new(StaticSource::new(&[("1-10-A-C", 0.5)]));
        let vcf = table(
            "#CHROM\tPOS\tREF\tALT\tINFO\n\
             1\t10\tA\tC\tDP=5;AO=2;AF=0.4;TYPE=snp\n\
             1\t10\tA\tC\tDP=7;AO=3;AF=0.4;TYPE=snp\n",
        );

        let annotation = pipeline(source).annotate(&vcf).await.unwrap();
        assert_eq!(annotation.duplicate_keys, 1);
        assert_eq!(annotation.variants.len(), 2);
        assert!(annotation
            .variants
            .iter()
            .all(|v| v.population_frequency == AlleleFrequency::Known(0.5)));
    }

    #[tokio::test]
    async fn test_unmatched_key_aborts() {
        let vcf = table("#CHROM\tPOS\tREF\tALT\tINFO\n1\t10\tA\tC\tDP=5;AO=2;AF=0.4;TYPE=snp\n");
        let err = pipeline(Arc::new(ForgetfulSource)).annotate(&vcf).await.unwrap_err();
        assert!(matches!(err, AnnotateError::UnmatchedKey(_)));
    }

    #[tokio::test]
    async fn test_header_only_file() {
        let vcf = table("#CHROM\tPOS\tREF\tALT\tINFO\n");
        let annotation = pipeline(Arc::new(ForgetfulSource)).annotate(&vcf).await.unwrap();
        assert!(annotation.variants.is_empty());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::DecodeInfo.to_string(), "DECODE_INFO");
        assert_eq!(Stage::BuildKey.to_string(), "BUILD_KEY");
    }
}
