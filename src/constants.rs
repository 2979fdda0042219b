//! Column names and delimiters shared by the pipeline stages.

// Source VCF columns
pub const CHROM_COLUMN: &str = "#CHROM";
pub const POS_COLUMN: &str = "POS";
pub const REF_COLUMN: &str = "REF";
pub const ALT_COLUMN: &str = "ALT";
pub const INFO_COLUMN: &str = "INFO";

// INFO sub-fields
pub const DEPTH_KEY: &str = "DP";
pub const OBSERVATION_COUNT_KEY: &str = "AO";
pub const ALLELE_FREQUENCY_KEY: &str = "AF";
pub const VARIANT_TYPE_KEY: &str = "TYPE";

/// Header of the remote frequency column in the annotated file
pub const EXAC_FREQUENCY_COLUMN: &str = "ALLELE_FREQUENCY(ExAC)";

pub const INFO_ENTRY_SEPARATOR: char = ';';
pub const INFO_KEY_VALUE_SEPARATOR: char = '=';
pub const MULTI_VALUE_SEPARATOR: char = ',';
pub const COMPOSITE_KEY_SEPARATOR: char = '-';
pub const META_LINE_PREFIX: &str = "##";

pub const DEFAULT_LOOKUP_URL: &str = "http://exac.hms.harvard.edu/rest/bulk/variant/variant";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_LOOKUP_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const ANNOTATED_SUFFIX: &str = "_annotated.vcf";

/// Leading entries of [`projected_columns`] taken from the VCF itself; the rest come from INFO
pub const SITE_COLUMN_COUNT: usize = 4;

/// Columns retained by the projection stage, in source order
pub fn projected_columns() -> Vec<&'static str> {
    vec![
        CHROM_COLUMN,
        POS_COLUMN,
        REF_COLUMN,
        ALT_COLUMN,
        DEPTH_KEY,
        OBSERVATION_COUNT_KEY,
        ALLELE_FREQUENCY_KEY,
        VARIANT_TYPE_KEY,
    ]
}

/// Columns whose cells carry one value per alternate allele
pub fn per_allele_columns() -> Vec<&'static str> {
    vec![
        ALT_COLUMN,
        OBSERVATION_COUNT_KEY,
        ALLELE_FREQUENCY_KEY,
        VARIANT_TYPE_KEY,
    ]
}

/// Final column order of the annotated file
pub fn output_columns() -> Vec<&'static str> {
    vec![
        CHROM_COLUMN,
        POS_COLUMN,
        REF_COLUMN,
        ALT_COLUMN,
        VARIANT_TYPE_KEY,
        DEPTH_KEY,
        OBSERVATION_COUNT_KEY,
        ALLELE_FREQUENCY_KEY,
        EXAC_FREQUENCY_COLUMN,
    ]
}
