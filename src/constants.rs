/// ALT value used by callers that emit every site, meaning "no deviation from reference".
pub const NO_VARIANT_ALT: &str = ".";
/// Prefix applied to VCF column names that do not start with a letter.
pub const SAMPLE_COLUMN_PREFIX: &str = "SAMPLE_";
pub const VCF_FIXED_COLUMNS: [&str; 9] = [
    "CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO", "FORMAT",
];

pub const IVAR_FIELD_COUNT: usize = 19;
/// REGION through PASS must be present on every ivar line.
pub const IVAR_REQUIRED_FIELD_COUNT: usize = 14;

pub const INFO_TYPE_TAG: &str = "TYPE";
pub const INFO_CIGAR_TAG: &str = "CIGAR";
pub const FORMAT_AD_TAG: &str = "AD";
pub const FORMAT_DP_TAG: &str = "DP";

/// Samples handed to one invocation of the external depth tool.
pub const DEPTH_BATCH_SIZE: usize = 5;

pub const DEFAULT_MIN_ALT_DEPTH: u32 = 0;
pub const MISSING_VALUE: &str = ".";
