use crate::{
    constants::{IVAR_FIELD_COUNT, IVAR_REQUIRED_FIELD_COUNT},
    core::mutation_type::MutationType,
    io::readers::{read_variant_file, sample_name_from_path},
    utils::util::{parse_count, Result},
};
use std::{collections::BTreeMap, path::Path};

/// One line of an ivar variants table. Columns from GFF_FEATURE on are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct RawIvarRow {
    pub region: String,
    pub pos: u32,
    pub reference: String,
    pub alt: String,
    pub ref_dp: u32,
    pub ref_rv: String,
    pub ref_qual: String,
    pub alt_dp: u32,
    pub alt_rv: String,
    pub alt_qual: String,
    pub alt_freq: String,
    pub total_dp: u32,
    pub pval: String,
    pub pass: String,
    pub gff_feature: String,
    pub ref_codon: String,
    pub ref_aa: String,
    pub alt_codon: String,
    pub alt_aa: String,
    /// Inferred from the ALT prefix.
    pub mutation_type: MutationType,
}

impl RawIvarRow {
    fn from_record(record: &csv::StringRecord, line_number: u64) -> Result<Self> {
        if record.len() < IVAR_REQUIRED_FIELD_COUNT {
            return Err(crate::format_error!(
                "ivar line {line_number} has {} columns, at least {IVAR_REQUIRED_FIELD_COUNT} are required",
                record.len()
            ));
        }
        if record.len() > IVAR_FIELD_COUNT {
            log::debug!(
                "ivar line {line_number} has {} columns, ignoring the ones past {IVAR_FIELD_COUNT}",
                record.len()
            );
        }
        let field = |idx: usize| record.get(idx).unwrap_or("").to_string();
        let count = |idx: usize, label: &str| {
            parse_count(record.get(idx).unwrap_or(""), label)
                .map_err(|e| crate::format_error!("ivar line {line_number}: {e}"))
        };

        let alt = field(3);
        Ok(RawIvarRow {
            region: field(0),
            pos: count(1, "POS")?,
            reference: field(2),
            mutation_type: MutationType::from_ivar_alt(&alt),
            alt,
            ref_dp: count(4, "REF_DP")?,
            ref_rv: field(5),
            ref_qual: field(6),
            alt_dp: count(7, "ALT_DP")?,
            alt_rv: field(8),
            alt_qual: field(9),
            alt_freq: field(10),
            total_dp: count(11, "TOTAL_DP")?,
            pval: field(12),
            pass: field(13),
            gff_feature: field(14),
            ref_codon: field(15),
            ref_aa: field(16),
            alt_codon: field(17),
            alt_aa: field(18),
        })
    }
}

/// A parsed ivar table with its rows keyed by position.
#[derive(Debug, Clone)]
pub struct IvarFile {
    pub sample_name: String,
    pub rows: BTreeMap<u32, Vec<RawIvarRow>>,
}

impl IvarFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        log::trace!("Start loading ivar table {:?}", path);
        let content = read_variant_file(path)?;
        let sample_name = sample_name_from_path(path)?;
        let ivar = Self::from_content(sample_name, &content)
            .map_err(|e| crate::vcfviz_error!("Error parsing ivar table {}: {e}", path.display()))?;
        log::trace!(
            "Finished loading ivar table {:?}: {} position(s)",
            path,
            ivar.rows.len()
        );
        Ok(ivar)
    }

    /// Parses the table body; the first line is the column header and is not validated.
    pub fn from_content(sample_name: impl Into<String>, content: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_reader(content.as_bytes());

        let mut rows: BTreeMap<u32, Vec<RawIvarRow>> = BTreeMap::new();
        for record in reader.records() {
            let record = record?;
            if record.len() == 1 && record.get(0).is_some_and(|f| f.trim().is_empty()) {
                continue;
            }
            let line_number = record.position().map_or(0, |p| p.line());
            let row = RawIvarRow::from_record(&record, line_number)?;
            rows.entry(row.pos).or_default().push(row);
        }

        Ok(IvarFile {
            sample_name: sample_name.into(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const IVAR: &str = "REGION\tPOS\tREF\tALT\tREF_DP\tREF_RV\tREF_QUAL\tALT_DP\tALT_RV\tALT_QUAL\tALT_FREQ\tTOTAL_DP\tPVAL\tPASS\tGFF_FEATURE\tREF_CODON\tREF_AA\tALT_CODON\tALT_AA
MN908947.3\t241\tC\tT\t2\t1\t35\t98\t50\t36\t0.98\t100\t0\tTRUE\tNA\tNA\tNA\tNA\tNA
MN908947.3\t11287\tG\t-TCTGGTTTT\t40\t20\t37\t60\t31\t20\t0.6\t100\t0\tTRUE\tNA\tNA\tNA\tNA\tNA
MN908947.3\t11287\tG\tA\t40\t20\t37\t5\t3\t20\t0.05\t100\t0.1\tFALSE
MN908947.3\t22204\tT\t+GAGCCAGAA\t10\t5\t37\t30\t15\t20\t0.75\t40\t0\tTRUE\tNA\tNA\tNA\tNA\tNA
";

    #[test]
    fn test_parse_rows_and_infer_type() {
        let ivar = IvarFile::from_content("s1", IVAR).unwrap();
        assert_eq!(ivar.rows.len(), 3);
        assert_eq!(ivar.rows[&11287].len(), 2);

        let snp = &ivar.rows[&241][0];
        assert_eq!(snp.mutation_type, MutationType::SNP);
        assert_eq!(snp.alt_dp, 98);
        assert_eq!(snp.total_dp, 100);
        assert_eq!(snp.gff_feature, "NA");

        let del = &ivar.rows[&11287][0];
        assert_eq!(del.mutation_type, MutationType::DELETION);
        assert_eq!(del.alt, "-TCTGGTTTT");

        let short = &ivar.rows[&11287][1];
        assert_eq!(short.pass, "FALSE");
        assert_eq!(short.gff_feature, "");
        assert_eq!(short.alt_aa, "");

        assert_eq!(ivar.rows[&22204][0].mutation_type, MutationType::INSERTION);
    }

    #[test]
    fn test_too_few_columns_is_an_error() {
        let content = "REGION\tPOS\tREF\tALT\nMN908947.3\t241\tC\tT\t2\n";
        let err = IvarFile::from_content("s1", content).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_bad_depth_is_an_error() {
        let content = "header\nMN908947.3\t241\tC\tT\t2\t1\t35\tmany\t50\t36\t0.98\t100\t0\tTRUE\n";
        let err = IvarFile::from_content("s1", content).unwrap_err();
        assert!(err.to_string().contains("ALT_DP"));
    }

    #[test]
    fn test_from_path_derives_sample_name() -> Result<()> {
        let mut file = Builder::new().prefix("s1_").suffix(".ivar.tsv").tempfile()?;
        file.write_all(IVAR.as_bytes())?;
        let ivar = IvarFile::from_path(file.path())?;
        let expected = sample_name_from_path(file.path())?;
        assert_eq!(ivar.sample_name, expected);
        assert_eq!(ivar.rows.len(), 3);

        let empty = Builder::new().prefix("empty").suffix(".tsv").tempfile()?;
        assert!(IvarFile::from_path(empty.path())?.rows.is_empty());
        Ok(())
    }
}
