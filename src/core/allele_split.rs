use crate::{
    constants::{FORMAT_AD_TAG, INFO_CIGAR_TAG},
    io::vcf_reader::RawVcfRow,
    utils::util::{parse_count, Result},
};

/// One ALT allele of a (possibly multi-allelic) VCF row with its own depth and CIGAR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlleleTuple {
    pub reference_allele: String,
    pub alternate_allele: String,
    pub alt_depth: u32,
    pub cigar: String,
    pub position: u32,
}

/// Parses the comma-separated AD values of the row's single sample.
pub fn allele_depths(row: &RawVcfRow) -> Result<Vec<u32>> {
    let (_, values) = row.single_sample()?;
    let ad = RawVcfRow::sample_value(values, FORMAT_AD_TAG, row.pos)?;
    ad.split(',')
        .map(|depth| parse_count(depth, FORMAT_AD_TAG))
        .collect()
}

/// Re-pairs every ALT allele with its AD value (index 0 is the reference depth) and CIGAR segment.
pub fn split_alleles(row: &RawVcfRow) -> Result<Vec<AlleleTuple>> {
    let depths = allele_depths(row)?;
    let cigar = row.info_value(INFO_CIGAR_TAG)?;
    let alts = row.alt_alleles();

    if alts.len() == 1 {
        let alt_depth = *depths.last().ok_or_else(|| {
            crate::format_error!("Empty {FORMAT_AD_TAG} value at position {}", row.pos)
        })?;
        return Ok(vec![AlleleTuple {
            reference_allele: row.reference.clone(),
            alternate_allele: row.alt.clone(),
            alt_depth,
            cigar: cigar.to_string(),
            position: row.pos,
        }]);
    }

    let alt_depths = depths.get(1..).unwrap_or_default();
    let cigars: Vec<&str> = cigar.split(',').collect();
    if alt_depths.len() != alts.len() || cigars.len() != alts.len() {
        return Err(crate::format_error!(
            "Position {} has {} ALT alleles but {} alt depths and {} CIGAR segments",
            row.pos,
            alts.len(),
            alt_depths.len(),
            cigars.len()
        ));
    }

    Ok(alts
        .into_iter()
        .zip(alt_depths)
        .zip(cigars)
        .map(|((alt, &alt_depth), cigar)| AlleleTuple {
            reference_allele: row.reference.clone(),
            alternate_allele: alt.to_string(),
            alt_depth,
            cigar: cigar.to_string(),
            position: row.pos,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::VcfVizError, io::vcf_reader::VcfFile};

    fn row(alt: &str, info: &str, samples: &[&str]) -> RawVcfRow {
        let mut header = String::from("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT");
        let mut line = format!("MN908947.3\t300\t.\tA\t{alt}\t50\t.\t{info}\tGT:AD:DP");
        for (idx, sample) in samples.iter().enumerate() {
            header.push_str(&format!("\ts{idx}"));
            line.push('\t');
            line.push_str(sample);
        }
        let vcf = VcfFile::from_content("s1", &format!("{header}\n{line}\n")).unwrap();
        vcf.table[&300][0].clone()
    }

    #[test]
    fn test_multi_allelic_row_pairs_depth_and_cigar() {
        let tuples = split_alleles(&row("A,AG", "CIGAR=1M,1M1I;TYPE=snp,ins", &["1:10,3,2:15"])).unwrap();
        assert_eq!(
            tuples,
            vec![
                AlleleTuple {
                    reference_allele: "A".to_string(),
                    alternate_allele: "A".to_string(),
                    alt_depth: 3,
                    cigar: "1M".to_string(),
                    position: 300,
                },
                AlleleTuple {
                    reference_allele: "A".to_string(),
                    alternate_allele: "AG".to_string(),
                    alt_depth: 2,
                    cigar: "1M1I".to_string(),
                    position: 300,
                },
            ]
        );
    }

    #[test]
    fn test_single_allele_uses_last_depth() {
        let tuples = split_alleles(&row("AG", "CIGAR=1M1I;TYPE=ins", &["1:10,4:15"])).unwrap();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].alt_depth, 4);
        assert_eq!(tuples[0].cigar, "1M1I");
    }

    #[test]
    fn test_count_mismatch_is_a_format_error() {
        let missing_depth = row("A,AG", "CIGAR=1M,1M1I;TYPE=snp,ins", &["1:10,3:15"]);
        assert!(split_alleles(&missing_depth).unwrap_err().is_format());

        let missing_cigar = row("A,AG", "CIGAR=1M1I;TYPE=snp,ins", &["1:10,3,2:15"]);
        assert!(split_alleles(&missing_cigar).unwrap_err().is_format());
    }

    #[test]
    fn test_requires_exactly_one_sample() {
        let two = row("AG", "CIGAR=1M1I;TYPE=ins", &["1:10,4:15", "1:9,5:14"]);
        let err = split_alleles(&two).unwrap_err();
        assert!(matches!(err, VcfVizError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_missing_cigar_is_a_format_error() {
        let err = split_alleles(&row("AG", "TYPE=ins", &["1:10,4:15"])).unwrap_err();
        assert!(err.is_format());
    }
}
