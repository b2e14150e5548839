use crate::{core::mutation_type::MutationType, utils::util::Result};
use std::{collections::BTreeMap, fmt};

/// Source-format independent call of one atomic mutation for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalVariant {
    pub sample_name: String,
    pub chromosome: String,
    pub mutation_type: MutationType,
    pub total_depth: u32,
    pub alt_depth: u32,
    pub position: u32,
    pub alt_allele: String,
    pub ref_allele: String,
}

/// Position keyed calls for one sample; several alleles may share a position.
pub type PositionMap = BTreeMap<u32, Vec<CanonicalVariant>>;
/// Sample name -> calls.
pub type VariantMap = BTreeMap<String, PositionMap>;

impl CanonicalVariant {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sample_name: impl Into<String>,
        chromosome: impl Into<String>,
        mutation_type: MutationType,
        total_depth: u32,
        alt_depth: u32,
        position: u32,
        alt_allele: impl Into<String>,
        ref_allele: impl Into<String>,
    ) -> Result<Self> {
        let variant = CanonicalVariant {
            sample_name: sample_name.into(),
            chromosome: chromosome.into(),
            mutation_type,
            total_depth,
            alt_depth,
            position,
            alt_allele: alt_allele.into(),
            ref_allele: ref_allele.into(),
        };
        variant.check_invariants()?;
        Ok(variant)
    }

    pub fn check_invariants(&self) -> Result<()> {
        if self.position < 1 {
            return Err(crate::error::VcfVizError::consistency(format!(
                "{self} has a position below 1"
            )));
        }
        if self.alt_depth > self.total_depth {
            return Err(crate::error::VcfVizError::consistency(format!(
                "{self} has alt depth {} above total depth {}",
                self.alt_depth, self.total_depth
            )));
        }
        Ok(())
    }

    /// Grouping key used when collapsing duplicate decompositions.
    pub fn merge_key(&self) -> String {
        format!("{}{}", self.position, self.alt_allele)
    }

    pub fn alt_frequency(&self) -> f64 {
        if self.total_depth == 0 {
            0.0
        } else {
            f64::from(self.alt_depth) / f64::from(self.total_depth)
        }
    }
}

impl fmt::Display for CanonicalVariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "(sample: {}, {}:{} {}>{} {}, depth: {}/{})",
            self.sample_name,
            self.chromosome,
            self.position,
            self.ref_allele,
            self.alt_allele,
            self.mutation_type,
            self.alt_depth,
            self.total_depth
        )
    }
}

pub fn push_variant(map: &mut VariantMap, variant: CanonicalVariant) {
    map.entry(variant.sample_name.clone())
        .or_default()
        .entry(variant.position)
        .or_default()
        .push(variant);
}

pub fn count_variants(map: &VariantMap) -> usize {
    map.values()
        .flat_map(|positions| positions.values())
        .map(Vec::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_enforces_depth_and_position() {
        let ok = CanonicalVariant::new("s1", "MN908947.3", MutationType::SNP, 10, 10, 1, "G", "A");
        assert!(ok.is_ok());

        let err = CanonicalVariant::new("s1", "chr", MutationType::SNP, 5, 6, 10, "G", "A")
            .unwrap_err();
        assert!(err.to_string().contains("alt depth 6"));

        assert!(CanonicalVariant::new("s1", "chr", MutationType::SNP, 5, 1, 0, "G", "A").is_err());
    }

    #[test]
    fn test_merge_key_and_frequency() {
        let v = CanonicalVariant::new("s1", "chr", MutationType::INSERTION, 20, 5, 200, "+AT", "A")
            .unwrap();
        assert_eq!(v.merge_key(), "200+AT");
        assert!((v.alt_frequency() - 0.25).abs() < 1e-9);

        let zero = CanonicalVariant::new("s1", "chr", MutationType::SNP, 0, 0, 3, "T", "C")
            .unwrap();
        assert_eq!(zero.alt_frequency(), 0.0);
    }

    #[test]
    fn test_push_and_count() {
        let mut map = VariantMap::new();
        for (sample, pos, alt) in [("a", 5, "G"), ("a", 5, "T"), ("a", 9, "C"), ("b", 5, "G")] {
            push_variant(
                &mut map,
                CanonicalVariant::new(sample, "chr", MutationType::SNP, 10, 1, pos, alt, "A")
                    .unwrap(),
            );
        }
        assert_eq!(count_variants(&map), 4);
        assert_eq!(map["a"][&5].len(), 2);
        assert_eq!(map["b"].len(), 1);
    }
}
