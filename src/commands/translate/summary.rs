use crate::{
    core::{
        canonical::{count_variants, VariantMap},
        mutation_type::MutationType,
    },
    utils::util::format_number_with_commas,
};
use std::collections::BTreeMap;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub samples: usize,
    pub positions: usize,
    pub variants: usize,
    pub by_type: BTreeMap<MutationType, usize>,
}

impl BatchSummary {
    pub fn from_map(map: &VariantMap) -> Self {
        let mut by_type = BTreeMap::new();
        for variant in map.values().flat_map(|p| p.values()).flatten() {
            *by_type.entry(variant.mutation_type).or_insert(0) += 1;
        }
        BatchSummary {
            samples: map.len(),
            positions: map.values().map(|p| p.len()).sum(),
            variants: count_variants(map),
            by_type,
        }
    }

    pub fn log(&self) {
        log::info!(
            "Translated {} sample(s): {} position(s), {} variant(s)",
            format_number_with_commas(self.samples),
            format_number_with_commas(self.positions),
            format_number_with_commas(self.variants)
        );
        for (mutation_type, count) in &self.by_type {
            log::debug!("  {}: {}", mutation_type, format_number_with_commas(*count));
        }
    }
}
