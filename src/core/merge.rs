use crate::{
    core::canonical::{CanonicalVariant, PositionMap, VariantMap},
    error::VcfVizError,
    utils::util::Result,
};
use std::collections::{HashMap, HashSet};

/// Collapses calls that share a `(position, alt allele)` key into one call.
///
/// Groups keep the order in which their first member appeared. A collapsed call sums the alt
/// depth of its members and takes every other field from the first member.
pub fn merge_position(variants: Vec<CanonicalVariant>) -> Result<Vec<CanonicalVariant>> {
    let mut groups: Vec<Vec<CanonicalVariant>> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for variant in variants {
        let key = variant.merge_key();
        match group_index.get(&key) {
            Some(&idx) => groups[idx].push(variant),
            None => {
                group_index.insert(key, groups.len());
                groups.push(vec![variant]);
            }
        }
    }

    groups.into_iter().map(collapse_group).collect()
}

fn collapse_group(mut group: Vec<CanonicalVariant>) -> Result<CanonicalVariant> {
    if group.len() == 1 {
        return Ok(group.remove(0));
    }

    let alt_depth = group.iter().map(|v| v.alt_depth).sum::<u32>();
    let mut merged = group.swap_remove(0);
    for other in &group {
        // TODO: decide whether disagreeing members should be an error once expected semantics are settled
        if other.total_depth != merged.total_depth
            || other.mutation_type != merged.mutation_type
            || other.ref_allele != merged.ref_allele
        {
            log::debug!("Merging disagreeing calls {} and {}", merged, other);
        }
    }
    log::trace!(
        "Collapsed {} calls at {} into alt depth {}",
        group.len() + 1,
        merged.merge_key(),
        alt_depth
    );
    merged.alt_depth = alt_depth;
    merged.check_invariants()?;
    Ok(merged)
}

/// Runs [`merge_position`] on every sample/position group with more than one candidate.
pub fn merge_variant_map(map: VariantMap) -> Result<VariantMap> {
    let mut merged = VariantMap::new();
    for (sample, positions) in map {
        let mut merged_positions = PositionMap::new();
        for (position, variants) in positions {
            let variants = if variants.len() > 1 {
                merge_position(variants)?
            } else {
                variants
            };
            merged_positions.insert(position, variants);
        }
        merged.insert(sample, merged_positions);
    }
    Ok(merged)
}

/// Fails if any `(sample, position, alt allele)` key still occurs more than once.
pub fn check_unique(map: &VariantMap) -> Result<()> {
    let mut duplicates = Vec::new();
    for (sample, positions) in map {
        let mut seen: HashSet<(u32, &str)> = HashSet::new();
        for variant in positions.values().flatten() {
            if !seen.insert((variant.position, variant.alt_allele.as_str())) {
                log::error!(
                    "Too many entries for sample {} at {}{}",
                    sample,
                    variant.position,
                    variant.alt_allele
                );
                duplicates.push(format!("{sample}:{}{}", variant.position, variant.alt_allele));
            }
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(VcfVizError::consistency(format!(
            "duplicate calls after merging, the input may have been improperly parsed: {}",
            duplicates.join(", ")
        )))
    }
}
