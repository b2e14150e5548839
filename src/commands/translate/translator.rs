use crate::{
    constants::{FORMAT_DP_TAG, INFO_TYPE_TAG},
    core::{
        allele_split::{allele_depths, split_alleles, AlleleTuple},
        canonical::{push_variant, CanonicalVariant, VariantMap},
        cigar::{decompose, is_all_match, parse_cigar},
        merge::{check_unique, merge_variant_map},
        mutation_type::MutationType,
    },
    error::VcfVizError,
    io::{
        ivar_reader::IvarFile,
        readers::{SourceKind, VariantInput},
        vcf_reader::{RawVcfRow, VcfFile},
    },
    utils::util::{parse_count, try_exists, Result},
};

/// A parsed input, tagged by the format it was read as.
#[derive(Debug, Clone)]
pub enum LoadedInput {
    Vcf(VcfFile),
    Ivar(IvarFile),
}

impl LoadedInput {
    /// Reads `input` with the parser for its kind; the sample name on `input` wins over the file name.
    pub fn load(input: &VariantInput) -> Result<Self> {
        try_exists(&input.path)?;
        match input.kind {
            SourceKind::Vcf => {
                let mut vcf = VcfFile::from_path(&input.path)?;
                vcf.sample_name = input.sample_name.clone();
                Ok(LoadedInput::Vcf(vcf))
            }
            SourceKind::Ivar => {
                let mut ivar = IvarFile::from_path(&input.path)?;
                ivar.sample_name = input.sample_name.clone();
                Ok(LoadedInput::Ivar(ivar))
            }
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            LoadedInput::Vcf(_) => SourceKind::Vcf,
            LoadedInput::Ivar(_) => SourceKind::Ivar,
        }
    }

    pub fn sample_name(&self) -> &str {
        match self {
            LoadedInput::Vcf(vcf) => &vcf.sample_name,
            LoadedInput::Ivar(ivar) => &ivar.sample_name,
        }
    }
}

/// Translates one batch of same-kind inputs into the canonical per-sample variant map.
///
/// The batch kind is taken from the first input and checked against every other input before
/// any record is translated. Any error aborts the whole batch.
pub fn translate_batch(inputs: &[LoadedInput]) -> Result<VariantMap> {
    let Some(first) = inputs.first() else {
        return Ok(VariantMap::new());
    };
    let kind = first.kind();
    if let Some(other) = inputs.iter().find(|input| input.kind() != kind) {
        return Err(VcfVizError::schema_mismatch(format!(
            "sample {} is a {} input but sample {} is {}; VCF and ivar inputs cannot be mixed in one batch",
            other.sample_name(),
            other.kind(),
            first.sample_name(),
            kind
        )));
    }
    log::debug!("Translating {} {} input(s)", inputs.len(), kind);

    let mut variants = VariantMap::new();
    match kind {
        SourceKind::Vcf => {
            for input in inputs {
                if let LoadedInput::Vcf(vcf) = input {
                    translate_vcf(vcf, &mut variants)?;
                }
            }
            let merged = merge_variant_map(variants)?;
            check_unique(&merged)?;
            Ok(merged)
        }
        SourceKind::Ivar => {
            for input in inputs {
                if let LoadedInput::Ivar(ivar) = input {
                    translate_ivar(ivar, &mut variants)?;
                }
            }
            Ok(variants)
        }
    }
}

pub fn translate_vcf(vcf: &VcfFile, variants: &mut VariantMap) -> Result<()> {
    let mut skipped = 0usize;
    for rows in vcf.table.values() {
        for row in rows {
            if row.is_no_variant() {
                skipped += 1;
                continue;
            }
            translate_vcf_row(&vcf.sample_name, row, variants).map_err(|e| {
                log::error!(
                    "Failed to translate {} record at {}:{}",
                    vcf.sample_name,
                    row.chrom,
                    row.pos
                );
                e
            })?;
        }
    }
    if skipped > 0 {
        log::trace!(
            "{}: skipped {} no-variant record(s)",
            vcf.sample_name,
            skipped
        );
    }
    Ok(())
}

fn translate_vcf_row(sample_name: &str, row: &RawVcfRow, variants: &mut VariantMap) -> Result<()> {
    let (_, values) = row.single_sample()?;
    let total_depth = parse_count(
        RawVcfRow::sample_value(values, FORMAT_DP_TAG, row.pos)?,
        FORMAT_DP_TAG,
    )?;
    let type_tag = row.info_value(INFO_TYPE_TAG)?;

    if MutationType::is_substitution_tag(type_tag) {
        let alt_depth = *allele_depths(row)?.last().ok_or_else(|| {
            crate::format_error!("Empty AD value at position {}", row.pos)
        })?;
        let variant = CanonicalVariant::new(
            sample_name,
            row.chrom.as_str(),
            type_tag.parse::<MutationType>()?,
            total_depth,
            alt_depth,
            row.pos,
            row.alt.as_str(),
            row.reference.as_str(),
        )?;
        push_variant(variants, variant);
        return Ok(());
    }

    for tuple in split_alleles(row)? {
        for variant in decompose_allele(sample_name, &row.chrom, total_depth, &tuple)? {
            push_variant(variants, variant);
        }
    }
    Ok(())
}

/// Turns one ALT allele into a canonical call per non-match CIGAR run.
fn decompose_allele(
    sample_name: &str,
    chromosome: &str,
    total_depth: u32,
    tuple: &AlleleTuple,
) -> Result<Vec<CanonicalVariant>> {
    let ops = parse_cigar(&tuple.cigar)?;
    let events = decompose(
        &ops,
        &tuple.reference_allele,
        &tuple.alternate_allele,
        tuple.position,
    )?;
    if events.is_empty() && !is_all_match(&ops) {
        return Err(VcfVizError::consistency(format!(
            "CIGAR {} for {}>{} at {} produced no variants",
            tuple.cigar, tuple.reference_allele, tuple.alternate_allele, tuple.position
        )));
    }

    events
        .into_iter()
        .map(|event| {
            CanonicalVariant::new(
                sample_name,
                chromosome,
                event.kind,
                total_depth,
                tuple.alt_depth,
                event.position,
                event.allele_text,
                event.reference_slice,
            )
        })
        .collect()
}

pub fn translate_ivar(ivar: &IvarFile, variants: &mut VariantMap) -> Result<()> {
    for row in ivar.rows.values().flatten() {
        let variant = CanonicalVariant::new(
            ivar.sample_name.as_str(),
            row.region.as_str(),
            row.mutation_type,
            row.total_dp,
            row.alt_dp,
            row.pos,
            row.alt.as_str(),
            row.reference.as_str(),
        )?;
        push_variant(variants, variant);
    }
    Ok(())
}
