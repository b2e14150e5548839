use crate::{core::mutation_type::MutationType, error::VcfVizError, utils::util::Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOpKind {
    Match,
    Mismatch,
    Insertion,
    Deletion,
}

impl CigarOpKind {
    fn code(&self) -> char {
        match self {
            CigarOpKind::Match => 'M',
            CigarOpKind::Mismatch => 'X',
            CigarOpKind::Insertion => 'I',
            CigarOpKind::Deletion => 'D',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    pub kind: CigarOpKind,
    pub len: usize,
}

impl CigarOp {
    pub fn new(kind: CigarOpKind, len: usize) -> Self {
        Self { kind, len }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.kind.code())
    }
}

fn ops_to_string(ops: &[CigarOp]) -> String {
    ops.iter().map(|op| op.to_string()).collect()
}

/// Parses CIGAR text such as `1M2I3D` into `(op, length)` runs.
pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarOp>> {
    let mut ops = Vec::new();
    let mut run_start = 0;

    for (idx, c) in cigar.char_indices() {
        if c.is_ascii_digit() {
            continue;
        }
        let kind = match c {
            'M' => CigarOpKind::Match,
            'X' => CigarOpKind::Mismatch,
            'I' => CigarOpKind::Insertion,
            'D' => CigarOpKind::Deletion,
            _ => {
                return Err(VcfVizError::UnknownCigarOp {
                    op: c,
                    cigar: cigar.to_string(),
                })
            }
        };
        let len_text = &cigar[run_start..idx];
        let len = len_text.parse::<usize>().map_err(|_| {
            crate::format_error!("CIGAR '{cigar}' has an operation '{c}' without a length")
        })?;
        if len == 0 {
            return Err(crate::format_error!(
                "CIGAR '{cigar}' has a zero-length '{c}' operation"
            ));
        }
        ops.push(CigarOp::new(kind, len));
        run_start = idx + c.len_utf8();
    }

    if run_start != cigar.len() {
        return Err(crate::format_error!(
            "CIGAR '{cigar}' ends with a length but no operation"
        ));
    }
    if ops.is_empty() {
        return Err(crate::format_error!("Empty CIGAR string"));
    }
    Ok(ops)
}

/// One atomic change extracted from an allele pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CigarEvent {
    pub position: u32,
    /// `+` prefixed for insertions, `-` prefixed for deletions.
    pub allele_text: String,
    pub kind: MutationType,
    pub reference_slice: String,
}

fn slice_allele<'a>(
    sequence: &'a str,
    start: usize,
    len: usize,
    allele: &'static str,
    ops: &[CigarOp],
) -> Result<&'a str> {
    sequence
        .get(start..start + len)
        .ok_or_else(|| VcfVizError::CigarOverrun {
            cigar: ops_to_string(ops),
            allele,
            sequence: sequence.to_string(),
            needed: start + len,
        })
}

/// Walks the reference and alternate alleles in lockstep and emits one event per non-match run.
///
/// `M` and `X` consume both alleles, `I` consumes only the alternate and leaves the genomic
/// position in place, `D` consumes only the reference and is reported at the position where it
/// starts. A CIGAR made only of `M` runs produces no events.
pub fn decompose(
    ops: &[CigarOp],
    reference: &str,
    alternate: &str,
    start_position: u32,
) -> Result<Vec<CigarEvent>> {
    if ops.is_empty() {
        return Err(crate::format_error!("Empty CIGAR string"));
    }
    if start_position < 1 {
        return Err(crate::format_error!(
            "CIGAR start position must be 1-based, got {start_position}"
        ));
    }

    let mut ref_cursor = 0usize;
    let mut alt_cursor = 0usize;
    let mut gen_pos = start_position;
    let mut events = Vec::new();

    for op in ops {
        let step = u32::try_from(op.len)
            .map_err(|_| crate::format_error!("CIGAR operation {op} is too long"))?;
        match op.kind {
            CigarOpKind::Match | CigarOpKind::Mismatch => {
                let allele_text = slice_allele(alternate, alt_cursor, op.len, "alternate", ops)?;
                let reference_slice = slice_allele(reference, ref_cursor, op.len, "reference", ops)?;
                if op.kind == CigarOpKind::Mismatch {
                    events.push(CigarEvent {
                        position: gen_pos,
                        allele_text: allele_text.to_string(),
                        kind: MutationType::SNP,
                        reference_slice: reference_slice.to_string(),
                    });
                }
                ref_cursor += op.len;
                alt_cursor += op.len;
                gen_pos += step;
            }
            CigarOpKind::Insertion => {
                let inserted = slice_allele(alternate, alt_cursor, op.len, "alternate", ops)?;
                let anchor = match ref_cursor {
                    0 => "",
                    _ => slice_allele(reference, ref_cursor - 1, 1, "reference", ops)?,
                };
                events.push(CigarEvent {
                    position: gen_pos,
                    allele_text: format!("+{inserted}"),
                    kind: MutationType::INSERTION,
                    reference_slice: anchor.to_string(),
                });
                alt_cursor += op.len;
            }
            CigarOpKind::Deletion => {
                let deleted = slice_allele(reference, ref_cursor, op.len, "reference", ops)?;
                events.push(CigarEvent {
                    position: gen_pos,
                    allele_text: format!("-{deleted}"),
                    kind: MutationType::DELETION,
                    reference_slice: deleted.to_string(),
                });
                ref_cursor += op.len;
                gen_pos += step;
            }
        }
    }

    log::trace!(
        "CIGAR {} over {reference}>{alternate} at {start_position}: {} event(s)",
        ops_to_string(ops),
        events.len()
    );
    Ok(events)
}

/// Whether every run in the CIGAR is a match, i.e. the allele carries no change.
pub fn is_all_match(ops: &[CigarOp]) -> bool {
    ops.iter().all(|op| op.kind == CigarOpKind::Match)
}
