use crate::{error::VcfVizError, utils::util::Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
pub enum MutationType {
    SNP,
    MNP,
    INSERTION,
    DELETION,
}

impl MutationType {
    pub fn from_u8(bytes: &[u8]) -> Result<Self> {
        match bytes.to_ascii_uppercase().as_slice() {
            b"SNP" => Ok(MutationType::SNP),
            b"MNP" => Ok(MutationType::MNP),
            b"INS" => Ok(MutationType::INSERTION),
            b"DEL" => Ok(MutationType::DELETION),
            _ => Err(crate::format_error!(
                "Invalid mutation TYPE: {:?}",
                String::from_utf8_lossy(bytes)
            )),
        }
    }

    /// ivar marks insertions with `+` and deletions with `-` in ALT; it never reports MNPs.
    pub fn from_ivar_alt(alt: &str) -> Self {
        if alt.contains('+') {
            MutationType::INSERTION
        } else if alt.contains('-') {
            MutationType::DELETION
        } else {
            MutationType::SNP
        }
    }

    /// Whether a VCF INFO TYPE value can be taken as-is without CIGAR decomposition.
    pub fn is_substitution_tag(tag: &str) -> bool {
        tag.eq_ignore_ascii_case("SNP") || tag.eq_ignore_ascii_case("MNP")
    }
}

impl std::str::FromStr for MutationType {
    type Err = VcfVizError;
    fn from_str(s: &str) -> Result<Self> {
        Self::from_u8(s.as_bytes())
    }
}

impl std::fmt::Display for MutationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationType::SNP => write!(f, "SNP"),
            MutationType::MNP => write!(f, "MNP"),
            MutationType::INSERTION => write!(f, "INS"),
            MutationType::DELETION => write!(f, "DEL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ivar_type_inference() {
        assert_eq!(MutationType::from_ivar_alt("+AT"), MutationType::INSERTION);
        assert_eq!(MutationType::from_ivar_alt("-C"), MutationType::DELETION);
        assert_eq!(MutationType::from_ivar_alt("G"), MutationType::SNP);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("snp".parse::<MutationType>().unwrap(), MutationType::SNP);
        assert_eq!("MNP".parse::<MutationType>().unwrap(), MutationType::MNP);
        assert_eq!("ins".parse::<MutationType>().unwrap(), MutationType::INSERTION);
        assert!("complex".parse::<MutationType>().unwrap_err().is_format());
    }

    #[test]
    fn test_display_round_trips_short_names() {
        for ty in [
            MutationType::SNP,
            MutationType::MNP,
            MutationType::INSERTION,
            MutationType::DELETION,
        ] {
            assert_eq!(ty.to_string().parse::<MutationType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_substitution_tags() {
        assert!(MutationType::is_substitution_tag("snp"));
        assert!(MutationType::is_substitution_tag("MNP"));
        assert!(!MutationType::is_substitution_tag("complex"));
        assert!(!MutationType::is_substitution_tag("snp,ins"));
    }
}
