use std::{num::ParseIntError, path::PathBuf};
use thiserror::Error;

pub type VcfVizResult<T> = std::result::Result<T, VcfVizError>;

#[derive(Debug, Error)]
pub enum VcfVizError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ParseInt(#[from] ParseIntError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Cli(#[from] anyhow::Error),
    #[error("Malformed input: {message}")]
    Format { message: String },
    #[error("Unsupported input combination: {message}")]
    SchemaMismatch { message: String },
    #[error("Inconsistent variant data: {message}")]
    Consistency { message: String },
    #[error("Unknown CIGAR operation '{op}' in CIGAR '{cigar}'")]
    UnknownCigarOp { op: char, cigar: String },
    #[error(
        "CIGAR '{cigar}' overruns the {allele} allele '{sequence}' (needs {needed} bases)"
    )]
    CigarOverrun {
        cigar: String,
        allele: &'static str,
        sequence: String,
        needed: usize,
    },
    #[error("Invalid gzip header: {}", path.display())]
    InvalidGzipHeader { path: PathBuf },
}

impl VcfVizError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    pub fn schema_mismatch(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency {
            message: message.into(),
        }
    }

    /// True for the malformed-input family (bad fields, CIGAR problems).
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            Self::Format { .. }
                | Self::UnknownCigarOp { .. }
                | Self::CigarOverrun { .. }
                | Self::ParseInt(_)
        )
    }
}

#[macro_export]
macro_rules! vcfviz_error {
    ($($arg:tt)*) => {
        $crate::error::VcfVizError::message(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! format_error {
    ($($arg:tt)*) => {
        $crate::error::VcfVizError::format(format!($($arg)*))
    };
}
