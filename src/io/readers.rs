use crate::{error::VcfVizError, utils::util::Result};
use flate2::read::MultiGzDecoder;
use std::{
    fmt,
    fs::File,
    io::{BufReader, Read as ioRead},
    path::{Path, PathBuf},
    str::FromStr,
};

/// Which caller produced an input file; all inputs of one batch must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Vcf,
    Ivar,
}

impl SourceKind {
    /// `.tsv` files are ivar tables, everything else is read as VCF.
    pub fn from_path(path: &Path) -> Self {
        let name = path.to_string_lossy().to_lowercase();
        let name = name
            .strip_suffix(".gz")
            .or_else(|| name.strip_suffix(".gzip"))
            .unwrap_or(&name);
        if name.ends_with(".tsv") {
            SourceKind::Ivar
        } else {
            SourceKind::Vcf
        }
    }

    /// Glob-style extensions used when collecting a directory of inputs.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SourceKind::Vcf => &[".vcf", ".vcf.gz"],
            SourceKind::Ivar => &[".tsv"],
        }
    }
}

impl FromStr for SourceKind {
    type Err = VcfVizError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "vcf" => Ok(SourceKind::Vcf),
            "ivar" | "tsv" => Ok(SourceKind::Ivar),
            _ => Err(crate::vcfviz_error!(
                "Invalid source kind: {s}. Must be one of vcf, ivar."
            )),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Vcf => write!(f, "VCF"),
            SourceKind::Ivar => write!(f, "ivar"),
        }
    }
}

/// A variant file queued for translation together with the sample it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInput {
    pub path: PathBuf,
    pub sample_name: String,
    pub kind: SourceKind,
    /// Alignment listed next to the variant file in a sample sheet, if any.
    pub bam_path: Option<PathBuf>,
}

impl VariantInput {
    /// Sample name from the file name, kind from `kind` or else the extension.
    pub fn from_path(path: &Path, kind: Option<SourceKind>) -> Result<Self> {
        Ok(VariantInput {
            path: path.to_path_buf(),
            sample_name: sample_name_from_path(path)?,
            kind: kind.unwrap_or_else(|| SourceKind::from_path(path)),
            bam_path: None,
        })
    }

    pub fn with_sample_name(mut self, sample_name: impl Into<String>) -> Self {
        self.sample_name = sample_name.into();
        self
    }

    pub fn with_bam_path(mut self, bam_path: PathBuf) -> Self {
        self.bam_path = Some(bam_path);
        self
    }
}

/// All inputs of a batch must share the kind of the first one.
pub fn check_source_kinds(inputs: &[VariantInput]) -> Result<SourceKind> {
    let first = inputs
        .first()
        .ok_or_else(|| crate::vcfviz_error!("No input files to translate"))?;
    if let Some(other) = inputs.iter().find(|input| input.kind != first.kind) {
        return Err(VcfVizError::schema_mismatch(format!(
            "{} is a {} input but {} is {}; VCF and ivar inputs cannot be mixed in one batch",
            other.path.display(),
            other.kind,
            first.path.display(),
            first.kind
        )));
    }
    Ok(first.kind)
}

fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".gzip")
}

pub fn open_variant_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    let file = File::open(path)
        .map_err(|error| crate::vcfviz_error!("Failed to open file {}: {error}", path.display()))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(VcfVizError::InvalidGzipHeader {
                path: path.to_path_buf(),
            })
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

/// Reads a whole (optionally gzipped) variant file into memory.
pub fn read_variant_file(path: &Path) -> Result<String> {
    let mut reader = open_variant_reader(path)?;
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| crate::vcfviz_error!("Failed to read {}: {e}", path.display()))?;
    Ok(content)
}

/// Sample name is the file name up to its first `.`.
pub fn sample_name_from_path(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| crate::vcfviz_error!("Cannot derive a sample name from {}", path.display()))?;
    let sample = file_name.split('.').next().unwrap_or(file_name);
    if sample.is_empty() {
        return Err(crate::vcfviz_error!(
            "Cannot derive a sample name from {}",
            path.display()
        ));
    }
    Ok(sample.to_string())
}
