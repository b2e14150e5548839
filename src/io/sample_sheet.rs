use crate::utils::util::Result;
use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

const SAMPLE_SHEET_COLUMNS: usize = 3;

/// One sample: an explicit name, its variant file and the alignment used for depth lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleSheetEntry {
    pub sample_name: String,
    pub variant_path: PathBuf,
    pub bam_path: PathBuf,
}

pub fn read_sample_sheet(path: &Path) -> Result<Vec<SampleSheetEntry>> {
    let file = File::open(path).map_err(|e| {
        crate::vcfviz_error!("Failed to open sample sheet {}: {e}", path.display())
    })?;
    let entries = parse_sample_sheet(file)?;
    if entries.is_empty() {
        return Err(crate::vcfviz_error!(
            "No samples found in sample sheet {}",
            path.display()
        ));
    }
    log::debug!("Read {} sample(s) from {:?}", entries.len(), path);
    Ok(entries)
}

/// Tab-separated `sample<TAB>variant file<TAB>bam` lines; `#` lines are comments.
pub fn parse_sample_sheet<R: Read>(reader: R) -> Result<Vec<SampleSheetEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() != SAMPLE_SHEET_COLUMNS {
            let line = record.position().map_or(0, |p| p.line());
            return Err(crate::format_error!(
                "Sample sheet line {line} has {} columns, expected {SAMPLE_SHEET_COLUMNS} (sample, variant file, bam)",
                record.len()
            ));
        }
        entries.push(SampleSheetEntry {
            sample_name: record[0].trim().to_string(),
            variant_path: PathBuf::from(record[1].trim()),
            bam_path: PathBuf::from(record[2].trim()),
        });
    }
    Ok(entries)
}
