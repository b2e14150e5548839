use crate::{
    constants::MISSING_VALUE,
    core::canonical::{CanonicalVariant, VariantMap},
    io::depth::DepthTable,
    utils::util::Result,
};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

const REPORT_HEADER: [&str; 9] = [
    "SAMPLE",
    "POS",
    "ALT",
    "REF",
    "TYPE",
    "TOTAL_DEPTH",
    "ALT_DEPTH",
    "ALT_FREQ",
    "CHROM",
];
const SITE_DEPTH_COLUMN: &str = "SITE_DEPTH";

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    sample: &'a str,
    pos: u32,
    alt: &'a str,
    reference: &'a str,
    mutation_type: String,
    total_depth: u32,
    alt_depth: u32,
    alt_freq: String,
    chrom: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    site_depth: Option<String>,
}

impl<'a> ReportRow<'a> {
    fn new(variant: &'a CanonicalVariant, depths: Option<&DepthTable>) -> Self {
        ReportRow {
            sample: &variant.sample_name,
            pos: variant.position,
            alt: &variant.alt_allele,
            reference: &variant.ref_allele,
            mutation_type: variant.mutation_type.to_string(),
            total_depth: variant.total_depth,
            alt_depth: variant.alt_depth,
            alt_freq: format!("{:.4}", variant.alt_frequency()),
            chrom: &variant.chromosome,
            site_depth: depths.map(|table| {
                table
                    .get(&variant.sample_name, variant.position)
                    .map_or_else(|| MISSING_VALUE.to_string(), |d| d.to_string())
            }),
        }
    }
}

/// Tab-separated report of a translated batch, one line per canonical variant.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    min_alt_depth: u32,
    rows_written: usize,
}

impl ReportWriter<Box<dyn Write>> {
    /// Opens `output`, or standard output when no path is given.
    pub fn from_output(output: Option<&Path>, min_alt_depth: u32) -> Result<Self> {
        let sink: Box<dyn Write> = match output {
            Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
                crate::vcfviz_error!("Failed to create output file {}: {e}", path.display())
            })?)),
            None => Box::new(io::stdout()),
        };
        Ok(ReportWriter::new(sink, min_alt_depth))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W, min_alt_depth: u32) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(sink);
        ReportWriter {
            writer,
            min_alt_depth,
            rows_written: 0,
        }
    }

    /// Writes the header and every variant with at least the minimum alt depth.
    pub fn write_report(&mut self, variants: &VariantMap, depths: Option<&DepthTable>) -> Result<usize> {
        let mut header: Vec<&str> = REPORT_HEADER.to_vec();
        if depths.is_some() {
            header.push(SITE_DEPTH_COLUMN);
        }
        self.writer.write_record(&header)?;

        let mut skipped = 0usize;
        for variant in variants.values().flat_map(|p| p.values()).flatten() {
            if variant.alt_depth < self.min_alt_depth {
                skipped += 1;
                continue;
            }
            self.writer.serialize(ReportRow::new(variant, depths))?;
            self.rows_written += 1;
        }
        self.writer.flush()?;
        if skipped > 0 {
            log::debug!(
                "Skipped {} variant(s) below alt depth {}",
                skipped,
                self.min_alt_depth
            );
        }
        Ok(self.rows_written)
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::vcfviz_error!("Failed to flush report: {}", e.error()))
    }
}
