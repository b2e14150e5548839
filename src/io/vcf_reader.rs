use crate::{
    constants::{NO_VARIANT_ALT, SAMPLE_COLUMN_PREFIX, VCF_FIXED_COLUMNS},
    error::VcfVizError,
    io::{
        header::HeaderCatalog,
        readers::{read_variant_file, sample_name_from_path},
    },
    utils::util::{parse_count, Result},
};
use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
};

pub type SampleValues = HashMap<String, String>;

/// One body line of a VCF with INFO and per-sample FORMAT values decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVcfRow {
    pub chrom: String,
    pub pos: u32,
    pub id: String,
    pub reference: String,
    pub alt: String,
    pub qual: String,
    pub filter: String,
    pub info: HashMap<String, String>,
    pub format: Vec<String>,
    /// Sample column name -> FORMAT tag -> value.
    pub samples: BTreeMap<String, SampleValues>,
}

impl RawVcfRow {
    pub fn info_value(&self, tag: &str) -> Result<&str> {
        self.info
            .get(tag)
            .map(String::as_str)
            .ok_or_else(|| crate::format_error!("INFO tag {tag} missing at position {}", self.pos))
    }

    /// The only sample of the row; more than one sample column is not supported.
    pub fn single_sample(&self) -> Result<(&str, &SampleValues)> {
        let mut samples = self.samples.iter();
        match (samples.next(), samples.next()) {
            (Some((name, values)), None) => Ok((name.as_str(), values)),
            (None, _) => Err(crate::format_error!(
                "No sample column recorded at position {}",
                self.pos
            )),
            (Some(_), Some(_)) => Err(VcfVizError::schema_mismatch(format!(
                "More than one sample recorded in VCF file ({} columns at position {}), this is currently not supported",
                self.samples.len(),
                self.pos
            ))),
        }
    }

    pub fn sample_value<'a>(values: &'a SampleValues, tag: &str, pos: u32) -> Result<&'a str> {
        values
            .get(tag)
            .map(String::as_str)
            .ok_or_else(|| crate::format_error!("FORMAT tag {tag} missing at position {pos}"))
    }

    pub fn is_no_variant(&self) -> bool {
        self.alt == NO_VARIANT_ALT
    }

    pub fn alt_alleles(&self) -> Vec<&str> {
        self.alt.split(',').collect()
    }
}

/// Position -> every row recorded at that position, in file order.
pub type RecordTable = BTreeMap<u32, Vec<RawVcfRow>>;

/// Column indices resolved once from the `#CHROM` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub names: Vec<String>,
    fixed: [Option<usize>; 9],
    sample_start: Option<usize>,
}

impl ColumnLayout {
    pub fn from_header_line(line: &str) -> Result<Self> {
        let names: Vec<String> = line
            .trim_end()
            .trim_start_matches('#')
            .split('\t')
            .map(sanitize_column_name)
            .collect();

        let mut fixed = [None; 9];
        for (slot, expected) in fixed.iter_mut().zip(VCF_FIXED_COLUMNS.iter()) {
            *slot = names.iter().position(|name| name == expected);
        }
        if let Some(missing) = VCF_FIXED_COLUMNS[..8]
            .iter()
            .zip(fixed.iter())
            .find_map(|(name, idx)| idx.is_none().then_some(name))
        {
            return Err(crate::format_error!(
                "VCF column header is missing the {missing} column: {line}"
            ));
        }
        let sample_start = fixed[8].map(|format_idx| format_idx + 1);

        Ok(ColumnLayout {
            names,
            fixed,
            sample_start,
        })
    }

    fn index(&self, column: usize) -> Option<usize> {
        self.fixed[column]
    }

    pub fn sample_names(&self) -> &[String] {
        match self.sample_start {
            Some(start) if start <= self.names.len() => &self.names[start..],
            _ => &[],
        }
    }

    fn parse_row(&self, line: &str, line_number: usize) -> Result<RawVcfRow> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != self.names.len() {
            return Err(crate::format_error!(
                "Line {line_number} has {} columns, the header has {}",
                fields.len(),
                self.names.len()
            ));
        }
        // The first eight columns are guaranteed by from_header_line.
        let column = |idx: usize| self.index(idx).map_or("", |i| fields[i]);

        let pos = parse_count(column(1), "POS")
            .map_err(|e| crate::format_error!("Line {line_number}: {e}"))?;
        let info = decode_info(column(7))
            .map_err(|e| crate::format_error!("Line {line_number}: {e}"))?;
        let format: Vec<String> = match self.index(8) {
            Some(i) => fields[i].split(':').map(str::to_string).collect(),
            None => Vec::new(),
        };

        let mut samples = BTreeMap::new();
        if let Some(start) = self.sample_start {
            for (name, data) in self.names[start..].iter().zip(&fields[start..]) {
                let values: SampleValues = format
                    .iter()
                    .cloned()
                    .zip(data.split(':').map(str::to_string))
                    .collect();
                samples.insert(name.clone(), values);
            }
        }

        Ok(RawVcfRow {
            chrom: column(0).to_string(),
            pos,
            id: column(2).to_string(),
            reference: column(3).to_string(),
            alt: column(4).to_string(),
            qual: column(5).to_string(),
            filter: column(6).to_string(),
            info,
            format,
            samples,
        })
    }
}

/// Sample names are frequently numeric; every column name must start with a letter.
fn sanitize_column_name(name: &str) -> String {
    let name = name.trim();
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => name.to_string(),
        _ => format!("{SAMPLE_COLUMN_PREFIX}{name}"),
    }
}

/// Splits `DP=12;TYPE=ins` into a tag map. `.` is an empty INFO column.
pub fn decode_info(info: &str) -> Result<HashMap<String, String>> {
    let mut fields = HashMap::new();
    if info == "." || info.is_empty() {
        return Ok(fields);
    }
    for encoding in info.split(';') {
        let (name, value) = encoding.split_once('=').ok_or_else(|| {
            crate::format_error!("INFO field must be in 'name=value' format: '{encoding}'")
        })?;
        if name.is_empty() {
            return Err(crate::format_error!(
                "INFO field has an empty name: '{encoding}'"
            ));
        }
        fields.insert(name.to_string(), value.to_string());
    }
    Ok(fields)
}

/// Number of consecutive `##` lines at the top of the file.
pub fn header_line_count(content: &str) -> usize {
    content
        .lines()
        .take_while(|line| line.starts_with("##"))
        .count()
}

/// Parses the column header line at `table_start` and every body line after it.
pub fn parse_record_table(content: &str, table_start: usize) -> Result<(ColumnLayout, RecordTable)> {
    let mut lines = content.lines().enumerate().skip(table_start);
    let layout = match lines.next() {
        Some((_, line)) if line.starts_with('#') => ColumnLayout::from_header_line(line)?,
        Some((idx, line)) => {
            return Err(crate::format_error!(
                "Expected the #CHROM column header at line {}, found: {line}",
                idx + 1
            ))
        }
        None => return Err(crate::format_error!("VCF has no column header line")),
    };

    let mut table = RecordTable::new();
    for (idx, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let row = layout.parse_row(line.trim_end_matches('\r'), idx + 1)?;
        table.entry(row.pos).or_default().push(row);
    }
    Ok((layout, table))
}

/// A parsed single-sample VCF: its header catalog and its rows keyed by position.
#[derive(Debug, Clone)]
pub struct VcfFile {
    pub sample_name: String,
    pub header: HeaderCatalog,
    pub layout: ColumnLayout,
    pub table: RecordTable,
}

impl VcfFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        log::trace!("Start loading VCF {:?}", path);
        let content = read_variant_file(path)?;
        let sample_name = sample_name_from_path(path)?;
        let vcf = Self::from_content(sample_name, &content)
            .map_err(|e| crate::vcfviz_error!("Error parsing VCF {}: {e}", path.display()))?;
        log::trace!(
            "Finished loading VCF {:?}: {} position(s)",
            path,
            vcf.table.len()
        );
        Ok(vcf)
    }

    pub fn from_content(sample_name: impl Into<String>, content: &str) -> Result<Self> {
        let table_start = header_line_count(content);
        let header = HeaderCatalog::parse(content.lines().take(table_start));
        let (layout, table) = parse_record_table(content, table_start)?;
        Ok(VcfFile {
            sample_name: sample_name.into(),
            header,
            layout,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub const VCF: &str = "##fileformat=VCFv4.2
##INFO=<ID=TYPE,Number=A,Type=String,Description=\"Allele type\">
##FORMAT=<ID=AD,Number=R,Type=Integer,Description=\"Allele depth\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t2201
MN908947.3\t241\t.\tC\tT\t900\t.\tDP=40;TYPE=snp\tGT:AD:DP\t1:2,38:40
MN908947.3\t300\t.\tA\tA,AG\t50\t.\tCIGAR=1M,1M1I;TYPE=snp,ins\tGT:AD:DP\t1:10,3,2:15
MN908947.3\t300\t.\tA\tAG\t20\t.\tCIGAR=1M1I;TYPE=ins\tGT:AD:DP\t1:10,2:15
";

    #[test]
    fn test_header_line_count() {
        assert_eq!(header_line_count(VCF), 3);
        assert_eq!(header_line_count("#CHROM\tPOS\n"), 0);
    }

    #[test]
    fn test_parse_rows_keyed_by_position() {
        let vcf = VcfFile::from_content("s1", VCF).unwrap();
        assert_eq!(vcf.header.infos.len(), 1);
        assert_eq!(vcf.table.len(), 2);
        assert_eq!(vcf.table[&300].len(), 2);

        let row = &vcf.table[&241][0];
        assert_eq!(row.chrom, "MN908947.3");
        assert_eq!(row.reference, "C");
        assert_eq!(row.info["TYPE"], "snp");
        assert_eq!(row.format, vec!["GT", "AD", "DP"]);
        let (sample, values) = row.single_sample().unwrap();
        assert_eq!(sample, "SAMPLE_2201");
        assert_eq!(values["AD"], "2,38");
        assert_eq!(values["DP"], "40");
    }

    #[test]
    fn test_numeric_sample_names_are_prefixed() {
        let layout =
            ColumnLayout::from_header_line("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\t22_AB16\tWPG17")
                .unwrap();
        assert_eq!(layout.sample_names(), &["SAMPLE_22_AB16", "WPG17"]);
        assert_eq!(layout.names[0], "CHROM");
    }

    #[test]
    fn test_missing_fixed_column_is_an_error() {
        let err = ColumnLayout::from_header_line("#CHROM\tPOS\tREF\tALT").unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_decode_info() {
        let info = decode_info("DP=12;TYPE=ins;CIGAR=1M1I").unwrap();
        assert_eq!(info.len(), 3);
        assert_eq!(info["CIGAR"], "1M1I");
        assert!(decode_info(".").unwrap().is_empty());
        assert!(decode_info("DP=12;INDEL").unwrap_err().is_format());
    }

    #[test]
    fn test_bad_rows_are_errors() {
        let short = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts1\nchr\t5\t.\tA\tG\n";
        assert!(VcfFile::from_content("s1", short).unwrap_err().is_format());

        let bad_pos =
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr\tfive\t.\tA\tG\t.\t.\tDP=1\n";
        assert!(VcfFile::from_content("s1", bad_pos).unwrap_err().is_format());

        assert!(VcfFile::from_content("s1", "##fileformat=VCFv4.2\n").is_err());
    }

    #[test]
    fn test_single_sample_rejects_multi_sample_rows() {
        let multi = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ta\tb\n\
                     chr\t5\t.\tA\tG\t.\t.\tDP=1\tAD\t1,2\t3,4\n";
        let vcf = VcfFile::from_content("s1", multi).unwrap();
        let err = vcf.table[&5][0].single_sample().unwrap_err();
        assert!(matches!(err, VcfVizError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_sites_only_vcf_has_no_samples() {
        let sites = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr\t5\t.\tA\t.\t.\t.\t.\n";
        let vcf = VcfFile::from_content("s1", sites).unwrap();
        let row = &vcf.table[&5][0];
        assert!(row.is_no_variant());
        assert!(row.samples.is_empty());
        assert!(row.info.is_empty());
    }
}
