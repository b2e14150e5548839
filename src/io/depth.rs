use crate::{
    constants::DEPTH_BATCH_SIZE,
    utils::util::{parse_count, Result},
};
use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::Read,
    path::Path,
};

/// Per-sample read depth at every reported position.
///
/// Positions are keyed without a contig; inputs are single-reference genomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthTable {
    depths: HashMap<String, BTreeMap<u32, u32>>,
}

impl DepthTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: &str, position: u32, depth: u32) {
        self.depths
            .entry(sample.to_string())
            .or_default()
            .insert(position, depth);
    }

    pub fn get(&self, sample: &str, position: u32) -> Option<u32> {
        self.depths
            .get(sample)
            .and_then(|positions| positions.get(&position))
            .copied()
    }

    pub fn sample_count(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.values().all(BTreeMap::is_empty)
    }

    /// Loads `chrom<TAB>pos<TAB>depth...` lines where depth column `k` belongs to `samples[k]`.
    pub fn extend_from_depth_output<R: Read>(&mut self, samples: &[String], reader: R) -> Result<()> {
        let expected = samples.len() + 2;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let mut lines = 0usize;
        for record in reader.records() {
            let record = record?;
            if record.len() != expected {
                let line = record.position().map_or(0, |p| p.line());
                return Err(crate::format_error!(
                    "Depth line {line} has {} columns, expected {expected} for {} sample(s)",
                    record.len(),
                    samples.len()
                ));
            }
            let position = parse_count(&record[1], "depth position")?;
            for (sample, value) in samples.iter().zip(record.iter().skip(2)) {
                self.insert(sample, position, parse_count(value, "depth")?);
            }
            lines += 1;
        }
        log::debug!("Loaded {} depth line(s) for {} sample(s)", lines, samples.len());
        Ok(())
    }

    pub fn from_path(samples: &[String], path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| crate::vcfviz_error!("Failed to open depth file {}: {e}", path.display()))?;
        let mut table = DepthTable::new();
        table.extend_from_depth_output(samples, file)?;
        Ok(table)
    }
}

/// Sample groups handed to one invocation of the external depth tool each.
pub fn depth_batches(samples: &[String]) -> Vec<&[String]> {
    samples.chunks(DEPTH_BATCH_SIZE).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn test_insert_out_of_order() {
        let mut table = DepthTable::new();
        table.insert("s1", 300, 15);
        table.insert("s1", 100, 4);
        table.insert("s2", 100, 9);
        assert_eq!(table.get("s1", 100), Some(4));
        assert_eq!(table.get("s1", 300), Some(15));
        assert_eq!(table.get("s2", 300), None);
        assert_eq!(table.get("s3", 100), None);
        assert_eq!(table.sample_count(), 2);
    }

    #[test]
    fn test_extend_from_depth_output() {
        let samples = names(2);
        let output = "MN908947.3\t1\t0\t3\nMN908947.3\t2\t10\t12\n";
        let mut table = DepthTable::new();
        table.extend_from_depth_output(&samples, output.as_bytes()).unwrap();
        assert_eq!(table.get("s0", 2), Some(10));
        assert_eq!(table.get("s1", 1), Some(3));
        assert!(!table.is_empty());
    }

    #[test]
    fn test_depth_column_mismatch_is_a_format_error() {
        let samples = names(3);
        let output = "MN908947.3\t1\t0\t3\n";
        let err = DepthTable::new()
            .extend_from_depth_output(&samples, output.as_bytes())
            .unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_depth_batches() {
        let samples = names(12);
        let batches = depth_batches(&samples);
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
        assert_eq!(batches[2][1], "s11");
        assert!(depth_batches(&[]).is_empty());
    }
}
