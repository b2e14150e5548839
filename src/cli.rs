use crate::{
    constants::*,
    io::{
        readers::{SourceKind, VariantInput},
        sample_sheet::read_sample_sheet,
    },
    utils::util::Result,
};
use anyhow::anyhow;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

/// Full version string including the crate version and git description.
///
/// # Examples
/// * `0.1.0-1ba958a-dirty` - while on a dirty branch
/// * `0.1.0-1ba958a` - with a fresh commit
pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    let git_describe = env!("VERGEN_GIT_DESCRIBE");
    if git_describe.is_empty() {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        format!("{}-{}", env!("CARGO_PKG_VERSION"), git_describe)
    }
});

#[derive(Parser, Debug)]
#[command(name="vcfviz",
          author="Matthew Wells",
          version=&**FULL_VERSION,
          about="Normalize VCF and ivar variant calls into canonical per-sample variants",
          long_about = None,
          after_help = format!("Copyright (C) 2022-{}", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true
    )]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Translate(TranslateArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Translate(_) => "translate",
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(group(
    ArgGroup::new("inputs")
        .required(true)
        .args(["input", "input_list", "sample_sheet", "input_dir"]),
))]
#[command(arg_required_else_help(true))]
pub struct TranslateArgs {
    /// VCF or ivar files to translate
    #[arg(
        long = "input",
        value_name = "FILE",
        num_args = 1..,
        value_parser = check_file_exists
    )]
    pub input: Option<Vec<PathBuf>>,

    /// File containing paths of variant files to translate (one per line)
    #[arg(
        long = "input-list",
        value_name = "INPUT_LIST",
        value_parser = check_file_exists
    )]
    pub input_list: Option<PathBuf>,

    /// Tab-separated sample sheet: sample name, variant file, BAM file
    #[arg(
        long = "sample-sheet",
        value_name = "SAMPLE_SHEET",
        value_parser = check_file_exists
    )]
    pub sample_sheet: Option<PathBuf>,

    /// Directory of variant files (*.vcf, *.vcf.gz or *.tsv)
    #[arg(
        long = "input-dir",
        value_name = "DIR",
        value_parser = check_dir_exists
    )]
    pub input_dir: Option<PathBuf>,

    /// Input format: vcf|ivar [default: inferred from the file extension]
    #[arg(
        long = "source-kind",
        value_name = "KIND",
        value_parser = parse_source_kind
    )]
    pub source_kind: Option<SourceKind>,

    /// Write the report to a file [default: standard output]
    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        value_parser = check_prefix_path
    )]
    pub output: Option<String>,

    /// Leave variants with a lower alt depth out of the report
    #[arg(
        long = "min-alt-depth",
        value_name = "DEPTH",
        default_value_t = DEFAULT_MIN_ALT_DEPTH
    )]
    pub min_alt_depth: u32,

    /// Per-position depth table (samtools depth -aa output) to add a SITE_DEPTH column
    #[arg(
        long = "depth",
        value_name = "FILE",
        value_parser = check_file_exists,
        help_heading = "Advanced"
    )]
    pub depth: Option<PathBuf>,

    /// Sample names of the depth table columns, in order [default: input sample names]
    #[arg(
        long = "depth-samples",
        value_name = "SAMPLES",
        value_delimiter = ',',
        requires = "depth",
        help_heading = "Advanced"
    )]
    pub depth_samples: Option<Vec<String>>,
}

/// Initializes the verbosity level for logging based on the command-line arguments.
///
/// 0 occurrences of `-v` log at info, 1 at debug, anything above at trace.
pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.module_path().unwrap_or("unknown_module"),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_file_exists(s: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(s);
    if !path.is_file() {
        return Err(anyhow!("File does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn check_dir_exists(s: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(s);
    if !path.is_dir() {
        return Err(anyhow!("Directory does not exist: {}", path.display()));
    }
    Ok(path.to_path_buf())
}

fn check_prefix_path(s: &str) -> anyhow::Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(anyhow!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn parse_source_kind(s: &str) -> anyhow::Result<SourceKind> {
    s.parse::<SourceKind>()
        .map_err(|_| anyhow!("Invalid source kind: {}. Must be one of vcf, ivar.", s))
}

impl TranslateArgs {
    /// Resolves whichever input option was given into the batch to translate.
    pub fn process_inputs(&self) -> Result<Vec<VariantInput>> {
        let inputs = match (
            &self.input,
            &self.input_list,
            &self.sample_sheet,
            &self.input_dir,
        ) {
            (Some(paths), None, None, None) => self.inputs_from_paths(paths)?,
            (None, Some(list_path), None, None) => {
                self.inputs_from_paths(&Self::read_paths_from_file(list_path)?)?
            }
            (None, None, Some(sheet), None) => read_sample_sheet(sheet)?
                .into_iter()
                .map(|entry| -> Result<VariantInput> {
                    Ok(VariantInput::from_path(&entry.variant_path, self.source_kind)?
                        .with_sample_name(entry.sample_name)
                        .with_bam_path(entry.bam_path))
                })
                .collect::<Result<Vec<_>>>()?,
            (None, None, None, Some(dir)) => {
                self.inputs_from_paths(&Self::collect_dir_paths(dir, self.source_kind)?)?
            }
            _ => unreachable!("Exactly one input option is accepted"),
        };
        Ok(inputs)
    }

    fn inputs_from_paths(&self, paths: &[PathBuf]) -> Result<Vec<VariantInput>> {
        paths
            .iter()
            .map(|path| VariantInput::from_path(path, self.source_kind))
            .collect()
    }

    fn read_paths_from_file(path: &Path) -> Result<Vec<PathBuf>> {
        let file = File::open(path)
            .map_err(|e| anyhow!("Failed to open input list file {}: {}", path.display(), e))?;
        let reader = BufReader::new(file);

        let mut paths = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| anyhow!("Error reading line {}: {}", line_num + 1, e))?;
            let trimmed = line.trim();
            // Skip empty or comment lines
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let path = PathBuf::from(trimmed);
            if !path.exists() {
                Err(anyhow!("Variant file does not exist: {}", path.display()))?;
            }
            paths.push(path);
        }

        if paths.is_empty() {
            Err(anyhow!("No variant file paths found in the input list"))?;
        }

        Ok(paths)
    }

    /// Every file in `dir` of the given kind, or of the kind of the first recognised file.
    fn collect_dir_paths(dir: &Path, kind: Option<SourceKind>) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let has_extension = |path: &Path, kind: SourceKind| {
            let name = path.to_string_lossy().to_lowercase();
            kind.extensions().iter().any(|ext| name.ends_with(ext))
        };
        let kind = kind.or_else(|| {
            files.iter().find_map(|path| {
                [SourceKind::Vcf, SourceKind::Ivar]
                    .into_iter()
                    .find(|&kind| has_extension(path, kind))
            })
        });
        let Some(kind) = kind else {
            return Err(anyhow!("No VCF or ivar files found in {}", dir.display()).into());
        };

        files.retain(|path| has_extension(path, kind));
        if files.is_empty() {
            Err(anyhow!("No {} files found in {}", kind, dir.display()))?;
        }
        log::debug!("Found {} {} file(s) in {:?}", files.len(), kind, dir);
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("vcfviz").chain(args.iter().copied()))
    }

    #[test]
    fn test_input_options_are_exclusive() -> Result<()> {
        let dir = tempdir()?;
        let vcf = dir.path().join("s1.vcf");
        fs::write(&vcf, "")?;
        let vcf = vcf.to_string_lossy().to_string();
        let dir_arg = dir.path().to_string_lossy().to_string();

        assert!(parse(&["translate", "--input", &vcf]).is_ok());
        assert!(parse(&["translate", "--input", &vcf, "--input-dir", &dir_arg]).is_err());
        assert!(parse(&["translate", "--min-alt-depth", "3"]).is_err());
        assert!(parse(&["translate", "--input", &vcf, "--source-kind", "bam"]).is_err());
        assert!(parse(&["translate", "--input", &vcf, "--depth-samples", "a,b"]).is_err());
        Ok(())
    }

    #[test]
    fn test_defaults_and_verbosity() -> Result<()> {
        let dir = tempdir()?;
        let vcf = dir.path().join("s1.vcf");
        fs::write(&vcf, "")?;
        let vcf = vcf.to_string_lossy().to_string();
        let cli = parse(&["-vv", "translate", "--input", &vcf]).unwrap();
        assert_eq!(cli.verbosity, 2);
        assert_eq!(cli.command.name(), "translate");
        let Command::Translate(args) = cli.command;
        assert_eq!(args.min_alt_depth, DEFAULT_MIN_ALT_DEPTH);
        assert!(args.source_kind.is_none());
        Ok(())
    }

    #[test]
    fn test_input_list_skips_comments() -> Result<()> {
        let dir = tempdir()?;
        let first = dir.path().join("s1.vcf");
        let second = dir.path().join("s2.vcf.gz");
        fs::write(&first, "")?;
        fs::write(&second, "")?;
        let list = dir.path().join("inputs.txt");
        fs::write(
            &list,
            format!("# batch\n{}\n\n{}\n", first.display(), second.display()),
        )?;

        let list = list.to_string_lossy().to_string();
        let cli = parse(&["translate", "--input-list", &list]).unwrap();
        let Command::Translate(args) = cli.command;
        let inputs = args.process_inputs()?;
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].sample_name, "s1");
        assert_eq!(inputs[1].sample_name, "s2");
        assert!(inputs.iter().all(|i| i.kind == SourceKind::Vcf));
        Ok(())
    }

    #[test]
    fn test_input_dir_uses_kind_of_first_file() -> Result<()> {
        let dir = tempdir()?;
        for name in ["a.ivar.tsv", "b.ivar.tsv", "c.vcf", "notes.txt"] {
            fs::write(dir.path().join(name), "")?;
        }
        let files = TranslateArgs::collect_dir_paths(dir.path(), None)?;
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.ivar.tsv"));

        let vcfs = TranslateArgs::collect_dir_paths(dir.path(), Some(SourceKind::Vcf))?;
        assert_eq!(vcfs.len(), 1);

        let empty = tempdir()?;
        assert!(TranslateArgs::collect_dir_paths(empty.path(), None).is_err());
        Ok(())
    }

    #[test]
    fn test_sample_sheet_names_override_file_names() -> Result<()> {
        let dir = tempdir()?;
        let vcf = dir.path().join("run_17.vcf");
        fs::write(&vcf, "")?;
        let sheet = dir.path().join("sheet.tsv");
        fs::write(&sheet, format!("WPG17\t{}\t/data/WPG17.bam\n", vcf.display()))?;

        let sheet = sheet.to_string_lossy().to_string();
        let cli = parse(&["translate", "--sample-sheet", &sheet]).unwrap();
        let Command::Translate(args) = cli.command;
        let inputs = args.process_inputs()?;
        assert_eq!(inputs[0].sample_name, "WPG17");
        assert_eq!(inputs[0].bam_path, Some(PathBuf::from("/data/WPG17.bam")));
        Ok(())
    }
}
