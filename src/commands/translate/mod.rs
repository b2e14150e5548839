use crate::{
    cli::TranslateArgs,
    io::{depth::DepthTable, readers::check_source_kinds, report_writer::ReportWriter},
    utils::util::Result,
};
use std::path::Path;

mod summary;
mod translator;

pub use summary::BatchSummary;
pub use translator::{translate_batch, translate_ivar, translate_vcf, LoadedInput};


pub fn translate(args: TranslateArgs) -> Result<()> {
    let inputs = args.process_inputs()?;
    let kind = check_source_kinds(&inputs)?;
    log::info!("Loading {} {} input(s)", inputs.len(), kind);

    let loaded = inputs
        .iter()
        .map(LoadedInput::load)
        .collect::<Result<Vec<_>>>()?;
    let variants = translate_batch(&loaded)?;
    BatchSummary::from_map(&variants).log();

    let depths = match &args.depth {
        Some(depth_path) => {
            let samples = args.depth_samples.clone().unwrap_or_else(|| {
                inputs
                    .iter()
                    .map(|input| input.sample_name.clone())
                    .collect()
            });
            let table = DepthTable::from_path(&samples, depth_path)?;
            log::info!(
                "Loaded site depths for {} sample(s) from {:?}",
                table.sample_count(),
                depth_path
            );
            Some(table)
        }
        None => None,
    };

    let mut writer = ReportWriter::from_output(args.output.as_deref().map(Path::new), args.min_alt_depth)?;
    let written = writer.write_report(&variants, depths.as_ref())?;
    log::info!(
        "Wrote {} variant(s) to {}",
        written,
        args.output.as_deref().unwrap_or("stdout")
    );
    Ok(())
}
