//! Command implementations shared by the binaries.

use anyhow::{Context, Result, bail};
use pandect::{Pandect, SaveOutcome, load, save};
use tracing::info_span;

use crate::cli::{ConvertArgs, InfoArgs, LoadArgs};
use crate::config::Sav2DtaConfig;
use crate::summary::print_info;

/// Load `input` and save it to `output` with its metadata.
///
/// A destination no writer accepts is an error here, so the process exits
/// non-zero.
pub fn convert(input: &str, output: &str, load_args: &LoadArgs) -> Result<SaveOutcome> {
    let span = info_span!("convert", input = %input, output = %output);
    let _guard = span.enter();

    let (mut data, meta) =
        load(input, &load_args.load_options()).with_context(|| format!("failed to load {input}"))?;
    let outcome = save(&mut data, output, Some(&meta), load_args.match_case())
        .with_context(|| format!("failed to save {output}"))?;
    if let SaveOutcome::Skipped { reason } = &outcome {
        bail!("nothing written: {reason}");
    }
    Ok(outcome)
}

pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let outcome = convert(&args.input, &args.output, &args.load)?;
    println!("{outcome}");
    Ok(())
}

pub fn run_info(args: &InfoArgs) -> Result<()> {
    let dataset = Pandect::open(args.input.as_str(), args.load.load_options())
        .with_context(|| format!("failed to load {}", args.input))?;
    print_info(&args.input, dataset.data(), dataset.metadata());
    Ok(())
}

/// Run `sav2dta` with a resolved configuration.
pub fn run_sav2dta(config: &Sav2DtaConfig) -> Result<SaveOutcome> {
    let (input, output) = config.paths()?;
    convert(input, output, &LoadArgs::default())
}
