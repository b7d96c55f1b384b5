//! `sav2dta`: convert one SPSS file to Stata, paths from flags or config.

use anyhow::Result;
use clap::Parser;
use pandect_cli::cli::Sav2DtaCli;
use pandect_cli::commands::run_sav2dta;
use pandect_cli::config::Sav2DtaConfig;
use pandect_cli::logging::init_logging;

fn run(cli: Sav2DtaCli) -> Result<()> {
    let config = Sav2DtaConfig::resolve(cli.config.as_deref())?.merge(cli.input, cli.output);
    let outcome = run_sav2dta(&config)?;
    println!("{outcome}");
    Ok(())
}

fn main() {
    let cli = Sav2DtaCli::parse();
    cli.logging.color.write_global();
    if let Err(error) = init_logging(&cli.logging.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    if let Err(error) = run(cli) {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
