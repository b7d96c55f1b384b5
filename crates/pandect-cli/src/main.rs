//! `pandect` command-line tool.

use clap::Parser;
use pandect_cli::cli::{Cli, Command};
use pandect_cli::commands::{run_convert, run_info};
use pandect_cli::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    cli.logging.color.write_global();
    if let Err(error) = init_logging(&cli.logging.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Info(args) => run_info(args),
    };
    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}
