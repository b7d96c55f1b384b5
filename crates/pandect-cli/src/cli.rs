//! CLI argument definitions for `pandect` and `sav2dta`.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use pandect::{LoadOptions, MatchCase};
use tracing::level_filters::LevelFilter;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "pandect",
    version,
    about = "Load tabular datasets from many file formats and save them to others",
    long_about = "Load tabular datasets and convert between file formats.\n\n\
                  Inputs: csv, tsv, xlsx, sav (SPSS), dta (Stata), sqlite3.\n\
                  Outputs: csv, tsv, xlsx, sav, dta. The format is chosen by suffix."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub logging: LogArgs,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load INPUT and save it as OUTPUT, keeping labels where possible.
    Convert(ConvertArgs),

    /// Print shape, column types and labels of INPUT.
    Info(InfoArgs),
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Source file.
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Destination file; its suffix selects the writer.
    #[arg(value_name = "OUTPUT")]
    pub output: String,

    #[command(flatten)]
    pub load: LoadArgs,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Source file.
    #[arg(value_name = "INPUT")]
    pub input: String,

    #[command(flatten)]
    pub load: LoadArgs,
}

/// Options shared by every command that loads a dataset.
#[derive(Args, Debug, Clone, Default)]
pub struct LoadArgs {
    /// Field separator for .csv input (a single ASCII character, or "tab").
    #[arg(long = "sep", value_name = "CHAR", value_parser = parse_separator)]
    pub separator: Option<u8>,

    /// Table to read from a .sqlite3 database.
    #[arg(long = "table", value_name = "NAME")]
    pub table: Option<String>,

    /// Do not expand ~ and environment variables in paths.
    #[arg(long = "no-expand")]
    pub no_expand: bool,

    /// Match file suffixes case-sensitively.
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,
}

impl LoadArgs {
    pub fn match_case(&self) -> MatchCase {
        if self.case_sensitive {
            MatchCase::Sensitive
        } else {
            MatchCase::Insensitive
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::default()
            .with_expand(!self.no_expand)
            .with_match_case(self.match_case());
        if let Some(separator) = self.separator {
            options = options.with_separator(separator);
        }
        if let Some(table) = &self.table {
            options = options.with_table(table.clone());
        }
        options
    }
}

/// Parse a separator argument into a single byte.
pub fn parse_separator(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!("separator must be one ASCII character, got {value:?}")),
            }
        }
    }
}

/// Logging flags shared by both binaries.
#[derive(Args)]
pub struct LogArgs {
    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl LogArgs {
    /// Build logging configuration from the flags with consistent precedence:
    /// `--log-level`, then `-v`/`-q`, then `RUST_LOG`, then warn.
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig {
            level_filter: self.verbosity.tracing_level_filter(),
            ..LogConfig::default()
        };
        config.use_env_filter = !(self.verbosity.is_present() || self.log_level.is_some());
        if let Some(level) = self.log_level {
            config.level_filter = level.into();
        }
        config.format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        config.log_file = self.log_file.clone();
        config.with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        config
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Arguments of the `sav2dta` binary. Flags override the config file.
#[derive(Parser)]
#[command(
    name = "sav2dta",
    version,
    about = "Convert an SPSS .sav file to a Stata .dta file"
)]
pub struct Sav2DtaCli {
    /// Config file with `input` and `output` keys
    /// (default: <config dir>/pandect/sav2dta.toml).
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Input file.
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub input: Option<String>,

    /// Output file.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<String>,

    #[command(flatten)]
    pub logging: LogArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definitions_are_valid() {
        Cli::command().debug_assert();
        Sav2DtaCli::command().debug_assert();
    }

    #[test]
    fn test_parse_separator() {
        assert_eq!(parse_separator(";"), Ok(b';'));
        assert_eq!(parse_separator("tab"), Ok(b'\t'));
        assert!(parse_separator("ab").is_err());
        assert!(parse_separator("é").is_err());
        assert!(parse_separator("").is_err());
    }

    #[test]
    fn test_convert_args() {
        let cli = Cli::try_parse_from([
            "pandect",
            "convert",
            "in.sqlite3",
            "out.dta",
            "--table",
            "people",
            "--no-expand",
            "--case-sensitive",
        ])
        .unwrap();
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        let options = args.load.load_options();
        assert_eq!(args.output, "out.dta");
        assert_eq!(options.table.as_deref(), Some("people"));
        assert!(!options.expand);
        assert_eq!(options.match_case, MatchCase::Sensitive);
        assert_eq!(options.separator, b',');
    }

    #[test]
    fn test_log_level_overrides_verbosity() {
        let cli = Cli::try_parse_from(["pandect", "-q", "--log-level", "debug", "info", "x.csv"])
            .unwrap();
        let config = cli.logging.log_config();
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(!config.use_env_filter);
    }

    #[test]
    fn test_default_log_config_uses_env() {
        let cli = Cli::try_parse_from(["pandect", "info", "x.csv", "--log-format", "json"]).unwrap();
        let config = cli.logging.log_config();
        assert_eq!(config.level_filter, LevelFilter::WARN);
        assert!(config.use_env_filter);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_sav2dta_args() {
        let cli = Sav2DtaCli::try_parse_from(["sav2dta", "-i", "a.sav", "--output", "b.dta"]).unwrap();
        assert_eq!(cli.input.as_deref(), Some("a.sav"));
        assert_eq!(cli.output.as_deref(), Some("b.dta"));
        assert!(cli.config.is_none());
    }
}
