//! `sav2dta` configuration file.
//!
//! A TOML file with optional `input` and `output` keys. Command-line flags
//! take precedence over file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// File name looked up in `<config dir>/pandect/`.
pub const CONFIG_FILE_NAME: &str = "sav2dta.toml";

/// Input and output paths for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sav2DtaConfig {
    pub input: Option<String>,
    pub output: Option<String>,
}

impl Sav2DtaConfig {
    /// The per-user config file path, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pandect").join(CONFIG_FILE_NAME))
    }

    /// Load a config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Resolve the config: an explicit path must exist; otherwise the
    /// default file is used when present, else an empty config.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "using default config file");
                Self::load_from(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Overlay command-line values on top of the file values.
    #[must_use]
    pub fn merge(self, input: Option<String>, output: Option<String>) -> Self {
        Self {
            input: input.or(self.input),
            output: output.or(self.output),
        }
    }

    /// Both paths, or an error naming the missing one.
    pub fn paths(&self) -> Result<(&str, &str)> {
        match (self.input.as_deref(), self.output.as_deref()) {
            (Some(input), Some(output)) => Ok((input, output)),
            (None, _) => bail!("no input file given (use --input or set `input` in the config file)"),
            (_, None) => bail!("no output file given (use --output or set `output` in the config file)"),
        }
    }
}
