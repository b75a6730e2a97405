//! Program-level configuration.
//!
//! A [`CliConfig`] names the program and tunes help layout. It can be
//! declared in code or loaded from YAML:
//!
//! ```yaml
//! name: pm
//! description: A tiny package manager
//! help:
//!   indent: 4
//!   column_gap: 3
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Program name, description and help layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Root command name, shown as the first path segment.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub help: HelpConfig,
}

/// Help rendering settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    /// Spaces before each row in a help section.
    pub indent: usize,
    /// Minimum spaces between a row's label and its description.
    pub column_gap: usize,
    /// Description of the synthetic `--help` option.
    pub help_description: String,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            column_gap: 2,
            help_description: "Display help for command".to_string(),
        }
    }
}

impl CliConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            help: HelpConfig::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_help(mut self, help: HelpConfig) -> Self {
        self.help = help;
        self
    }

    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading CLI configuration");
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: CliConfig = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
