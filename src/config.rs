//! Checker configuration.
//!
//! Read from a TOML file.  Every field is optional; CLI flags override
//! whatever the file sets.
//!
//! ```toml
//! strict = false
//! format = "text"
//! exclude = ["vendor/**", "tests/fixtures/**"]
//! extensions = ["php", "phtml"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use etcetera::BaseStrategy;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::CheckError;

pub const SERVICE_NAME: &str = "phpdoc-typecheck";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "phpdoc-types.toml";

/// Output format of the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Propagate fatal errors instead of degrading a file to one
    /// file-level diagnostic.
    pub strict: bool,
    pub format: OutputFormat,
    /// Glob patterns of paths to skip.
    pub exclude: Vec<String>,
    /// File extensions to check, without the dot.
    pub extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            format: OutputFormat::Text,
            exclude: Vec::new(),
            extensions: vec!["php".to_string()],
        }
    }
}

impl Config {
    /// Parse a config from TOML text.  `path` is only used for errors.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, CheckError> {
        toml::from_str(content).map_err(|err| CheckError::Config {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, CheckError> {
        let content = fs::read_to_string(path).map_err(|source| CheckError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Load the config: an explicit path must exist, otherwise the first
    /// file found on the search path wins, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CheckError> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        for path in config_search_paths() {
            if path.exists() {
                let config = Self::from_file(&path)?;
                info!("Loaded config from {}", path.display());
                return Ok(config);
            }
        }

        debug!("No config file found for {}; using defaults", SERVICE_NAME);
        Ok(Self::default())
    }

    /// Whether `path` has one of the configured extensions.
    pub fn wants_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }
}

fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];

    if let Ok(strategy) = etcetera::choose_base_strategy() {
        paths.push(strategy.config_dir().join(SERVICE_NAME).join("config.toml"));
    }

    paths
}
