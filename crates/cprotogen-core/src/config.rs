//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// cprotogen configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Parser configuration
    pub parser: ParserConfig,

    /// Header generation configuration
    pub header: HeaderConfig,
}

impl Config {
    /// Load a configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Parser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Run the C preprocessor before parsing
    pub preprocess: bool,

    /// Preprocessor executable (auto-detected when unset)
    pub preprocessor: Option<PathBuf>,

    /// Include directories passed as `-I`
    pub include_dirs: Vec<PathBuf>,

    /// Macro definitions passed as `-D` (`NAME` or `NAME=VALUE`)
    pub defines: Vec<String>,

    /// Keep going when the syntax tree contains error nodes
    pub allow_syntax_errors: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            preprocess: false,
            preprocessor: None,
            include_dirs: Vec::new(),
            defines: Vec::new(),
            allow_syntax_errors: false,
        }
    }
}

/// Header generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Emit prototypes for `static` definitions too
    pub include_static: bool,

    /// Write through a temporary file and rename it into place
    pub atomic_write: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            include_static: true,
            atomic_write: true,
        }
    }
}
