//! System preprocessor wrapper
//!
//! Invokes `cc -E` (or clang/gcc) so that macros, conditional compilation and
//! includes are resolved before the file reaches tree-sitter.

use cprotogen_core::{Error, ParserConfig, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use super::line_map::LineMap;

/// Options for preprocessing
#[derive(Debug, Clone, Default)]
pub struct PreprocessOptions {
    /// Include paths (-I flags)
    pub includes: Vec<PathBuf>,
    /// Macro definitions (-D flags), `NAME` or `NAME=VALUE`
    pub defines: Vec<String>,
    /// Additional arguments
    pub extra_args: Vec<String>,
}

impl From<&ParserConfig> for PreprocessOptions {
    fn from(config: &ParserConfig) -> Self {
        Self {
            includes: config.include_dirs.clone(),
            defines: config.defines.clone(),
            extra_args: Vec::new(),
        }
    }
}

/// Result of preprocessing
#[derive(Debug)]
pub struct PreprocessResult {
    /// Preprocessed code with line markers blanked out
    pub code: String,
    /// Output row -> line of the preprocessed file
    pub line_map: LineMap,
    /// Warnings reported on stderr
    pub warnings: Vec<String>,
}

/// Preprocessor executable wrapper
pub struct Preprocessor {
    program: PathBuf,
}

impl Preprocessor {
    /// Create a preprocessor, auto-detecting a C compiler driver
    pub fn new() -> Result<Self> {
        let program = Self::find_program()?;
        debug!("Found preprocessor at: {:?}", program);
        Ok(Self { program })
    }

    /// Create a preprocessor with a specific executable
    pub fn with_path(program: PathBuf) -> Self {
        Self { program }
    }

    /// Configured executable, or auto-detection when none is set
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        match &config.preprocessor {
            Some(path) => Ok(Self::with_path(path.clone())),
            None => Self::new(),
        }
    }

    fn find_program() -> Result<PathBuf> {
        let candidates = ["cc", "clang", "gcc", "/usr/bin/cc", "/usr/local/bin/clang"];

        for candidate in candidates {
            if let Ok(output) = Command::new(candidate).arg("--version").output() {
                if output.status.success() {
                    return Ok(PathBuf::from(candidate));
                }
            }
        }

        Err(Error::Preprocess(
            "no C preprocessor found (tried cc, clang, gcc)".into(),
        ))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check if the executable runs
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Preprocess a file on disk
    pub fn preprocess_file(
        &self,
        source_path: &Path,
        options: &PreprocessOptions,
    ) -> Result<PreprocessResult> {
        if !source_path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", source_path.display()),
            )));
        }

        let args = self.build_args(options);
        debug!("Preprocessing {:?} with args: {:?}", source_path, args);

        let output = Command::new(&self.program)
            .args(&args)
            .arg(source_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Preprocess(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let (line_map, code) = LineMap::from_preprocessed(&stdout, source_path);
        let warnings = parse_warnings(&output.stderr);
        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(PreprocessResult {
            code,
            line_map,
            warnings,
        })
    }

    fn build_args(&self, options: &PreprocessOptions) -> Vec<String> {
        // -E keeps line markers unless -P is given
        let mut args = vec!["-E".to_string()];

        for define in &options.defines {
            args.push(format!("-D{}", define));
        }

        for include in &options.includes {
            args.push(format!("-I{}", include.display()));
        }

        args.extend(options.extra_args.iter().cloned());
        args
    }
}

fn parse_warnings(stderr: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stderr)
        .lines()
        .filter(|line| line.contains("warning:"))
        .map(|s| s.to_string())
        .collect()
}
