//! Error types for cprotogen

use std::path::PathBuf;
use thiserror::Error;

/// cprotogen error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The C front-end could not produce a usable syntax tree
    #[error("Parse error: {0}")]
    Parse(String),

    /// The C preprocessor is missing or rejected the input
    #[error("Preprocessor error: {0}")]
    Preprocess(String),

    /// A function declaration did not have the expected shape
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("A header file already exists at {}", .0.display())]
    HeaderExists(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for cprotogen
pub type Result<T> = std::result::Result<T, Error>;
