//! cprotogen Parser
//!
//! The C front-end of cprotogen: builds tree-sitter syntax trees for C files
//! (optionally after running the system preprocessor), renders declaration
//! nodes back to canonical C text and extracts function prototypes.
//!
//! ## Modules
//!
//! - `treesitter` - tree-sitter backed parsers
//! - `preprocessor` - system C preprocessor integration
//! - `ast` - parsed tree with line information
//! - `render` - canonical C text for types and declarators
//! - `extract` - prototype extraction from a syntax tree

pub mod ast;
pub mod extract;
pub mod preprocessor;
pub mod render;
pub mod treesitter;

pub use ast::SyntaxTree;
pub use extract::{extract_signatures, ExtractOptions};

use cprotogen_core::{ParserConfig, Result};
use std::path::Path;

/// Parser trait for different backends
pub trait Parser {
    /// Parse source code; `origin` names the file it was read from
    fn parse(&self, source: &str, origin: &Path) -> Result<SyntaxTree>;

    /// Parse a file
    fn parse_file(&self, path: &Path) -> Result<SyntaxTree> {
        let source = std::fs::read_to_string(path)?;
        self.parse(&source, path)
    }

    /// Get parser name
    fn name(&self) -> &str;

    /// Check if parser is available
    fn is_available(&self) -> bool;
}

/// Get the parser matching the configuration
pub fn get_parser(config: &ParserConfig) -> Result<Box<dyn Parser>> {
    let base = treesitter::TreeSitterParser::new().tolerant(config.allow_syntax_errors);
    if config.preprocess {
        let preprocessor = preprocessor::Preprocessor::from_config(config)?;
        Ok(Box::new(treesitter::PreprocessingParser::new(
            base,
            preprocessor,
            config.into(),
        )))
    } else {
        Ok(Box::new(base))
    }
}
