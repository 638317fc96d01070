//! Tree-sitter based parsers for C

use cprotogen_core::{Error, Result};
use std::path::Path;
use tree_sitter::Parser as TSParser;
use tracing::{debug, warn};

use crate::ast::SyntaxTree;
use crate::preprocessor::{blank_cplusplus_blocks, PreprocessOptions, Preprocessor};

/// Parses C text without running the preprocessor. Directives stay in the
/// tree, except for `__cplusplus` conditionals whose C++-only lines are
/// blanked first.
#[derive(Debug, Clone, Default)]
pub struct TreeSitterParser {
    tolerant: bool,
}

impl TreeSitterParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept trees that contain syntax errors
    pub fn tolerant(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    fn build(&self, source: String, origin: &Path) -> Result<SyntaxTree> {
        let mut parser = TSParser::new();
        parser
            .set_language(&tree_sitter_c::language())
            .map_err(|e| Error::Parse(format!("failed to load C grammar: {}", e)))?;

        let tree = parser.parse(&source, None).ok_or_else(|| {
            Error::Parse(format!("{}: parser produced no tree", origin.display()))
        })?;

        Ok(SyntaxTree::new(origin, source, tree))
    }

    fn check(&self, tree: SyntaxTree) -> Result<SyntaxTree> {
        if !tree.has_errors() {
            return Ok(tree);
        }

        let line = tree.first_error_line().unwrap_or(0);
        if self.tolerant {
            warn!(
                "{}:{}: syntax error, continuing with a partial tree",
                tree.origin().display(),
                line
            );
            Ok(tree)
        } else {
            Err(Error::Parse(format!(
                "{}:{}: syntax error",
                tree.origin().display(),
                line
            )))
        }
    }
}

impl crate::Parser for TreeSitterParser {
    fn parse(&self, source: &str, origin: &Path) -> Result<SyntaxTree> {
        debug!("Parsing {}", origin.display());
        let source = blank_cplusplus_blocks(source).into_owned();
        let tree = self.build(source, origin)?;
        self.check(tree)
    }

    fn name(&self) -> &str {
        "tree-sitter"
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Runs the system preprocessor first and parses its output. Only the rows
/// that map back to the parsed file take part in extraction.
pub struct PreprocessingParser {
    inner: TreeSitterParser,
    preprocessor: Preprocessor,
    options: PreprocessOptions,
}

impl PreprocessingParser {
    pub fn new(
        inner: TreeSitterParser,
        preprocessor: Preprocessor,
        options: PreprocessOptions,
    ) -> Self {
        Self {
            inner,
            preprocessor,
            options,
        }
    }
}

impl crate::Parser for PreprocessingParser {
    /// Text that is not on disk is parsed without preprocessing
    fn parse(&self, source: &str, origin: &Path) -> Result<SyntaxTree> {
        crate::Parser::parse(&self.inner, source, origin)
    }

    fn parse_file(&self, path: &Path) -> Result<SyntaxTree> {
        let result = self.preprocessor.preprocess_file(path, &self.options)?;
        debug!(
            "Preprocessed {} into {} rows",
            path.display(),
            result.line_map.len()
        );
        let tree = self
            .inner
            .build(result.code, path)?
            .with_line_map(result.line_map);
        self.inner.check(tree)
    }

    fn name(&self) -> &str {
        "tree-sitter+cpp"
    }

    fn is_available(&self) -> bool {
        self.preprocessor.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Parser;

    #[test]
    fn test_parse_simple_source() {
        let parser = TreeSitterParser::new();
        let tree = parser
            .parse("int add(int a, int b) { return a + b; }\n", Path::new("add.c"))
            .unwrap();

        assert!(!tree.has_errors());
        assert_eq!(tree.top_level_items().len(), 1);
        assert_eq!(tree.origin(), Path::new("add.c"));
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let parser = TreeSitterParser::new();
        let err = parser
            .parse("int ok(void);\nint broken(int a {\n", Path::new("bad.h"))
            .err()
            .unwrap();

        match err {
            Error::Parse(message) => assert!(message.starts_with("bad.h:")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_tolerant_mode_keeps_tree() {
        let parser = TreeSitterParser::new().tolerant(true);
        let tree = parser
            .parse("int ok(void);\nint broken(int a {\n", Path::new("bad.h"))
            .unwrap();
        assert!(tree.has_errors());
    }

    #[test]
    fn test_parse_header_with_extern_c_wrapper() {
        let header = "#ifndef API_H\n#define API_H\n\n#ifdef __cplusplus\nextern \"C\" {\n#endif\n\nint api_open(const char *path);\n\n#ifdef __cplusplus\n}\n#endif\n\n#endif\n";
        let tree = TreeSitterParser::new()
            .parse(header, Path::new("api.h"))
            .unwrap();

        assert!(!tree.has_errors());
        assert_eq!(tree.top_level_items().len(), 1);
        assert_eq!(tree.include_guard_end(), Some(14));
    }

    #[test]
    fn test_parse_missing_file() {
        let parser = TreeSitterParser::new();
        let err = parser.parse_file(Path::new("/nonexistent/file.c")).err().unwrap();
        assert!(matches!(err, Error::Io(_)));
    }
}
