//! Core type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::location::LineBounds;

/// A function prototype as it should appear in a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Function name
    pub name: String,
    /// Rendered prototype, terminated by `;` and a newline
    pub canonical_text: String,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, canonical_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canonical_text: canonical_text.into(),
        }
    }
}

/// Insertion-ordered map from function name to canonical prototype text.
///
/// Inserting a name that is already present replaces its text but keeps
/// the position of the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl SignatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a prototype, returning the previous text
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> Option<String> {
        let name = name.into();
        let text = text.into();
        match self.index.get(&name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, text)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, text));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, text)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which kind of file is being visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractMode {
    /// Prototypes only, no bodies (a `.h` file)
    Header,
    /// Function definitions with bodies
    Source,
}

impl ExtractMode {
    /// `.h` files are headers, everything else is treated as source
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("h") => ExtractMode::Header,
            _ => ExtractMode::Source,
        }
    }
}

/// Prototypes extracted from one file
#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    /// Every visited signature, in source order
    pub ordered_signatures: Vec<FunctionSignature>,
    /// Name -> prototype, last write wins
    pub by_name: SignatureMap,
    /// Lines spanned by the visited functions
    pub bounds: LineBounds,
    /// Number of distinct lines actually occupied by prototypes
    pub covered_lines: usize,
}

impl ExtractionResult {
    /// Record a signature in both the ordered list and the map
    pub fn push(&mut self, signature: FunctionSignature) {
        self.by_name
            .insert(signature.name.clone(), signature.canonical_text.clone());
        self.ordered_signatures.push(signature);
    }

    /// Canonical texts in source order
    pub fn prototypes(&self) -> Vec<String> {
        self.ordered_signatures
            .iter()
            .map(|sig| sig.canonical_text.clone())
            .collect()
    }

    /// Distinct function names, in order of first appearance
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.names()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_signatures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_map_keeps_first_position() {
        let mut map = SignatureMap::new();
        map.insert("a", "int a();\n");
        map.insert("b", "int b();\n");
        let previous = map.insert("a", "long a();\n");

        assert_eq!(previous.as_deref(), Some("int a();\n"));
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some("long a();\n"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_extraction_result_push() {
        let mut result = ExtractionResult::default();
        result.push(FunctionSignature::new("f", "void f();\n"));
        result.push(FunctionSignature::new("f", "int f();\n"));

        assert_eq!(result.ordered_signatures.len(), 2);
        assert_eq!(result.by_name.len(), 1);
        assert_eq!(result.by_name.get("f"), Some("int f();\n"));
    }

    #[test]
    fn test_extraction_result_names_are_distinct() {
        let mut result = ExtractionResult::default();
        result.push(FunctionSignature::new("calc", "int calc(int x);\n"));
        result.push(FunctionSignature::new("init", "void init(void);\n"));
        result.push(FunctionSignature::new("calc", "long calc(long x);\n"));

        assert_eq!(result.names().collect::<Vec<_>>(), vec!["calc", "init"]);
        assert_eq!(result.prototypes().len(), 3);
    }

    #[test]
    fn test_mode_from_path() {
        assert_eq!(ExtractMode::from_path(Path::new("dir/foo.h")), ExtractMode::Header);
        assert_eq!(ExtractMode::from_path(Path::new("foo.c")), ExtractMode::Source);
        assert_eq!(ExtractMode::from_path(Path::new("Makefile")), ExtractMode::Source);
    }
}
