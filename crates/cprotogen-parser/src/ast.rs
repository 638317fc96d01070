//! Parsed syntax tree with line information

use std::path::{Path, PathBuf};
use tree_sitter::{Node, Tree};

use crate::preprocessor::LineMap;

/// Node kinds whose children are still at file scope
const TRANSPARENT_KINDS: &[&str] = &[
    "preproc_if",
    "preproc_ifdef",
    "preproc_else",
    "preproc_elif",
    "preproc_elifdef",
    "linkage_specification",
    "declaration_list",
];

/// A parsed C file: the tree-sitter tree, the text it was built from and
/// the mapping back to the lines of the file on disk.
pub struct SyntaxTree {
    origin: PathBuf,
    source: String,
    tree: Tree,
    line_map: Option<LineMap>,
}

impl SyntaxTree {
    pub fn new(origin: impl Into<PathBuf>, source: String, tree: Tree) -> Self {
        Self {
            origin: origin.into(),
            source,
            tree,
            line_map: None,
        }
    }

    /// Attach the line map of a preprocessed translation unit
    pub fn with_line_map(mut self, line_map: LineMap) -> Self {
        self.line_map = Some(line_map);
        self
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Text the tree was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// 1-based line in the original file for a 0-based row of the parsed
    /// text, or `None` when the row came from another file.
    pub fn line_of(&self, row: usize) -> Option<usize> {
        match &self.line_map {
            Some(map) => map.primary_line(row),
            None => Some(row + 1),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.root().has_error()
    }

    /// Original line of the first error or missing node
    pub fn first_error_line(&self) -> Option<usize> {
        fn find(node: Node) -> Option<usize> {
            if node.is_error() || node.is_missing() {
                return Some(node.start_position().row);
            }
            if !node.has_error() {
                return None;
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            children.into_iter().find_map(find)
        }

        let row = find(self.root())?;
        self.line_of(row).or(Some(row + 1))
    }

    /// Function definitions and declarations at file scope, in source
    /// order. Conditional-compilation blocks and linkage blocks are
    /// looked through.
    pub fn top_level_items(&self) -> Vec<Node<'_>> {
        let mut items = Vec::new();
        collect_items(self.root(), &mut items);
        items
    }

    /// Line of the `#endif` closing the include guard, if the file has one
    pub fn include_guard_end(&self) -> Option<usize> {
        let root = self.root();
        let mut cursor = root.walk();
        let guard = root
            .named_children(&mut cursor)
            .find(|node| node.kind() == "preproc_ifdef")?;

        let end = guard.end_position();
        let row = if end.column == 0 && end.row > 0 {
            end.row - 1
        } else {
            end.row
        };
        self.line_of(row)
    }
}

fn collect_items<'t>(node: Node<'t>, items: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "function_definition" | "declaration" => items.push(child),
            kind if TRANSPARENT_KINDS.contains(&kind) => collect_items(child, items),
            _ => {}
        }
    }
}
