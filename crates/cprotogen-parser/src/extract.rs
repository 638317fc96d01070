//! Prototype extraction
//!
//! Walks the file-scope items of a [`SyntaxTree`] and produces an
//! [`ExtractionResult`]. Header mode reads function declarations, source
//! mode reads function definitions; both emit the same canonical text:
//!
//! ```text
//! <return type><name>(<param>, <param>);\n
//! ```
//!
//! where a return or parameter type ending in `*` is glued to the name.

use cprotogen_core::{Error, ExtractMode, ExtractionResult, FunctionSignature, Result};
use std::collections::BTreeSet;
use tracing::debug;
use tree_sitter::Node;

use crate::ast::SyntaxTree;
use crate::render::{join_type_and_name, DeclaratorShape, Renderer};

/// Extraction options
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Emit prototypes for `static` definitions
    pub include_static: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_static: true,
        }
    }
}

/// Extract the prototypes of one file.
///
/// Fails with [`Error::Extraction`] when a function declarator has a shape
/// that cannot be written as `<type> <name>(<params>)`.
pub fn extract_signatures(
    tree: &SyntaxTree,
    mode: ExtractMode,
    options: &ExtractOptions,
) -> Result<ExtractionResult> {
    let renderer = Renderer::new(tree.source());
    let mut result = ExtractionResult::default();
    let mut covered = BTreeSet::new();

    for item in tree.top_level_items() {
        let wanted = match (mode, item.kind()) {
            (ExtractMode::Header, "declaration") => true,
            (ExtractMode::Source, "function_definition") => {
                options.include_static || !renderer.is_static(item)
            }
            _ => false,
        };
        if !wanted {
            continue;
        }

        // Rows that came from another file through #include
        let Some(first) = tree.line_of(item.start_position().row) else {
            continue;
        };

        let mut cursor = item.walk();
        let declarators: Vec<Node> = item
            .children_by_field_name("declarator", &mut cursor)
            .collect();

        let mut last = first;
        let mut found = false;
        for declarator in declarators {
            let Some(signature) = signature_of(tree, &renderer, item, declarator)? else {
                continue;
            };
            debug!("{} {}: {}", mode_label(mode), signature.name, signature.canonical_text.trim_end());
            found = true;
            last = last.max(
                tree.line_of(declarator.end_position().row)
                    .unwrap_or(first),
            );
            result.push(signature);
        }

        if !found {
            continue;
        }

        // A declaration owns every line up to its terminator
        if mode == ExtractMode::Header {
            if let Some(end) = tree.line_of(item.end_position().row) {
                last = last.max(end);
            }
        }
        result.bounds.record(first, last);
        covered.extend(first..=last);
    }

    result.covered_lines = covered.len();
    Ok(result)
}

fn signature_of(
    tree: &SyntaxTree,
    renderer: &Renderer,
    item: Node,
    declarator: Node,
) -> Result<Option<FunctionSignature>> {
    let (declarator_node, name_node) = match renderer.function_shape(declarator) {
        DeclaratorShape::Function {
            declarator: function, name, ..
        } => (function, name),
        DeclaratorShape::NotAFunction => return Ok(None),
        DeclaratorShape::Unsupported => {
            return Err(Error::Extraction(format!(
                "{}:{}: cannot derive a prototype from `{}`",
                tree.origin().display(),
                error_line(tree, declarator.start_position().row),
                renderer.canonical(item)
            )));
        }
    };

    let name = renderer.text(name_node);
    if name.is_empty() {
        let row = declarator.start_position().row;
        return Err(Error::Extraction(format!(
            "{}:{}: function declaration without a name",
            tree.origin().display(),
            error_line(tree, row)
        )));
    }

    let return_type = renderer.return_type(item, declarator);
    let params = renderer.parameters(declarator_node).join(", ");
    let text = format!("{}({});\n", join_type_and_name(&return_type, name), params);

    Ok(Some(FunctionSignature::new(name, text)))
}

/// Line reported in extraction errors for a row of the parsed text
fn error_line(tree: &SyntaxTree, row: usize) -> usize {
    tree.line_of(row).unwrap_or(row + 1)
}

fn mode_label(mode: ExtractMode) -> &'static str {
    match mode {
        ExtractMode::Header => "declared",
        ExtractMode::Source => "defined",
    }
}
