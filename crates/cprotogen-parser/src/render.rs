//! Canonical C text for declaration nodes
//!
//! Tokens are joined with single spaces except around brackets and commas,
//! and pointer stars bind to what follows them: `char *`, `char **argv`,
//! `void (*cb)(int)`.

use tree_sitter::Node;

/// Nodes rendered from their raw text instead of their tokens
const ATOMIC_KINDS: &[&str] = &[
    "string_literal",
    "char_literal",
    "concatenated_string",
    "system_lib_string",
    "number_literal",
];

const POINTER_KINDS: &[&str] = &["pointer_declarator", "abstract_pointer_declarator"];

/// How a declarator relates to a function
#[derive(Debug, Clone, Copy)]
pub enum DeclaratorShape<'t> {
    /// A plain function, possibly returning pointers
    Function {
        /// Pointer levels that belong to the return type
        return_pointers: usize,
        /// The `function_declarator` node
        declarator: Node<'t>,
        /// The function's identifier
        name: Node<'t>,
    },
    /// A function whose declarator cannot be expressed as
    /// `<type> <name>(<params>)`, e.g. one returning a function pointer
    Unsupported,
    /// A variable, array or function pointer
    NotAFunction,
}

#[derive(Debug, Clone, Copy)]
struct Token<'s> {
    text: &'s str,
    kind: &'static str,
    parent: &'static str,
}

/// Renders nodes of a tree parsed from `source`
pub struct Renderer<'s> {
    source: &'s str,
}

impl<'s> Renderer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    /// Raw text of a node
    pub fn text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Whitespace-normalized text of a node
    pub fn canonical(&self, node: Node) -> String {
        let mut tokens = Vec::new();
        self.collect_tokens(node, &mut tokens);

        let mut out = String::new();
        let mut prev: Option<Token> = None;
        for token in tokens {
            if let Some(prev) = prev {
                if needs_space(&prev, &token) {
                    out.push(' ');
                }
            }
            out.push_str(token.text);
            prev = Some(token);
        }
        out
    }

    fn collect_tokens(&self, node: Node, tokens: &mut Vec<Token<'s>>) {
        if node.kind() == "comment" {
            return;
        }
        if node.child_count() == 0 || ATOMIC_KINDS.contains(&node.kind()) {
            let text = self.text(node);
            if !text.is_empty() {
                tokens.push(Token {
                    text,
                    kind: node.kind(),
                    parent: node.parent().map(|p| p.kind()).unwrap_or(""),
                });
            }
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect_tokens(child, tokens);
        }
    }

    /// Type specifier and qualifiers of a declaration, definition or
    /// parameter, in source order. Storage classes (`static`, `extern`,
    /// `inline`) and attributes are dropped.
    pub fn specifiers(&self, node: Node) -> String {
        let type_id = node.child_by_field_name("type").map(|t| t.id());

        let mut parts = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "type_qualifier" || Some(child.id()) == type_id {
                parts.push(self.canonical(child));
            }
        }
        parts.join(" ")
    }

    /// Whether the declaration carries the `static` storage class
    pub fn is_static(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|c| c.kind() == "storage_class_specifier" && self.text(c) == "static");
        found
    }

    /// Strip pointer declarators, returning the pointer text (`*`, `**`,
    /// `*const`) and whatever they wrapped
    fn unwrap_pointers<'t>(&self, mut node: Node<'t>) -> (String, Option<Node<'t>>) {
        let mut stars = String::new();
        while POINTER_KINDS.contains(&node.kind()) {
            stars.push('*');
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "type_qualifier" {
                    if !stars.ends_with('*') {
                        stars.push(' ');
                    }
                    stars.push_str(self.text(child));
                }
            }

            match node.child_by_field_name("declarator") {
                Some(inner) => node = inner,
                None => return (stars, None),
            }
        }
        (stars, Some(node))
    }

    /// Classify a declarator of a declaration or definition
    pub fn function_shape<'t>(&self, declarator: Node<'t>) -> DeclaratorShape<'t> {
        let mut pointers = 0;
        let mut node = declarator;
        while node.kind() == "pointer_declarator" {
            pointers += 1;
            match node.child_by_field_name("declarator") {
                Some(inner) => node = inner,
                None => return DeclaratorShape::NotAFunction,
            }
        }

        if node.kind() != "function_declarator" {
            return DeclaratorShape::NotAFunction;
        }

        match node.child_by_field_name("declarator") {
            Some(target) if target.kind() == "identifier" => DeclaratorShape::Function {
                return_pointers: pointers,
                declarator: node,
                name: target,
            },
            Some(target) if target.kind() == "parenthesized_declarator" => {
                if contains_kind(target, "function_declarator") {
                    DeclaratorShape::Unsupported
                } else if contains_kind(target, "pointer_declarator") {
                    DeclaratorShape::NotAFunction
                } else {
                    DeclaratorShape::Unsupported
                }
            }
            _ => DeclaratorShape::Unsupported,
        }
    }

    /// Return type of a function: specifiers of `decl` plus the pointer
    /// levels between the declarator and its `function_declarator`
    pub fn return_type(&self, decl: Node, declarator: Node) -> String {
        let (stars, _) = self.unwrap_pointers(declarator);
        type_text(&self.specifiers(decl), &stars)
    }

    /// Rendered parameters of a `function_declarator`
    pub fn parameters(&self, function_declarator: Node) -> Vec<String> {
        let Some(list) = function_declarator.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut params = Vec::new();
        let mut cursor = list.walk();
        for child in list.children(&mut cursor) {
            match child.kind() {
                "..." | "variadic_parameter" => params.push("...".to_string()),
                "comment" => {}
                _ if child.is_named() => params.push(self.parameter(child)),
                _ => {}
            }
        }
        params
    }

    /// One parameter. Plain pointer chains are split into type and name and
    /// joined by [`join_type_and_name`]; arrays and function pointers keep
    /// the name inside the declarator.
    pub fn parameter(&self, param: Node) -> String {
        if param.kind() != "parameter_declaration" {
            return self.canonical(param);
        }

        let base = self.specifiers(param);
        let Some(declarator) = param.child_by_field_name("declarator") else {
            return base;
        };

        match self.unwrap_pointers(declarator) {
            (stars, None) => type_text(&base, &stars),
            (stars, Some(name)) if name.kind() == "identifier" => {
                join_type_and_name(&type_text(&base, &stars), self.text(name))
            }
            (_, Some(_)) => join_type_and_name(&base, &self.canonical(declarator)),
        }
    }
}

/// `char` + `**` -> `char **`
pub fn type_text(base: &str, pointers: &str) -> String {
    match (base.is_empty(), pointers.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => pointers.to_string(),
        (false, false) => format!("{} {}", base, pointers),
    }
}

/// A type ending in `*` is glued to the name, anything else gets one space
pub fn join_type_and_name(ty: &str, name: &str) -> String {
    if ty.is_empty() {
        name.to_string()
    } else if ty.ends_with('*') {
        format!("{}{}", ty, name)
    } else {
        format!("{} {}", ty, name)
    }
}

fn needs_space(prev: &Token, next: &Token) -> bool {
    if matches!(next.text, ")" | "]" | "," | ";" | "[") {
        return false;
    }
    if matches!(prev.text, "(" | "[") {
        return false;
    }
    if prev.text == "*" && POINTER_KINDS.contains(&prev.parent) {
        return false;
    }
    if next.text == "(" && (prev.kind == "identifier" || prev.text == ")") {
        return false;
    }
    true
}

fn contains_kind(node: Node, kind: &str) -> bool {
    if node.kind() == kind {
        return true;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().any(|c| contains_kind(c, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treesitter::TreeSitterParser;
    use crate::Parser;
    use std::path::Path;

    fn render_params(source: &str) -> Vec<String> {
        let tree = TreeSitterParser::new()
            .parse(source, Path::new("test.h"))
            .unwrap();
        let item = tree.top_level_items()[0];
        let renderer = Renderer::new(tree.source());
        let declarator = item.child_by_field_name("declarator").unwrap();
        match renderer.function_shape(declarator) {
            DeclaratorShape::Function { declarator, .. } => renderer.parameters(declarator),
            other => panic!("not a function: {:?}", other),
        }
    }

    #[test]
    fn test_pointer_params_glue_to_name() {
        assert_eq!(
            render_params("int f(int a, char *s, const char **argv);"),
            vec!["int a", "char *s", "const char **argv"]
        );
    }

    #[test]
    fn test_unnamed_and_void_params() {
        assert_eq!(render_params("int f(void);"), vec!["void"]);
        assert!(render_params("int f();").is_empty());
        assert_eq!(render_params("int f(int, char *);"), vec!["int", "char *"]);
    }

    #[test]
    fn test_array_and_function_pointer_params() {
        assert_eq!(
            render_params("int main(int argc, char  *argv[ ]);"),
            vec!["int argc", "char *argv[]"]
        );
        assert_eq!(
            render_params("void reg(void ( * cb )( int, void * ));"),
            vec!["void (*cb)(int, void *)"]
        );
    }

    #[test]
    fn test_variadic_and_struct_params() {
        assert_eq!(
            render_params("int log_msg(struct logger *l, const char *fmt, ...);"),
            vec!["struct logger *l", "const char *fmt", "..."]
        );
    }

    #[test]
    fn test_return_type_drops_storage_class() {
        let tree = TreeSitterParser::new()
            .parse(
                "static inline const char **names(void) { return 0; }\n",
                Path::new("t.c"),
            )
            .unwrap();
        let item = tree.top_level_items()[0];
        let renderer = Renderer::new(tree.source());
        let declarator = item.child_by_field_name("declarator").unwrap();

        assert!(renderer.is_static(item));
        assert_eq!(renderer.return_type(item, declarator), "const char **");
    }

    #[test]
    fn test_shapes() {
        let tree = TreeSitterParser::new()
            .parse(
                "int (*handler)(int);\nint counter;\nint (*pick(int which))(int);\n",
                Path::new("t.h"),
            )
            .unwrap();
        let renderer = Renderer::new(tree.source());
        let shapes: Vec<_> = tree
            .top_level_items()
            .into_iter()
            .map(|item| renderer.function_shape(item.child_by_field_name("declarator").unwrap()))
            .collect();

        assert!(matches!(shapes[0], DeclaratorShape::NotAFunction));
        assert!(matches!(shapes[1], DeclaratorShape::NotAFunction));
        assert!(matches!(shapes[2], DeclaratorShape::Unsupported));
    }

    #[test]
    fn test_join_type_and_name() {
        assert_eq!(join_type_and_name("int", "x"), "int x");
        assert_eq!(join_type_and_name("int *", "x"), "int *x");
        assert_eq!(join_type_and_name("", "x"), "x");
        assert_eq!(type_text("char", "**"), "char **");
        assert_eq!(type_text("char", ""), "char");
    }
}
