//! Merge policy
//!
//! The header decides the order of the functions it already declares, the
//! source decides their text. Functions new to the header are appended in
//! source order and functions the source no longer defines are dropped.

use cprotogen_core::SignatureMap;
use std::collections::HashSet;

/// Final prototype list for a header declaring `old` whose source now
/// defines `new`
pub fn merge_prototypes(old: &SignatureMap, new: &SignatureMap) -> Vec<String> {
    let mut merged = Vec::with_capacity(new.len());
    let mut visited = HashSet::new();

    for name in old.names() {
        if let Some(text) = new.get(name) {
            merged.push(text.to_string());
            visited.insert(name);
        }
    }

    for (name, text) in new.iter() {
        if !visited.contains(name) {
            merged.push(text.to_string());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> SignatureMap {
        let mut map = SignatureMap::new();
        for (name, text) in entries {
            map.insert(*name, *text);
        }
        map
    }

    #[test]
    fn test_header_order_wins_for_known_functions() {
        let old = map(&[("b", "int b();\n"), ("a", "int a();\n")]);
        let new = map(&[("a", "int a(int x);\n"), ("b", "int b(int y);\n")]);

        assert_eq!(
            merge_prototypes(&old, &new),
            vec!["int b(int y);\n", "int a(int x);\n"]
        );
    }

    #[test]
    fn test_new_functions_are_appended_in_source_order() {
        let old = map(&[("keep", "void keep();\n")]);
        let new = map(&[
            ("zeta", "void zeta();\n"),
            ("keep", "void keep();\n"),
            ("alpha", "void alpha();\n"),
        ]);

        assert_eq!(
            merge_prototypes(&old, &new),
            vec!["void keep();\n", "void zeta();\n", "void alpha();\n"]
        );
    }

    #[test]
    fn test_stale_declarations_are_dropped() {
        let old = map(&[("foo", "void foo(void);\n"), ("add", "int add(int a, int b);\n")]);
        let new = map(&[("add", "int add(int a, int b);\n"), ("bar", "int bar(int *p);\n")]);

        let merged = merge_prototypes(&old, &new);
        assert_eq!(merged, vec!["int add(int a, int b);\n", "int bar(int *p);\n"]);
        assert!(!merged.iter().any(|p| p.contains("foo")));
    }

    #[test]
    fn test_empty_sides() {
        let some = map(&[("f", "int f();\n")]);
        let none = SignatureMap::new();

        assert_eq!(merge_prototypes(&none, &some), vec!["int f();\n"]);
        assert!(merge_prototypes(&some, &none).is_empty());
    }
}
