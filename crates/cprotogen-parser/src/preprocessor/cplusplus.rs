//! C++ linkage blocks
//!
//! Headers meant for both C and C++ wrap their declarations in
//!
//! ```c
//! #ifdef __cplusplus
//! extern "C" {
//! #endif
//! ```
//!
//! and the matching closing block. A tree built from the raw text sees an
//! unbalanced `{`, so before parsing without the system preprocessor every
//! line a C compiler would skip is blanked. `__cplusplus` is never defined
//! in C, so `#ifdef` branches go and `#ifndef`/`#else` branches stay.
//! Rows keep their positions and line numbers stay valid.

use std::borrow::Cow;
use tracing::debug;

const MACRO: &str = "__cplusplus";

#[derive(Debug, Clone, Copy)]
enum Frame {
    /// A conditional on `__cplusplus`; `live` is the state of its branch
    Cplusplus { live: bool },
    /// Any other conditional, left to the parser
    Other,
}

/// `source` with the C++-only lines blanked, or borrowed unchanged when it
/// has none. An `#elif` on a `__cplusplus` conditional cannot be decided
/// without evaluating it, so such a file is returned unchanged.
pub fn blank_cplusplus_blocks(source: &str) -> Cow<'_, str> {
    if !source.contains(MACRO) {
        return Cow::Borrowed(source);
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut out = String::with_capacity(source.len());
    let mut blanked = 0usize;

    for line in source.split_inclusive('\n') {
        let dead = stack
            .iter()
            .any(|frame| matches!(frame, Frame::Cplusplus { live: false }));

        let blank = match directive(line) {
            Some(("ifdef", rest)) if first_word(rest) == MACRO => {
                stack.push(Frame::Cplusplus { live: false });
                true
            }
            Some(("ifndef", rest)) if first_word(rest) == MACRO => {
                stack.push(Frame::Cplusplus { live: true });
                true
            }
            Some(("if", rest)) => match tests_cplusplus(rest) {
                Some(defined) => {
                    stack.push(Frame::Cplusplus { live: !defined });
                    true
                }
                None => {
                    stack.push(Frame::Other);
                    dead
                }
            },
            Some(("ifdef" | "ifndef", _)) => {
                stack.push(Frame::Other);
                dead
            }
            Some(("else", _)) => match stack.last_mut() {
                Some(Frame::Cplusplus { live }) => {
                    *live = !*live;
                    true
                }
                _ => dead,
            },
            Some(("elif" | "elifdef" | "elifndef", _)) => match stack.last() {
                Some(Frame::Cplusplus { .. }) => {
                    debug!("#elif on {}, parsing the text unchanged", MACRO);
                    return Cow::Borrowed(source);
                }
                _ => dead,
            },
            Some(("endif", _)) => match stack.pop() {
                Some(Frame::Cplusplus { .. }) => true,
                _ => dead,
            },
            _ => dead,
        };

        if blank {
            blanked += 1;
            out.push_str(line_ending(line));
        } else {
            out.push_str(line);
        }
    }

    if blanked == 0 {
        return Cow::Borrowed(source);
    }
    debug!("Blanked {} C++-only lines", blanked);
    Cow::Owned(out)
}

/// Keyword and remainder of a preprocessor directive line
fn directive(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    Some((&rest[..end], &rest[end..]))
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or("")
}

/// `Some(true)` for `#if defined(__cplusplus)`, `Some(false)` for its
/// negation, `None` for any other condition
fn tests_cplusplus(condition: &str) -> Option<bool> {
    let compact: String = condition
        .split("//")
        .next()
        .unwrap_or("")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let (negated, test) = match compact.strip_prefix('!') {
        Some(test) => (true, test),
        None => (false, compact.as_str()),
    };
    let plain = matches!(test, "__cplusplus" | "defined__cplusplus" | "defined(__cplusplus)");
    plain.then_some(!negated)
}

fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extern_c_wrapper_is_blanked() {
        let header = "#ifndef A_H\n#define A_H\n#ifdef __cplusplus\nextern \"C\" {\n#endif\nint a(int x);\n#ifdef __cplusplus\n}\n#endif\n#endif\n";
        let blanked = blank_cplusplus_blocks(header);

        assert_eq!(
            blanked,
            "#ifndef A_H\n#define A_H\n\n\n\nint a(int x);\n\n\n\n#endif\n"
        );
        assert_eq!(blanked.lines().count(), header.lines().count());
    }

    #[test]
    fn test_else_branch_is_kept() {
        let text = "#if defined(__cplusplus)\nclass X;\n#else\nstruct X;\n#endif\n#ifndef __cplusplus\nint c_only(void);\n#endif\n";
        assert_eq!(
            blank_cplusplus_blocks(text),
            "\n\n\nstruct X;\n\n\nint c_only(void);\n\n"
        );
    }

    #[test]
    fn test_nested_conditionals_inside_block() {
        let text = "#ifdef __cplusplus\n#ifdef WIN32\nextern \"C++\" {\n#endif\n#endif\n#ifdef DEBUG\nint dbg(void);\n#endif\n";
        assert_eq!(
            blank_cplusplus_blocks(text),
            "\n\n\n\n\n#ifdef DEBUG\nint dbg(void);\n#endif\n"
        );
    }

    #[test]
    fn test_unrelated_text_is_borrowed() {
        let text = "#ifdef DEBUG\nint dbg(void);\n#endif\n";
        assert!(matches!(blank_cplusplus_blocks(text), Cow::Borrowed(_)));

        let mention = "/* works with __cplusplus too */\nint f(void);\n";
        assert!(matches!(blank_cplusplus_blocks(mention), Cow::Borrowed(_)));
    }

    #[test]
    fn test_elif_leaves_text_unchanged() {
        let text = "#ifdef __cplusplus\nextern \"C\" {\n#elif defined(X)\nint x;\n#endif\n";
        assert_eq!(blank_cplusplus_blocks(text), text);
    }
}
