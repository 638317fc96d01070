//! Line markers
//!
//! Preprocessor output carries markers of the form `# 42 "path/file.h" 1 3`
//! that name the file and line the following text comes from.

use std::path::{Path, PathBuf};

/// Maps rows of preprocessed text to lines of the primary file
#[derive(Debug, Clone, Default)]
pub struct LineMap {
    lines: Vec<Option<usize>>,
}

impl LineMap {
    /// Build the map for `output` and return it with a copy of the output in
    /// which every marker is blanked, so rows keep their positions.
    pub fn from_preprocessed(output: &str, primary: &Path) -> (Self, String) {
        let mut lines = Vec::new();
        let mut code = String::with_capacity(output.len());
        let mut in_primary = false;
        let mut next_line = 1usize;

        for raw in output.split_inclusive('\n') {
            let newline = if raw.ends_with('\n') { "\n" } else { "" };
            if let Some((line, file)) = parse_marker(raw) {
                in_primary = same_file(&file, primary);
                next_line = line;
                lines.push(None);
                code.push_str(newline);
                continue;
            }

            lines.push(in_primary.then_some(next_line));
            next_line += 1;
            code.push_str(raw);
        }

        (Self { lines }, code)
    }

    /// Original 1-based line for a 0-based output row, when the row belongs
    /// to the primary file
    pub fn primary_line(&self, row: usize) -> Option<usize> {
        self.lines.get(row).copied().flatten()
    }

    /// Number of output rows known to the map
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Parse `# <line> "<file>" <flags>` (and the `#line` spelling)
fn parse_marker(line: &str) -> Option<(usize, PathBuf)> {
    let rest = line.strip_prefix('#')?;
    let rest = rest.strip_prefix("line").unwrap_or(rest);
    let rest = rest.trim_start();

    let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let number: usize = rest[..digits_end].parse().ok()?;

    let rest = rest[digits_end..].trim_start();
    let start = rest.find('"')?;
    let end = rest[start + 1..].find('"')?;
    let file = &rest[start + 1..start + 1 + end];

    Some((number, PathBuf::from(file)))
}

fn same_file(marker: &Path, primary: &Path) -> bool {
    if marker == primary {
        return true;
    }
    match (marker.canonicalize(), primary.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
