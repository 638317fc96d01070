//! Header writer
//!
//! Either synthesizes a new header around a list of prototypes or splices
//! the prototypes into an existing header, replacing the line range the old
//! prototypes occupied and leaving every other line untouched.

use cprotogen_core::{Error, LineBounds, Result};
use regex::Regex;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

fn non_identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"))
}

/// Include guard token for a source file: `src/my_lib.c` -> `MY_LIB_H`.
///
/// Characters that cannot appear in an identifier become `_`.
pub fn include_guard(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".c").unwrap_or(&file_name);

    let mut guard = non_identifier()
        .replace_all(&format!("{}_H", stem), "_")
        .to_uppercase();
    if guard.starts_with(|c: char| c.is_ascii_digit()) {
        guard.insert(0, '_');
    }
    guard
}

/// A fresh header for `source` declaring `prototypes`
pub fn synthesize_header(source: &Path, prototypes: &[String]) -> String {
    let guard = include_guard(source);
    format!(
        "#ifndef {guard}\n#define {guard}\n\n{}\n#endif // {guard}",
        prototypes.concat()
    )
}

/// Where prototypes go in an existing header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpliceRegion {
    /// 0-based line index the new prototypes are inserted at
    pub insert_at: usize,
    /// Number of old lines replaced, starting at `insert_at`
    pub replace: usize,
}

impl SpliceRegion {
    /// The region occupied by the prototypes a header already declares
    pub fn from_bounds(bounds: &LineBounds) -> Option<Self> {
        let (first, _) = bounds.span()?;
        Some(Self {
            insert_at: first - 1,
            replace: bounds.len(),
        })
    }

    /// Pure insertion before 0-based line `index`
    pub fn insertion(index: usize) -> Self {
        Self {
            insert_at: index,
            replace: 0,
        }
    }
}

/// Insert `prototypes` at the start of `region` and drop the `region.replace`
/// lines that the insertion pushed down
pub fn splice_prototypes(content: &str, region: SpliceRegion, prototypes: &[String]) -> String {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let insert_at = region.insert_at.min(lines.len());
    let resume_at = (insert_at + region.replace).min(lines.len());

    let mut out = String::with_capacity(content.len());
    for line in &lines[..insert_at] {
        out.push_str(line);
    }
    if !prototypes.is_empty() && !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for prototype in prototypes {
        out.push_str(prototype);
    }
    for line in &lines[resume_at..] {
        out.push_str(line);
    }

    debug!(
        "Spliced {} prototypes at line {}, replacing {} lines",
        prototypes.len(),
        insert_at + 1,
        resume_at - insert_at
    );
    out
}

/// Replace the contents of `path`.
///
/// With `atomic` set and a file already present, the new contents go to a
/// temporary file in the same directory which is renamed over the original,
/// keeping its permissions. A symlinked header is rewritten at its target.
pub fn write_header_file(path: &Path, contents: &str, atomic: bool) -> Result<()> {
    let existing = std::fs::metadata(path).ok();
    let Some(metadata) = existing.filter(|_| atomic) else {
        std::fs::write(path, contents)?;
        return Ok(());
    };

    let target = std::fs::canonicalize(path)?;
    if target != path {
        debug!("Writing {} through {}", target.display(), path.display());
    }
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().set_permissions(metadata.permissions())?;
    tmp.persist(&target).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn protos(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard(Path::new("add.c")), "ADD_H");
        assert_eq!(include_guard(Path::new("src/net/my_sock.c")), "MY_SOCK_H");
        assert_eq!(include_guard(Path::new("my-lib.v2.c")), "MY_LIB_V2_H");
        assert_eq!(include_guard(Path::new("3d.c")), "_3D_H");
        assert_eq!(include_guard(Path::new("util.cc")), "UTIL_CC_H");
    }

    #[test]
    fn test_synthesize_header() {
        let header = synthesize_header(
            Path::new("lib/add.c"),
            &protos(&["int add(int a, int b);\n", "int sub(int a, int b);\n"]),
        );
        assert_eq!(
            header,
            "#ifndef ADD_H\n#define ADD_H\n\nint add(int a, int b);\nint sub(int a, int b);\n\n#endif // ADD_H"
        );
    }

    #[test]
    fn test_splice_replaces_block() {
        let content = "#ifndef X_H\n#define X_H\nint a();\nint b();\nint c();\n#endif\n";
        let region = SpliceRegion {
            insert_at: 2,
            replace: 3,
        };

        let out = splice_prototypes(content, region, &protos(&["int b(int);\n", "int d();\n"]));
        assert_eq!(out, "#ifndef X_H\n#define X_H\nint b(int);\nint d();\n#endif\n");
    }

    #[test]
    fn test_splice_keeps_surrounding_content() {
        let content = "// top\n\nint a();\nint b();\nint c();\n\nstruct after { int x; };\n";
        let region = SpliceRegion::from_bounds(&LineBounds { first: 3, last: 5 }).unwrap();

        let out = splice_prototypes(content, region, &protos(&["int n1();\n", "int n2();\n"]));
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(&lines[..2], &["// top", ""]);
        assert_eq!(&lines[2..4], &["int n1();", "int n2();"]);
        assert_eq!(&lines[4..], &["", "struct after { int x; };"]);
    }

    #[test]
    fn test_splice_insertion_only() {
        let content = "#ifndef E_H\n#define E_H\n#endif";
        let out = splice_prototypes(content, SpliceRegion::insertion(2), &protos(&["int f();\n"]));
        assert_eq!(out, "#ifndef E_H\n#define E_H\nint f();\n#endif");

        let out = splice_prototypes("", SpliceRegion::insertion(0), &protos(&["int f();\n"]));
        assert_eq!(out, "int f();\n");
    }

    #[test]
    fn test_splice_at_unterminated_last_line() {
        let out = splice_prototypes("int a();", SpliceRegion::insertion(1), &protos(&["int b();\n"]));
        assert_eq!(out, "int a();\nint b();\n");
    }

    #[test]
    fn test_splice_removing_everything() {
        let out = splice_prototypes(
            "head\nint a();\nint b();\ntail\n",
            SpliceRegion {
                insert_at: 1,
                replace: 2,
            },
            &[],
        );
        assert_eq!(out, "head\ntail\n");
    }

    #[test]
    fn test_region_from_empty_bounds() {
        assert_eq!(SpliceRegion::from_bounds(&LineBounds::default()), None);
    }

    #[test]
    fn test_write_header_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.h");

        write_header_file(&path, "first\n", true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\n");

        write_header_file(&path, "second\n", true).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");

        write_header_file(&path, "third\n", false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "third\n");

        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_header_file_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.h");
        let link = dir.path().join("link.h");
        std::fs::write(&real, "old\n").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_header_file(&link, "new\n", true).unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "new\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
