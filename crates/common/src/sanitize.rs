//! Client path sanitizing
//!
//! Clients declare where a file belongs with a relative path (folder
//! uploads) or just a filename. Both are untrusted: they may carry `..`,
//! a leading `/`, a drive marker, or characters that mean something to a
//! shell or filesystem. Every segment is reduced to `[A-Za-z0-9_.-]` and
//! segments that collapse to nothing are dropped, so the result can only
//! ever name a location below whatever root it gets joined to.

use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Names Windows treats as devices regardless of extension
const WINDOWS_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM0", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
    "COM8", "COM9", "LPT0", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8",
    "LPT9",
];

/// Reduce a single name to a filesystem-safe form.
///
/// The name is NFKD-decomposed so accented letters keep their base
///  letter, then anything still non-ASCII is dropped. Separators become
///  whitespace, whitespace runs become a single `_`, anything outside
///  `[A-Za-z0-9_.-]` is removed and leading/trailing `.`/`_` are
///  stripped. The result may be empty.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_ascii_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');

    let stem = trimmed.split('.').next().unwrap_or_default();
    if !trimmed.is_empty() && WINDOWS_DEVICE_NAMES.contains(&stem.to_ascii_uppercase().as_str()) {
        return format!("_{}", trimmed);
    }

    trimmed.to_string()
}

/// Sanitize a client declared relative path segment by segment.
///
/// Both `/` and `\` split segments. Returns `None` when nothing
///  survives, in which case the caller needs a fallback name or has to
///  skip the entry.
pub fn sanitize_relative_path(raw: &str) -> Option<PathBuf> {
    let path: PathBuf = raw
        .split(['/', '\\'])
        .map(secure_filename)
        .filter(|segment| !segment.is_empty())
        .collect();

    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Render a relative path with forward slashes, whatever the platform
pub fn to_posix(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stays_below_root(path: &Path) -> bool {
        path.components().all(|c| matches!(c, Component::Normal(_)))
    }

    #[test]
    fn test_secure_filename_basics() {
        assert_eq!(secure_filename("notes.txt"), "notes.txt");
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(
            secure_filename("i contain cool \u{fc}ml\u{e4}uts.txt"),
            "i_contain_cool_umlauts.txt"
        );
        assert_eq!(secure_filename("..."), "");
        assert_eq!(secure_filename("  "), "");
        assert_eq!(secure_filename("_.hidden"), "hidden");
        assert_eq!(secure_filename("a;b|c$(d).sh"), "abcd.sh");
        assert_eq!(secure_filename("nul\0byte.txt"), "nulbyte.txt");
    }

    #[test]
    fn test_secure_filename_transliterates() {
        assert_eq!(secure_filename("r\u{e9}sum\u{e9}.pdf"), "resume.pdf");
        assert_eq!(secure_filename("caf\u{e9}.txt"), "cafe.txt");
        assert_ne!(secure_filename("caf\u{e9}.txt"), secure_filename("caf.txt"));
        assert_eq!(secure_filename("\u{fb01}le.txt"), "file.txt");
        assert_eq!(secure_filename("\u{65e5}\u{672c}.txt"), "txt");
    }

    #[test]
    fn test_secure_filename_windows_devices() {
        assert_eq!(secure_filename("con"), "_con");
        assert_eq!(secure_filename("AUX.txt"), "_AUX.txt");
        assert_eq!(secure_filename("lpt1.log"), "_lpt1.log");
        assert_eq!(secure_filename("console.txt"), "console.txt");
    }

    #[test]
    fn test_relative_path_keeps_structure() {
        assert_eq!(
            sanitize_relative_path("docs/readme.md"),
            Some(PathBuf::from("docs/readme.md"))
        );
        assert_eq!(
            sanitize_relative_path("photos\\2024\\img 1.png"),
            Some(PathBuf::from("photos/2024/img_1.png"))
        );
    }

    #[test]
    fn test_relative_path_drops_traversal_and_roots() {
        assert_eq!(
            sanitize_relative_path("../../etc/passwd"),
            Some(PathBuf::from("etc/passwd"))
        );
        assert_eq!(
            sanitize_relative_path("/abs/./file"),
            Some(PathBuf::from("abs/file"))
        );
        assert_eq!(
            sanitize_relative_path("C:\\Windows\\system32"),
            Some(PathBuf::from("C/Windows/system32"))
        );
        assert_eq!(
            sanitize_relative_path("a//b///c"),
            Some(PathBuf::from("a/b/c"))
        );
    }

    #[test]
    fn test_relative_path_empty_results() {
        for raw in ["", "/", "..", "../..", "./.", "\\\\", "   ", "\u{263a}/\u{263a}"] {
            assert_eq!(sanitize_relative_path(raw), None, "raw = {:?}", raw);
        }
    }

    #[test]
    fn test_sanitized_paths_never_escape() {
        let root = Path::new("/srv/jobs/job-00000000/uploads");
        let crafted = [
            "../x",
            "../../../../../../etc/shadow",
            "/etc/passwd",
            "\\\\server\\share\\f",
            "C:/x/../../y",
            "a/../../b",
            "..\\..\\boot.ini",
            "....//....//x",
            ". ./. ./y",
            "a/\0/b",
            "~/.ssh/id_rsa",
        ];
        for raw in crafted {
            if let Some(rel) = sanitize_relative_path(raw) {
                assert!(stays_below_root(&rel), "{:?} -> {:?}", raw, rel);
                assert!(root.join(&rel).starts_with(root));
            }
        }
    }

    #[test]
    fn test_to_posix() {
        let p: PathBuf = ["b", "c.bin"].iter().collect();
        assert_eq!(to_posix(&p), "b/c.bin");
        assert_eq!(to_posix(Path::new("a.txt")), "a.txt");
    }
}
