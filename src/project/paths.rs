//! Path string helpers shared by the importers
//!
//! Build metadata mixes POSIX and Windows spellings, so these work on strings
//! rather than relying on the host's `Path` semantics.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// True for `/abs/path` and drive-letter paths such as `C:\x` or `c:/x`
pub fn is_absolute_like(path: &str) -> bool {
    path.starts_with('/') || path.as_bytes().get(1) == Some(&b':')
}

/// Replace Windows separators with forward slashes
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Resolve `path` against `base` unless it is already absolute
///
/// The joined path is normalized lexically so `..\src\a.cpp` next to a
/// `BuildFiles/` project names the same file as its absolute spelling.
pub fn resolve_against(base: &Path, path: &str) -> String {
    if is_absolute_like(path) {
        path.to_string()
    } else {
        normalize_lexically(&base.join(path).to_string_lossy())
    }
}

/// Collapse `.` and `..` segments without touching the filesystem
///
/// `..` never climbs above the root or a drive letter; leading `..` of a
/// relative path are kept.
pub fn normalize_lexically(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&"..") => segments.push(".."),
                Some(last) if is_drive(last) => {}
                Some(_) => {
                    segments.pop();
                }
                None if absolute => {}
                None => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

fn is_drive(segment: &str) -> bool {
    segment.len() == 2 && segment.ends_with(':')
}

/// Directory containing `file`, or `.` for a bare file name
pub fn parent_dir(file: &Path) -> &Path {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Files directly inside `dir` with the given extension, sorted by name
///
/// A missing or unreadable directory yields no files.
pub fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("Failed to access directory entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|e| e == extension))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_detection() {
        assert!(is_absolute_like("/usr/include"));
        assert!(is_absolute_like("C:\\sdk"));
        assert!(is_absolute_like("d:/sdk"));
        assert!(!is_absolute_like("src/main.cpp"));
        assert!(!is_absolute_like("..\\lib"));
        assert!(!is_absolute_like(""));
    }

    #[test]
    fn test_resolve_against() {
        let base = Path::new("/work/proj");
        assert_eq!(resolve_against(base, "src/a.cpp"), "/work/proj/src/a.cpp");
        assert_eq!(resolve_against(base, "/abs/a.cpp"), "/abs/a.cpp");
        assert_eq!(resolve_against(base, "C:/abs/a.cpp"), "C:/abs/a.cpp");
    }

    #[test]
    fn test_resolve_collapses_parent_segments() {
        let base = Path::new("/p/BuildFiles");
        assert_eq!(resolve_against(base, "../src/main.cpp"), "/p/src/main.cpp");
        assert_eq!(resolve_against(base, "./gen/../x.h"), "/p/BuildFiles/x.h");
        assert_eq!(resolve_against(Path::new("/"), "../../a.c"), "/a.c");
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(normalize_lexically("/a/b/../c/./d"), "/a/c/d");
        assert_eq!(normalize_lexically("C:/sdk/../include"), "C:/include");
        assert_eq!(normalize_lexically("C:/.."), "C:");
        assert_eq!(normalize_lexically("../x/../../y"), "../../y");
        assert_eq!(normalize_lexically("a/.."), ".");
        assert_eq!(normalize_lexically("/work/proj/"), "/work/proj");
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("gn.json")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/a/b.sln")), Path::new("/a"));
    }

    #[test]
    fn test_files_with_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.sln"), "").unwrap();
        std::fs::write(dir.path().join("a.sln"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested.sln")).unwrap();

        assert_eq!(
            files_with_extension(dir.path(), "sln"),
            [dir.path().join("a.sln"), dir.path().join("b.sln")]
        );
        assert!(files_with_extension(&dir.path().join("missing"), "sln").is_empty());
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_separators("src\\app\\app.vcxproj"), "src/app/app.vcxproj");
    }
}
