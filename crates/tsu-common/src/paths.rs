//! Path helpers.
//!
//! Paths flow through the service as strings: they are map keys in the
//! registry, the program, and the response cache. Keys are always produced by
//! [`normalize_path`] so `a/./b.ts`, `a\b.ts` and `a/b.ts` name one file.

/// Lexically normalize a path: backslashes become `/`, `.` segments are
/// dropped and `..` segments pop their parent where possible.
///
/// Does not touch the file system and does not resolve symlinks.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let is_absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else if !is_absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    if is_absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Directory portion of a normalized path (`"."` when there is none).
pub fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(idx) => &path[..idx],
        None => ".",
    }
}

/// Join `relative` onto the directory containing `from_file` and normalize.
pub fn resolve_relative(from_file: &str, relative: &str) -> String {
    if relative.starts_with('/') {
        return normalize_path(relative);
    }
    normalize_path(&format!("{}/{}", directory_of(from_file), relative))
}

/// Final path component.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Final path component without its extension.
///
/// Declaration files lose the whole `.d.ts` suffix.
pub fn file_stem(path: &str) -> &str {
    let name = base_name(path);
    if let Some(stem) = name.strip_suffix(".d.ts") {
        return stem;
    }
    match name.rfind('.') {
        Some(0) | None => name,
        Some(idx) => &name[..idx],
    }
}

/// Whether the path names an ambient declaration file.
pub fn is_declaration_file(path: &str) -> bool {
    path.ends_with(".d.ts")
}

/// Whether the path lives in an installed-package directory.
///
/// Such files are treated as immutable for the life of the process.
pub fn is_library_path(path: &str) -> bool {
    path.replace('\\', "/")
        .split('/')
        .any(|segment| segment == "node_modules")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_collapses_segments() {
        assert_eq!(normalize_path("/a/./b/../c.ts"), "/a/c.ts");
        assert_eq!(normalize_path("a\\b\\c.ts"), "a/b/c.ts");
        assert_eq!(normalize_path("../x/./y.ts"), "../x/y.ts");
        assert_eq!(normalize_path("/../a.ts"), "/a.ts");
        assert_eq!(normalize_path("./"), ".");
    }

    #[test]
    fn test_resolve_relative_import() {
        assert_eq!(
            resolve_relative("/p/scripts/a.ts", "./lib/b"),
            "/p/scripts/lib/b"
        );
        assert_eq!(resolve_relative("/p/scripts/a.ts", "../b"), "/p/b");
    }

    #[test]
    fn test_file_stem_and_base_name() {
        assert_eq!(base_name("/p/scripts/Actor.ts"), "Actor.ts");
        assert_eq!(file_stem("/p/scripts/Actor.ts"), "Actor");
        assert_eq!(file_stem("C:\\p\\Types.d.ts"), "Types");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_library_classification() {
        assert!(is_library_path("/p/node_modules/@types/ue/index.d.ts"));
        assert!(is_library_path("C:\\p\\node_modules\\x.d.ts"));
        assert!(!is_library_path("/p/scripts/node_modules_copy/a.ts"));
    }
}
