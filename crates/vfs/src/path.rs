//! Path utilities for the VFS layer.
//!
//! Paths are slash-separated strings. These helpers are purely lexical; the
//! [`crate::resolver`] is what walks them against the namespace.

use crate::VfsError;

/// Validate that a path is usable at all.
///
/// # Errors
/// `InvalidPath` for an empty path or one containing a NUL byte.
pub fn validate_path(path: &str) -> Result<(), VfsError> {
    if path.is_empty() {
        return Err(VfsError::invalid_path(path, "empty path"));
    }
    if path.contains('\0') {
        return Err(VfsError::invalid_path(path, "path contains null character"));
    }
    Ok(())
}

/// Check whether a path starts at the root.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Normalize a path by resolving `.` and `..` and removing redundant slashes.
///
/// Relative paths are treated as relative to the root. `..` at the root
/// stays at the root, as in POSIX.
pub fn normalize_path(path: &str) -> String {
    let mut components: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => continue,
            ".." => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    if components.is_empty() {
        return String::from("/");
    }

    let mut result: String = String::with_capacity(path.len() + 1);
    for component in components {
        result.push('/');
        result.push_str(component);
    }
    result
}

/// Resolve `path` against a working directory and normalize the result.
///
/// # Arguments
/// * `cwd` - Absolute working directory
/// * `path` - Absolute or relative path
pub fn resolve_against(cwd: &str, path: &str) -> String {
    if is_absolute(path) {
        normalize_path(path)
    } else {
        normalize_path(&join_path(cwd, path))
    }
}

/// Get the parent path of a normalized path.
pub fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(pos) => &path[..pos],
    }
}

/// Get the filename (last component) of a normalized path.
pub fn filename(path: &str) -> &str {
    if path == "/" {
        return "";
    }

    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// Split a path into parent directory and final segment without
/// interpreting `.` or `..`.
///
/// Trailing slashes are ignored, so `/a/b/` splits like `/a/b`.
///
/// # Returns
/// (parent_path, name) tuple; the root yields `("/", "")`.
pub fn split_path(path: &str) -> (&str, &str) {
    let trimmed: &str = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return ("/", "");
    }
    (parent_path(trimmed), filename(trimmed))
}

/// Check whether `path` can only name the root: it has no segment other
/// than `.` and `..`.
pub fn names_root(path: &str) -> bool {
    path.split('/').all(|segment: &str| matches!(segment, "" | "." | ".."))
}

/// Join two path components.
pub fn join_path(base: &str, name: &str) -> String {
    if base.ends_with('/') {
        format!("{}{}", base, name)
    } else {
        format!("{}/{}", base, name)
    }
}

/// Check that `name` can be used as a new directory entry.
///
/// # Errors
/// `InvalidPath` for empty names, `.`, `..`, or names containing `/`.
pub fn validate_entry_name(path: &str, name: &str) -> Result<(), VfsError> {
    match name {
        "" => Err(VfsError::invalid_path(path, "missing entry name")),
        "." | ".." => Err(VfsError::invalid_path(path, "reserved entry name")),
        n if n.contains('/') => Err(VfsError::invalid_path(path, "entry name contains '/'")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("/").is_ok());
        assert!(validate_path("relative/path").is_ok());
        assert!(validate_path("").is_err());
        assert!(validate_path("/a\0b").is_err());
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/home/user"), "/home/user");
        assert_eq!(normalize_path("/home/./user/"), "/home/user");
        assert_eq!(normalize_path("//home//user"), "/home/user");
        assert_eq!(normalize_path("/home/user/../other"), "/home/other");
        assert_eq!(normalize_path("/a/b/c/../../d"), "/a/d");
        assert_eq!(normalize_path("/.."), "/");
        assert_eq!(normalize_path("file"), "/file");
    }

    #[test]
    fn test_resolve_against() {
        assert_eq!(resolve_against("/", "file"), "/file");
        assert_eq!(resolve_against("/d1", "f1"), "/d1/f1");
        assert_eq!(resolve_against("/d1", "../d2"), "/d2");
        assert_eq!(resolve_against("/d1", "/abs"), "/abs");
        assert_eq!(resolve_against("/d1", "."), "/d1");
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("/"), ("/", ""));
        assert_eq!(split_path("/home"), ("/", "home"));
        assert_eq!(split_path("/home/user/file.txt"), ("/home/user", "file.txt"));
        assert_eq!(split_path("/home/user/"), ("/home", "user"));
        assert_eq!(split_path("/a/link/../f"), ("/a/link/..", "f"));
        assert_eq!(split_path("/a/.."), ("/a", ".."));
        assert_eq!(split_path("rel"), ("/", "rel"));
    }

    #[test]
    fn test_names_root() {
        assert!(names_root("/"));
        assert!(names_root("//./.."));
        assert!(!names_root("/a/.."));
        assert!(!names_root("/a"));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("/", "home"), "/home");
        assert_eq!(join_path("/home", "user"), "/home/user");
    }

    #[test]
    fn test_validate_entry_name() {
        assert!(validate_entry_name("/a", "a").is_ok());
        assert!(validate_entry_name("/", "").is_err());
        assert!(validate_entry_name("/a/..", "..").is_err());
    }
}
