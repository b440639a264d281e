//! Stage 8: pathname expansion (globbing).
//!
//! Grounded on §4.1 bullet 8. A field that does not parse as a
//! [`rbash_fnmatch::Pattern`] containing a wildcard is returned unchanged;
//! a field that does but matches nothing on disk is also returned
//! unchanged (bash's default, non-`failglob` behavior), rather than
//! vanishing. Matches are read directory-by-directory rather than one
//! `glob()` libc call, since a pattern may span several path components
//! (`a*/b*`) and each component's matches must be filtered and sorted
//! independently before being combined with the next.

use rbash_fnmatch::Pattern;
use std::path::{Path, PathBuf};

/// Whether `field` contains a character fnmatch treats as a wildcard
/// (unescaped `*`, `?`, `[`). Used to skip the filesystem walk entirely
/// for the common case of a field with no glob metacharacters at all.
fn has_wildcard(field: &str) -> bool {
    let mut escaped = false;
    for c in field.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '*' | '?' | '[' => return true,
            _ => {}
        }
    }
    false
}

/// Expands `field` against the filesystem rooted at `cwd`, returning the
/// sorted list of matching paths, or `field` itself (as the sole result)
/// if it has no wildcard or nothing on disk matches.
pub fn expand(field: &str, cwd: &Path, noglob: bool) -> Vec<String> {
    if noglob || !has_wildcard(field) {
        return vec![field.to_owned()];
    }

    let leading_dot_slash = field.starts_with("./");
    let absolute = field.starts_with('/');
    let components: Vec<&str> = field.trim_start_matches('/').split('/').collect();

    let mut current: Vec<PathBuf> = vec![if absolute {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    }];

    for component in &components {
        if !has_wildcard(component) {
            current = current
                .into_iter()
                .map(|base| base.join(component))
                .collect();
            continue;
        }
        let Ok(pattern) = Pattern::parse(component) else {
            return vec![field.to_owned()];
        };
        let mut next = Vec::new();
        for base in &current {
            let dir = if base.as_os_str().is_empty() {
                cwd.to_path_buf()
            } else if base.is_absolute() {
                base.clone()
            } else {
                cwd.join(base)
            };
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            let mut names: Vec<String> = entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().into_string().ok())
                .filter(|name| component.starts_with('.') || !name.starts_with('.'))
                .filter(|name| pattern.is_match(name))
                .collect();
            names.sort();
            for name in names {
                next.push(base.join(name));
            }
        }
        current = next;
    }

    if current.is_empty() {
        return vec![field.to_owned()];
    }

    let mut results: Vec<String> = current
        .into_iter()
        .map(|p| {
            let mut s = p.to_string_lossy().into_owned();
            if leading_dot_slash && !s.starts_with("./") {
                s = format!("./{s}");
            }
            s
        })
        .collect();
    results.sort();
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn a_field_without_a_wildcard_is_returned_unchanged() {
        let dir = tempdir().unwrap();
        assert_eq!(expand("plain.txt", dir.path(), false), vec!["plain.txt"]);
    }

    #[test]
    fn noglob_suppresses_expansion() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();
        assert_eq!(expand("*.txt", dir.path(), true), vec!["*.txt"]);
    }

    #[test]
    fn a_star_pattern_matches_sorted_filenames() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"").unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();
        fs::write(dir.path().join("c.md"), b"").unwrap();
        assert_eq!(expand("*.txt", dir.path(), false), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn no_match_falls_back_to_the_literal_pattern() {
        let dir = tempdir().unwrap();
        assert_eq!(expand("*.missing", dir.path(), false), vec!["*.missing"]);
    }

    #[test]
    fn hidden_files_require_an_explicit_leading_dot() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden"), b"").unwrap();
        fs::write(dir.path().join("visible"), b"").unwrap();
        assert_eq!(expand("*", dir.path(), false), vec!["visible"]);
        assert_eq!(expand(".*", dir.path(), false), vec![".hidden"]);
    }
}
