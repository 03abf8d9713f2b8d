//! General utility functions for unctb

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};

/// Format a byte count in human-readable form (B, KB, MB, GB)
pub fn format_size(size: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", size)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

/// Create a glob matcher for table names.
///
/// Table names have no path separators, so a pattern without wildcards is
/// treated as a substring search (`Monster` matches `MonsterTable`).
pub fn create_name_matcher(pattern: &str) -> Result<GlobMatcher> {
    let pattern = if !pattern.contains('*') && !pattern.contains('?') {
        format!("*{}*", pattern)
    } else {
        pattern.to_string()
    };
    let glob = Glob::new(&pattern).with_context(|| format!("Invalid pattern: {}", pattern))?;
    Ok(glob.compile_matcher())
}

/// Check if a name matches the optional filter
pub fn matches_filter(name: &str, matcher: Option<&GlobMatcher>) -> bool {
    match matcher {
        Some(m) => m.is_match(name),
        None => true,
    }
}

/// Recursively collect files with the given extension under `dir`.
pub fn collect_files_with_ext(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_recursive(dir, ext, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_recursive(dir: &Path, ext: &str, files: &mut Vec<PathBuf>) -> Result<()> {
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                collect_recursive(&path, ext, files)?;
            } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
                files.push(path);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_name_matcher_substring_fallback() {
        let m = create_name_matcher("Monster").unwrap();
        assert!(matches_filter("MonsterTable", Some(&m)));
        assert!(!matches_filter("ItemTable", Some(&m)));
        assert!(matches_filter("ItemTable", None));
    }

    #[test]
    fn test_name_matcher_glob() {
        let m = create_name_matcher("*Table").unwrap();
        assert!(matches_filter("ItemTable", Some(&m)));
        assert!(!matches_filter("TableOfContents", Some(&m)));
    }
}
