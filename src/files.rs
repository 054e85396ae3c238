use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{DetectorError, Result};

pub const IMAGE_PATTERNS: &[&str] = &["*.png", "*.jpg"];
pub const ANNOTATION_PATTERNS: &[&str] = &["*.txt"];
pub const PATCH_PATTERNS: &[&str] = &["*.png"];

/// List the files in `dir` matching any of the `*.ext` patterns.
///
/// Each pattern is tried once. The result is sorted and free of duplicates;
/// if no pattern matched anything the scan fails with `NoMatchingFiles`.
pub fn scan_directory(dir: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| DetectorError::file_access(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| DetectorError::file_access(dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut matched = Vec::new();
    for pattern in patterns {
        let before = matched.len();
        for path in &files {
            if matches_pattern(path, pattern) && !matched.contains(path) {
                matched.push(path.clone());
            }
        }
        debug!("{}: {} file(s) match {}", dir.display(), matched.len() - before, pattern);
    }

    if matched.is_empty() {
        return Err(DetectorError::NoMatchingFiles {
            dir: dir.to_path_buf(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        });
    }

    matched.sort();
    Ok(matched)
}

/// `*.ext` patterns compare the extension case-insensitively; anything else
/// must equal the file name.
fn matches_pattern(path: &Path, pattern: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(ext) => path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
            .unwrap_or(false),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy() == pattern)
            .unwrap_or(false),
    }
}

/// Image name used for patch files, e.g. `image0001` for `../image0001.png`.
pub fn image_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Find `<dir>/<name>.<ext>` for the first image extension that exists.
pub fn find_image(dir: &Path, name: &str) -> Option<PathBuf> {
    IMAGE_PATTERNS
        .iter()
        .filter_map(|p| p.strip_prefix("*."))
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|p| p.is_file())
}

/// Create `dir` if needed. Failing here is fatal to a run.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| DetectorError::file_access(dir, e))
}
