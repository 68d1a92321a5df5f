use crate::error::EtlResult;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect regular files under `root` whose extension is exactly
/// `extension`, as absolute paths.
///
/// Order is whatever the directory listing yields. It is not sorted.
pub fn find_files(root: &Path, extension: &str) -> EtlResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == extension);
        if matches {
            files.push(fs::canonicalize(entry.path())?);
        }
    }
    Ok(files)
}
