//! Filesystem helpers for walking the submissions tree

use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::constants::HIDDEN_ENTRY_PREFIX;

/// Whether an entry name is hidden and must be ignored
pub fn is_hidden(name: &str) -> bool {
    name.starts_with(HIDDEN_ENTRY_PREFIX)
}

/// List the names of the non-hidden direct children of `dir`, sorted by name.
///
/// Fails if `dir` does not exist or is not a directory.
pub fn list_visible_entries(dir: &Path) -> io::Result<Vec<String>> {
    let metadata = std::fs::metadata(dir)?;
    if !metadata.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", dir.display()),
        ));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_hidden(&name) {
            names.push(name);
        }
    }

    Ok(names)
}
