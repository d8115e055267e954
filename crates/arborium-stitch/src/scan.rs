//! Finding output files that still carry placeholders.

use std::fs;
use std::path::{Path, PathBuf};

use memchr::memmem;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Every regular file under `root` whose bytes contain `needle`, sorted.
///
/// Files are read, never parsed. Zero matches is an empty list, not an error.
pub fn files_containing(root: &Path, needle: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| Error::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    let mut matches = files
        .into_par_iter()
        .map(|path| -> Result<Option<PathBuf>> {
            let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
            Ok(memmem::find(&bytes, needle.as_bytes())
                .is_some()
                .then_some(path))
        })
        .filter_map(Result::transpose)
        .collect::<Result<Vec<_>>>()?;
    matches.sort();

    tracing::debug!(root = %root.display(), needle, found = matches.len(), "scanned output");
    Ok(matches)
}
