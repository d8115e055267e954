//! Detecting placeholders that survived every pass.

use std::fs;
use std::path::Path;

use crate::block::SENTINEL;
use crate::error::{Error, LeftoverReport, Result};
use crate::resolve::placeholder_ids;
use crate::scan::files_containing;

/// Collect placeholder ids still present under `root`, minus `ignore`.
pub fn find_leftovers(root: &Path, ignore: &[String]) -> Result<LeftoverReport> {
    let mut report = LeftoverReport::default();

    for path in files_containing(root, SENTINEL)? {
        let contents = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let mut ids = placeholder_ids(&contents);
        ids.retain(|id| !ignore.contains(id));
        if ids.is_empty() {
            tracing::debug!(path = %path.display(), "only ignored placeholders left");
            continue;
        }
        report.files.insert(path, ids);
    }

    Ok(report)
}

/// Fail with [`Error::UnrenderedBlocks`] if any unignored placeholder remains.
pub fn check_leftovers(root: &Path, ignore: &[String]) -> Result<()> {
    let report = find_leftovers(root, ignore)?;
    if report.is_empty() {
        return Ok(());
    }

    tracing::error!(
        files = report.files.len(),
        blocks = report.len(),
        "unrendered blocks in output"
    );
    Err(Error::UnrenderedBlocks(report))
}
