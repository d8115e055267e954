//! Error types for stitching.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can abort a stitch run.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// Reading or writing an output file failed.
    #[error("failed to access {}", .path.display())]
    #[diagnostic(code(arborium_stitch::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Walking the destination tree failed.
    #[error("failed to walk {}", .root.display())]
    #[diagnostic(code(arborium_stitch::walk))]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A `<pre>` that carries a placeholder was never closed.
    #[error("unclosed <pre> element starting at byte {offset} in {}", .path.display())]
    #[diagnostic(
        code(arborium_stitch::unclosed_fragment),
        help("the page markup is malformed; check the template that produced it")
    )]
    UnclosedFragment { path: PathBuf, offset: usize },

    /// The config file could not be parsed.
    #[error("invalid config file {}", .path.display())]
    #[diagnostic(code(arborium_stitch::config))]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A block list could not be decoded.
    #[error("invalid block list {}", .path.display())]
    #[diagnostic(code(arborium_stitch::json))]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The highlighting service failed.
    #[error("highlighting service failed")]
    #[diagnostic(code(arborium_stitch::service))]
    Service(#[source] ServiceError),

    /// The highlighting service did not answer for a block it was sent.
    #[error("no highlighting result for block `{id}`")]
    #[diagnostic(code(arborium_stitch::missing_highlight))]
    MissingHighlight { id: String },

    /// Placeholders survived every rewrite pass.
    #[error("{0}")]
    #[diagnostic(
        code(arborium_stitch::unrendered_blocks),
        help(
            "register the missing blocks, or list their ids under `ignore_leftover_ids` if they are expected"
        )
    )]
    UnrenderedBlocks(LeftoverReport),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Error returned by a [`HighlightService`](crate::HighlightService).
pub type ServiceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for stitch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Placeholder ids still present after all passes, per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeftoverReport {
    pub files: BTreeMap<PathBuf, BTreeSet<String>>,
}

impl LeftoverReport {
    pub fn is_empty(&self) -> bool {
        self.files.values().all(BTreeSet::is_empty)
    }

    /// Total number of offending ids across all files.
    pub fn len(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }

    /// Whether `id` was reported for `path`.
    pub fn contains(&self, path: &std::path::Path, id: &str) -> bool {
        self.files.get(path).is_some_and(|ids| ids.contains(id))
    }
}

impl fmt::Display for LeftoverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.len();
        writeln!(
            f,
            "{count} code block{} left unrendered in the output:",
            if count == 1 { " was" } else { "s were" }
        )?;
        for (path, ids) in &self.files {
            if ids.is_empty() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "  {}", path.display())?;
            for id in ids {
                writeln!(f, "    - {id}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lists_files_and_ids() {
        let mut report = LeftoverReport::default();
        report.files.insert(
            PathBuf::from("build/index.html"),
            ["fake_id".to_string(), "other".to_string()].into(),
        );

        let text = report.to_string();
        assert!(text.starts_with("2 code blocks were left unrendered"));
        assert!(text.contains("  build/index.html\n    - fake_id\n    - other\n"));
        assert!(report.contains(std::path::Path::new("build/index.html"), "fake_id"));
    }

    #[test]
    fn test_report_with_only_empty_sets_is_empty() {
        let mut report = LeftoverReport::default();
        report.files.insert(PathBuf::from("a.html"), BTreeSet::new());
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }
}
