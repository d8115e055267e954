//! Stitch configuration, read from `arborium-stitch.toml`.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "arborium-stitch.toml";

/// Build-level settings.
///
/// ```toml
/// theme = "light:github-light,dark:github-dark"
/// components = true
/// ignore_leftover_ids = ["example-id"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Theme for code blocks whose info string names none.
    pub theme: Option<String>,
    /// Run the component pass.
    pub components: bool,
    /// Placeholder ids that may legitimately remain in the output.
    pub ignore_leftover_ids: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: None,
            components: true,
            ignore_leftover_ids: Vec::new(),
        }
    }
}

impl Config {
    /// Load `arborium-stitch.toml` from `dir`, or defaults if it doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_optional(&dir.join(CONFIG_FILE))
    }

    /// Load `path`, or defaults if it doesn't exist.
    pub fn load_optional(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(path, &text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Load `path`, which must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(path, &text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}
