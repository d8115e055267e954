//! Mapping a fragment to the block it stands for.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::block::Block;
use crate::registry::Registry;

/// Matches any placeholder, including the `_classes`/`_styles` facets; group 1 is the id.
static PLACEHOLDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__arborium-block-\[([^\]]+)\]").expect("valid regex"));

/// Outcome of resolving one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'r> {
    /// The fragment holds no placeholder.
    NoPlaceholder,
    /// The id is not registered. Left in place for the leftover check.
    Unknown(&'r str),
    /// The block exists but belongs to the component pass.
    WrongOrigin(&'r Block),
    /// Safe to rewrite.
    Resolved(&'r Block),
}

/// The id of the first placeholder in `text`.
pub fn placeholder_id(text: &str) -> Option<&str> {
    PLACEHOLDER_ID
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Every distinct placeholder id in `text`.
pub fn placeholder_ids(text: &str) -> BTreeSet<String> {
    PLACEHOLDER_ID
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Resolve a fragment by its first placeholder.
pub fn resolve<'r>(fragment: &'r str, registry: &'r Registry) -> Resolution<'r> {
    let Some(id) = placeholder_id(fragment) else {
        return Resolution::NoPlaceholder;
    };

    match registry.lookup(id) {
        None => Resolution::Unknown(id),
        Some(block) if !block.origin.is_fragment_rewritable() => Resolution::WrongOrigin(block),
        Some(block) => Resolution::Resolved(block),
    }
}
