//! Code blocks and the placeholders that stand in for them in rendered output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix every placeholder starts with. Cheap to search for with a substring scan.
pub const SENTINEL: &str = "__arborium-block-";

/// Marker left inside fragments that were produced by the component path.
pub const COMPONENT_MARKER: &str = "##ARBORIUM_COMPONENT##";

/// Which upstream path produced a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Captured from a fenced/indented code block while rendering markdown.
    MarkdownExtracted,
    /// Registered by a template component; rendered by the directive pass.
    ComponentRegistered,
    /// Added by hand by the caller.
    #[default]
    Manual,
}

impl Origin {
    /// Whether fragments carrying this block may be rewritten by the markdown pass.
    ///
    /// Component blocks are left for the directive renderer, which knows how the
    /// component laid out its markup.
    pub fn is_fragment_rewritable(self) -> bool {
        !matches!(self, Origin::ComponentRegistered)
    }
}

/// One highlighted code unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Block {
    pub id: String,
    pub code: String,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub origin: Origin,
    /// Inner HTML for the `<code>` element. Empty until the highlighter answers.
    pub highlighted: String,
    pub classes: String,
    pub styles: String,
    pub attrs: IndexMap<String, String>,
    /// Alternate-theme renderings of the same source, emitted right after this block.
    pub clones: Vec<Block>,
}

impl Block {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the theme. A multi-theme spec such as `light:github-light,dark:github-dark`
    /// keeps the first theme here and adds one clone per remaining theme. Clones copy
    /// the code and language, so set those first.
    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        let theme = theme.into();
        let mut themes = split_themes(&theme).into_iter();

        self.theme = themes.next();
        self.clones = themes
            .enumerate()
            .map(|(n, theme)| Block {
                id: format!("{}_clone_{}", self.id, n),
                code: self.code.clone(),
                language: self.language.clone(),
                theme: Some(theme),
                origin: self.origin,
                ..Default::default()
            })
            .collect();
        self
    }

    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        for clone in &mut self.clones {
            clone.origin = origin;
        }
        self
    }

    /// The placeholder text left in rendered output for this block.
    pub fn placeholder(&self) -> String {
        placeholder(&self.id, None)
    }

    /// Placeholder for one facet of the block (`classes`, `styles`) used by components.
    pub fn placeholder_for(&self, extra: &str) -> String {
        placeholder(&self.id, Some(extra))
    }

    /// This block followed by its clones, in render order.
    pub fn group(&self) -> impl Iterator<Item = &Block> {
        std::iter::once(self).chain(self.clones.iter())
    }

    pub fn is_highlighted(&self) -> bool {
        !self.highlighted.is_empty()
    }
}

/// Format a placeholder for `id`, optionally for a named facet.
pub fn placeholder(id: &str, extra: Option<&str>) -> String {
    match extra {
        Some(extra) => format!("{SENTINEL}[{id}]_{extra}__"),
        None => format!("{SENTINEL}[{id}]__"),
    }
}

/// Split a theme spec into individual theme names.
///
/// `github-dark` is a single theme. `light:github-light,dark:github-dark` is a
/// pair: the `label:` prefixes only say which scheme each theme is for.
fn split_themes(spec: &str) -> Vec<String> {
    if !spec.contains(',') {
        return vec![spec.trim().to_string()];
    }

    spec.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once(':') {
            Some((_label, theme)) => theme.trim().to_string(),
            None => part.to_string(),
        })
        .collect()
}
