//! Rendering pages that hold component blocks.
//!
//! Components lay out their own markup and refer to a block through facet
//! placeholders: `__arborium-block-[id]_classes__`, `__arborium-block-[id]_styles__`
//! and the plain placeholder for the highlighted code. Pages carrying
//! [`COMPONENT_MARKER`] are rendered once more after the markdown pass.
//!
//! A block with theme clones needs one element per theme. When the plain
//! placeholder sits alone inside a `<code>` element, that element is repeated
//! for the parent and each clone, with every facet filled from that member.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::block::{Block, COMPONENT_MARKER};
use crate::registry::Registry;

static FACET_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"__arborium-block-\[([^\]]+)\](?:_(classes|styles))?__").expect("valid regex")
});

/// A `<code>` element with text-only content. Quoted attribute values may hold `>`.
static CODE_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<code(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?>[^<]*</code\s*>"#)
        .expect("valid regex")
});

/// Renders the directives left by components on a page.
pub trait DirectiveRenderer: Sync {
    /// Return the rendered page. Returning `contents` unchanged means nothing to do.
    fn render(&self, contents: &str, registry: &Registry) -> String;
}

/// Fills facet placeholders from the registry and drops the component marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDirectives;

impl DirectiveRenderer for PlaceholderDirectives {
    fn render(&self, contents: &str, registry: &Registry) -> String {
        let expanded = CODE_ELEMENT.replace_all(contents, |caps: &Captures<'_>| {
            let element = &caps[0];
            match themed_block(element, registry) {
                Some(block) => block
                    .group()
                    .map(|member| {
                        fill_placeholders(element, registry, Some((block.id.as_str(), member)))
                    })
                    .collect::<String>(),
                None => element.to_string(),
            }
        });

        fill_placeholders(&expanded, registry, None).replace(COMPONENT_MARKER, "")
    }
}

/// The block with clones whose plain placeholder is inside `element`.
fn themed_block<'r>(element: &str, registry: &'r Registry) -> Option<&'r Block> {
    FACET_PLACEHOLDER
        .captures_iter(element)
        .filter(|caps| caps.get(2).is_none())
        .find_map(|caps| registry.lookup(&caps[1]))
        .filter(|block| !block.clones.is_empty())
}

/// Replace placeholders of known blocks. `member` stands in for the block with its id.
fn fill_placeholders(text: &str, registry: &Registry, member: Option<(&str, &Block)>) -> String {
    FACET_PLACEHOLDER
        .replace_all(text, |caps: &Captures<'_>| {
            let id = &caps[1];
            let block = match member {
                Some((group_id, member)) if group_id == id => Some(member),
                _ => registry.lookup(id),
            };
            let Some(block) = block else {
                return caps[0].to_string();
            };
            match caps.get(2).map(|m| m.as_str()) {
                Some("classes") => block.classes.clone(),
                Some("styles") => block.styles.clone(),
                _ => {
                    if member.is_none() && !block.clones.is_empty() {
                        tracing::warn!(
                            id,
                            "placeholder is not alone in a <code> element, theme clones dropped"
                        );
                    }
                    block.highlighted.clone()
                }
            }
        })
        .into_owned()
}

impl<F> DirectiveRenderer for F
where
    F: Fn(&str, &Registry) -> String + Sync,
{
    fn render(&self, contents: &str, registry: &Registry) -> String {
        self(contents, registry)
    }
}
