//! Rendering highlighted blocks and splicing them into pages.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::block::Block;
use crate::extract::{UnclosedPre, extract_fragments};
use crate::registry::Registry;
use crate::resolve::{Resolution, resolve};

static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// `language-go:github-dark` and friends. A bare trailing colon is left alone.
static LANGUAGE_THEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(language-[^\s:]+):\S+").expect("valid regex"));

/// Attributes an author put on the original fragment.
///
/// Markdown only lets authors set an id and classes, so nothing else is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAttributes {
    pub id: Option<String>,
    pub classes: String,
}

impl UserAttributes {
    pub fn from_fragment(fragment: &str) -> Self {
        let id = ID_ATTR
            .captures(fragment)
            .and_then(|caps| attr_value(&caps))
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let classes = CLASS_ATTR
            .captures(fragment)
            .and_then(|caps| attr_value(&caps))
            .map(strip_theme_annotations)
            .unwrap_or_default();

        Self { id, classes }
    }
}

fn attr_value<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

/// Drop the `:theme` suffix from `language-*` classes.
pub fn strip_theme_annotations(classes: &str) -> String {
    LANGUAGE_THEME.replace_all(classes, "$1").into_owned()
}

/// User classes first, then the highlighter's.
pub fn merge_classes(user: &str, block: &str) -> String {
    user.split_whitespace()
        .chain(block.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render `block` and its clones as one `<pre>` element.
pub fn render_block(block: &Block, user: &UserAttributes) -> String {
    let mut html = String::from("<pre>");

    for (n, member) in block.group().enumerate() {
        html.push_str("<code");
        if n == 0
            && let Some(id) = &user.id
        {
            push_attr(&mut html, "id", id);
        }
        push_attr(&mut html, "class", &merge_classes(&user.classes, &member.classes));
        if !member.styles.is_empty() {
            push_attr(&mut html, "style", &member.styles);
        }
        for (name, value) in &member.attrs {
            if matches!(name.as_str(), "id" | "class" | "style") {
                continue;
            }
            push_attr(&mut html, name, value);
        }
        html.push('>');

        if member.is_highlighted() {
            html.push_str(&member.highlighted);
        } else {
            tracing::warn!(id = %member.id, "block has no highlighted markup, emitting plain code");
            html.push_str(&escape_html(&member.code));
        }
        html.push_str("</code>");
    }

    html.push_str("</pre>");
    html
}

fn push_attr(html: &mut String, name: &str, value: &str) {
    html.push(' ');
    html.push_str(name);
    html.push_str("='");
    html.push_str(&value.replace('\'', "&#39;"));
    html.push('\'');
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Result of rewriting one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRewrite {
    pub content: String,
    pub replaced: usize,
    /// Ids of placeholders with no registered block, left in place.
    pub unknown: Vec<String>,
    /// Fragments skipped because their block belongs to the component pass.
    pub wrong_origin: usize,
}

impl PageRewrite {
    pub fn changed(&self) -> bool {
        self.replaced > 0
    }
}

/// Replace every resolvable fragment in `content` with its rendered block.
///
/// Text outside replaced fragments is copied unchanged.
pub fn rewrite_page(content: &str, registry: &Registry) -> Result<PageRewrite, UnclosedPre> {
    let fragments = extract_fragments(content)?;
    let mut page = PageRewrite {
        content: String::with_capacity(content.len()),
        ..Default::default()
    };
    let mut last = 0;

    for fragment in fragments {
        match resolve(fragment.text, registry) {
            Resolution::Resolved(block) => {
                let user = UserAttributes::from_fragment(fragment.text);
                page.content.push_str(&content[last..fragment.range.start]);
                page.content.push_str(&render_block(block, &user));
                last = fragment.range.end;
                page.replaced += 1;
            }
            Resolution::Unknown(id) => {
                tracing::debug!(id, "placeholder has no registered block");
                page.unknown.push(id.to_string());
            }
            Resolution::WrongOrigin(block) => {
                tracing::debug!(id = %block.id, "leaving component block for the directive pass");
                page.wrong_origin += 1;
            }
            Resolution::NoPlaceholder => continue,
        }
    }

    page.content.push_str(&content[last..]);
    Ok(page)
}
