//! Finding the fragments of a page that hold placeholders.
//!
//! Extraction works on the page text, not a DOM, so everything outside the
//! returned ranges is left byte-for-byte intact. Two shapes are recognized:
//!
//! - [`FragmentKind::Pre`]: an outermost `<pre>...</pre>` element, nesting
//!   balanced, spanning any number of lines.
//! - [`FragmentKind::Code`]: a `<code>...</code>` element outside any `<pre>`
//!   with only text inside, as left by indented code in some renderers.
//!
//! Fragments carrying the component marker belong to the directive pass and
//! are never returned.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::block::{COMPONENT_MARKER, SENTINEL};

// Attribute lists skip over quoted values, so `<pre title="a>b">` is one tag.
static PRE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(/?)pre(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?>"#).expect("valid regex")
});

static BARE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<code(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?>[^<]*</code\s*>"#)
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Pre,
    Code,
}

/// A slice of page text that may be replaced by a rendered block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment<'a> {
    pub kind: FragmentKind,
    pub range: Range<usize>,
    pub text: &'a str,
}

/// A `<pre>` holding a placeholder was opened at `offset` and never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnclosedPre {
    pub offset: usize,
}

/// All placeholder-bearing fragments in `content`, in document order.
pub fn extract_fragments(content: &str) -> Result<Vec<Fragment<'_>>, UnclosedPre> {
    let pres = pre_ranges(content)?;

    let mut fragments: Vec<Fragment<'_>> = pres
        .iter()
        .map(|range| Fragment {
            kind: FragmentKind::Pre,
            range: range.clone(),
            text: &content[range.clone()],
        })
        .collect();

    fragments.extend(
        BARE_CODE
            .find_iter(content)
            .filter(|m| {
                !pres
                    .iter()
                    .any(|pre| m.start() < pre.end && pre.start < m.end())
            })
            .map(|m| Fragment {
                kind: FragmentKind::Code,
                range: m.range(),
                text: m.as_str(),
            }),
    );

    fragments.retain(|f| f.text.contains(SENTINEL) && !f.text.contains(COMPONENT_MARKER));
    fragments.sort_by_key(|f| f.range.start);
    Ok(fragments)
}

/// Byte ranges of outermost `<pre>` elements.
fn pre_ranges(content: &str) -> Result<Vec<Range<usize>>, UnclosedPre> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for caps in PRE_TAG.captures_iter(content) {
        let Some(tag) = caps.get(0) else { continue };
        let closing = caps.get(1).is_some_and(|m| !m.is_empty());

        match (closing, depth) {
            (false, 0) => {
                start = tag.start();
                depth = 1;
            }
            (false, _) => depth += 1,
            // Stray close with nothing open.
            (true, 0) => {}
            (true, 1) => {
                ranges.push(start..tag.end());
                depth = 0;
            }
            (true, _) => depth -= 1,
        }
    }

    if depth > 0 {
        if content[start..].contains(SENTINEL) {
            return Err(UnclosedPre { offset: start });
        }
        tracing::debug!(offset = start, "ignoring unclosed <pre> without placeholders");
    }

    Ok(ranges)
}
