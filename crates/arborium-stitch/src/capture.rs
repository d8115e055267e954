//! Capturing code blocks while markdown is rendered.
//!
//! The markdown renderer hands every fenced or indented code block to
//! [`Capture::code_block`] and writes the returned placeholder where the
//! highlighted block will later go.

use crate::block::{Block, Origin};
use crate::config::Config;
use crate::registry::Registry;

/// Escapes that template engines force authors to write inside code blocks.
const TEMPLATE_ESCAPES: &[(&str, &str)] = &[
    ("<{{'?php'}}", "<?php"),
    ("{{'@'}}", "@"),
    ("@{{", "{{"),
    ("@{!!", "{!!"),
];

/// Registers markdown code blocks and returns their placeholders.
pub struct Capture<'r> {
    registry: &'r mut Registry,
    default_theme: Option<String>,
}

impl<'r> Capture<'r> {
    pub fn new(registry: &'r mut Registry) -> Self {
        Self {
            registry,
            default_theme: None,
        }
    }

    /// Capture with the `theme` from `config` as the default theme.
    pub fn from_config(registry: &'r mut Registry, config: &Config) -> Self {
        Self::new(registry).with_default_theme(config.theme.clone())
    }

    /// Theme used when the info string doesn't name one.
    pub fn with_default_theme(mut self, theme: Option<String>) -> Self {
        self.default_theme = theme.filter(|t| !t.trim().is_empty());
        self
    }

    /// Register one code block and return the placeholder to render in its place.
    ///
    /// `info` is the fence info string, e.g. `rust` or `rust:github-dark`.
    pub fn code_block(&mut self, code: &str, info: &str) -> String {
        let code = undo_template_escapes(code);
        let (language, theme) = split_language_and_theme(info);
        let theme = theme.map(str::to_string).or_else(|| self.default_theme.clone());

        let id = block_id(language, theme.as_deref(), &code);
        let mut block = Block::new(id).code(code).language(language);
        if let Some(theme) = theme {
            block = block.theme(theme);
        }
        let block = block.origin(Origin::MarkdownExtracted);

        let placeholder = block.placeholder();
        self.registry.register(block);
        placeholder
    }
}

/// Undo template-engine escapes in captured code.
///
/// A single left-to-right pass, so text produced by one escape is never
/// matched again: `{{'@'}}{{` becomes `@{{`, not `{{`.
pub fn undo_template_escapes(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut rest = code;

    'outer: while !rest.is_empty() {
        for (escaped, plain) in TEMPLATE_ESCAPES {
            if let Some(after) = rest.strip_prefix(escaped) {
                out.push_str(plain);
                rest = after;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

/// Split a fence info string into language and optional theme.
///
/// Everything after the first `:` is the theme, so `go:light:a,dark:b` keeps
/// the whole multi-theme spec.
pub fn split_language_and_theme(info: &str) -> (&str, Option<&str>) {
    let info = info.trim();
    match info.split_once(':') {
        Some((language, theme)) => {
            let theme = theme.trim();
            (language.trim(), (!theme.is_empty()).then_some(theme))
        }
        None => (info, None),
    }
}

/// Content-derived id: the same block always gets the same placeholder.
fn block_id(language: &str, theme: Option<&str>, code: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(language.as_bytes());
    hasher.update(&[0]);
    hasher.update(theme.unwrap_or_default().as_bytes());
    hasher.update(&[0]);
    hasher.update(code.as_bytes());
    hasher.finalize().to_hex().as_str()[..16].to_string()
}
