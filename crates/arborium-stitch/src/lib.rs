//! Stitch remotely highlighted code blocks back into static-site output.
//!
//! While a site renders, every code block is registered and replaced by a
//! placeholder such as `__arborium-block-[id]__`. Once the highlighting service
//! has answered, this crate walks the output directory and puts the
//! highlighted markup where the placeholders are.
//!
//! # Usage
//!
//! ```bash
//! arborium-stitch apply build/ --blocks blocks.json
//! arborium-stitch check build/
//! ```
//!
//! # How it works
//!
//! 1. **Scan**: find output files containing the placeholder prefix.
//! 2. **Markdown pass**: replace each `<pre>` (or bare `<code>`) fragment that
//!    holds a placeholder with the rendered block, keeping the author's id and
//!    classes.
//! 3. **Component pass**: re-render pages marked by components so their facet
//!    placeholders are filled in.
//! 4. **Leftover check**: fail the build if any placeholder survived.
//!
//! Matching is textual. Pages are never parsed into a DOM, so bytes outside
//! replaced fragments are left exactly as the site generator wrote them.

mod block;
mod capture;
mod component;
mod config;
mod error;
mod extract;
mod highlight;
mod leftover;
mod registry;
mod resolve;
mod rewrite;
mod scan;
mod stitcher;

pub use block::{Block, COMPONENT_MARKER, Origin, SENTINEL, placeholder};
pub use capture::{Capture, split_language_and_theme, undo_template_escapes};
pub use component::{DirectiveRenderer, PlaceholderDirectives};
pub use config::{CONFIG_FILE, Config};
pub use error::{Error, LeftoverReport, Result, ServiceError};
pub use extract::{Fragment, FragmentKind, UnclosedPre, extract_fragments};
pub use highlight::{HighlightRequest, HighlightResponse, HighlightService, highlight_registry};
pub use leftover::{check_leftovers, find_leftovers};
pub use registry::Registry;
pub use resolve::{Resolution, placeholder_id, placeholder_ids, resolve};
pub use rewrite::{
    PageRewrite, UserAttributes, merge_classes, render_block, rewrite_page,
    strip_theme_annotations,
};
pub use scan::files_containing;
pub use stitcher::{StitchOptions, StitchStats, Stitcher};
