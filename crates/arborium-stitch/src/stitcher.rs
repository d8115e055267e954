//! The stitch pipeline: markdown pass, component pass, leftover check.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::block::{COMPONENT_MARKER, SENTINEL};
use crate::component::{DirectiveRenderer, PlaceholderDirectives};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::highlight::{HighlightService, highlight_registry};
use crate::leftover::check_leftovers;
use crate::registry::Registry;
use crate::rewrite::rewrite_page;
use crate::scan::files_containing;

/// Options for one stitch run.
#[derive(Debug, Clone)]
pub struct StitchOptions {
    /// Root of the rendered site, rewritten in place.
    pub output_dir: PathBuf,
    /// Run the component pass after the markdown pass.
    pub components: bool,
    /// Placeholder ids allowed to survive.
    pub ignore_leftover_ids: Vec<String>,
}

impl StitchOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(output_dir, &Config::default())
    }

    pub fn from_config(output_dir: impl Into<PathBuf>, config: &Config) -> Self {
        Self {
            output_dir: output_dir.into(),
            components: config.components,
            ignore_leftover_ids: config.ignore_leftover_ids.clone(),
        }
    }
}

/// Statistics from a stitch run.
#[derive(Debug, Default)]
pub struct StitchStats {
    /// Files that contained the sentinel when the markdown pass started.
    pub candidate_files: usize,
    /// Files rewritten by either pass, sorted.
    pub files_written: Vec<PathBuf>,
    pub blocks_replaced: usize,
    pub unknown_placeholders: usize,
    pub wrong_origin_skips: usize,
    pub component_files: usize,
    pub duration: Duration,
}

struct FileOutcome {
    path: PathBuf,
    written: bool,
    replaced: usize,
    unknown: usize,
    wrong_origin: usize,
}

/// Rewrites a rendered site so every placeholder becomes highlighted markup.
pub struct Stitcher {
    options: StitchOptions,
    renderer: Box<dyn DirectiveRenderer>,
}

impl Stitcher {
    pub fn new(options: StitchOptions) -> Self {
        Self {
            options,
            renderer: Box::new(PlaceholderDirectives),
        }
    }

    /// Use `renderer` for the component pass instead of [`PlaceholderDirectives`].
    pub fn with_renderer(mut self, renderer: impl DirectiveRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn options(&self) -> &StitchOptions {
        &self.options
    }

    /// Highlight the registry through `service`, then run every pass.
    pub fn build(
        &self,
        registry: &mut Registry,
        service: &mut dyn HighlightService,
    ) -> Result<StitchStats> {
        highlight_registry(registry, service)?;
        self.run(registry)
    }

    /// Run every pass against an already highlighted registry.
    ///
    /// Fails with [`Error::MissingHighlight`] before touching any file if a
    /// block or clone has no highlighted markup.
    pub fn run(&self, registry: &Registry) -> Result<StitchStats> {
        let start = Instant::now();
        let mut stats = StitchStats::default();

        if let Some(block) = registry.unhighlighted().next() {
            tracing::error!(id = %block.id, "block was never highlighted");
            return Err(Error::MissingHighlight {
                id: block.id.clone(),
            });
        }

        self.markdown_pass(registry, &mut stats)?;
        if self.options.components {
            self.component_pass(registry, &mut stats)?;
        } else {
            tracing::debug!("component pass disabled");
        }
        check_leftovers(&self.options.output_dir, &self.options.ignore_leftover_ids)?;

        stats.files_written.sort();
        stats.files_written.dedup();
        stats.duration = start.elapsed();

        tracing::info!(
            replaced = stats.blocks_replaced,
            written = stats.files_written.len(),
            elapsed_ms = stats.duration.as_millis() as u64,
            "stitch complete"
        );
        Ok(stats)
    }

    fn markdown_pass(&self, registry: &Registry, stats: &mut StitchStats) -> Result<()> {
        let files = files_containing(&self.options.output_dir, SENTINEL)?;
        stats.candidate_files = files.len();

        let outcomes = files
            .par_iter()
            .map(|path| Self::rewrite_file(path, registry))
            .collect::<Result<Vec<_>>>()?;

        for outcome in outcomes {
            stats.blocks_replaced += outcome.replaced;
            stats.unknown_placeholders += outcome.unknown;
            stats.wrong_origin_skips += outcome.wrong_origin;
            if outcome.written {
                stats.files_written.push(outcome.path);
            }
        }
        Ok(())
    }

    fn rewrite_file(path: &Path, registry: &Registry) -> Result<FileOutcome> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let page = rewrite_page(&content, registry).map_err(|unclosed| Error::UnclosedFragment {
            path: path.to_path_buf(),
            offset: unclosed.offset,
        })?;

        let written = page.changed();
        if written {
            fs::write(path, &page.content).map_err(|e| Error::io(path, e))?;
            tracing::debug!(path = %path.display(), replaced = page.replaced, "rewrote page");
        }
        for id in &page.unknown {
            tracing::warn!(path = %path.display(), id = %id, "placeholder has no registered block");
        }

        Ok(FileOutcome {
            path: path.to_path_buf(),
            written,
            replaced: page.replaced,
            unknown: page.unknown.len(),
            wrong_origin: page.wrong_origin,
        })
    }

    fn component_pass(&self, registry: &Registry, stats: &mut StitchStats) -> Result<()> {
        for path in files_containing(&self.options.output_dir, COMPONENT_MARKER)? {
            let content = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
            if !content.contains(SENTINEL) {
                tracing::debug!(path = %path.display(), "component page has no placeholders left");
                continue;
            }
            let rendered = self.renderer.render(&content, registry);
            stats.component_files += 1;

            if rendered != content {
                fs::write(&path, &rendered).map_err(|e| Error::io(&path, e))?;
                tracing::debug!(path = %path.display(), "rendered component page");
                stats.files_written.push(path);
            }
        }
        Ok(())
    }
}
