use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use arborium_stitch::{
    Block, Capture, Config, Error, HighlightRequest, HighlightResponse, HighlightService, Origin,
    Registry, ServiceError, StitchOptions, Stitcher,
};
use tempfile::TempDir;

/// Records every batch and answers with predictable markup.
#[derive(Default)]
struct MockService {
    batches: Vec<Vec<String>>,
}

impl HighlightService for MockService {
    fn highlight(
        &mut self,
        requests: &[HighlightRequest],
    ) -> Result<Vec<HighlightResponse>, ServiceError> {
        self.batches
            .push(requests.iter().map(|r| r.id.clone()).collect());
        Ok(requests
            .iter()
            .map(|r| HighlightResponse {
                id: r.id.clone(),
                highlighted: format!("highlighted:{}", r.id),
                classes: "arborium".into(),
                styles: "background-color: #000000;".into(),
                ..Default::default()
            })
            .collect())
    }
}

struct Site {
    _dir: TempDir,
    root: PathBuf,
}

impl Site {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("build_testing");
        fs::create_dir_all(&root).unwrap();
        Self { _dir: dir, root }
    }

    fn page(&self, name: &str, html: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, html).unwrap();
        path
    }

    fn read(&self, path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn stitcher(&self) -> Stitcher {
        Stitcher::new(StitchOptions::new(&self.root))
    }
}

fn highlighted(id: &str, origin: Origin) -> Block {
    Block {
        highlighted: format!("highlighted:{id}"),
        classes: "arborium".into(),
        styles: "background-color: #000000;".into(),
        ..Block::new(id).code("code").language("go").origin(origin)
    }
}

fn page_with(body: &str) -> String {
    format!("<!DOCTYPE html>\n<html>\n<body>\n{body}\n</body>\n</html>\n")
}

#[test]
fn no_fragments_means_no_writes() {
    let site = Site::new();
    site.page("index.html", &page_with("<p>nothing here</p>"));
    let registry = Registry::new();

    for _ in 0..2 {
        let stats = site.stitcher().run(&registry).unwrap();
        assert_eq!(stats.candidate_files, 0);
        assert!(stats.files_written.is_empty());
    }
}

#[test]
fn untouched_file_is_never_written() {
    let site = Site::new();
    let clean = site.page("clean.html", &page_with("<pre><code>plain</code></pre>"));
    let dirty = site.page(
        "dirty.html",
        &page_with("<pre><code>__arborium-block-[a]__</code></pre>"),
    );
    let registry: Registry = [highlighted("a", Origin::MarkdownExtracted)]
        .into_iter()
        .collect();

    // Any write, even of identical bytes, would move the mtime to now.
    let long_ago = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000);
    fs::File::options()
        .write(true)
        .open(&clean)
        .unwrap()
        .set_modified(long_ago)
        .unwrap();

    let stats = site.stitcher().run(&registry).unwrap();
    assert_eq!(stats.files_written, [dirty]);
    assert_eq!(fs::metadata(&clean).unwrap().modified().unwrap(), long_ago);
    assert_eq!(
        site.read(&clean),
        page_with("<pre><code>plain</code></pre>")
    );
}

#[test]
fn attributes_get_carried_over() {
    let site = Site::new();
    let path = site.page(
        "index.html",
        &page_with(
            r#"<pre><code id="intro" class="language-go:github-dark extra">__arborium-block-[a]__</code></pre>"#,
        ),
    );
    let registry: Registry = [highlighted("a", Origin::MarkdownExtracted)]
        .into_iter()
        .collect();

    site.stitcher().run(&registry).unwrap();
    assert_eq!(
        site.read(&path),
        page_with(
            "<pre><code id='intro' class='language-go extra arborium' style='background-color: #000000;'>highlighted:a</code></pre>"
        )
    );
}

#[test]
fn clones_render_in_order_after_parent() {
    let site = Site::new();
    let mut registry = Registry::new();
    registry.register(
        Block::new("a")
            .code("code")
            .language("go")
            .theme("light:github-light,dark:github-dark")
            .origin(Origin::MarkdownExtracted),
    );
    let path = site.page(
        "index.html",
        &page_with("<pre><code>__arborium-block-[a]__</code></pre>"),
    );

    let mut service = MockService::default();
    site.stitcher().build(&mut registry, &mut service).unwrap();

    assert_eq!(service.batches, [["a", "a_clone_0"]]);
    let content = site.read(&path);
    let parent = content.find("highlighted:a<").unwrap();
    let clone = content.find("highlighted:a_clone_0").unwrap();
    assert!(parent < clone);
    assert_eq!(content.matches("<pre>").count(), 1);
}

#[test]
fn every_placeholder_resolved_is_fine() {
    let site = Site::new();
    let path = site.page(
        "docs/guide/index.html",
        &page_with(
            "<pre><code>__arborium-block-[a]__</code></pre>\n<ul><li><code>__arborium-block-[b]__</code></li></ul>",
        ),
    );
    let registry: Registry = [
        highlighted("a", Origin::MarkdownExtracted),
        highlighted("b", Origin::MarkdownExtracted),
    ]
    .into_iter()
    .collect();

    let stats = site.stitcher().run(&registry).unwrap();
    assert_eq!(stats.blocks_replaced, 2);
    assert!(!site.read(&path).contains("__arborium-block-"));
}

#[test]
fn unknown_block_fails_the_build() {
    let site = Site::new();
    let path = site.page(
        "index.html",
        &page_with("<pre><code>__arborium-block-[fake_id]__</code></pre>"),
    );

    let report = match site.stitcher().run(&Registry::new()) {
        Err(Error::UnrenderedBlocks(report)) => report,
        other => panic!("expected unrendered blocks, got {other:?}"),
    };
    assert!(report.contains(&path, "fake_id"));
    assert!(report.to_string().contains("fake_id"));
}

#[test]
fn expected_unknown_block_is_fine() {
    let site = Site::new();
    site.page(
        "index.html",
        &page_with("<pre><code>__arborium-block-[fake_id]__</code></pre>"),
    );
    let config = Config {
        ignore_leftover_ids: vec!["fake_id".into()],
        ..Default::default()
    };

    let stats = Stitcher::new(StitchOptions::from_config(&site.root, &config))
        .run(&Registry::new())
        .unwrap();
    assert_eq!(stats.unknown_placeholders, 1);
}

#[test]
fn manually_added_block_is_highlighted_and_stitched() {
    let site = Site::new();
    let path = site.page(
        "index.html",
        &page_with("<pre><code>__arborium-block-[id]__</code></pre>"),
    );
    let mut registry: Registry = [Block::new("id").code("echo 1").language("bash")]
        .into_iter()
        .collect();

    site.stitcher()
        .build(&mut registry, &mut MockService::default())
        .unwrap();
    assert_eq!(
        site.read(&path),
        page_with(
            "<pre><code class='arborium' style='background-color: #000000;'>highlighted:id</code></pre>"
        )
    );
}

#[test]
fn captured_markdown_blocks_round_trip() {
    let site = Site::new();
    let mut registry = Registry::new();
    let (json, php) = {
        let mut capture = Capture::new(&mut registry);
        (
            capture.code_block("{\"a\": 1}", "json:github-light"),
            capture.code_block("<{{'?php'}} echo 1;", "php"),
        )
    };
    let path = site.page(
        "index.html",
        &page_with(&format!(
            "<pre><code class=\"language-json:github-light\">{json}</code></pre>\n<pre><code class=\"language-php\">{php}</code></pre>"
        )),
    );

    let mut service = MockService::default();
    site.stitcher().build(&mut registry, &mut service).unwrap();

    let php_block = registry.all().nth(1).unwrap();
    assert_eq!(php_block.code, "<?php echo 1;");
    assert_eq!(registry.all().next().unwrap().theme.as_deref(), Some("github-light"));

    let content = site.read(&path);
    assert!(!content.contains("__arborium-block-"));
    assert!(content.contains("<code class='language-json arborium'"));
    assert!(content.contains("<code class='language-php arborium'"));
}

#[test]
fn component_pages_render_after_markdown_pass() {
    let site = Site::new();
    let path = site.page(
        "index.html",
        &page_with(
            "##ARBORIUM_COMPONENT##<pre><code class=\"__arborium-block-[c]_classes__\" style=\"__arborium-block-[c]_styles__\">__arborium-block-[c]__</code></pre>\n<pre><code>__arborium-block-[m]__</code></pre>",
        ),
    );
    let registry: Registry = [
        highlighted("c", Origin::ComponentRegistered),
        highlighted("m", Origin::MarkdownExtracted),
    ]
    .into_iter()
    .collect();

    let stats = site.stitcher().run(&registry).unwrap();
    assert_eq!(stats.component_files, 1);
    assert_eq!(stats.files_written, [path.clone()]);
    assert_eq!(
        site.read(&path),
        page_with(
            "<pre><code class=\"arborium\" style=\"background-color: #000000;\">highlighted:c</code></pre>\n<pre><code class='arborium' style='background-color: #000000;'>highlighted:m</code></pre>"
        )
    );
}

#[test]
fn component_block_in_plain_fragment_is_not_consumed_by_markdown_pass() {
    let site = Site::new();
    let path = site.page(
        "index.html",
        &page_with("<pre><code>__arborium-block-[c]__</code></pre>"),
    );
    let registry: Registry = [highlighted("c", Origin::ComponentRegistered)]
        .into_iter()
        .collect();

    // No marker on the page, so the component pass never sees it either.
    let err = site.stitcher().run(&registry).unwrap_err();
    assert!(matches!(err, Error::UnrenderedBlocks(_)));
    assert_eq!(
        site.read(&path),
        page_with("<pre><code>__arborium-block-[c]__</code></pre>")
    );
}

#[test]
fn component_theme_pair_renders_both_elements() {
    let site = Site::new();
    let path = site.page(
        "index.html",
        &page_with(
            "##ARBORIUM_COMPONENT##<pre><code class=\"__arborium-block-[c]_classes__\">__arborium-block-[c]__</code></pre>",
        ),
    );
    let mut registry = Registry::new();
    registry.register(
        Block::new("c")
            .code("code")
            .language("go")
            .theme("light:one,dark:two")
            .origin(Origin::ComponentRegistered),
    );

    site.stitcher()
        .build(&mut registry, &mut MockService::default())
        .unwrap();
    assert_eq!(
        site.read(&path),
        page_with(
            "<pre><code class=\"arborium\">highlighted:c</code><code class=\"arborium\">highlighted:c_clone_0</code></pre>"
        )
    );
}

#[test]
fn unhighlighted_component_block_fails_the_build() {
    let site = Site::new();
    let html = page_with("##ARBORIUM_COMPONENT##<pre><code>__arborium-block-[c]__</code></pre>");
    let path = site.page("index.html", &html);
    let registry: Registry = [Block::new("c")
        .code("let x = 1;")
        .origin(Origin::ComponentRegistered)]
    .into_iter()
    .collect();

    let err = site.stitcher().run(&registry).unwrap_err();
    assert!(matches!(err, Error::MissingHighlight { id } if id == "c"));
    assert_eq!(site.read(&path), html);
}

#[test]
fn unhighlighted_markdown_block_fails_the_build() {
    let site = Site::new();
    let html = page_with("<pre><code>__arborium-block-[m]__</code></pre>");
    let path = site.page("index.html", &html);
    let registry: Registry = [Block::new("m")
        .code("a < b")
        .origin(Origin::MarkdownExtracted)]
    .into_iter()
    .collect();

    let err = site.stitcher().run(&registry).unwrap_err();
    assert!(matches!(err, Error::MissingHighlight { id } if id == "m"));
    assert_eq!(site.read(&path), html);
}
