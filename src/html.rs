//! HTML content extraction.
//!
//! Turns HTML into clean plain text or lightweight Markdown. Works on
//! strings, single files, or whole directory trees (converted in bulk on a
//! bounded blocking pool).

use crate::{config::ExtractorConfig, error::Result, ExtractError, ExtractResult, Extractor};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Tags whose contents never contribute visible text.
const SKIP_TAGS: [&str; 7] = [
    "script", "style", "noscript", "nav", "header", "footer", "aside",
];

/// Selectors tried in order to find the main content region of a page.
const CONTENT_SELECTORS: [&str; 8] = [
    "article",
    "main",
    "[role='main']",
    ".content",
    ".post-content",
    ".article-content",
    "#content",
    "#main",
];

/// Progress hook for bulk conversion, called as `(files_done, files_total)`.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Outcome of a directory conversion run.
#[derive(Debug, Default, Clone)]
pub struct DirSummary {
    /// Files converted and written (or logged, in dry-run mode)
    pub converted: usize,
    /// Files that failed to read or convert
    pub failed: usize,
    /// Total HTML files found
    pub total: usize,
}

/// HTML content extractor
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    config: ExtractorConfig,
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl HtmlExtractor {
    /// Create a new HTML extractor with the given configuration
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract from an HTML string.
    ///
    /// Renders Markdown when the config asks for it, clean text otherwise.
    /// With `clean_text` off the input passes through untouched.
    pub fn extract_str(&self, html: &str, source: &str) -> ExtractResult {
        let (text, title) = if self.config.markdown {
            self.render_markdown(html)
        } else if self.config.clean_text {
            self.extract_text(html)
        } else {
            (html.to_string(), None)
        };

        let mut result = ExtractResult::new(text, source.to_string())
            .with_original_length(html.len())
            .with_content_type("text/html");
        if let Some(t) = title {
            result = result.with_title(t);
        }
        result
    }

    /// Extract from an HTML file.
    pub async fn extract_path(&self, path: &Path) -> Result<ExtractResult> {
        let html = tokio::fs::read_to_string(path).await?;
        if html.len() > self.config.max_length {
            return Err(ExtractError::ContentTooLarge {
                size: html.len(),
                max: self.config.max_length,
            });
        }
        let this = self.clone();
        let source = path.display().to_string();
        let result =
            tokio::task::spawn_blocking(move || this.extract_str(&html, &source)).await?;
        Ok(result)
    }

    /// Extract clean text and the page title from HTML.
    pub fn extract_text(&self, html: &str) -> (String, Option<String>) {
        let document = Html::parse_document(html);
        let title = page_title(&document);

        // Prefer a recognizable main-content region over the whole body
        let mut parts = Vec::new();
        for selector_str in CONTENT_SELECTORS {
            if let Ok(selector) = Selector::parse(selector_str) {
                for element in document.select(&selector) {
                    let text = self.visible_text(&element);
                    if !text.trim().is_empty() {
                        parts.push(text);
                    }
                }
            }
            if !parts.is_empty() {
                break;
            }
        }

        if parts.is_empty() {
            let body_selector = Selector::parse("body").unwrap();
            for element in document.select(&body_selector) {
                parts.push(self.visible_text(&element));
            }
        }

        (self.clean_text(&parts.join("\n\n")), title)
    }

    /// Render HTML as lightweight Markdown, returning the page title too.
    pub fn render_markdown(&self, html: &str) -> (String, Option<String>) {
        let document = Html::parse_document(html);
        let title = page_title(&document);

        let body_selector = Selector::parse("body").unwrap();
        let mut out = String::new();
        for element in document.select(&body_selector) {
            self.render_children(&element, &mut out);
        }

        (tidy_markdown(&out), title)
    }

    /// Collect every `.html`/`.htm` file under a directory, recursively.
    pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            })
            .map(|entry| entry.into_path())
            .collect()
    }

    /// Convert a single HTML file and write the result under `output_dir`.
    ///
    /// Returns the output path. Dry-run mode only logs what would be written.
    pub async fn convert_file(
        &self,
        input: &Path,
        output_dir: &Path,
        dry_run: bool,
    ) -> Result<PathBuf> {
        let rel = input
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| ExtractError::Parse(format!("not a file: {}", input.display())))?;
        let config = self.config.clone();
        let input = input.to_path_buf();
        let output_dir = output_dir.to_path_buf();
        let path = tokio::task::spawn_blocking(move || {
            convert_one(&config, &input, &rel, &output_dir, dry_run)
        })
        .await??;
        Ok(path)
    }

    /// Convert every HTML file under `input_dir`, mirroring the tree under
    /// `output_dir` with the extension swapped to `.md` (or `.txt` in plain
    /// text mode).
    ///
    /// Files are converted concurrently on up to `config.workers` blocking
    /// tasks. A failing file is logged and skipped; the rest of the run
    /// continues.
    pub async fn convert_dir(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        dry_run: bool,
        progress: Option<ProgressFn>,
    ) -> Result<DirSummary> {
        let files = Self::collect_files(input_dir);
        let total = files.len();
        debug!(total, input = %input_dir.display(), "starting directory conversion");

        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks = JoinSet::new();

        for input in files {
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();
            let rel = input
                .strip_prefix(input_dir)
                .unwrap_or(&input)
                .to_path_buf();
            let output_dir = output_dir.to_path_buf();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ExtractError::Other(e.to_string()))?;
                let source = input.clone();
                tokio::task::spawn_blocking(move || {
                    convert_one(&config, &source, &rel, &output_dir, dry_run)
                })
                .await?
                .map(|out| (input, out))
            });
        }

        let mut summary = DirSummary {
            total,
            ..Default::default()
        };
        let mut done = 0;
        while let Some(joined) = tasks.join_next().await {
            done += 1;
            match joined? {
                Ok((input, output)) => {
                    summary.converted += 1;
                    debug!(input = %input.display(), output = %output.display(), "converted");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("skipping file: {e}");
                }
            }
            if let Some(ref hook) = progress {
                hook(done, total);
            }
        }

        Ok(summary)
    }

    /// Extract the visible text of an element, skipping non-content tags.
    fn visible_text(&self, element: &ElementRef) -> String {
        let mut text = String::new();
        for child in element.children() {
            if let Some(child_element) = child.value().as_element() {
                let tag = child_element.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    text.push_str(&self.visible_text(&child_ref));
                    if matches!(
                        tag,
                        "p" | "div" | "br" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li"
                    ) {
                        text.push('\n');
                    }
                }
            } else if let Some(text_node) = child.value().as_text() {
                text.push_str(text_node);
            }
        }
        text
    }

    /// Collapse whitespace runs: each newline run becomes a single newline,
    /// any other whitespace run becomes a single space.
    fn clean_text(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut prev_was_whitespace = false;
        let mut prev_was_newline = false;

        for c in text.chars() {
            if c == '\n' {
                if !prev_was_newline {
                    result.push('\n');
                    prev_was_newline = true;
                }
                prev_was_whitespace = true;
            } else if c.is_whitespace() {
                if !prev_was_whitespace {
                    result.push(' ');
                    prev_was_whitespace = true;
                }
            } else {
                result.push(c);
                prev_was_whitespace = false;
                prev_was_newline = false;
            }
        }

        result.trim().to_string()
    }

    fn render_element(&self, element: &ElementRef, out: &mut String) {
        let tag = element.value().name();
        if SKIP_TAGS.contains(&tag) {
            return;
        }
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = (tag.as_bytes()[1] - b'0') as usize;
                out.push_str("\n\n");
                for _ in 0..level {
                    out.push('#');
                }
                out.push(' ');
                out.push_str(self.inline_text(element).trim());
                out.push_str("\n\n");
            }
            "pre" => {
                // Anchors inside code blocks flatten to their link text here
                let code: String = element.text().collect();
                out.push_str("\n\n```\n");
                out.push_str(code.trim_matches('\n'));
                out.push_str("\n```\n\n");
            }
            "p" => {
                out.push_str("\n\n");
                self.render_children(element, out);
                out.push_str("\n\n");
            }
            "li" => {
                out.push_str("\n- ");
                self.render_children(element, out);
            }
            "ul" | "ol" => {
                self.render_children(element, out);
                out.push('\n');
            }
            "br" => out.push('\n'),
            "code" => {
                out.push('`');
                out.push_str(self.inline_text(element).trim());
                out.push('`');
            }
            "a" => {
                let text = self.inline_text(element);
                let text = text.trim();
                match element.value().attr("href") {
                    Some(href) if self.config.keep_links && !text.is_empty() => {
                        out.push('[');
                        out.push_str(text);
                        out.push_str("](");
                        out.push_str(href);
                        out.push(')');
                    }
                    _ => out.push_str(text),
                }
            }
            "div" | "section" | "article" | "table" | "tr" => {
                self.render_children(element, out);
                out.push('\n');
            }
            _ => self.render_children(element, out),
        }
    }

    fn render_children(&self, element: &ElementRef, out: &mut String) {
        for child in element.children() {
            if let Some(child_ref) = ElementRef::wrap(child) {
                self.render_element(&child_ref, out);
            } else if let Some(text_node) = child.value().as_text() {
                push_collapsed(out, text_node);
            }
        }
    }

    fn inline_text(&self, element: &ElementRef) -> String {
        let mut text = String::new();
        self.render_children(element, &mut text);
        text
    }
}

#[async_trait::async_trait]
impl Extractor for HtmlExtractor {
    async fn extract(&self, source: &str) -> Result<ExtractResult> {
        let path = Path::new(source);
        if !path.is_file() {
            return Err(ExtractError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {source}"),
            )));
        }
        self.extract_path(path).await
    }
}

/// Convert one HTML file synchronously; runs on a blocking task.
fn convert_one(
    config: &ExtractorConfig,
    input: &Path,
    rel: &Path,
    output_dir: &Path,
    dry_run: bool,
) -> Result<PathBuf> {
    let html = std::fs::read_to_string(input)?;
    let extractor = HtmlExtractor::new(config.clone());
    let result = extractor.extract_str(&html, &input.display().to_string());

    let mut text = result.text;
    let extension = if config.markdown { "md" } else { "txt" };
    if config.markdown {
        // Converted trees link to each other; keep those links working
        text = text.replace(".html", ".md");
    }
    let output_path = output_dir.join(rel).with_extension(extension);

    if dry_run {
        debug!(
            "would write {} bytes to {}",
            text.len(),
            output_path.display()
        );
    } else {
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&output_path, &text)?;
    }
    Ok(output_path)
}

fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").unwrap();
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Append text with whitespace runs collapsed to a single space.
fn push_collapsed(out: &mut String, text: &str) {
    let mut prev_ws = out.is_empty() || out.ends_with([' ', '\n']);
    for c in text.chars() {
        if c.is_whitespace() {
            if !prev_ws {
                out.push(' ');
                prev_ws = true;
            }
        } else {
            out.push(c);
            prev_ws = false;
        }
    }
}

/// Strip trailing spaces and collapse runs of blank lines.
fn tidy_markdown(text: &str) -> String {
    static TRAILING: OnceLock<Regex> = OnceLock::new();
    static BLANKS: OnceLock<Regex> = OnceLock::new();
    let trailing = TRAILING.get_or_init(|| Regex::new(r"[ \t]+\n").unwrap());
    let blanks = BLANKS.get_or_init(|| Regex::new(r"\n{3,}").unwrap());

    let text = trailing.replace_all(text, "\n");
    let text = blanks.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_skips_script() {
        let extractor = HtmlExtractor::default();
        let html = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Test Page</title></head>
        <body>
            <script>alert('ignore me')</script>
            <h1>Hello World</h1>
            <p>This is a test paragraph.</p>
        </body>
        </html>
        "#;

        let (text, title) = extractor.extract_text(html);
        assert_eq!(title, Some("Test Page".to_string()));
        assert!(text.contains("Hello World"));
        assert!(text.contains("This is a test paragraph"));
        assert!(!text.contains("alert"));
    }

    #[test]
    fn test_extract_text_prefers_main_content() {
        let extractor = HtmlExtractor::default();
        let html = r#"
        <html><body>
            <nav>Site navigation</nav>
            <article><p>The actual story.</p></article>
            <footer>Copyright</footer>
        </body></html>
        "#;

        let (text, _) = extractor.extract_text(html);
        assert!(text.contains("The actual story"));
        assert!(!text.contains("Site navigation"));
        assert!(!text.contains("Copyright"));
    }

    #[test]
    fn test_clean_text() {
        let extractor = HtmlExtractor::default();
        let input = "  Hello   World  \n\n\n\n  Test  ";
        let result = extractor.clean_text(input);
        assert_eq!(result, "Hello World \nTest");
    }

    #[test]
    fn test_clean_text_collapses_newline_runs_to_one() {
        let extractor = HtmlExtractor::default();
        assert_eq!(extractor.clean_text("a\nb"), "a\nb");
        assert_eq!(extractor.clean_text("a\n\nb"), "a\nb");
        assert_eq!(extractor.clean_text("a\n\n\n\n\nb"), "a\nb");
    }

    #[test]
    fn test_markdown_headings_and_lists() {
        let config = ExtractorConfig::default().with_markdown(true);
        let extractor = HtmlExtractor::new(config);
        let html = r#"
        <html><body>
            <h1>Title</h1>
            <h3>Section</h3>
            <p>Intro text.</p>
            <ul><li>first</li><li>second</li></ul>
        </body></html>
        "#;

        let (md, _) = extractor.render_markdown(html);
        assert!(md.contains("# Title"));
        assert!(md.contains("### Section"));
        assert!(md.contains("Intro text."));
        assert!(md.contains("- first"));
        assert!(md.contains("- second"));
    }

    #[test]
    fn test_markdown_pre_flattens_anchors() {
        let config = ExtractorConfig::default()
            .with_markdown(true)
            .with_keep_links(true);
        let extractor = HtmlExtractor::new(config);
        let html = r#"<html><body>
            <pre>let x = <a href="/docs/foo">foo</a>();</pre>
        </body></html>"#;

        let (md, _) = extractor.render_markdown(html);
        assert!(md.contains("```\nlet x = foo();\n```"));
        assert!(!md.contains("](/docs/foo)"));
    }

    #[test]
    fn test_markdown_links() {
        let config = ExtractorConfig::default()
            .with_markdown(true)
            .with_keep_links(true);
        let extractor = HtmlExtractor::new(config);
        let html = r#"<html><body><p>See <a href="https://example.com">the docs</a>.</p></body></html>"#;

        let (md, _) = extractor.render_markdown(html);
        assert!(md.contains("[the docs](https://example.com)"));
    }

    #[test]
    fn test_markdown_links_dropped_by_default() {
        let config = ExtractorConfig::default().with_markdown(true);
        let extractor = HtmlExtractor::new(config);
        let html = r#"<html><body><p>See <a href="https://example.com">the docs</a>.</p></body></html>"#;

        let (md, _) = extractor.render_markdown(html);
        assert!(md.contains("the docs"));
        assert!(!md.contains("example.com"));
    }

    #[test]
    fn test_markdown_inline_code() {
        let config = ExtractorConfig::default().with_markdown(true);
        let extractor = HtmlExtractor::new(config);
        let html = "<html><body><p>Run <code>cargo build</code> first.</p></body></html>";

        let (md, _) = extractor.render_markdown(html);
        assert!(md.contains("`cargo build`"));
    }

    #[test]
    fn test_collect_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.html"), "<p>a</p>").unwrap();
        std::fs::write(dir.path().join("sub/b.HTM"), "<p>b</p>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "skip").unwrap();

        let mut files = HtmlExtractor::collect_files(dir.path());
        files.sort();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.html"));
        assert!(files[1].ends_with("sub/b.HTM"));
    }

    #[test]
    fn test_tidy_markdown() {
        let input = "line one   \n\n\n\n\nline two";
        assert_eq!(tidy_markdown(input), "line one\n\nline two");
    }
}
