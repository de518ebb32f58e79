//! On-disk page cache for web extraction.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/html/<host>/<url path, or index.html>      raw fetched body
//! <root>/markdown/<host>/<url path stem>.md         rendered Markdown
//! ```
//!
//! There is no expiry: a cached raw page is reused until it is deleted.

use crate::error::{ExtractError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use url::Url;

/// Filesystem cache keyed by URL host and path
#[derive(Debug, Clone)]
pub struct PageCache {
    root: PathBuf,
}

impl PageCache {
    /// Create a cache rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path where the raw HTML for a URL is stored
    pub fn html_path(&self, url: &Url) -> Result<PathBuf> {
        let rel = url_relative_path(url)?;
        Ok(self.root.join("html").join(rel))
    }

    /// Path where the Markdown rendition for a URL is stored
    pub fn markdown_path(&self, url: &Url) -> Result<PathBuf> {
        let rel = url_relative_path(url)?;
        Ok(self.root.join("markdown").join(rel.with_extension("md")))
    }

    /// Read a cached file; `None` on a miss
    pub fn read(&self, path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "cache hit");
                Some(content)
            }
            Err(_) => None,
        }
    }

    /// Write a cached file, creating parent directories as needed
    pub fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "cache write");
        Ok(())
    }
}

/// Derive `<host>/<path>` for a URL, defaulting an empty path to
/// `index.html`. Rejects URLs without a host and strips any path component
/// that would escape the cache root.
fn url_relative_path(url: &Url) -> Result<PathBuf> {
    let host = url
        .host_str()
        .ok_or_else(|| ExtractError::InvalidUrl(format!("URL has no host: {url}")))?;

    let raw = url.path().trim_start_matches('/');
    let path = if raw.is_empty() {
        Path::new("index.html").to_path_buf()
    } else {
        // keep cache writes inside the root
        Path::new(raw)
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect()
    };

    Ok(Path::new(host).join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_for_document_url() {
        let cache = PageCache::new("/tmp/cache");
        let url = Url::parse("https://example.com/docs/page.html").unwrap();

        assert_eq!(
            cache.html_path(&url).unwrap(),
            Path::new("/tmp/cache/html/example.com/docs/page.html")
        );
        assert_eq!(
            cache.markdown_path(&url).unwrap(),
            Path::new("/tmp/cache/markdown/example.com/docs/page.md")
        );
    }

    #[test]
    fn test_bare_host_maps_to_index() {
        let cache = PageCache::new("/tmp/cache");
        let url = Url::parse("https://example.com").unwrap();

        assert_eq!(
            cache.html_path(&url).unwrap(),
            Path::new("/tmp/cache/html/example.com/index.html")
        );
        assert_eq!(
            cache.markdown_path(&url).unwrap(),
            Path::new("/tmp/cache/markdown/example.com/index.md")
        );
    }

    #[test]
    fn test_extensionless_path_gets_md_extension() {
        let cache = PageCache::new("/tmp/cache");
        let url = Url::parse("https://example.com/blog/post").unwrap();

        assert_eq!(
            cache.markdown_path(&url).unwrap(),
            Path::new("/tmp/cache/markdown/example.com/blog/post.md")
        );
    }

    #[test]
    fn test_parent_components_stripped() {
        let cache = PageCache::new("/tmp/cache");
        let url = Url::parse("https://example.com/%2e%2e/etc/passwd").unwrap();

        let path = cache.html_path(&url).unwrap();
        assert!(path.starts_with("/tmp/cache/html/example.com"));
        assert!(!path.components().any(|c| c == Component::ParentDir));
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let url = Url::parse("https://example.com/a/b.html").unwrap();
        let path = cache.html_path(&url).unwrap();

        assert!(cache.read(&path).is_none());
        cache.write(&path, "<p>hello</p>").unwrap();
        assert_eq!(cache.read(&path).as_deref(), Some("<p>hello</p>"));
    }
}
