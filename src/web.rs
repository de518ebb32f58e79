//! Web page content extraction

use crate::{
    cache::PageCache, config::ExtractorConfig, error::Result, html::HtmlExtractor, ExtractError,
    ExtractResult, Extractor,
};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Web page content extractor
#[derive(Debug, Clone)]
pub struct WebExtractor {
    config: ExtractorConfig,
    client: Client,
}

impl Default for WebExtractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl WebExtractor {
    /// Create a new web extractor with the given configuration
    pub fn new(config: ExtractorConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            })
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Fetch a URL, returning the body and the content type
    pub async fn fetch(&self, url: &Url) -> Result<(String, Option<String>)> {
        debug!(url = %url, "fetching");
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Http {
                status: status.as_u16(),
                message: status.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await?;
        if body.len() > self.config.max_length {
            return Err(ExtractError::ContentTooLarge {
                size: body.len(),
                max: self.config.max_length,
            });
        }

        Ok((body, content_type))
    }

    /// Fetch a URL through an on-disk cache and return the path and content
    /// of its Markdown rendition.
    ///
    /// A cached raw page suppresses the network fetch entirely; a miss
    /// fetches and stores the raw body. The Markdown rendition is rewritten
    /// on every call (it is deterministic, and the fetch is what the cache
    /// exists to avoid).
    pub async fn extract_cached(
        &self,
        source: &str,
        cache: &PageCache,
    ) -> Result<(PathBuf, String)> {
        let url = Url::parse(source)?;
        let html_path = cache.html_path(&url)?;
        let markdown_path = cache.markdown_path(&url)?;

        let html = match cache.read(&html_path) {
            Some(cached) => {
                info!(url = %url, "using cached page");
                cached
            }
            None => {
                let (body, _) = self.fetch(&url).await?;
                cache.write(&html_path, &body)?;
                body
            }
        };

        let renderer =
            HtmlExtractor::new(self.config.clone().with_markdown(true).with_clean_text(true));
        let (markdown, _title) = renderer.render_markdown(&html);
        cache.write(&markdown_path, &markdown)?;

        Ok((markdown_path, markdown))
    }
}

#[async_trait::async_trait]
impl Extractor for WebExtractor {
    async fn extract(&self, source: &str) -> Result<ExtractResult> {
        let url =
            Url::parse(source).map_err(|_| ExtractError::InvalidUrl(source.to_string()))?;

        let (body, content_type) = self.fetch(&url).await?;
        let original_length = body.len();

        let renderer = HtmlExtractor::new(self.config.clone());
        let mut result = renderer.extract_str(&body, source);
        result.original_length = original_length;

        if let Some(ct) = content_type {
            result = result.with_content_type(ct);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_page_skips_network() {
        // Prime the raw-HTML cache, then extract against a host that does
        // not resolve; a network attempt would fail the call.
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let url = Url::parse("https://cache-test.invalid/page.html").unwrap();
        cache
            .write(
                &cache.html_path(&url).unwrap(),
                "<html><body><h1>Cached</h1><p>Body text.</p></body></html>",
            )
            .unwrap();

        let extractor = WebExtractor::default();
        let (path, markdown) = tokio_test::block_on(
            extractor.extract_cached("https://cache-test.invalid/page.html", &cache),
        )
        .unwrap();

        assert!(path.ends_with("markdown/cache-test.invalid/page.md"));
        assert!(markdown.contains("# Cached"));
        assert!(markdown.contains("Body text."));
        assert!(path.is_file());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let extractor = WebExtractor::default();
        let err = tokio_test::block_on(extractor.extract("not a url")).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl(_)));
    }
}
