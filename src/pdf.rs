//! PDF document content extraction

use crate::{config::ExtractorConfig, error::Result, ExtractError, ExtractResult, Extractor};
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// PDF document content extractor
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    config: ExtractorConfig,
}

impl PdfExtractor {
    /// Create a new PDF extractor with the given configuration
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract text from a PDF file path
    pub fn extract_from_file(&self, path: &Path) -> Result<ExtractResult> {
        let doc = Document::load(path)?;
        self.extract_from_document(&doc, path.display().to_string())
    }

    /// Extract text from PDF bytes
    pub fn extract_from_bytes(&self, bytes: &[u8], source: String) -> Result<ExtractResult> {
        let doc = Document::load_mem(bytes)?;
        self.extract_from_document(&doc, source)
    }

    /// Extract text page by page from a loaded document
    fn extract_from_document(&self, doc: &Document, source: String) -> Result<ExtractResult> {
        let pages = doc.get_pages();
        debug!(pages = pages.len(), source = %source, "extracting PDF");

        let mut page_texts: Vec<String> = Vec::with_capacity(pages.len());
        for page_num in pages.keys() {
            // A page that fails to decode is skipped rather than failing
            // the whole document
            if let Ok(page_text) = doc.extract_text(&[*page_num]) {
                let cleaned = self.clean_text(&page_text);
                if !cleaned.is_empty() {
                    page_texts.push(cleaned);
                }
            }
        }

        let text = page_texts.join("\n\n");
        if text.len() > self.config.max_length {
            return Err(ExtractError::ContentTooLarge {
                size: text.len(),
                max: self.config.max_length,
            });
        }

        let mut result = ExtractResult::new(text, source)
            .with_content_type("application/pdf")
            .with_metadata("page_count", pages.len().to_string());

        if let Some((title, author)) = document_info(doc) {
            if let Some(title) = title {
                result = result.with_title(title);
            }
            if let Some(author) = author {
                result = result.with_metadata("author", author);
            }
        }

        Ok(result)
    }

    /// Collapse whitespace runs, keeping single newlines
    fn clean_text(&self, text: &str) -> String {
        let mut result = String::with_capacity(text.len());
        let mut prev_was_whitespace = false;

        for c in text.chars() {
            if c.is_whitespace() {
                if !prev_was_whitespace {
                    result.push(if c == '\n' { '\n' } else { ' ' });
                    prev_was_whitespace = true;
                }
            } else {
                result.push(c);
                prev_was_whitespace = false;
            }
        }

        result.trim().to_string()
    }
}

/// Pull title and author out of the document's Info dictionary, if present.
fn document_info(doc: &Document) -> Option<(Option<String>, Option<String>)> {
    let info_ref = doc.trailer.get(b"Info").ok()?;
    let info_id = info_ref.as_reference().ok()?;
    let info_dict = doc.get_object(info_id).ok()?.as_dict().ok()?;

    let field = |key: &[u8]| -> Option<String> {
        let bytes = info_dict.get(key).ok()?.as_str().ok()?;
        let value = String::from_utf8_lossy(bytes).trim().to_string();
        (!value.is_empty()).then_some(value)
    };

    Some((field(b"Title"), field(b"Author")))
}

#[async_trait::async_trait]
impl Extractor for PdfExtractor {
    /// Extract text from a PDF file path
    async fn extract(&self, source: &str) -> Result<ExtractResult> {
        let path = Path::new(source);
        if !path.is_file() {
            return Err(ExtractError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {source}"),
            )));
        }

        // lopdf parsing is synchronous and can be heavy on large documents
        let this = self.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || this.extract_from_file(&path)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        let extractor = PdfExtractor::default();
        let input = "  Hello   World  \n\n  Test  ";
        let result = extractor.clean_text(input);
        assert_eq!(result, "Hello World Test");
    }

    #[test]
    fn test_invalid_bytes_error() {
        let extractor = PdfExtractor::default();
        let err = extractor
            .extract_from_bytes(b"not a pdf", "mem".to_string())
            .unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }
}
