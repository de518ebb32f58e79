//! Extraction result types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of content extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResult {
    /// The extracted text content
    pub text: String,

    /// Source URL or path
    pub source: String,

    /// Content type (e.g., "text/html", "application/pdf")
    pub content_type: Option<String>,

    /// Original content length in bytes
    pub original_length: usize,

    /// Extracted text length in characters
    pub text_length: usize,

    /// Page title (for web pages and HTML documents)
    pub title: Option<String>,

    /// Metadata extracted from the source
    pub metadata: HashMap<String, String>,
}

impl ExtractResult {
    /// Create a new extraction result
    pub fn new(text: String, source: String) -> Self {
        let text_length = text.len();
        Self {
            text,
            source,
            content_type: None,
            original_length: 0,
            text_length,
            title: None,
            metadata: HashMap::new(),
        }
    }

    /// Set the content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the original length
    pub fn with_original_length(mut self, length: usize) -> Self {
        self.original_length = length;
        self
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Get a truncated version of the text
    pub fn truncate(&self, max_chars: usize) -> String {
        if self.text.chars().count() <= max_chars {
            self.text.clone()
        } else {
            let mut result = self.text.chars().take(max_chars).collect::<String>();
            result.push_str("...");
            result
        }
    }
}
