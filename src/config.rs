//! Extractor configuration

use serde::{Deserialize, Serialize};

/// Configuration for content extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum content length to extract (in bytes)
    pub max_length: usize,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Whether to extract clean text (remove HTML tags, scripts, etc.)
    pub clean_text: bool,

    /// Whether to render Markdown instead of plain text
    pub markdown: bool,

    /// Whether to keep hyperlinks as `[text](href)` in Markdown output
    pub keep_links: bool,

    /// User agent for web requests
    pub user_agent: String,

    /// Whether to follow redirects
    pub follow_redirects: bool,

    /// Maximum redirects to follow
    pub max_redirects: usize,

    /// OCR engine binary to invoke (a name looked up on PATH, or a full path)
    #[cfg(feature = "ocr")]
    pub ocr_engine: String,

    /// Tesseract language code
    #[cfg(feature = "ocr")]
    pub ocr_lang: String,

    /// Tesseract page segmentation mode
    #[cfg(feature = "ocr")]
    pub ocr_psm: u8,

    /// Worker count for bulk directory conversion
    pub workers: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_length: 1_000_000,
            timeout_secs: 30,
            clean_text: true,
            markdown: false,
            keep_links: false,
            user_agent: format!(
                "textgrab/{} (https://github.com/textgrab/textgrab)",
                env!("CARGO_PKG_VERSION")
            ),
            follow_redirects: true,
            max_redirects: 5,
            #[cfg(feature = "ocr")]
            ocr_engine: "tesseract".to_string(),
            #[cfg(feature = "ocr")]
            ocr_lang: "eng".to_string(),
            // 3 is tesseract's default: fully automatic segmentation, no OSD
            #[cfg(feature = "ocr")]
            ocr_psm: 3,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl ExtractorConfig {
    /// Create a new config with custom max length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Create a new config with custom timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Enable or disable text cleaning
    pub fn with_clean_text(mut self, clean: bool) -> Self {
        self.clean_text = clean;
        self
    }

    /// Enable or disable Markdown rendering
    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }

    /// Enable or disable hyperlinks in Markdown output
    pub fn with_keep_links(mut self, keep: bool) -> Self {
        self.keep_links = keep;
        self
    }

    #[cfg(feature = "ocr")]
    /// Set the OCR engine binary
    pub fn with_ocr_engine(mut self, engine: impl Into<String>) -> Self {
        self.ocr_engine = engine.into();
        self
    }

    #[cfg(feature = "ocr")]
    /// Set the tesseract language code
    pub fn with_ocr_lang(mut self, lang: impl Into<String>) -> Self {
        self.ocr_lang = lang.into();
        self
    }

    #[cfg(feature = "ocr")]
    /// Set the tesseract page segmentation mode
    pub fn with_ocr_psm(mut self, psm: u8) -> Self {
        self.ocr_psm = psm;
        self
    }

    /// Set the worker count for bulk directory conversion
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}
