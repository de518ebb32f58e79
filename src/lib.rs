//! # textgrab
//!
//! Text extraction from images, PDFs, HTML files, and web pages.
//!
//! Each source kind gets one extractor behind a shared [`Extractor`] trait:
//!
//! - **OCR**: preprocess an image and hand it to the `tesseract` binary
//! - **PDF**: per-page text extraction via `lopdf`
//! - **HTML**: clean text or Markdown from a file, string, or directory tree
//! - **Web**: fetch a URL, optionally through an on-disk page cache
//!
//! Extracted text can be segmented further into paragraphs, sentences, and
//! words with [`TextParser`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use textgrab::{Extractor, ExtractorConfig, WebExtractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = WebExtractor::new(ExtractorConfig::default());
//!     let result = extractor.extract("https://example.com").await?;
//!     println!("{}", result.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────┐     ┌───────────────┐
//! │      Source      │ ──► │  Extractor   │ ──► │  Plain text / │
//! │ (image/PDF/URL/  │     │ (engine call │     │   Markdown    │
//! │   HTML path)     │     │  + cleanup)  │     │               │
//! └──────────────────┘     └──────────────┘     └───────────────┘
//! ```

pub mod config;
pub mod error;
pub mod html;
pub mod parse;
pub mod result;

#[cfg(feature = "web")]
pub mod cache;

#[cfg(feature = "web")]
pub mod web;

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use config::ExtractorConfig;
pub use error::{ExtractError, Result};
pub use html::HtmlExtractor;
pub use parse::TextParser;
pub use result::ExtractResult;

#[cfg(feature = "web")]
pub use cache::PageCache;

#[cfg(feature = "web")]
pub use web::WebExtractor;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

#[cfg(feature = "ocr")]
pub use ocr::{ImageOp, OcrExtractor};

/// Common trait for all extractors.
///
/// `source` is a file path for the OCR, PDF, and HTML extractors and a URL
/// for the web extractor.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Extract text content from the given source.
    async fn extract(&self, source: &str) -> Result<ExtractResult>;
}
