//! Command-line interface for textgrab.
//!
//! Usage:
//!   textgrab ocr -i scan.png -o scan.txt --grayscale --preprocess
//!   textgrab pdf -i report.pdf
//!   textgrab html -i ./docs -o converted_md --markdown
//!   textgrab web https://example.com/post.html --cache ./cache

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use textgrab::html::ProgressFn;
use textgrab::{
    Extractor, ExtractorConfig, HtmlExtractor, ImageOp, OcrExtractor, PageCache, PdfExtractor,
    Result, TextParser, WebExtractor,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "textgrab")]
#[command(about = "Extract text from images, PDFs, HTML files, and web pages", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from an image via tesseract
    Ocr {
        /// Path to the input image
        #[arg(short, long)]
        input: PathBuf,
        /// Path to save the extracted text (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rotate the image by the given angle in degrees before recognition
        #[arg(short, long, default_value_t = 0.0)]
        rotate: f32,
        /// Scale the image by the given factor before recognition
        #[arg(short, long)]
        scale: Option<f32>,
        /// Convert the image to grayscale
        #[arg(short, long)]
        grayscale: bool,
        /// Enhance contrast via histogram equalization
        #[arg(short = 'a', long)]
        contrast: bool,
        /// Burn the image (darken: alpha 1.0, beta -50)
        #[arg(short, long)]
        burn: bool,
        /// Binarize with an adaptive threshold before recognition
        #[arg(short, long)]
        preprocess: bool,
        /// Tesseract language code
        #[arg(long, default_value = "eng")]
        lang: String,
        /// Tesseract page segmentation mode
        #[arg(long, default_value_t = 3)]
        psm: u8,
        /// Emit the full extraction result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Extract text from a PDF document
    Pdf {
        /// Path to the input PDF
        #[arg(short, long)]
        input: PathBuf,
        /// Path to save the extracted text (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit the full extraction result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert an HTML file or directory tree to Markdown or plain text
    Html {
        /// Path to the file or directory to process
        #[arg(short, long)]
        input: PathBuf,
        /// Directory for the converted output
        #[arg(short, long, default_value = "converted_md")]
        output_dir: PathBuf,
        /// Number of worker tasks for directory conversion
        #[arg(short = 't', long)]
        threads: Option<usize>,
        /// Render Markdown instead of plain text
        #[arg(short, long)]
        markdown: bool,
        /// Keep hyperlinks as [text](href) in Markdown output
        #[arg(long)]
        links: bool,
        /// Report what would be written without writing anything
        #[arg(short, long)]
        dry_run: bool,
    },
    /// Segment a plain text file into paragraphs and sentences
    Parse {
        /// Path to the text file to segment
        #[arg(short, long)]
        input: PathBuf,
        /// Print word tokens for each sentence
        #[arg(short, long)]
        words: bool,
    },
    /// Fetch a web page, cache it, and render it as Markdown
    Web {
        /// The URL to download the page from
        url: String,
        /// Cache directory for the raw HTML and Markdown documents
        #[arg(long, default_value = ".")]
        cache: PathBuf,
        /// Print the Markdown content to standard output
        #[arg(long)]
        stdout: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ocr {
            input,
            output,
            rotate,
            scale,
            grayscale,
            contrast,
            burn,
            preprocess,
            lang,
            psm,
            json,
        } => {
            let mut pipeline = Vec::new();
            if rotate != 0.0 {
                pipeline.push(ImageOp::Rotate(rotate));
            }
            if let Some(factor) = scale {
                pipeline.push(ImageOp::Scale(factor));
            }
            if grayscale {
                pipeline.push(ImageOp::Grayscale);
            }
            if contrast {
                pipeline.push(ImageOp::Contrast);
            }
            if burn {
                pipeline.push(ImageOp::Burn {
                    alpha: 1.0,
                    beta: -50,
                });
            }
            if preprocess {
                pipeline.push(ImageOp::Binarize);
            }

            let config = ExtractorConfig::default()
                .with_ocr_lang(lang)
                .with_ocr_psm(psm);
            let extractor = OcrExtractor::new(config).with_pipeline(pipeline);
            let result = extractor.extract(&input.display().to_string()).await?;
            emit(&result, output.as_deref(), json)
        }
        Command::Pdf {
            input,
            output,
            json,
        } => {
            let is_pdf = input
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
            if !is_pdf {
                return Err(textgrab::ExtractError::Parse(format!(
                    "input must be a .pdf file: {}",
                    input.display()
                )));
            }

            let extractor = PdfExtractor::new(ExtractorConfig::default());
            let result = extractor.extract(&input.display().to_string()).await?;
            emit(&result, output.as_deref(), json)
        }
        Command::Html {
            input,
            output_dir,
            threads,
            markdown,
            links,
            dry_run,
        } => {
            let mut config = ExtractorConfig::default()
                .with_markdown(markdown)
                .with_keep_links(links);
            if let Some(n) = threads {
                config = config.with_workers(n);
            }
            let extractor = HtmlExtractor::new(config);

            if input.is_file() {
                let path = extractor.convert_file(&input, &output_dir, dry_run).await?;
                info!("wrote {}", path.display());
            } else if input.is_dir() {
                let total = HtmlExtractor::collect_files(&input).len();
                let bar = ProgressBar::new(total as u64);
                let hook = bar.clone();
                let progress: ProgressFn = Arc::new(move |done, _total| {
                    hook.set_position(done as u64);
                });

                let summary = extractor
                    .convert_dir(&input, &output_dir, dry_run, Some(progress))
                    .await?;
                bar.finish_and_clear();

                println!(
                    "Converted {} of {} files ({} failed)",
                    summary.converted, summary.total, summary.failed
                );
            } else {
                return Err(textgrab::ExtractError::Parse(format!(
                    "invalid input path: {}",
                    input.display()
                )));
            }
            Ok(())
        }
        Command::Parse { input, words } => {
            let text = tokio::fs::read_to_string(&input).await?;
            let parser = TextParser::new();
            let parsed = parser.parse(&parser.normalize(&text));

            for (i, paragraph) in parsed.iter().enumerate() {
                let kind = if paragraph.is_toc { " (toc)" } else { "" };
                println!("Paragraph {}{kind}", i + 1);
                for (j, sentence) in paragraph.sentences.iter().enumerate() {
                    println!("  Sentence {}: {sentence}", j + 1);
                    if words {
                        println!("    Words: {:?}", parser.words(sentence));
                    }
                }
            }
            Ok(())
        }
        Command::Web { url, cache, stdout } => {
            info!("attempting to get content from {url}");
            let config = ExtractorConfig::default()
                .with_markdown(true)
                .with_keep_links(true);
            let extractor = WebExtractor::new(config);
            let cache = PageCache::new(cache);

            let (path, markdown) = extractor.extract_cached(&url, &cache).await?;
            if stdout {
                println!("{markdown}");
            }
            println!("Wrote {} bytes to {}", markdown.len(), path.display());
            Ok(())
        }
    }
}

/// Write extracted text to a file or stdout, optionally as JSON.
fn emit(result: &textgrab::ExtractResult, output: Option<&Path>, json: bool) -> Result<()> {
    let content = if json {
        serde_json::to_string_pretty(result)
            .map_err(|e| textgrab::ExtractError::Other(e.to_string()))?
    } else {
        result.text.clone()
    };

    match output {
        Some(path) => {
            std::fs::write(path, &content)?;
            info!("wrote {} bytes to {}", content.len(), path.display());
        }
        None => println!("{}", content.trim_end()),
    }
    Ok(())
}
