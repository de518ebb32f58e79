//! Image text extraction via the `tesseract` binary.
//!
//! The image is optionally run through a preprocessing pipeline (grayscale,
//! scaling, rotation, contrast stretch, brightness burn, binarization)
//! before being handed to tesseract. Recognition itself is entirely
//! delegated to the engine.

use crate::{config::ExtractorConfig, error::Result, ExtractError, ExtractResult, Extractor};
use image::{DynamicImage, GenericImageView, GrayImage, RgbaImage};
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, warn};

/// One step of the OCR preprocessing pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageOp {
    /// Convert to grayscale
    Grayscale,
    /// Scale both dimensions by a factor
    Scale(f32),
    /// Rotate around the image center by degrees (counter-clockwise),
    /// clipping at the original bounds
    Rotate(f32),
    /// Histogram-equalize the luma channel
    Contrast,
    /// Linear brightness/contrast adjust: `v' = alpha * v + beta`
    Burn { alpha: f32, beta: i32 },
    /// Adaptive mean threshold to black and white
    Binarize,
}

/// Image text extractor backed by the system tesseract install
#[derive(Debug, Clone, Default)]
pub struct OcrExtractor {
    config: ExtractorConfig,
    pipeline: Vec<ImageOp>,
}

impl OcrExtractor {
    /// Create a new OCR extractor with the given configuration
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            pipeline: Vec::new(),
        }
    }

    /// Set the preprocessing pipeline, applied in order before recognition
    pub fn with_pipeline(mut self, pipeline: Vec<ImageOp>) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Check whether the configured engine binary can be invoked
    pub fn engine_available(&self) -> bool {
        std::process::Command::new(&self.config.ocr_engine)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    /// Run OCR against an image file
    pub async fn extract_from_file(&self, path: &Path) -> Result<ExtractResult> {
        let source = path.display().to_string();

        // Without preprocessing the original file goes straight to the
        // engine; no point re-encoding it
        if self.pipeline.is_empty() {
            let text = self.run_tesseract(path).await?;
            let byte_len = tokio::fs::metadata(path)
                .await
                .map(|m| m.len() as usize)
                .unwrap_or(0);
            return Ok(ExtractResult::new(text, source).with_original_length(byte_len));
        }

        let pipeline = self.pipeline.clone();
        let input = path.to_path_buf();
        let image = tokio::task::spawn_blocking(move || -> Result<DynamicImage> {
            let mut image = image::open(&input)?;
            for op in &pipeline {
                image = apply_op(image, *op);
            }
            Ok(image)
        })
        .await??;

        let (width, height) = image.dimensions();
        debug!(width, height, ops = self.pipeline.len(), "preprocessed image");

        let tmp = tempfile::tempdir()?;
        let tmp_path = tmp.path().join("preprocessed.png");
        image.save(&tmp_path)?;

        let text = self.run_tesseract(&tmp_path).await?;
        let byte_len = tokio::fs::metadata(path)
            .await
            .map(|m| m.len() as usize)
            .unwrap_or(0);
        Ok(ExtractResult::new(text, source)
            .with_original_length(byte_len)
            .with_metadata("preprocessing_ops", self.pipeline.len().to_string()))
    }

    async fn run_tesseract(&self, image_path: &Path) -> Result<String> {
        let output = tokio::process::Command::new(&self.config.ocr_engine)
            .arg(image_path)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.ocr_lang)
            .arg("--psm")
            .arg(self.config.ocr_psm.to_string())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::EngineMissing(format!(
                        "{} not found; install the tesseract-ocr package",
                        self.config.ocr_engine
                    ))
                } else {
                    ExtractError::Ocr(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::Ocr(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        // Tesseract writes diagnostics to stderr even on success
        if !output.stderr.is_empty() {
            warn!(
                "tesseract: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait::async_trait]
impl Extractor for OcrExtractor {
    async fn extract(&self, source: &str) -> Result<ExtractResult> {
        let path = Path::new(source);
        if !path.is_file() {
            return Err(ExtractError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {source}"),
            )));
        }
        self.extract_from_file(path).await
    }
}

/// Apply one preprocessing operation.
fn apply_op(image: DynamicImage, op: ImageOp) -> DynamicImage {
    match op {
        ImageOp::Grayscale => image.grayscale(),
        ImageOp::Scale(factor) => {
            let (w, h) = image.dimensions();
            let nw = ((w as f32 * factor).round() as u32).max(1);
            let nh = ((h as f32 * factor).round() as u32).max(1);
            image.resize_exact(nw, nh, image::imageops::FilterType::Triangle)
        }
        ImageOp::Rotate(degrees) => rotate(&image, degrees),
        ImageOp::Contrast => equalize(&image),
        ImageOp::Burn { alpha, beta } => burn(&image, alpha, beta),
        ImageOp::Binarize => binarize(&image),
    }
}

/// Rotate around the center into a same-sized buffer using nearest-neighbor
/// inverse mapping. Corners that leave the frame clip to transparent black.
fn rotate(image: &DynamicImage, degrees: f32) -> DynamicImage {
    let src = image.to_rgba8();
    let (w, h) = src.dimensions();
    let cx = (w.saturating_sub(1)) as f32 / 2.0;
    let cy = (h.saturating_sub(1)) as f32 / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();

    let mut out = RgbaImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let sx = (cos * dx + sin * dy + cx).round();
            let sy = (-sin * dx + cos * dy + cy).round();
            if sx >= 0.0 && sy >= 0.0 && (sx as u32) < w && (sy as u32) < h {
                out.put_pixel(x, y, *src.get_pixel(sx as u32, sy as u32));
            }
        }
    }
    DynamicImage::ImageRgba8(out)
}

/// Histogram equalization on the luma channel.
fn equalize(image: &DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let total = (gray.width() as u64 * gray.height() as u64).max(1);

    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let mut lut = [0u8; 256];
    let mut cumulative = 0u64;
    for (value, count) in histogram.iter().enumerate() {
        cumulative += count;
        lut[value] = ((cumulative * 255) / total) as u8;
    }

    let mut out = gray;
    for pixel in out.pixels_mut() {
        pixel.0[0] = lut[pixel.0[0] as usize];
    }
    DynamicImage::ImageLuma8(out)
}

/// Linear brightness/contrast adjustment, clamped to the u8 range.
fn burn(image: &DynamicImage, alpha: f32, beta: i32) -> DynamicImage {
    let mut rgba = image.to_rgba8();
    for pixel in rgba.pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = (alpha * f32::from(*channel) + beta as f32).clamp(0.0, 255.0) as u8;
        }
    }
    DynamicImage::ImageRgba8(rgba)
}

/// Adaptive mean threshold with an 11x11 window and a constant offset of 2,
/// computed over an integral image.
fn binarize(image: &DynamicImage) -> DynamicImage {
    const WINDOW: i64 = 11;
    const OFFSET: i64 = 2;

    let gray = image.to_luma8();
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return DynamicImage::ImageLuma8(gray);
    }

    // integral[y][x] = sum of all pixels above and left of (x, y)
    let stride = (w + 1) as usize;
    let mut integral = vec![0i64; stride * (h + 1) as usize];
    for y in 0..h as usize {
        let mut row_sum = 0i64;
        for x in 0..w as usize {
            row_sum += i64::from(gray.get_pixel(x as u32, y as u32).0[0]);
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    let half = WINDOW / 2;
    let mut out = GrayImage::new(w, h);
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let x0 = (x - half).max(0) as usize;
            let y0 = (y - half).max(0) as usize;
            let x1 = (x + half + 1).min(w as i64) as usize;
            let y1 = (y + half + 1).min(h as i64) as usize;

            let area = ((x1 - x0) * (y1 - y0)) as i64;
            let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
                - integral[y0 * stride + x1]
                - integral[y1 * stride + x0];
            let mean = sum / area;

            let value = i64::from(gray.get_pixel(x as u32, y as u32).0[0]);
            let pixel = if value > mean - OFFSET { 255 } else { 0 };
            out.put_pixel(x as u32, y as u32, image::Luma([pixel]));
        }
    }
    DynamicImage::ImageLuma8(out)
}
