// Export - encoding composed images and running batches
mod batch;
mod jpeg;
mod png;

pub use batch::{BatchError, BatchFailure, BatchJob, BatchReport, export_batch, export_one};
pub use jpeg::flatten_onto_white;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Source extensions accepted for watermarking
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tiff"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Refusing to overwrite source image {0:?}")]
    WouldOverwriteSource(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpeg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Png => "png",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "png" => Some(ExportFormat::Png),
            _ => None,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| ExportError::UnsupportedFormat(s.to_string()))
    }
}

/// Where and how composed images are written
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    /// JPEG quality, 1-100
    pub quality: u8,
    pub prefix: String,
    pub suffix: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            format: ExportFormat::Jpeg,
            quality: 95,
            prefix: String::new(),
            suffix: "_watermarked".to_string(),
        }
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// `<output_dir>/<prefix><stem><suffix>.<ext>` for one input image
pub fn output_filename(input: &Path, options: &ExportOptions) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    options.output_dir.join(format!(
        "{}{}{}.{}",
        options.prefix,
        stem,
        options.suffix,
        options.format.extension()
    ))
}

/// Encode a composed image; JPEG output is flattened onto white first
pub fn save_composed(
    image: &RgbaImage,
    path: &Path,
    format: ExportFormat,
    quality: u8,
) -> Result<(), ExportError> {
    match format {
        ExportFormat::Jpeg => {
            if !(1..=100).contains(&quality) {
                return Err(ExportError::InvalidQuality(quality));
            }
            jpeg::save(image, path, quality)
        }
        ExportFormat::Png => png::save(image, path),
    }
}
