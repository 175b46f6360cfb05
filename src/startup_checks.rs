use crate::Config;
use crate::export::is_supported_image;
use crate::watermark::{WatermarkMode, WatermarkSource};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create output directory: {0}")]
    OutputDirectoryCreationFailed(#[from] std::io::Error),

    #[error("Watermark image does not exist: {0:?}")]
    WatermarkImageMissing(PathBuf),

    #[error("Image mode selected but no watermark image configured")]
    WatermarkImageNotConfigured,

    #[error("Input does not exist: {0:?}")]
    InputMissing(PathBuf),

    #[error("Input is not a supported image: {0:?}")]
    UnsupportedInput(PathBuf),
}

/// Validate the configuration and inputs before a batch starts.
///
/// Problems that only degrade output (missing font directories, no
/// watermark configured) are logged as warnings.
pub fn perform_startup_checks(
    config: &Config,
    inputs: &[PathBuf],
) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let output_dir = &config.export.output_dir;
    if !output_dir.exists() {
        info!("Output directory does not exist, creating: {:?}", output_dir);
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            error!("Failed to create output directory: {}", e);
            errors.push(StartupCheckError::OutputDirectoryCreationFailed(e));
        }
    } else {
        info!("Output directory exists: {:?}", output_dir);
    }

    for font_dir in &config.fonts.directories {
        if font_dir.is_dir() {
            info!("Font directory exists: {:?}", font_dir);
        } else {
            warn!("Font directory does not exist: {:?}", font_dir);
        }
    }

    match config.watermark.source() {
        Some(WatermarkSource::Image(path)) if !path.is_file() => {
            error!("Watermark image does not exist: {:?}", path);
            errors.push(StartupCheckError::WatermarkImageMissing(path.to_path_buf()));
        }
        Some(_) => {}
        None if config.watermark.mode == WatermarkMode::Image => {
            errors.push(StartupCheckError::WatermarkImageNotConfigured);
        }
        None => warn!("No watermark text configured, images will be exported unchanged"),
    }

    for input in inputs {
        check_input(input, &mut errors);
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}

fn check_input(input: &Path, errors: &mut Vec<StartupCheckError>) {
    if !input.exists() {
        error!("Input does not exist: {:?}", input);
        errors.push(StartupCheckError::InputMissing(input.to_path_buf()));
    } else if input.is_file() && !is_supported_image(input) {
        warn!("Input is not a supported image: {:?}", input);
        errors.push(StartupCheckError::UnsupportedInput(input.to_path_buf()));
    }
}
