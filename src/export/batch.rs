use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use super::{ExportError, ExportOptions, output_filename, save_composed};
use crate::watermark::{LayerRenderer, RenderError, WatermarkSettings, load_source, try_render_watermark};

/// One source image and the settings to watermark it with
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub settings: WatermarkSettings,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

#[derive(Debug)]
pub struct BatchFailure {
    pub input: PathBuf,
    pub error: BatchError,
}

/// Outcome of a whole batch: what was written and what failed
#[derive(Debug, Default)]
pub struct BatchReport {
    pub exported: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.exported.len() + self.failures.len()
    }
}

/// Export every job, carrying on past failures.
///
/// An image whose watermark fails to render is reported as failed rather
/// than written without its watermark.
pub fn export_batch(
    jobs: &[BatchJob],
    renderer: &LayerRenderer,
    options: &ExportOptions,
) -> BatchReport {
    let mut report = BatchReport::default();

    for job in jobs {
        match export_one(job, renderer, options) {
            Ok(output) => {
                info!("Exported {:?} -> {:?}", job.input, output);
                report.exported.push(output);
            }
            Err(e) => {
                error!("Failed to export {:?}: {}", job.input, e);
                report.failures.push(BatchFailure {
                    input: job.input.clone(),
                    error: e,
                });
            }
        }
    }

    info!(
        "Batch finished: {} exported, {} failed",
        report.exported.len(),
        report.failures.len()
    );
    report
}

/// Load, watermark and save a single image, returning the written path
pub fn export_one(
    job: &BatchJob,
    renderer: &LayerRenderer,
    options: &ExportOptions,
) -> Result<PathBuf, BatchError> {
    let output = output_filename(&job.input, options);
    std::fs::create_dir_all(&options.output_dir).map_err(ExportError::from)?;
    if is_same_file(&job.input, &output) {
        return Err(ExportError::WouldOverwriteSource(output).into());
    }

    let original = load_source(&job.input)?;
    let composition = try_render_watermark(&original, &job.settings.normalized(), renderer)?;

    save_composed(&composition.image, &output, options.format, options.quality)?;
    Ok(output)
}

/// Whether `output` names the same file as `input` once both are resolved.
///
/// `output` may not exist yet, so only its directory is canonicalized.
fn is_same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    let Ok(input) = input.canonicalize() else {
        return false;
    };
    let (Some(dir), Some(name)) = (output.parent(), output.file_name()) else {
        return false;
    };
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    dir.canonicalize()
        .map(|dir| dir.join(name) == input)
        .unwrap_or(false)
}
