use std::path::PathBuf;
use thiserror::Error;

/// Failure while building a watermark layer.
///
/// Font lookup failures never show up here; they fall back to the embedded font.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot open image {path:?}: {source}")]
    UnreadableSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot decode image {path:?}: {source}")]
    UnsupportedFormat {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}
