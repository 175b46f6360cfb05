use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod editor;
pub mod export;
pub mod startup_checks;
pub mod watermark;

use export::ExportOptions;
use watermark::{LayerRenderer, WatermarkSettings};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkSettings,
    #[serde(default)]
    pub export: ExportOptions,
    #[serde(default)]
    pub fonts: FontConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FontConfig {
    /// Directories searched for `watermark.font_name`
    pub directories: Vec<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            directories: vec![PathBuf::from("static")],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml_edit::de::Error),
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml_edit::de::from_str::<Config>(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn layer_renderer(&self) -> LayerRenderer {
        LayerRenderer::new(self.fonts.directories.clone())
    }
}
