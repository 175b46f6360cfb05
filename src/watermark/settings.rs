use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_FONT_NAME: &str = "DejaVuSans.ttf";
pub const DEFAULT_FONT_SIZE: i32 = 36;

/// Which kind of watermark is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkMode {
    #[default]
    Text,
    Image,
}

/// Position of the watermark as a fraction of its travel range on the canvas.
///
/// `(0.0, 0.0)` pins the layer to the top-left corner and `(1.0, 1.0)` to the
/// bottom-right corner, whatever the layer size.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct RelativePosition {
    pub x: f64,
    pub y: f64,
}

impl RelativePosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes into `[0, 1]`, mapping non-finite values to 0
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
        }
    }
}

impl Default for RelativePosition {
    fn default() -> Self {
        Self { x: 0.05, y: 0.05 }
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Normalize an angle in degrees into `[0, 360)`
pub fn normalize_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// The watermark source selected by the current settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatermarkSource<'a> {
    Text(&'a str),
    Image(&'a Path),
}

/// Everything needed to draw one watermark onto one image
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatermarkSettings {
    pub mode: WatermarkMode,
    pub text: String,
    /// Font file name or path, resolved against the configured font directories
    pub font_name: String,
    pub font_size: i32,
    pub color: [u8; 3],
    /// Absolute fill alpha for text, alpha multiplier for image watermarks
    pub opacity: u8,
    pub rotation_degrees: f32,
    /// Resize factor for image watermarks; text ignores it
    pub scale: f32,
    pub position: RelativePosition,
    pub image_path: Option<PathBuf>,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            mode: WatermarkMode::Text,
            text: String::new(),
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            color: [0, 0, 0],
            opacity: 255,
            rotation_degrees: 0.0,
            scale: 1.0,
            position: RelativePosition::default(),
            image_path: None,
        }
    }
}

impl WatermarkSettings {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            mode: WatermarkMode::Text,
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: WatermarkMode::Image,
            image_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// The active source, or `None` when nothing should be drawn.
    ///
    /// Text mode with empty text and image mode without a path both mean
    /// "no watermark"; the output then equals the original.
    pub fn source(&self) -> Option<WatermarkSource<'_>> {
        match self.mode {
            WatermarkMode::Text if !self.text.is_empty() => Some(WatermarkSource::Text(&self.text)),
            WatermarkMode::Image => self
                .image_path
                .as_deref()
                .filter(|path| !path.as_os_str().is_empty())
                .map(WatermarkSource::Image),
            _ => None,
        }
    }

    /// Copy with the position clamped, the rotation folded into `[0, 360)`
    /// and a non-positive font size replaced by the default
    pub fn normalized(&self) -> Self {
        let mut settings = self.clone();
        settings.position = settings.position.clamped();
        settings.rotation_degrees = normalize_degrees(settings.rotation_degrees);
        if settings.font_size <= 0 {
            settings.font_size = DEFAULT_FONT_SIZE;
        }
        settings
    }
}
