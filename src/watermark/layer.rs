use image::{DynamicImage, GrayImage, ImageReader, Rgba, RgbaImage, imageops, imageops::FilterType};
use imageproc::geometric_transformations::{Interpolation, rotate};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::RenderError;
use super::settings::{WatermarkSettings, WatermarkSource, normalize_degrees};
use super::text::{rasterize_coverage, resolve_font};

/// A watermark rendered on its own, before placement
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLayer {
    pixels: RgbaImage,
}

impl RenderedLayer {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

/// Open and decode an image, telling apart unreadable files from undecodable ones
pub fn load_source(path: &Path) -> Result<DynamicImage, RenderError> {
    let unreadable = |source| RenderError::UnreadableSource {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(unreadable)?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(unreadable)?;
    debug!("Decoding {:?} as {:?}", path, reader.format());

    reader.decode().map_err(|source| RenderError::UnsupportedFormat {
        path: path.to_path_buf(),
        source,
    })
}

/// Fill a coverage mask with `color`, using `opacity` as the alpha of fully
/// covered pixels. Anti-aliased edges get proportionally less.
pub fn apply_absolute_alpha(mask: &GrayImage, color: [u8; 3], opacity: u8) -> RgbaImage {
    let [r, g, b] = color;
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let coverage = mask.get_pixel(x, y)[0] as u32;
        let alpha = (coverage * opacity as u32 + 127) / 255;
        Rgba([r, g, b, alpha as u8])
    })
}

/// Multiply the existing alpha channel by `opacity / 255`, keeping any
/// transparency already present in the image
pub fn scale_alpha_channel(image: &mut RgbaImage, opacity: u8) {
    if opacity == u8::MAX {
        return;
    }
    for pixel in image.pixels_mut() {
        pixel[3] = ((pixel[3] as u32 * opacity as u32 + 127) / 255) as u8;
    }
}

/// Transparent room kept on every side of a rotated layer for bilinear edges
const ROTATION_MARGIN: u32 = 2;

/// Largest layer, in pixels, an image watermark may be scaled to
pub const MAX_LAYER_PIXELS: u64 = 1 << 26;

/// Rotate counter-clockwise about the center, growing the canvas so the
/// rotated silhouette is never clipped.
///
/// The canvas never shrinks below the input size on either axis and keeps
/// [`ROTATION_MARGIN`] pixels of room around the rotated silhouette. Exposed
/// area is filled with `fill`, which should be fully transparent.
pub fn rotate_expanded(image: &RgbaImage, degrees: f32, fill: Rgba<u8>) -> RgbaImage {
    let degrees = normalize_degrees(degrees);
    if degrees == 0.0 {
        return image.clone();
    }

    let (width, height) = image.dimensions();
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    let rotated_width = expanded_extent(width as f32 * cos + height as f32 * sin);
    let rotated_height = expanded_extent(width as f32 * sin + height as f32 * cos);
    let canvas_width = padded_extent(rotated_width.max(width), width);
    let canvas_height = padded_extent(rotated_height.max(height), height);

    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, fill);
    imageops::replace(
        &mut canvas,
        image,
        ((canvas_width - width) / 2) as i64,
        ((canvas_height - height) / 2) as i64,
    );

    // Pixel centers sit on integer coordinates, so the true center of an
    // n-pixel axis is (n - 1) / 2. imageproc rotates clockwise for positive angles.
    let center = (
        (canvas_width - 1) as f32 / 2.0,
        (canvas_height - 1) as f32 / 2.0,
    );
    rotate(&canvas, center, -radians, Interpolation::Bilinear, fill)
}

fn expanded_extent(extent: f32) -> u32 {
    // Trim float noise so exact quarter turns do not gain a pixel
    (extent - 1e-3).ceil().max(1.0) as u32
}

/// Add the margin on both sides, keeping the parity of `original` so the
/// pasted image sits exactly on the canvas center
fn padded_extent(extent: u32, original: u32) -> u32 {
    let padded = extent + 2 * ROTATION_MARGIN;
    if (padded - original) % 2 == 1 {
        padded + 1
    } else {
        padded
    }
}

/// Target size of an image watermark scaled by `scale`
fn scaled_dimensions(width: u32, height: u32, scale: f32) -> Result<(u32, u32), RenderError> {
    let too_large = || {
        RenderError::InvalidGeometry(format!(
            "scale {} turns a {}x{} watermark into more than {} pixels",
            scale, width, height, MAX_LAYER_PIXELS
        ))
    };

    let scaled_width = (width as f64 * scale as f64).floor().max(1.0);
    let scaled_height = (height as f64 * scale as f64).floor().max(1.0);
    if scaled_width * scaled_height > MAX_LAYER_PIXELS as f64 {
        return Err(too_large());
    }
    Ok((scaled_width as u32, scaled_height as u32))
}

/// Turns [`WatermarkSettings`] into a standalone [`RenderedLayer`]
#[derive(Debug, Clone, Default)]
pub struct LayerRenderer {
    font_dirs: Vec<PathBuf>,
}

impl LayerRenderer {
    pub fn new(font_dirs: Vec<PathBuf>) -> Self {
        Self { font_dirs }
    }

    pub fn font_dirs(&self) -> &[PathBuf] {
        &self.font_dirs
    }

    /// Render whatever the settings select; `Ok(None)` means no watermark
    pub fn render(&self, settings: &WatermarkSettings) -> Result<Option<RenderedLayer>, RenderError> {
        let layer = match settings.source() {
            None => return Ok(None),
            Some(WatermarkSource::Text(text)) => self.render_text(
                text,
                &settings.font_name,
                settings.font_size,
                settings.color,
                settings.opacity,
                settings.rotation_degrees,
            )?,
            Some(WatermarkSource::Image(path)) => self.render_image(
                path,
                settings.scale,
                settings.rotation_degrees,
                settings.opacity,
            )?,
        };
        Ok(Some(layer))
    }

    pub fn render_text(
        &self,
        text: &str,
        font_name: &str,
        font_size: i32,
        color: [u8; 3],
        opacity: u8,
        rotation_degrees: f32,
    ) -> Result<RenderedLayer, RenderError> {
        if font_size <= 0 {
            return Err(RenderError::InvalidGeometry(format!(
                "font size must be positive, got {}",
                font_size
            )));
        }

        let font = resolve_font(font_name, &self.font_dirs);
        let mask = rasterize_coverage(&font, text, font_size as f32);
        let filled = apply_absolute_alpha(&mask, color, opacity);

        let [r, g, b] = color;
        let rotated = rotate_expanded(&filled, rotation_degrees, Rgba([r, g, b, 0]));
        debug!(
            "Rendered text layer {}x{} (font size {}, rotation {})",
            rotated.width(),
            rotated.height(),
            font_size,
            rotation_degrees
        );
        Ok(RenderedLayer::new(rotated))
    }

    pub fn render_image(
        &self,
        path: &Path,
        scale: f32,
        rotation_degrees: f32,
        opacity: u8,
    ) -> Result<RenderedLayer, RenderError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RenderError::InvalidGeometry(format!(
                "scale must be positive, got {}",
                scale
            )));
        }

        let mut pixels = load_source(path)?.to_rgba8();

        if scale != 1.0 {
            let (width, height) = scaled_dimensions(pixels.width(), pixels.height(), scale)?;
            pixels = imageops::resize(&pixels, width, height, FilterType::Lanczos3);
        }

        let mut pixels = rotate_expanded(&pixels, rotation_degrees, Rgba([0, 0, 0, 0]));
        scale_alpha_channel(&mut pixels, opacity);

        debug!(
            "Rendered image layer {}x{} from {:?}",
            pixels.width(),
            pixels.height(),
            path
        );
        Ok(RenderedLayer::new(pixels))
    }
}
