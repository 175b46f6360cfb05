use ab_glyph::{Font, FontArc, OutlinedGlyph, PxScale, Rect, ScaleFont, point};
use image::GrayImage;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Transparent margin kept around the tight text box on every side
pub const TEXT_PADDING: u32 = 10;

static FALLBACK_FONT_DATA: &[u8] = include_bytes!("../../static/DejaVuSans.ttf");

static FALLBACK_FONT: LazyLock<FontArc> = LazyLock::new(|| {
    FontArc::try_from_slice(FALLBACK_FONT_DATA).expect("embedded DejaVuSans.ttf must parse")
});

/// The font used whenever the requested one cannot be loaded
pub fn fallback_font() -> FontArc {
    FALLBACK_FONT.clone()
}

/// Load `font_name` as a path, then relative to each search directory.
///
/// Falls back to the embedded DejaVu Sans instead of failing.
pub fn resolve_font(font_name: &str, search_dirs: &[PathBuf]) -> FontArc {
    if font_name.is_empty() {
        return fallback_font();
    }

    let candidates = std::iter::once(PathBuf::from(font_name))
        .chain(search_dirs.iter().map(|dir| dir.join(font_name)));

    for candidate in candidates {
        if let Some(font) = load_font_file(&candidate) {
            return font;
        }
    }

    debug!(
        "Font {:?} not found in {:?}, using embedded fallback",
        font_name, search_dirs
    );
    fallback_font()
}

fn load_font_file(path: &Path) -> Option<FontArc> {
    if !path.is_file() {
        return None;
    }
    let data = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            debug!("Failed to parse font {:?}: {}", path, e);
            None
        }
    }
}

/// Rasterize `text` into a coverage mask padded by [`TEXT_PADDING`].
///
/// The tight ink box of all lines lands exactly at `(TEXT_PADDING, TEXT_PADDING)`.
/// Text without any ink yields a mask that is only padding.
pub fn rasterize_coverage(font: &FontArc, text: &str, font_size: f32) -> GrayImage {
    let scale = PxScale::from(font_size);
    let scaled = font.as_scaled(scale);
    let line_advance = scaled.height() + scaled.line_gap();

    let mut outlines: Vec<OutlinedGlyph> = Vec::new();
    let mut ink: Option<Rect> = None;

    for (line_index, line) in text.split('\n').enumerate() {
        let baseline = scaled.ascent() + line_index as f32 * line_advance;
        let mut cursor_x = 0.0f32;
        let mut previous = None;

        for ch in line.trim_end_matches('\r').chars() {
            let glyph_id = font.glyph_id(ch);
            if let Some(prev) = previous {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline));
            cursor_x += scaled.h_advance(glyph_id);
            previous = Some(glyph_id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                ink = Some(match ink {
                    Some(acc) => Rect {
                        min: point(acc.min.x.min(bounds.min.x), acc.min.y.min(bounds.min.y)),
                        max: point(acc.max.x.max(bounds.max.x), acc.max.y.max(bounds.max.y)),
                    },
                    None => bounds,
                });
                outlines.push(outlined);
            }
        }
    }

    let Some(ink) = ink else {
        return GrayImage::new(2 * TEXT_PADDING, 2 * TEXT_PADDING);
    };

    let width = (ink.max.x - ink.min.x).round() as u32 + 2 * TEXT_PADDING;
    let height = (ink.max.y - ink.min.y).round() as u32 + 2 * TEXT_PADDING;
    let mut mask = GrayImage::new(width, height);

    for outlined in &outlines {
        let bounds = outlined.px_bounds();
        let left = (bounds.min.x - ink.min.x).round() as u32 + TEXT_PADDING;
        let top = (bounds.min.y - ink.min.y).round() as u32 + TEXT_PADDING;
        outlined.draw(|x, y, coverage| {
            let (px, py) = (left + x, top + y);
            if px < width && py < height {
                let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                let pixel = mask.get_pixel_mut(px, py);
                // Overlapping glyphs keep the stronger coverage
                pixel[0] = pixel[0].max(value);
            }
        });
    }

    mask
}
