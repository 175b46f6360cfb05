// Watermark rendering - layer construction, placement and compositing
mod composite;
mod error;
mod layer;
mod placement;
mod settings;
mod text;

pub use composite::{BoundingBox, Composition, compose, source_over};
pub use error::RenderError;
pub use layer::{
    LayerRenderer, MAX_LAYER_PIXELS, RenderedLayer, apply_absolute_alpha, load_source,
    rotate_expanded, scale_alpha_channel,
};
pub use placement::{GRID_STOPS, GridAnchor, relative_from_origin, resolve_origin, travel};
pub use settings::{
    DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE, RelativePosition, WatermarkMode, WatermarkSettings,
    WatermarkSource, normalize_degrees,
};
pub use text::{TEXT_PADDING, fallback_font, resolve_font};

use image::DynamicImage;
use tracing::error;

/// Result of a render that never fails outright.
///
/// On failure the composition is the untouched original and `failure` says why.
#[derive(Debug)]
pub struct RenderOutcome {
    pub composition: Composition,
    pub failure: Option<RenderError>,
}

/// Render the layer, place it and composite it over `original`
pub fn try_render_watermark(
    original: &DynamicImage,
    settings: &WatermarkSettings,
    renderer: &LayerRenderer,
) -> Result<Composition, RenderError> {
    let Some(layer) = renderer.render(settings)? else {
        return Ok(Composition::unwatermarked(original));
    };

    let canvas = (original.width(), original.height());
    let origin = resolve_origin(canvas, layer.dimensions(), settings.position);
    Ok(compose(original, &layer, origin))
}

/// Like [`try_render_watermark`], but a failed render yields the original image
pub fn render_watermark(
    original: &DynamicImage,
    settings: &WatermarkSettings,
    renderer: &LayerRenderer,
) -> RenderOutcome {
    match try_render_watermark(original, settings, renderer) {
        Ok(composition) => RenderOutcome {
            composition,
            failure: None,
        },
        Err(e) => {
            error!("Failed to render watermark: {}", e);
            RenderOutcome {
                composition: Composition::unwatermarked(original),
                failure: Some(e),
            }
        }
    }
}
