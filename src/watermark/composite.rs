use image::{DynamicImage, Rgba, RgbaImage};

use super::layer::RenderedLayer;

/// Placed watermark rectangle in original-image pixel coordinates.
///
/// Not clipped to the canvas: a layer larger than the canvas reports its full size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment test for a canvas-space point
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x as f64
            && y >= self.y as f64
            && x < self.x as f64 + self.width as f64
            && y < self.y as f64 + self.height as f64
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// The composed output of one render
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub image: RgbaImage,
    pub bounding_box: Option<BoundingBox>,
}

impl Composition {
    /// The original as-is, with no watermark
    pub fn unwatermarked(original: &DynamicImage) -> Self {
        Self {
            image: original.to_rgba8(),
            bounding_box: None,
        }
    }
}

/// Place `layer` at `origin` over a fresh RGBA copy of `original`.
///
/// The original is never modified, so repeated calls with the same inputs
/// produce identical output. Parts of the layer outside the canvas are dropped.
pub fn compose(original: &DynamicImage, layer: &RenderedLayer, origin: (u32, u32)) -> Composition {
    let mut image = original.to_rgba8();
    let (canvas_width, canvas_height) = image.dimensions();
    let (origin_x, origin_y) = origin;

    let visible_width = layer.width().min(canvas_width.saturating_sub(origin_x));
    let visible_height = layer.height().min(canvas_height.saturating_sub(origin_y));

    for ly in 0..visible_height {
        for lx in 0..visible_width {
            let source = *layer.pixels().get_pixel(lx, ly);
            let target = image.get_pixel_mut(origin_x + lx, origin_y + ly);
            *target = source_over(*target, source);
        }
    }

    Composition {
        image,
        bounding_box: Some(BoundingBox::new(
            origin_x,
            origin_y,
            layer.width(),
            layer.height(),
        )),
    }
}

/// Straight-alpha "source over" of one pixel onto another
pub fn source_over(destination: Rgba<u8>, source: Rgba<u8>) -> Rgba<u8> {
    let source_alpha = source[3];
    if source_alpha == 0 {
        return destination;
    }
    if source_alpha == u8::MAX {
        return source;
    }

    let sa = source_alpha as f32 / 255.0;
    let da = destination[3] as f32 / 255.0;
    let out_alpha = sa + da * (1.0 - sa);

    let channel = |s: u8, d: u8| {
        let value = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(source[0], destination[0]),
        channel(source[1], destination[1]),
        channel(source[2], destination[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
