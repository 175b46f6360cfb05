use crate::watermark::{BoundingBox, RenderedLayer, compose};
use image::{DynamicImage, ImageBuffer, Rgb, Rgba, RgbaImage};

fn gradient_image(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 3 % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    DynamicImage::ImageRgba8(img)
}

fn half_transparent_layer(width: u32, height: u32) -> RenderedLayer {
    RenderedLayer::new(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 128])))
}

#[test]
fn test_compose_reports_bounding_box() {
    let original = gradient_image(100, 80);
    let layer = half_transparent_layer(20, 10);

    let composition = compose(&original, &layer, (30, 40));
    assert_eq!(
        composition.bounding_box,
        Some(BoundingBox::new(30, 40, 20, 10))
    );
    assert_eq!(composition.image.dimensions(), (100, 80));
}

#[test]
fn test_compose_leaves_pixels_outside_box_untouched() {
    let original = gradient_image(64, 48);
    let layer = half_transparent_layer(16, 12);

    let composition = compose(&original, &layer, (20, 10));
    let bbox = composition.bounding_box.unwrap();
    let reference = original.to_rgba8();

    for (x, y, pixel) in composition.image.enumerate_pixels() {
        let inside = bbox.contains(x as f64, y as f64);
        if inside {
            assert_ne!(pixel, reference.get_pixel(x, y));
        } else {
            assert_eq!(pixel, reference.get_pixel(x, y), "pixel ({}, {}) changed", x, y);
        }
    }
}

#[test]
fn test_compose_is_idempotent() {
    let original = gradient_image(50, 50);
    let layer = half_transparent_layer(25, 5);

    let first = compose(&original, &layer, (10, 20));
    let second = compose(&original, &layer, (10, 20));
    assert_eq!(first.image.as_raw(), second.image.as_raw());

    // The original itself is never modified
    assert_eq!(original, gradient_image(50, 50));
}

#[test]
fn test_compose_transparent_layer_is_noop() {
    let original = gradient_image(40, 30);
    let layer = RenderedLayer::new(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 0])));

    let composition = compose(&original, &layer, (5, 5));
    assert_eq!(composition.image, original.to_rgba8());
}

#[test]
fn test_compose_opaque_layer_replaces_pixels() {
    let original = gradient_image(40, 30);
    let layer = RenderedLayer::new(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));

    let composition = compose(&original, &layer, (36, 26));
    assert_eq!(composition.image.get_pixel(36, 26), &Rgba([1, 2, 3, 255]));
    assert_eq!(composition.image.get_pixel(39, 29), &Rgba([1, 2, 3, 255]));
}

#[test]
fn test_compose_crops_oversized_layer() {
    let original = gradient_image(30, 30);
    let layer = RenderedLayer::new(RgbaImage::from_pixel(50, 10, Rgba([0, 0, 0, 255])));

    let composition = compose(&original, &layer, (0, 5));
    // Unclipped box, clipped pixels
    assert_eq!(
        composition.bounding_box,
        Some(BoundingBox::new(0, 5, 50, 10))
    );
    assert_eq!(composition.image.dimensions(), (30, 30));
    assert_eq!(composition.image.get_pixel(29, 5), &Rgba([0, 0, 0, 255]));
    assert_eq!(composition.image.get_pixel(29, 15)[3], 255);
}

#[test]
fn test_compose_converts_rgb_original() {
    let original = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(20, 20, Rgb([100u8, 150, 200])));
    let layer = half_transparent_layer(5, 5);

    let composition = compose(&original, &layer, (0, 0));
    assert_eq!(composition.image.get_pixel(19, 19), &Rgba([100, 150, 200, 255]));
    assert_eq!(composition.image.get_pixel(0, 0)[3], 255);
}
