use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, Rgba, RgbaImage, codecs::jpeg::JpegEncoder};
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

use super::ExportError;
use crate::watermark::source_over;

/// Composite onto an opaque white background and drop the alpha channel
pub fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let flat = source_over(Rgba([255, 255, 255, 255]), *image.get_pixel(x, y));
        Rgb([flat[0], flat[1], flat[2]])
    })
}

/// Save as JPEG; JPEG has no alpha so the image is flattened onto white
pub fn save(image: &RgbaImage, path: &Path, quality: u8) -> Result<(), ExportError> {
    let rgb_image = flatten_onto_white(image);
    let output = BufWriter::new(std::fs::File::create(path)?);

    let encoder = JpegEncoder::new_with_quality(output, quality);
    encoder.write_image(
        &rgb_image,
        rgb_image.width(),
        rgb_image.height(),
        ExtendedColorType::Rgb8,
    )?;
    debug!("JPEG written to {:?} at quality {}", path, quality);
    Ok(())
}
