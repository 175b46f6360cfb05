use image::{RgbaImage, codecs::png::PngEncoder};
use std::io::BufWriter;
use std::path::Path;

use super::ExportError;

pub fn save(image: &RgbaImage, path: &Path) -> Result<(), ExportError> {
    let output = BufWriter::new(std::fs::File::create(path)?);
    let encoder = PngEncoder::new(output);
    image.write_with_encoder(encoder)?;
    Ok(())
}
