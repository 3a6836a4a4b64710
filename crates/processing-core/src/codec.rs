//! Lossless raster encoding.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat, ImageReader, RgbaImage};

use snapstrip_common::error::{SnapstripError, SnapstripResult};

/// Encode an RGBA surface as PNG. Output is a pure function of the pixels.
pub fn encode_png(surface: &RgbaImage) -> SnapstripResult<Vec<u8>> {
    let (width, height) = surface.dimensions();
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(surface.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| SnapstripError::processing(format!("PNG encoding failed: {e}")))?;
    Ok(out)
}

/// Decode any supported raster format into RGBA.
pub fn decode_rgba(bytes: &[u8]) -> SnapstripResult<RgbaImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| SnapstripError::decode(format!("undecodable image: {e}")))?;
    Ok(image.to_rgba8())
}

/// Read only the header of an encoded PNG to get its dimensions.
pub fn png_dimensions(bytes: &[u8]) -> SnapstripResult<(u32, u32)> {
    ImageReader::with_format(Cursor::new(bytes), ImageFormat::Png)
        .into_dimensions()
        .map_err(|e| SnapstripError::decode(format!("invalid PNG header: {e}")))
}
