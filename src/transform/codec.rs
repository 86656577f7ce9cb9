use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::error::{CardError, CardResult};

/// Width and height from the image header, without decoding pixels.
pub fn probe_dimensions(buf: &[u8]) -> CardResult<(u32, u32)> {
    image::ImageReader::new(Cursor::new(buf))
        .with_guessed_format()
        .context("sniff image format")
        .and_then(|r| r.into_dimensions().context("read image header"))
        .map_err(|e| CardError::decode(format!("{e:#}")))
}

/// Decode any supported format into straight-alpha RGBA8.
pub fn decode_rgba8(buf: &[u8]) -> CardResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(buf)
        .context("decode image from memory")
        .map_err(|e| CardError::decode(format!("{e:#}")))?;
    Ok(dyn_img.into_rgba8())
}

/// Encode as PNG; lossless, so a later decode sees exactly these pixels.
pub fn encode_png(img: &image::RgbaImage) -> CardResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")
        .map_err(|e| CardError::transform(format!("{e:#}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/codec.rs"]
mod tests;
