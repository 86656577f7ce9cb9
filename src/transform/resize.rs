use image::imageops::{self, FilterType};

use crate::foundation::error::{CardError, CardResult};
use crate::transform::attention::choose_crop;
use crate::transform::codec::{decode_rgba8, encode_png, probe_dimensions};

/// Resize `buf` to exactly `width×height`, cropping to the most salient region when the
/// aspect ratios differ.
///
/// Only the header is read when the source already has both target dimensions, and the
/// input buffer is handed back untouched. Any other case decodes, crops, resamples with
/// Lanczos3 and re-encodes as PNG.
#[tracing::instrument(skip(buf), fields(len = buf.len()))]
pub fn fit_resize(buf: Vec<u8>, width: u32, height: u32) -> CardResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(CardError::transform(format!(
            "fit target {width}x{height} has a zero dimension"
        )));
    }

    let (src_w, src_h) = probe_dimensions(&buf)?;
    if src_w == width && src_h == height {
        return Ok(buf);
    }

    tracing::debug!(src_w, src_h, width, height, "fit resize");
    let img = decode_rgba8(&buf)?;
    let win = choose_crop(&img, width, height);
    let cropped = imageops::crop_imm(&img, win.x, win.y, win.width, win.height).to_image();
    let resized = imageops::resize(&cropped, width, height, FilterType::Lanczos3);
    encode_png(&resized)
}

/// Uniformly scale `buf` so its height becomes `height`; width follows the aspect ratio.
#[tracing::instrument(skip(buf), fields(len = buf.len()))]
pub fn scale_to_height(buf: Vec<u8>, height: u32) -> CardResult<Vec<u8>> {
    if height == 0 {
        return Err(CardError::transform("scale target height is zero"));
    }

    let (src_w, src_h) = probe_dimensions(&buf)?;
    if src_h == height {
        return Ok(buf);
    }

    let width = scaled_width(src_w, src_h, height)?;
    tracing::debug!(src_w, src_h, width, height, "scale to height");
    let img = decode_rgba8(&buf)?;
    let resized = imageops::resize(&img, width, height, FilterType::Lanczos3);
    encode_png(&resized)
}

/// `round(src_w * height / src_h)`, at least one pixel.
pub fn scaled_width(src_w: u32, src_h: u32, height: u32) -> CardResult<u32> {
    if src_h == 0 {
        return Err(CardError::transform("source image has zero height"));
    }
    let w = (f64::from(src_w) * f64::from(height) / f64::from(src_h)).round();
    if w > f64::from(u32::MAX) {
        return Err(CardError::transform(format!(
            "scaled width {w} does not fit in u32"
        )));
    }
    Ok((w as u32).max(1))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/resize.rs"]
mod tests;
