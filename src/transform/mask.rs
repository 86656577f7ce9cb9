/// Hard-edged circular crop.
///
/// The radius is `floor(min(w, h) / 2)` around `(w / 2, h / 2)` (integer division).
/// A pixel at integer coordinates `(x, y)` farther than the radius from the center
/// becomes fully transparent; the rest keep their color and alpha.
pub fn circular_mask(img: &image::RgbaImage) -> image::RgbaImage {
    let (w, h) = img.dimensions();
    let r = i64::from(w.min(h) / 2);
    let cx = i64::from(w / 2);
    let cy = i64::from(h / 2);

    let mut out = img.clone();
    for (x, y, px) in out.enumerate_pixels_mut() {
        let dx = i64::from(x) - cx;
        let dy = i64::from(y) - cy;
        if dx * dx + dy * dy > r * r {
            px.0 = [0, 0, 0, 0];
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/transform/mask.rs"]
mod tests;
