//! Attention-driven crop window selection.
//!
//! The source is reduced to a small saliency map (edges, saturation, skin tones), and the
//! crop window with the target aspect ratio that covers the most saliency wins.

use image::imageops::{self, FilterType};

/// Longest side of the saliency map.
const SALIENCY_MAX_SIDE: u32 = 256;
const SATURATION_WEIGHT: f64 = 0.5;
const SKIN_BONUS: f64 = 60.0;
const SCORE_EPSILON: f64 = 1e-9;

/// Region of the source image to keep, in source pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropWindow {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Largest window with the `target_w:target_h` aspect ratio that fits in `src_w×src_h`.
pub fn crop_size(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let (sw, sh) = (u64::from(src_w), u64::from(src_h));
    let (tw, th) = (u64::from(target_w.max(1)), u64::from(target_h.max(1)));

    if sw * th > sh * tw {
        let w = ((sh * tw) as f64 / th as f64).round() as u32;
        (w.clamp(1, src_w), src_h)
    } else {
        let h = ((sw * th) as f64 / tw as f64).round() as u32;
        (src_w, h.clamp(1, src_h))
    }
}

/// Pick the crop window for resizing `img` to `target_w×target_h`.
pub fn choose_crop(img: &image::RgbaImage, target_w: u32, target_h: u32) -> CropWindow {
    let (src_w, src_h) = img.dimensions();
    let (crop_w, crop_h) = crop_size(src_w, src_h, target_w, target_h);
    if crop_w == src_w && crop_h == src_h {
        return CropWindow {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        };
    }

    let scale = (f64::from(SALIENCY_MAX_SIDE) / f64::from(src_w.max(src_h))).min(1.0);
    let small_w = ((f64::from(src_w) * scale).round() as u32).max(1);
    let small_h = ((f64::from(src_h) * scale).round() as u32).max(1);
    let small = if small_w == src_w && small_h == src_h {
        img.clone()
    } else {
        imageops::resize(img, small_w, small_h, FilterType::Triangle)
    };

    let table = SummedArea::new(&saliency_map(&small), small_w as usize, small_h as usize);

    let win_w = scaled_len(crop_w, small_w, src_w);
    let win_h = scaled_len(crop_h, small_h, src_h);
    let (best_x, best_y) = best_window(&table, win_w, win_h);

    let x = map_back(best_x, src_w, small_w).min(src_w - crop_w);
    let y = map_back(best_y, src_h, small_h).min(src_h - crop_h);

    CropWindow {
        x,
        y,
        width: crop_w,
        height: crop_h,
    }
}

fn scaled_len(len: u32, small: u32, full: u32) -> usize {
    let v = (f64::from(len) * f64::from(small) / f64::from(full)).round() as u32;
    v.clamp(1, small) as usize
}

fn map_back(pos: usize, full: u32, small: u32) -> u32 {
    (pos as f64 * f64::from(full) / f64::from(small)).round() as u32
}

/// Per-pixel interest score, row-major.
fn saliency_map(img: &image::RgbaImage) -> Vec<f64> {
    let (w, h) = img.dimensions();
    let (w, h) = (w as usize, h as usize);

    let luma: Vec<f64> = img
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
        })
        .collect();

    let mut out = Vec::with_capacity(w * h);
    for (i, p) in img.pixels().enumerate() {
        let (x, y) = (i % w, i / w);
        let l = |xx: usize, yy: usize| luma[yy * w + xx];

        let dx = l((x + 1).min(w - 1), y) - l(x.saturating_sub(1), y);
        let dy = l(x, (y + 1).min(h - 1)) - l(x, y.saturating_sub(1));
        let edge = dx.abs() + dy.abs();

        let [r, g, b, a] = p.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let saturation = f64::from(max - min);

        let skin = if is_skin_tone(r, g, b) { SKIN_BONUS } else { 0.0 };
        let coverage = f64::from(a) / 255.0;

        out.push((edge + SATURATION_WEIGHT * saturation + skin) * coverage);
    }
    out
}

fn is_skin_tone(r: u8, g: u8, b: u8) -> bool {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    r > 95 && g > 40 && b > 20 && r > g && r > b && r - g > 15 && max - min > 15
}

struct SummedArea {
    stride: usize,
    sums: Vec<f64>,
    width: usize,
    height: usize,
}

impl SummedArea {
    fn new(values: &[f64], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![0.0; stride * (height + 1)];
        for y in 0..height {
            let mut row = 0.0;
            for x in 0..width {
                row += values[y * width + x];
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row;
            }
        }
        Self {
            stride,
            sums,
            width,
            height,
        }
    }

    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> f64 {
        let at = |xx: usize, yy: usize| self.sums[yy * self.stride + xx];
        at(x + w, y + h) - at(x, y + h) - at(x + w, y) + at(x, y)
    }
}

/// Top-left of the highest-scoring window; ties go to the most central one.
fn best_window(table: &SummedArea, win_w: usize, win_h: usize) -> (usize, usize) {
    let max_x = table.width - win_w;
    let max_y = table.height - win_h;
    let center_x = max_x as f64 / 2.0;
    let center_y = max_y as f64 / 2.0;

    let mut best: Option<((usize, usize), f64, f64)> = None;
    for y in 0..=max_y {
        for x in 0..=max_x {
            let score = table.window(x, y, win_w, win_h);
            let dist = (x as f64 - center_x).powi(2) + (y as f64 - center_y).powi(2);
            let better = match best {
                None => true,
                Some((_, best_score, best_dist)) => {
                    let tolerance = SCORE_EPSILON * best_score.abs().max(1.0);
                    score > best_score + tolerance
                        || ((score - best_score).abs() <= tolerance && dist < best_dist)
                }
            };
            if better {
                best = Some(((x, y), score, dist));
            }
        }
    }
    best.map_or((0, 0), |(pos, _, _)| pos)
}

#[cfg(test)]
#[path = "../../tests/unit/transform/attention.rs"]
mod tests;
