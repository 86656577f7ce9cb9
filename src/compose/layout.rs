//! Fixed card geometry shared by every drawing pass.

use crate::foundation::core::{Point, Rect, Rgba8};

/// Inset of the darkening overlay from the canvas edge.
pub const MARGIN: f64 = 20.0;
/// Inset of all content from the canvas edge.
pub const PADDING: f64 = 48.0;
/// Width of the white ring around the avatar, summed over both sides.
pub const BORDER: u32 = 8;
/// Horizontal gap between footer items.
pub const GAP: f64 = MARGIN / 2.0;
/// Longest title, in codepoints, drawn before truncation.
pub const MAX_TITLE_CHARS: usize = 90;
/// Title line height as a multiple of the font's line metrics.
pub const TITLE_LINE_HEIGHT: f32 = 1.6;
/// Appended to a truncated title.
pub const ELLIPSIS: char = '\u{2026}';

/// Fill used when the render spec leaves the background empty.
pub const DEFAULT_BACKGROUND: Rgba8 = Rgba8::opaque(0x1c, 0x1c, 0x24);
/// Author text color.
pub const AUTHOR_COLOR: Rgba8 = Rgba8::new(255, 255, 255, 204);

/// Overlay rectangle, inset by [`MARGIN`] on every side.
pub fn overlay_rect(width: u32, height: u32) -> Rect {
    Rect::new(
        MARGIN,
        MARGIN,
        f64::from(width) - MARGIN,
        f64::from(height) - MARGIN,
    )
}

/// Center of the avatar ring on both axes.
pub fn avatar_center(avatar_diameter: u32) -> f64 {
    PADDING + f64::from(avatar_diameter.saturating_add(BORDER)) / 2.0
}

/// Ring radius, truncated to whole pixels.
pub fn avatar_ring_radius(avatar_diameter: u32) -> f64 {
    f64::from(avatar_diameter.saturating_add(BORDER) / 2)
}

/// Top-left corner for an avatar image of `img_w×img_h` centered on the truncated ring
/// center.
pub fn avatar_origin(avatar_diameter: u32, img_w: u32, img_h: u32) -> Point {
    let c = avatar_center(avatar_diameter).floor();
    Point::new(
        c - f64::from(img_w / 2),
        c - f64::from(img_h / 2),
    )
}

/// Top-left corner of the author layout, vertically centered on the avatar row.
pub fn author_origin(avatar_diameter: u32, text_height: f64) -> Point {
    let ava = f64::from(avatar_diameter);
    Point::new(
        PADDING + ava + PADDING / 2.0,
        PADDING + ava / 2.0 - text_height / 2.0,
    )
}

/// Top-left corner of the title block.
pub fn title_origin(avatar_diameter: u32) -> Point {
    Point::new(PADDING, 2.0 * PADDING + f64::from(avatar_diameter))
}

/// Wrap width for the title.
pub fn title_wrap_width(width: u32) -> f64 {
    f64::from(width) - PADDING - 2.0 * MARGIN
}

/// Shared baseline of the footer row (label, trailing label, logo bottom edge).
pub fn footer_baseline(height: u32) -> f64 {
    f64::from(height) - PADDING
}

/// Horizontal placement of the footer row, right to left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FooterLayout {
    /// Left edge of the trailing label.
    pub trailing_x: Option<f64>,
    /// Left edge of the logo.
    pub logo_x: Option<f64>,
    /// Left edge of the label.
    pub label_x: Option<f64>,
}

/// Lay the footer out from the right inset: trailing label, then logo, then label, each
/// separated by [`GAP`]. Widths of absent items are `None`.
pub fn footer_layout(
    width: u32,
    trailing_w: Option<f64>,
    logo_w: Option<f64>,
    label_w: Option<f64>,
) -> FooterLayout {
    let mut right = f64::from(width) - PADDING;
    let mut out = FooterLayout::default();

    if let Some(w) = trailing_w {
        out.trailing_x = Some(right - w);
        right -= w + GAP;
    }
    if let Some(w) = logo_w {
        out.logo_x = Some(right - w);
        right -= w + GAP;
    }
    if let Some(w) = label_w {
        out.label_x = Some(right - w);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
