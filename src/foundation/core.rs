pub use kurbo::{Point, Rect};

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    /// Build a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Alpha byte for a `[0, 1]` opacity, rounded to nearest.
    pub fn alpha_from_opacity(opacity: f64) -> u8 {
        (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Channels as `[r, g, b, a]`.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
