use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::compose::layout::{DEFAULT_BACKGROUND, ELLIPSIS, MAX_TITLE_CHARS};
use crate::fetch::locator::ResourceLocator;
use crate::foundation::color::parse_hex_color;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{CardError, CardResult};

/// Resource key of the background image.
pub const BACKGROUND_KEY: &str = "background";
/// Resource key of the avatar image.
pub const AVATAR_KEY: &str = "avatar";
/// Resource key of the logo image.
pub const LOGO_KEY: &str = "logo";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Everything needed to render one card.
///
/// Every field has a default, so a JSON document only needs the fields it changes.
pub struct RenderSpec {
    /// Canvas width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Canvas height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Overlay darkness in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Avatar draw size in pixels.
    #[serde(default = "default_avatar_diameter")]
    pub avatar_diameter: u32,
    /// Main text, wrapped below the avatar row.
    #[serde(default)]
    pub title: String,
    /// Text next to the avatar; empty to omit.
    #[serde(default)]
    pub author: String,
    /// Title point size.
    #[serde(default = "default_title_size")]
    pub title_size: f32,
    /// Author point size.
    #[serde(default = "default_author_size")]
    pub author_size: f32,
    /// Point size of both footer labels.
    #[serde(default = "default_label_size")]
    pub label_size: f32,
    /// Footer text drawn left of the logo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Footer text in the bottom-right corner; the logo moves left of it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_label: Option<String>,
    /// `#rgb`/`#rrggbb` color, image URL or asset name, or empty for the default fill.
    #[serde(default)]
    pub background: String,
    /// Avatar URL or asset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Logo URL or asset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Logo height in pixels; the width follows its aspect ratio.
    #[serde(default = "default_logo_height")]
    pub logo_height: u32,
    /// Output quality hint for lossy encoders, 1..=100.
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_width() -> u32 {
    1200
}

fn default_height() -> u32 {
    630
}

fn default_opacity() -> f64 {
    0.6
}

fn default_avatar_diameter() -> u32 {
    64
}

fn default_title_size() -> f32 {
    76.0
}

fn default_author_size() -> f32 {
    36.0
}

fn default_label_size() -> f32 {
    40.0
}

fn default_logo_height() -> u32 {
    48
}

fn default_quality() -> u8 {
    84
}

impl Default for RenderSpec {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            opacity: default_opacity(),
            avatar_diameter: default_avatar_diameter(),
            title: String::new(),
            author: String::new(),
            title_size: default_title_size(),
            author_size: default_author_size(),
            label_size: default_label_size(),
            label: None,
            trailing_label: None,
            background: String::new(),
            avatar: None,
            logo: None,
            logo_height: default_logo_height(),
            quality: default_quality(),
        }
    }
}

/// How the first pass fills the canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum Background {
    /// Flat color, no fetch.
    Color(Rgba8),
    /// Image fetched and cropped to the canvas.
    Image(ResourceLocator),
}

impl RenderSpec {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> CardResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CardError::config(format!("invalid render spec json: {e}")))
    }

    /// Check field ranges and locator syntax.
    ///
    /// Bad locators keep their [`CardError::Locator`] kind; everything else is a
    /// [`CardError::Config`].
    pub fn validate(&self) -> CardResult<()> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > u32::from(u16::MAX) {
                return Err(CardError::config(format!(
                    "{name} must be in 1..={}, got {value}",
                    u16::MAX
                )));
            }
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(CardError::config(format!(
                "opacity must be within [0, 1], got {}",
                self.opacity
            )));
        }
        for (name, size) in [
            ("title_size", self.title_size),
            ("author_size", self.author_size),
            ("label_size", self.label_size),
        ] {
            if !size.is_finite() || size <= 0.0 {
                return Err(CardError::config(format!(
                    "{name} must be finite and > 0, got {size}"
                )));
            }
        }
        let short_side = self.width.min(self.height);
        if self.avatar_diameter == 0 || self.avatar_diameter > short_side {
            return Err(CardError::config(format!(
                "avatar_diameter must be in 1..={short_side}, got {}",
                self.avatar_diameter
            )));
        }
        if self.logo_height == 0 || self.logo_height > self.height {
            return Err(CardError::config(format!(
                "logo_height must be in 1..={}, got {}",
                self.height, self.logo_height
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(CardError::config(format!(
                "quality must be in 1..=100, got {}",
                self.quality
            )));
        }

        self.background()?;
        self.locators()?;
        Ok(())
    }

    /// Classify the background field.
    pub fn background(&self) -> CardResult<Background> {
        let raw = self.background.trim();
        if raw.is_empty() {
            return Ok(Background::Color(DEFAULT_BACKGROUND));
        }
        if raw.starts_with('#') {
            return parse_hex_color(raw)
                .map(Background::Color)
                .map_err(|e| e.context("background"));
        }
        ResourceLocator::parse(raw)
            .map(Background::Image)
            .map_err(|e| e.context(BACKGROUND_KEY))
    }

    /// Avatar locator text, `None` when absent or blank.
    pub fn avatar_source(&self) -> Option<&str> {
        non_blank(self.avatar.as_deref())
    }

    /// Logo locator text, `None` when absent or blank.
    pub fn logo_source(&self) -> Option<&str> {
        non_blank(self.logo.as_deref())
    }

    /// Footer label, `None` when absent or blank.
    pub fn label_text(&self) -> Option<&str> {
        non_blank(self.label.as_deref())
    }

    /// Trailing footer label, `None` when absent or blank.
    pub fn trailing_label_text(&self) -> Option<&str> {
        non_blank(self.trailing_label.as_deref())
    }

    /// Every resource to fetch, keyed by [`BACKGROUND_KEY`], [`AVATAR_KEY`] and [`LOGO_KEY`].
    pub fn locators(&self) -> CardResult<BTreeMap<String, ResourceLocator>> {
        let mut out = BTreeMap::new();
        if let Background::Image(loc) = self.background()? {
            out.insert(BACKGROUND_KEY.to_string(), loc);
        }
        for (key, raw) in [(AVATAR_KEY, self.avatar_source()), (LOGO_KEY, self.logo_source())] {
            if let Some(raw) = raw {
                let loc = ResourceLocator::parse(raw).map_err(|e| e.context(key))?;
                out.insert(key.to_string(), loc);
            }
        }
        Ok(out)
    }

    /// Title as drawn: at most [`MAX_TITLE_CHARS`] codepoints plus an ellipsis.
    pub fn display_title(&self) -> Cow<'_, str> {
        truncate_title(&self.title)
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Cut `title` to [`MAX_TITLE_CHARS`] codepoints, appending `…` when anything was cut.
pub fn truncate_title(title: &str) -> Cow<'_, str> {
    match title.char_indices().nth(MAX_TITLE_CHARS) {
        None => Cow::Borrowed(title),
        Some((idx, _)) => {
            let mut out = String::with_capacity(idx + ELLIPSIS.len_utf8());
            out.push_str(&title[..idx]);
            out.push(ELLIPSIS);
            Cow::Owned(out)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/spec.rs"]
mod tests;
