use std::borrow::Cow;
use std::sync::Mutex;

use parley::fontique::{Blob, Collection, CollectionOptions, SourceCache};
use parley::{
    Alignment, AlignmentOptions, FontFamily, FontFamilyName, FontWeight, LineHeight,
    PositionedLayoutItem, StyleProperty,
};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{CardError, CardResult};

/// Weight requested when shaping a string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextWeight {
    /// Book weight (400).
    #[default]
    Regular,
    /// Bold weight (700).
    Bold,
}

impl TextWeight {
    fn to_parley(self) -> FontWeight {
        match self {
            Self::Regular => FontWeight::NORMAL,
            Self::Bold => FontWeight::BOLD,
        }
    }
}

/// Styling applied to a whole string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Requested weight; the closest registered face is used.
    pub weight: TextWeight,
    /// Fill color of every glyph.
    pub color: Rgba8,
    /// Wrap width in pixels. `None` lays the string out on a single line.
    pub max_width: Option<f32>,
    /// Line height as a multiple of the font's own line metrics.
    pub line_height: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            weight: TextWeight::Regular,
            color: Rgba8::WHITE,
            max_width: None,
            line_height: 1.0,
        }
    }
}

impl TextStyle {
    /// Single-line style with the given weight and color.
    pub fn new(weight: TextWeight, color: Rgba8) -> Self {
        Self {
            weight,
            color,
            ..Self::default()
        }
    }

    /// Wrap lines at `width` pixels.
    pub fn with_max_width(mut self, width: f32) -> Self {
        self.max_width = Some(width);
        self
    }

    /// Set the line-height multiplier.
    pub fn with_line_height(mut self, multiplier: f32) -> Self {
        self.line_height = multiplier;
        self
    }
}

/// Glyph id plus its pen position relative to the layout's top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedGlyph {
    /// Glyph index in the run's font.
    pub id: u32,
    /// Horizontal pen position.
    pub x: f32,
    /// Baseline position.
    pub y: f32,
}

/// Consecutive glyphs drawn with one font, size and color.
#[derive(Clone, Debug)]
pub struct GlyphRun {
    /// Font the glyph ids refer to.
    pub font: parley::FontData,
    /// Size in pixels.
    pub font_size: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Positioned glyphs.
    pub glyphs: Vec<PlacedGlyph>,
}

/// Owned result of shaping one string.
#[derive(Clone, Debug, Default)]
pub struct TextLayout {
    width: f32,
    height: f32,
    baseline: f32,
    line_count: usize,
    runs: Vec<GlyphRun>,
}

impl TextLayout {
    pub(crate) fn from_parts(
        width: f32,
        height: f32,
        baseline: f32,
        line_count: usize,
        runs: Vec<GlyphRun>,
    ) -> Self {
        Self {
            width,
            height,
            baseline,
            line_count,
            runs,
        }
    }

    /// Width of the widest line.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Total height of all line boxes.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Distance from the top of the layout to the first line's baseline.
    pub fn baseline(&self) -> f32 {
        self.baseline
    }

    /// Number of lines after wrapping.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Glyph runs in visual order.
    pub fn runs(&self) -> &[GlyphRun] {
        &self.runs
    }
}

/// A face able to shape text at a fixed size.
pub trait TextFace: Send + Sync {
    /// Point size the face was built for.
    fn size(&self) -> f32;

    /// Shape `text` into positioned glyph runs.
    fn layout(&self, text: &str, style: &TextStyle) -> CardResult<TextLayout>;

    /// Width `text` occupies when laid out with `style`.
    fn measure(&self, text: &str, style: &TextStyle) -> CardResult<f32> {
        Ok(self.layout(text, style)?.width())
    }
}

struct Shaper {
    font_cx: parley::FontContext,
    layout_cx: parley::LayoutContext<Rgba8>,
}

/// Several font files merged into one fallback chain at a single point size.
///
/// Families are queried in registration order, so a character missing from the primary
/// face is taken from the first later face that maps it. Shaping state is private to the
/// face and serialized by a mutex; the face itself is shared freely across threads.
pub struct CompositeFace {
    size: f32,
    families: Vec<String>,
    shaper: Mutex<Shaper>,
}

impl std::fmt::Debug for CompositeFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeFace")
            .field("size", &self.size)
            .field("families", &self.families)
            .finish_non_exhaustive()
    }
}

impl CompositeFace {
    /// Register each `(label, bytes)` font in order and build the fallback chain.
    pub(crate) fn build(size: f32, fonts: Vec<(String, Vec<u8>)>) -> CardResult<Self> {
        if !size.is_finite() || size <= 0.0 {
            return Err(CardError::font(format!(
                "font size must be finite and > 0, got {size}"
            )));
        }
        if fonts.is_empty() {
            return Err(CardError::font("no font sources configured"));
        }

        let mut font_cx = parley::FontContext {
            collection: Collection::new(CollectionOptions {
                shared: false,
                system_fonts: false,
            }),
            source_cache: SourceCache::default(),
        };

        let mut families: Vec<String> = Vec::new();
        for (label, bytes) in fonts {
            let registered = font_cx.collection.register_fonts(Blob::from(bytes), None);
            if registered.is_empty() {
                return Err(CardError::font(format!(
                    "{label} contains no usable font faces"
                )));
            }
            for (id, _) in registered {
                let name = font_cx
                    .collection
                    .family_name(id)
                    .ok_or_else(|| CardError::font(format!("{label} has an unnamed family")))?
                    .to_string();
                if !families.contains(&name) {
                    families.push(name);
                }
            }
        }

        Ok(Self {
            size,
            families,
            shaper: Mutex::new(Shaper {
                font_cx,
                layout_cx: parley::LayoutContext::new(),
            }),
        })
    }

    /// Family names in fallback order.
    pub fn families(&self) -> &[String] {
        &self.families
    }
}

impl TextFace for CompositeFace {
    fn size(&self) -> f32 {
        self.size
    }

    fn layout(&self, text: &str, style: &TextStyle) -> CardResult<TextLayout> {
        if !style.line_height.is_finite() || style.line_height <= 0.0 {
            return Err(CardError::font("line height must be finite and > 0"));
        }

        let mut guard = self
            .shaper
            .lock()
            .map_err(|_| CardError::font("font shaper lock poisoned"))?;
        let Shaper { font_cx, layout_cx } = &mut *guard;

        let stack: Vec<FontFamilyName<'_>> = self
            .families
            .iter()
            .map(|name| FontFamilyName::Named(Cow::Borrowed(name.as_str())))
            .collect();

        let mut builder = layout_cx.ranged_builder(font_cx, text, 1.0, true);
        builder.push_default(StyleProperty::FontFamily(FontFamily::List(Cow::Owned(
            stack,
        ))));
        builder.push_default(StyleProperty::FontSize(self.size));
        builder.push_default(StyleProperty::FontWeight(style.weight.to_parley()));
        builder.push_default(StyleProperty::Brush(style.color));
        builder.push_default(StyleProperty::LineHeight(LineHeight::MetricsRelative(
            style.line_height,
        )));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(style.max_width);
        layout.align(Alignment::Start, AlignmentOptions::default());

        let mut runs = Vec::new();
        let mut baseline = None;
        let mut line_count = 0;
        for line in layout.lines() {
            line_count += 1;
            if baseline.is_none() {
                baseline = Some(line.metrics().baseline);
            }
            for item in line.items() {
                let PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs: Vec<PlacedGlyph> = run
                    .positioned_glyphs()
                    .map(|g| PlacedGlyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    })
                    .collect();
                if glyphs.is_empty() {
                    continue;
                }
                runs.push(GlyphRun {
                    font: run.run().font().clone(),
                    font_size: run.run().font_size(),
                    color: run.style().brush,
                    glyphs,
                });
            }
        }

        Ok(TextLayout::from_parts(
            layout.width(),
            layout.height(),
            baseline.unwrap_or(0.0),
            line_count,
            runs,
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/face.rs"]
mod tests;
