use std::sync::Arc;

use crate::compose::canvas::{Canvas, CpuCanvas};
use crate::compose::layout::{
    AUTHOR_COLOR, TITLE_LINE_HEIGHT, author_origin, avatar_center, avatar_origin,
    avatar_ring_radius, footer_baseline, footer_layout, overlay_rect, title_origin,
    title_wrap_width,
};
use crate::compose::spec::{AVATAR_KEY, BACKGROUND_KEY, Background, LOGO_KEY, RenderSpec};
use crate::fetch::batch::{ResourceBundle, fetch_all};
use crate::fetch::cancel::CancelToken;
use crate::fetch::fetcher::ResourceFetcher;
use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{CardError, CardResult};
use crate::text::cache::FontProvider;
use crate::text::face::{TextLayout, TextStyle, TextWeight};
use crate::transform::codec::decode_rgba8;
use crate::transform::mask::circular_mask;
use crate::transform::resize::{fit_resize, scale_to_height};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Background,
    Overlay,
    Avatar,
    Author,
    Title,
    Logo,
    Label,
}

impl Pass {
    // Later passes paint over earlier ones.
    const ORDER: [Pass; 7] = [
        Pass::Background,
        Pass::Overlay,
        Pass::Avatar,
        Pass::Author,
        Pass::Title,
        Pass::Logo,
        Pass::Label,
    ];

    fn name(self) -> &'static str {
        match self {
            Pass::Background => "background",
            Pass::Overlay => "overlay",
            Pass::Avatar => "avatar",
            Pass::Author => "author",
            Pass::Title => "title",
            Pass::Logo => "logo",
            Pass::Label => "label",
        }
    }
}

struct Frame<'a> {
    spec: &'a RenderSpec,
    bundle: ResourceBundle,
    logo_width: Option<f64>,
}

impl Frame<'_> {
    fn take(&mut self, key: &str) -> CardResult<Vec<u8>> {
        self.bundle
            .take(key)
            .ok_or_else(|| CardError::fetch(format!("resource '{key}' missing from bundle")))
    }
}

/// Renders [`RenderSpec`]s into raster cards.
///
/// Resources are fetched in one concurrent batch, then the passes run in a fixed order
/// on a single thread: background, overlay, avatar, author, title, logo, labels. The
/// composer itself holds no per-render state and can be shared across threads.
pub struct Composer {
    fetcher: Arc<dyn ResourceFetcher>,
    fonts: Arc<dyn FontProvider>,
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer").finish_non_exhaustive()
    }
}

impl Composer {
    /// Composer drawing resources from `fetcher` and text from `fonts`.
    pub fn new(fetcher: Arc<dyn ResourceFetcher>, fonts: Arc<dyn FontProvider>) -> Self {
        Self { fetcher, fonts }
    }

    /// Render `spec` into a fresh straight-alpha image of `width×height`.
    ///
    /// Any failure aborts the render; no partial image is returned.
    #[tracing::instrument(skip_all, fields(width = spec.width, height = spec.height))]
    pub fn render(&self, spec: &RenderSpec, cancel: &CancelToken) -> CardResult<image::RgbaImage> {
        spec.validate()?;
        let mut canvas = CpuCanvas::new(spec.width, spec.height)?;
        self.draw(spec, cancel, &mut canvas)?;
        canvas.finish()
    }

    /// Run every pass for `spec` onto a caller-provided canvas of the requested size.
    pub fn render_onto<C: Canvas>(
        &self,
        spec: &RenderSpec,
        cancel: &CancelToken,
        canvas: &mut C,
    ) -> CardResult<()> {
        spec.validate()?;
        let (w, h) = canvas.size();
        if (w, h) != (spec.width, spec.height) {
            return Err(CardError::render(format!(
                "canvas is {w}x{h} but the render spec asks for {}x{}",
                spec.width, spec.height
            )));
        }
        self.draw(spec, cancel, canvas)
    }

    fn draw<C: Canvas>(
        &self,
        spec: &RenderSpec,
        cancel: &CancelToken,
        canvas: &mut C,
    ) -> CardResult<()> {
        let locators = spec.locators()?;
        let bundle = fetch_all(Arc::clone(&self.fetcher), &locators, cancel)?;

        let mut frame = Frame {
            spec,
            bundle,
            logo_width: None,
        };
        for pass in Pass::ORDER {
            cancel.check(&format!("{} pass", pass.name()))?;
            tracing::trace!(pass = pass.name(), "draw pass");
            self.run_pass(pass, &mut frame, canvas)
                .map_err(|e| e.context(format_args!("{} pass", pass.name())))?;
        }
        Ok(())
    }

    fn run_pass<C: Canvas>(
        &self,
        pass: Pass,
        frame: &mut Frame<'_>,
        canvas: &mut C,
    ) -> CardResult<()> {
        match pass {
            Pass::Background => draw_background(frame, canvas),
            Pass::Overlay => {
                let spec = frame.spec;
                let color = Rgba8::BLACK.with_alpha(Rgba8::alpha_from_opacity(spec.opacity));
                canvas.fill_rect(overlay_rect(spec.width, spec.height), color)
            }
            Pass::Avatar => draw_avatar(frame, canvas),
            Pass::Author => self.draw_author(frame.spec, canvas),
            Pass::Title => self.draw_title(frame.spec, canvas),
            Pass::Logo => self.draw_logo(frame, canvas),
            Pass::Label => self.draw_labels(frame, canvas),
        }
    }

    fn draw_author<C: Canvas>(&self, spec: &RenderSpec, canvas: &mut C) -> CardResult<()> {
        let author = spec.author.trim();
        if author.is_empty() {
            return Ok(());
        }
        let face = self.fonts.load(spec.author_size)?;
        let layout = face.layout(author, &TextStyle::new(TextWeight::Regular, AUTHOR_COLOR))?;
        let origin = author_origin(spec.avatar_diameter, f64::from(layout.height()));
        canvas.draw_text(&layout, origin)
    }

    fn draw_title<C: Canvas>(&self, spec: &RenderSpec, canvas: &mut C) -> CardResult<()> {
        let title = spec.display_title();
        if title.trim().is_empty() {
            return Ok(());
        }
        let face = self.fonts.load(spec.title_size)?;
        let style = TextStyle::new(TextWeight::Bold, Rgba8::WHITE)
            .with_max_width(title_wrap_width(spec.width) as f32)
            .with_line_height(TITLE_LINE_HEIGHT);
        let layout = face.layout(&title, &style)?;
        canvas.draw_text(&layout, title_origin(spec.avatar_diameter))
    }

    fn draw_logo<C: Canvas>(&self, frame: &mut Frame<'_>, canvas: &mut C) -> CardResult<()> {
        if frame.spec.logo_source().is_none() {
            return Ok(());
        }
        let spec = frame.spec;
        let bytes = frame.take(LOGO_KEY)?;
        let scaled = scale_to_height(bytes, spec.logo_height).map_err(|e| e.context(LOGO_KEY))?;
        let logo = decode_rgba8(&scaled).map_err(|e| e.context(LOGO_KEY))?;

        let trailing_w = self
            .label_layout(spec, spec.trailing_label_text())?
            .map(|l| f64::from(l.width()));
        let logo_w = f64::from(logo.width());
        let x = footer_layout(spec.width, trailing_w, Some(logo_w), None)
            .logo_x
            .unwrap_or_default();
        let y = footer_baseline(spec.height) - f64::from(logo.height());

        canvas.draw_image(&logo, Point::new(x, y))?;
        frame.logo_width = Some(logo_w);
        Ok(())
    }

    fn draw_labels<C: Canvas>(&self, frame: &mut Frame<'_>, canvas: &mut C) -> CardResult<()> {
        let spec = frame.spec;
        let label = self.label_layout(spec, spec.label_text())?;
        let trailing = self.label_layout(spec, spec.trailing_label_text())?;
        if label.is_none() && trailing.is_none() {
            return Ok(());
        }

        let footer = footer_layout(
            spec.width,
            trailing.as_ref().map(|l| f64::from(l.width())),
            frame.logo_width,
            label.as_ref().map(|l| f64::from(l.width())),
        );
        let baseline = footer_baseline(spec.height);
        for (layout, x) in [(label, footer.label_x), (trailing, footer.trailing_x)] {
            if let (Some(layout), Some(x)) = (layout, x) {
                let origin = Point::new(x, baseline - f64::from(layout.baseline()));
                canvas.draw_text(&layout, origin)?;
            }
        }
        Ok(())
    }

    fn label_layout(&self, spec: &RenderSpec, text: Option<&str>) -> CardResult<Option<TextLayout>> {
        let Some(text) = text else {
            return Ok(None);
        };
        let face = self.fonts.load(spec.label_size)?;
        face.layout(text, &TextStyle::new(TextWeight::Bold, Rgba8::WHITE))
            .map(Some)
    }
}

fn draw_background<C: Canvas>(frame: &mut Frame<'_>, canvas: &mut C) -> CardResult<()> {
    let spec = frame.spec;
    match spec.background()? {
        Background::Color(color) => canvas.fill_rect(
            Rect::new(0.0, 0.0, f64::from(spec.width), f64::from(spec.height)),
            color,
        ),
        Background::Image(_) => {
            let bytes = frame.take(BACKGROUND_KEY)?;
            let fitted = fit_resize(bytes, spec.width, spec.height)
                .map_err(|e| e.context(BACKGROUND_KEY))?;
            let img = decode_rgba8(&fitted).map_err(|e| e.context(BACKGROUND_KEY))?;
            canvas.draw_image(&img, Point::ZERO)
        }
    }
}

fn draw_avatar<C: Canvas>(frame: &mut Frame<'_>, canvas: &mut C) -> CardResult<()> {
    if frame.spec.avatar_source().is_none() {
        return Ok(());
    }
    let d = frame.spec.avatar_diameter;
    let c = avatar_center(d);
    canvas.fill_circle(Point::new(c, c), avatar_ring_radius(d), Rgba8::WHITE)?;

    let bytes = frame.take(AVATAR_KEY)?;
    let fitted = fit_resize(bytes, d, d).map_err(|e| e.context(AVATAR_KEY))?;
    let img = circular_mask(&decode_rgba8(&fitted).map_err(|e| e.context(AVATAR_KEY))?);
    canvas.draw_image(&img, avatar_origin(d, img.width(), img.height()))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/composer.rs"]
mod tests;
