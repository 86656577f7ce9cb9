use std::sync::Arc;

use kurbo::{Affine, Circle, Shape};

use crate::foundation::core::{Point, Rect, Rgba8};
use crate::foundation::error::{CardError, CardResult};
use crate::text::face::TextLayout;

/// Drawing surface the composer paints onto.
///
/// Positions are in canvas pixels with the origin at the top-left corner.
pub trait Canvas {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Fill `rect` with `color`, blending by its alpha.
    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> CardResult<()>;

    /// Fill a disk.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) -> CardResult<()>;

    /// Composite a straight-alpha image with its top-left corner at `top_left`.
    fn draw_image(&mut self, image: &image::RgbaImage, top_left: Point) -> CardResult<()>;

    /// Draw shaped text whose layout box starts at `origin`.
    fn draw_text(&mut self, layout: &TextLayout, origin: Point) -> CardResult<()>;

    /// Rasterize everything drawn so far into a straight-alpha image.
    fn finish(self) -> CardResult<image::RgbaImage>
    where
        Self: Sized;
}

/// [`Canvas`] backed by the `vello_cpu` rasterizer.
pub struct CpuCanvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl std::fmt::Debug for CpuCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl CpuCanvas {
    /// Transparent canvas of `width×height`; both must fit in `u16`.
    pub fn new(width: u32, height: u32) -> CardResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| CardError::render("canvas width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| CardError::render("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(CardError::render("canvas width/height must be > 0"));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            width: w,
            height: h,
        })
    }

    fn set_color(&mut self, color: Rgba8) {
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }
}

impl Canvas for CpuCanvas {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) -> CardResult<()> {
        self.ctx.set_transform(Affine::IDENTITY);
        self.set_color(color);
        self.ctx.fill_rect(&rect);
        Ok(())
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) -> CardResult<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(CardError::render(format!("invalid circle radius {radius}")));
        }
        self.ctx.set_transform(Affine::IDENTITY);
        self.set_color(color);
        self.ctx
            .fill_path(&Circle::new(center, radius).to_path(0.1));
        Ok(())
    }

    fn draw_image(&mut self, image: &image::RgbaImage, top_left: Point) -> CardResult<()> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Ok(());
        }
        let pixmap = premultiplied_pixmap(image)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.ctx
            .set_transform(Affine::translate((top_left.x, top_left.y)));
        self.ctx.set_paint_transform(Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
        Ok(())
    }

    fn draw_text(&mut self, layout: &TextLayout, origin: Point) -> CardResult<()> {
        self.ctx.set_transform(Affine::translate((origin.x, origin.y)));
        for run in layout.runs() {
            self.set_color(run.color);
            let glyphs = run.glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            self.ctx
                .glyph_run(&run.font)
                .font_size(run.font_size)
                .fill_glyphs(glyphs);
        }
        Ok(())
    }

    fn finish(mut self) -> CardResult<image::RgbaImage> {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);

        let data: Vec<u8> = pixmap
            .take_unpremultiplied()
            .into_iter()
            .flat_map(|px| [px.r, px.g, px.b, px.a])
            .collect();
        image::RgbaImage::from_raw(u32::from(self.width), u32::from(self.height), data)
            .ok_or_else(|| CardError::render("rendered pixmap has an unexpected length"))
    }
}

fn premultiplied_pixmap(image: &image::RgbaImage) -> CardResult<vello_cpu::Pixmap> {
    let (width, height) = image.dimensions();
    let w: u16 = width
        .try_into()
        .map_err(|_| CardError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CardError::render("image height exceeds u16"))?;

    let mut may_have_opacities = false;
    let pixels = image
        .pixels()
        .map(|px| {
            let [r, g, b, a] = px.0;
            may_have_opacities |= a != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: premultiply(r, a),
                g: premultiply(g, a),
                b: premultiply(b, a),
                a,
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn premultiply(c: u8, a: u8) -> u8 {
    ((u16::from(c) * u16::from(a) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/compose/canvas.rs"]
mod tests;
