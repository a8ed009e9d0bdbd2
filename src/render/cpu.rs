use std::sync::Arc;

use kurbo::Shape as _;

use crate::foundation::core::{Canvas, Point, Rect, Rgb8};
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::render::backend::FrameRGBA;
use crate::render::painter::Painter;

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

impl From<Rgb8> for TextBrushRgba8 {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// Parley contexts bound to one registered font family.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font_bytes` and remember the first family it provides.
    pub(crate) fn new(font_bytes: &[u8]) -> FamflowResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            FamflowError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| FamflowError::validation("registered font family has no name"))?
            .to_string();
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Shape `text` on a single unbroken line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> FamflowResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FamflowError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

struct LoadedFont {
    engine: TextLayoutEngine,
    data: vello_cpu::peniko::FontData,
}

/// [`Painter`] backed by the `vello_cpu` rasterizer.
///
/// Output frames are premultiplied RGBA8. Without font bytes, text calls are no-ops.
pub struct CpuPainter {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    font: Option<LoadedFont>,
}

impl CpuPainter {
    /// Create a painter for `canvas`, optionally able to draw text with `font_bytes`.
    pub fn new(canvas: Canvas, font_bytes: Option<Arc<Vec<u8>>>) -> FamflowResult<Self> {
        let w: u16 = canvas.width.try_into().map_err(|_| {
            FamflowError::evaluation(format!("surface width {} exceeds u16", canvas.width))
        })?;
        let h: u16 = canvas.height.try_into().map_err(|_| {
            FamflowError::evaluation(format!("surface height {} exceeds u16", canvas.height))
        })?;
        let font = match font_bytes {
            Some(bytes) => {
                let engine = TextLayoutEngine::new(&bytes)?;
                let data = vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
                    0,
                );
                Some(LoadedFont { engine, data })
            }
            None => None,
        };
        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(w, h),
            font,
        })
    }

    /// `true` when a font was supplied.
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

impl Painter for CpuPainter {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn fill_background(&mut self, color: Rgb8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.canvas.width),
            f64::from(self.canvas.height),
        ));
    }

    fn draw_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f64,
        fill: Rgb8,
        border: Rgb8,
        border_width: f64,
    ) {
        let rect = rect.abs();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(fill));
        self.ctx.fill_path(&rounded_rect_path(rect, radius));

        let bw = border_width.min(rect.width() / 2.0).min(rect.height() / 2.0);
        if bw > 0.0 {
            let inner = rect.inset(-bw / 2.0);
            self.ctx.set_paint(paint(border));
            self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(bw));
            self.ctx
                .stroke_path(&rounded_rect_path(inner, (radius - bw / 2.0).max(0.0)));
        }
    }

    fn draw_polyline(&mut self, points: &[Point], color: Rgb8, width: f64) {
        if points.len() < 2 || width <= 0.0 {
            return;
        }
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(to_cpu(points[0]));
        for p in &points[1..] {
            path.line_to(to_cpu(*p));
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint(color));
        self.ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(width)
                .with_caps(vello_cpu::kurbo::Cap::Round)
                .with_join(vello_cpu::kurbo::Join::Round),
        );
        self.ctx.stroke_path(&path);
    }

    fn draw_text_centered(
        &mut self,
        center: Point,
        text: &str,
        size: f64,
        color: Rgb8,
    ) -> FamflowResult<()> {
        let Some(font) = self.font.as_mut() else {
            return Ok(());
        };
        if text.is_empty() {
            return Ok(());
        }
        let layout = font
            .engine
            .layout_line(text, size as f32, TextBrushRgba8::from(color))?;
        let x = center.x - f64::from(layout.width()) / 2.0;
        let y = center.y - f64::from(layout.height()) / 2.0;
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font.data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> FamflowResult<FrameRGBA> {
        let w = self.ctx.width();
        let h = self.ctx.height();
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.render_to_pixmap(&mut pixmap);
        self.ctx.reset();
        Ok(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn paint(c: Rgb8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255)
}

fn to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rounded_rect_path(rect: Rect, radius: f64) -> vello_cpu::kurbo::BezPath {
    let r = radius.max(0.0).min(rect.width() / 2.0).min(rect.height() / 2.0);
    let shape = kurbo::RoundedRect::from_rect(rect, r);
    bezpath_to_cpu(shape.path_elements(0.1))
}

fn bezpath_to_cpu(elements: impl Iterator<Item = kurbo::PathEl>) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in elements {
        match el {
            PathEl::MoveTo(p) => out.move_to(to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(to_cpu(p1), to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(to_cpu(p1), to_cpu(p2), to_cpu(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
