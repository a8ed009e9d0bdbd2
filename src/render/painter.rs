use crate::foundation::core::{Canvas, Point, Rect, Rgb8};
use crate::foundation::error::FamflowResult;
use crate::render::backend::FrameRGBA;

/// Minimal drawing surface used by [`FrameDrawer`](crate::FrameDrawer).
///
/// Coordinates are pixels with the origin at the top-left corner. A painter accumulates drawing
/// commands until [`Painter::finish`] rasterizes them and clears the surface for the next frame.
pub trait Painter {
    /// Size of the surface.
    fn canvas(&self) -> Canvas;

    /// Cover the whole surface with `color`.
    fn fill_background(&mut self, color: Rgb8);

    /// Filled rounded rectangle with a border drawn inside its edge.
    fn draw_rounded_rect(
        &mut self,
        rect: Rect,
        radius: f64,
        fill: Rgb8,
        border: Rgb8,
        border_width: f64,
    );

    /// Open polyline through `points`. Fewer than two points draws nothing.
    fn draw_polyline(&mut self, points: &[Point], color: Rgb8, width: f64);

    /// Single-line text centered on `center`.
    fn draw_text_centered(
        &mut self,
        center: Point,
        text: &str,
        size: f64,
        color: Rgb8,
    ) -> FamflowResult<()>;

    /// Rasterize everything drawn since the previous call.
    fn finish(&mut self) -> FamflowResult<FrameRGBA>;
}
