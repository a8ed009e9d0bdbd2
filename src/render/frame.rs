use std::collections::BTreeSet;

use crate::config::StyleConfig;
use crate::family::model::{FamilyGraph, PersonId, Sex};
use crate::foundation::core::{Canvas, Point, Vec2};
use crate::foundation::error::FamflowResult;
use crate::layout::graph::{EdgeLayout, GraphLayout};
use crate::render::backend::FrameRGBA;
use crate::render::painter::Painter;
use crate::timeline::reconstruct::{FrameState, interpolate_along_path};

/// Two end nodes closer than this vertically count as one row.
const SAME_ROW_TOLERANCE_PX: f64 = 5.0;

/// Line style of a laid-out edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    /// Between spouses.
    Marriage,
    /// Down to a child.
    Child,
}

/// Paints family diagrams from a pixel-space layout.
///
/// The canvas is the layout extent plus `padding` on every side, rounded up to even sides.
pub struct FrameDrawer<'a> {
    graph: &'a FamilyGraph,
    layout: &'a GraphLayout,
    style: &'a StyleConfig,
    canvas: Canvas,
    offset: Vec2,
}

impl<'a> FrameDrawer<'a> {
    /// Bind a drawer to one layout.
    pub fn new(
        graph: &'a FamilyGraph,
        layout: &'a GraphLayout,
        style: &'a StyleConfig,
    ) -> FamflowResult<Self> {
        let pad = style.dimensions.padding;
        let canvas = Canvas::covering(layout.width + 2.0 * pad, layout.height + 2.0 * pad)?;
        Ok(Self {
            graph,
            layout,
            style,
            canvas,
            offset: Vec2::new(pad, pad),
        })
    }

    /// Pixel size of every frame this drawer produces.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Style an edge by its end nodes.
    ///
    /// Both ends known: marriage when they share a row. Otherwise an edge touching a junction
    /// is a marriage half.
    pub fn line_style(&self, edge: &EdgeLayout) -> LineStyle {
        match (self.layout.node(edge.tail), self.layout.node(edge.head)) {
            (Some(a), Some(b)) if (a.cy - b.cy).abs() < SAME_ROW_TOLERANCE_PX => {
                LineStyle::Marriage
            }
            (Some(_), Some(_)) => LineStyle::Child,
            _ if edge.tail.is_junction() || edge.head.is_junction() => LineStyle::Marriage,
            _ => LineStyle::Child,
        }
    }

    /// Draw one animation instant.
    pub fn draw_state(
        &self,
        painter: &mut dyn Painter,
        state: &FrameState<'_>,
    ) -> FamflowResult<FrameRGBA> {
        self.paint(
            painter,
            &state.visible,
            state.edges.iter().map(|e| (e.edge, e.progress)),
        )
    }

    /// Draw the complete diagram: every person and every edge of the layout.
    pub fn draw_full(&self, painter: &mut dyn Painter) -> FamflowResult<FrameRGBA> {
        let everyone: BTreeSet<PersonId> = self
            .layout
            .nodes
            .keys()
            .filter_map(|k| k.person())
            .collect();
        self.paint(painter, &everyone, self.layout.edges.iter().map(|e| (e, 1.0)))
    }

    fn paint<'e>(
        &self,
        painter: &mut dyn Painter,
        visible: &BTreeSet<PersonId>,
        edges: impl Iterator<Item = (&'e EdgeLayout, f64)>,
    ) -> FamflowResult<FrameRGBA> {
        let colors = &self.style.colors;
        let dims = &self.style.dimensions;
        painter.fill_background(colors.background);

        for (edge, progress) in edges {
            let pts: Vec<Point> = interpolate_along_path(&edge.points, progress)
                .into_iter()
                .map(|p| p + self.offset)
                .collect();
            if pts.len() < 2 {
                continue;
            }
            let (color, width) = match self.line_style(edge) {
                LineStyle::Marriage => (colors.marriage_line, dims.line_width_marriage),
                LineStyle::Child => (colors.child_line, dims.line_width_child),
            };
            painter.draw_polyline(&pts, color, width);
        }

        for id in visible {
            let (Some(person), Some(node)) = (self.graph.get(*id), self.layout.person(*id)) else {
                continue;
            };
            let (fill, border) = match person.sex {
                Sex::Male => (colors.male_fill, colors.male_border),
                Sex::Female => (colors.female_fill, colors.female_border),
            };
            painter.draw_rounded_rect(
                node.rect() + self.offset,
                dims.corner_radius,
                fill,
                border,
                dims.border_width,
            );
            painter.draw_text_centered(
                node.center() + self.offset,
                &person.name,
                dims.font_size_name,
                colors.text,
            )?;
        }

        painter.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
