use std::collections::{BTreeMap, BTreeSet};

use crate::family::generation::GenerationMap;
use crate::family::model::{FamilyGraph, PersonId};
use crate::foundation::core::Point;
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::layout::graph::{EdgeLayout, GraphLayout, NodeGeometry};
use crate::layout::request::{LayoutHints, LayoutRequest};
use crate::layout::solver::{LayoutSolver, RawLayout};

/// Everything the adapter needs besides the family itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    /// Spacing hints passed to the solver.
    pub hints: LayoutHints,
    /// Pixels per solver unit.
    pub pixels_per_unit: f64,
    /// Optional box width multiplier; `1.0` leaves widths alone.
    pub node_width_scale: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            hints: LayoutHints::default(),
            pixels_per_unit: 432.0,
            node_width_scale: 1.0,
        }
    }
}

impl GraphLayout {
    /// Convert solver output to pixel space.
    ///
    /// Every coordinate is multiplied by `pixels_per_unit`, y is flipped against the drawing
    /// height, and edge endpoints are re-anchored on the node boxes.
    pub fn from_raw(raw: &RawLayout, pixels_per_unit: f64) -> FamflowResult<Self> {
        if !pixels_per_unit.is_finite() || pixels_per_unit <= 0.0 {
            return Err(FamflowError::validation(format!(
                "pixels per unit must be finite and > 0, got {pixels_per_unit}"
            )));
        }
        let k = pixels_per_unit;
        let width = raw.width * k;
        let height = raw.height * k;
        let flip = |p: Point| Point::new(p.x * k, height - p.y * k);

        let nodes: BTreeMap<_, _> = raw
            .nodes
            .iter()
            .map(|n| {
                (
                    n.key,
                    NodeGeometry {
                        cx: n.x * k,
                        cy: height - n.y * k,
                        width: n.width * k,
                        height: n.height * k,
                    },
                )
            })
            .collect();
        let edges = raw
            .edges
            .iter()
            .map(|e| EdgeLayout {
                tail: e.tail,
                head: e.head,
                points: e.points.iter().copied().map(flip).collect(),
            })
            .collect();

        let mut layout = Self {
            width,
            height,
            nodes,
            edges,
        };
        layout.fix_edge_endpoints();
        Ok(layout)
    }
}

/// Lay out the people in `visible` and return the corrected pixel-space layout.
#[tracing::instrument(skip(graph, generations, visible, solver, params), fields(visible = visible.len()))]
pub fn compute_layout(
    graph: &FamilyGraph,
    generations: &GenerationMap,
    visible: &BTreeSet<PersonId>,
    solver: &dyn LayoutSolver,
    params: &LayoutParams,
) -> FamflowResult<GraphLayout> {
    let request = LayoutRequest::for_family(graph, generations, visible);
    let raw = solver.solve(&request, &params.hints)?;
    let mut layout = GraphLayout::from_raw(&raw, params.pixels_per_unit)?;
    if params.node_width_scale != 1.0 {
        layout.scale_node_widths(params.node_width_scale)?;
    }
    tracing::debug!(
        nodes = layout.nodes.len(),
        edges = layout.edges.len(),
        width = layout.width,
        height = layout.height,
        "layout ready"
    );
    Ok(layout)
}

/// Lay out the whole family.
pub fn compute_full_layout(
    graph: &FamilyGraph,
    generations: &GenerationMap,
    solver: &dyn LayoutSolver,
    params: &LayoutParams,
) -> FamflowResult<GraphLayout> {
    let everyone: BTreeSet<PersonId> = graph.ids().into_iter().collect();
    compute_layout(graph, generations, &everyone, solver, params)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/adapter.rs"]
mod tests;
