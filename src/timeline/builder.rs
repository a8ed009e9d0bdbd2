use std::collections::{BTreeSet, HashSet};

use crate::family::model::{CoupleKey, FamilyGraph, PersonId};
use crate::foundation::error::{FamflowError, FamflowResult};
use crate::layout::graph::{EdgeLayout, GraphLayout, NodeKey};
use crate::layout::merge::merge_marriage_edges;
use crate::schedule::scene::SceneList;
use crate::timeline::action::{AnimAction, EdgeId, Timeline};

/// Timing knobs for [`build_timeline`], in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineParams {
    /// Length of each line-drawing step.
    pub line_duration: f64,
    /// Hold after every step.
    pub pause_duration: f64,
    /// Hold on the fully revealed picture.
    pub final_pause: f64,
}

impl Default for TimelineParams {
    fn default() -> Self {
        Self {
            line_duration: 0.5,
            pause_duration: 0.3,
            final_pause: 2.0,
        }
    }
}

/// A group of edges that is drawn once all of its people are visible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Unit {
    Marriage(CoupleKey),
    Parentage(PersonId),
}

/// Turn reveal scenes into timed actions over `layout`.
///
/// Each scene becomes an `Appear`, an optional `DrawLine` with every edge that just became
/// drawable, and a `Pause`. A final pause holds the complete picture.
#[tracing::instrument(skip(graph, scenes, layout), fields(scenes = scenes.len()))]
pub fn build_timeline(
    graph: &FamilyGraph,
    scenes: &SceneList,
    layout: &GraphLayout,
    params: &TimelineParams,
) -> FamflowResult<Timeline> {
    for (name, v) in [
        ("line_duration", params.line_duration),
        ("pause_duration", params.pause_duration),
        ("final_pause", params.final_pause),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(FamflowError::validation(format!(
                "{name} must be finite and >= 0, got {v}"
            )));
        }
    }

    let mut b = Builder {
        graph,
        layout,
        visible: HashSet::with_capacity(graph.len()),
        drawn_units: HashSet::new(),
        edge_keys: HashSet::new(),
        edges: Vec::new(),
    };
    let mut actions = Vec::new();

    for scene in scenes.iter() {
        if scene.is_empty() {
            continue;
        }
        actions.push(AnimAction::Appear {
            persons: scene.to_vec(),
        });
        b.visible.extend(scene.iter().copied());

        let mut step = Vec::new();
        for id in scene {
            b.collect_for(*id, &mut step);
        }
        if !step.is_empty() {
            actions.push(AnimAction::DrawLine {
                duration: params.line_duration,
                edges: step,
            });
        }
        actions.push(AnimAction::Pause {
            duration: params.pause_duration,
        });
    }
    actions.push(AnimAction::Pause {
        duration: params.final_pause,
    });

    let timeline = Timeline::new(actions, b.edges)?;
    tracing::debug!(
        actions = timeline.actions().len(),
        edges = timeline.edges().len(),
        total = timeline.total_duration(),
        "timeline built"
    );
    Ok(timeline)
}

struct Builder<'a> {
    graph: &'a FamilyGraph,
    layout: &'a GraphLayout,
    visible: HashSet<PersonId>,
    drawn_units: HashSet<Unit>,
    /// Unordered endpoint pairs already scheduled.
    edge_keys: HashSet<(NodeKey, NodeKey)>,
    edges: Vec<EdgeLayout>,
}

impl Builder<'_> {
    /// Queue every unit involving `id` that just became drawable.
    ///
    /// Order: the marriage, the person's own parentage, then each child's parentage.
    fn collect_for(&mut self, id: PersonId, step: &mut Vec<EdgeId>) {
        let graph = self.graph;
        let Some(person) = graph.get(id) else {
            return;
        };

        if let Some(sid) = person.spouse_id
            && self.visible.contains(&sid)
        {
            let unit = Unit::Marriage(CoupleKey::new(id, sid));
            if self.drawn_units.insert(unit) {
                let merged = merge_marriage_edges(self.layout, id, sid);
                self.push_all(merged, step);
            }
        }

        self.try_parentage(id, step);

        let children: BTreeSet<PersonId> = graph.children_of(id).iter().map(|c| c.id).collect();
        for child in children {
            self.try_parentage(child, step);
        }
    }

    fn try_parentage(&mut self, child: PersonId, step: &mut Vec<EdgeId>) {
        let graph = self.graph;
        let Some(p) = graph.get(child) else {
            return;
        };
        if p.is_parentless()
            || !self.visible.contains(&child)
            || !p.parent_ids.iter().all(|pid| self.visible.contains(pid))
        {
            return;
        }
        if !self.drawn_units.insert(Unit::Parentage(child)) {
            return;
        }
        let edges = parentage_edges(self.layout, child, &p.parent_ids);
        self.push_all(edges, step);
    }

    fn push_all(&mut self, edges: Vec<EdgeLayout>, step: &mut Vec<EdgeId>) {
        for e in edges {
            let key = if e.tail <= e.head {
                (e.tail, e.head)
            } else {
                (e.head, e.tail)
            };
            if !self.edge_keys.insert(key) {
                continue;
            }
            step.push(EdgeId(self.edges.len()));
            self.edges.push(e);
        }
    }
}

/// Edges that connect `child` to its parents: the junction edge when the parents' junction
/// routes to the child, otherwise one direct edge per parent. All oriented toward the child.
fn parentage_edges(layout: &GraphLayout, child: PersonId, parents: &[PersonId]) -> Vec<EdgeLayout> {
    let child_key = NodeKey::Person(child);
    let orient = |e: &EdgeLayout| {
        if e.head == child_key {
            e.clone()
        } else {
            e.reversed()
        }
    };

    if let [a, b] = parents {
        let junction = NodeKey::Junction(CoupleKey::new(*a, *b));
        let via: Vec<EdgeLayout> = layout.edges_between(junction, child_key).map(orient).collect();
        if !via.is_empty() {
            return via;
        }
    }
    parents
        .iter()
        .flat_map(|pid| layout.edges_between(NodeKey::Person(*pid), child_key))
        .map(orient)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/builder.rs"]
mod tests;
