use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Write as _;

use crate::family::generation::GenerationMap;
use crate::family::model::{FamilyGraph, PersonId, Sex};
use crate::layout::graph::NodeKey;

/// Drawing role of a requested edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Spouse to junction (or junction to spouse).
    Marriage,
    /// Junction or parent to child.
    Parentage,
}

/// Node handed to the layout solver.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestNode {
    /// Node key.
    pub key: NodeKey,
    /// Visible label; `None` for junction points.
    pub label: Option<String>,
    /// Sex of the person, used only to tint the node in DOT output.
    pub sex: Option<Sex>,
}

/// Edge handed to the layout solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestEdge {
    /// Tail node.
    pub tail: NodeKey,
    /// Head node.
    pub head: NodeKey,
    /// Drawing role.
    pub kind: EdgeKind,
}

/// Solver spacing knobs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutHints {
    /// Minimum horizontal gap between nodes (inches).
    pub nodesep: f64,
    /// Minimum vertical gap between ranks (inches).
    pub ranksep: f64,
    /// Label font size hint (points).
    pub font_size: f64,
}

impl Default for LayoutHints {
    fn default() -> Self {
        Self {
            nodesep: 0.8,
            ranksep: 1.0,
            font_size: 11.0,
        }
    }
}

/// Node/edge description of the visible part of a family, ready for a [`crate::LayoutSolver`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutRequest {
    /// Nodes in emission order.
    pub nodes: Vec<RequestNode>,
    /// Edges in emission order.
    pub edges: Vec<RequestEdge>,
    /// Groups of nodes that must share a rank.
    pub same_rank: Vec<Vec<NodeKey>>,
}

impl LayoutRequest {
    /// Describe the people in `visible` with their marriages and parentage.
    ///
    /// Couples whose two spouses are visible get a junction node with marriage edges on both
    /// sides and edges from the junction to each visible common child. Visible children not
    /// covered by a junction are linked directly to each visible parent. Each couple and each
    /// generation is pinned to one rank.
    pub fn for_family(
        graph: &FamilyGraph,
        generations: &GenerationMap,
        visible: &BTreeSet<PersonId>,
    ) -> Self {
        let mut req = Self::default();

        for p in graph.persons().filter(|p| visible.contains(&p.id)) {
            req.nodes.push(RequestNode {
                key: NodeKey::Person(p.id),
                label: Some(format!("{}\n{}", p.name, p.birth_date)),
                sex: Some(p.sex),
            });
        }

        let mut covered = HashSet::<PersonId>::new();
        for couple in graph.couples() {
            if !visible.contains(&couple.lo) || !visible.contains(&couple.hi) {
                continue;
            }
            let junction = NodeKey::Junction(couple);
            let (lo, hi) = (NodeKey::Person(couple.lo), NodeKey::Person(couple.hi));
            req.nodes.push(RequestNode {
                key: junction,
                label: None,
                sex: None,
            });
            req.same_rank.push(vec![lo, junction, hi]);
            req.edges.push(RequestEdge {
                tail: lo,
                head: junction,
                kind: EdgeKind::Marriage,
            });
            req.edges.push(RequestEdge {
                tail: junction,
                head: hi,
                kind: EdgeKind::Marriage,
            });
            for child in graph.couple_children(couple.lo, couple.hi) {
                covered.insert(child.id);
                if visible.contains(&child.id) {
                    req.edges.push(RequestEdge {
                        tail: junction,
                        head: NodeKey::Person(child.id),
                        kind: EdgeKind::Parentage,
                    });
                }
            }
        }

        for p in graph.persons() {
            if !visible.contains(&p.id) || covered.contains(&p.id) {
                continue;
            }
            for pid in p.parent_ids.iter().filter(|pid| visible.contains(pid)) {
                req.edges.push(RequestEdge {
                    tail: NodeKey::Person(*pid),
                    head: NodeKey::Person(p.id),
                    kind: EdgeKind::Parentage,
                });
            }
        }

        let mut ranks = BTreeMap::<u32, Vec<NodeKey>>::new();
        for (id, depth) in generations.iter().filter(|(id, _)| visible.contains(id)) {
            ranks.entry(depth).or_default().push(NodeKey::Person(id));
        }
        req.same_rank.extend(ranks.into_values());
        req
    }

    /// Render as a Graphviz DOT digraph.
    pub fn to_dot(&self, hints: &LayoutHints) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "digraph family_tree {{");
        let _ = writeln!(
            out,
            "  graph [rankdir=TB, splines=polyline, nodesep=\"{}\", ranksep=\"{}\"];",
            hints.nodesep, hints.ranksep
        );
        let _ = writeln!(
            out,
            "  node [fontname=\"Helvetica\", fontsize=\"{}\", shape=box, style=\"filled,rounded\"];",
            hints.font_size
        );
        for n in &self.nodes {
            match &n.label {
                Some(label) => {
                    let fill = match n.sex {
                        Some(Sex::Female) => "lightpink",
                        _ => "lightblue",
                    };
                    let _ = writeln!(
                        out,
                        "  \"{}\" [label=\"{}\", fillcolor=\"{fill}\"];",
                        n.key,
                        escape_label(label)
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "  \"{}\" [label=\"\", shape=point, width=\"0.01\", height=\"0.01\"];",
                        n.key
                    );
                }
            }
        }
        for e in &self.edges {
            let attrs = match e.kind {
                EdgeKind::Marriage => "dir=none, color=\"darkred\", penwidth=\"2\"",
                EdgeKind::Parentage => "color=\"gray30\"",
            };
            let _ = writeln!(out, "  \"{}\" -> \"{}\" [{attrs}];", e.tail, e.head);
        }
        for group in &self.same_rank {
            let members = group
                .iter()
                .map(|k| format!("\"{k}\""))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = writeln!(out, "  {{ rank=same; {members}; }}");
        }
        out.push_str("}\n");
        out
    }
}

fn escape_label(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/request.rs"]
mod tests;
