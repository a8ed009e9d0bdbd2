use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::family::model::{CoupleKey, PersonId};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{FamflowError, FamflowResult};

/// Nodes narrower and shorter than this (in pixels) are treated as points.
pub const POINT_NODE_EXTENT: f64 = 2.0;

/// Key of a layout node: a person box or a synthetic marriage junction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    /// Person box.
    Person(PersonId),
    /// Zero-size branch point of a married couple.
    Junction(CoupleKey),
}

impl NodeKey {
    /// Person identity, when this is a person node.
    pub fn person(self) -> Option<PersonId> {
        match self {
            Self::Person(id) => Some(id),
            Self::Junction(_) => None,
        }
    }

    /// Return `true` for junction keys.
    pub fn is_junction(self) -> bool {
        matches!(self, Self::Junction(_))
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person(id) => write!(f, "{id}"),
            Self::Junction(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for NodeKey {
    type Err = FamflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_matches('"');
        if let Some(rest) = s.strip_prefix("couple_") {
            let parsed = rest
                .split_once('_')
                .and_then(|(a, b)| Some((a.parse::<u32>().ok()?, b.parse::<u32>().ok()?)));
            return match parsed {
                Some((a, b)) => Ok(Self::Junction(CoupleKey::new(PersonId(a), PersonId(b)))),
                None => Err(FamflowError::layout(format!("malformed junction key '{s}'"))),
            };
        }
        s.parse::<u32>()
            .map(|id| Self::Person(PersonId(id)))
            .map_err(|_| FamflowError::layout(format!("unknown node key '{s}'")))
    }
}

/// Pixel-space box of one node (y grows downward).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeGeometry {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
}

impl NodeGeometry {
    /// Center point.
    pub fn center(&self) -> Point {
        Point::new(self.cx, self.cy)
    }

    /// Left edge x.
    pub fn left(&self) -> f64 {
        self.cx - self.width / 2.0
    }

    /// Right edge x.
    pub fn right(&self) -> f64 {
        self.cx + self.width / 2.0
    }

    /// Top edge y.
    pub fn top(&self) -> f64 {
        self.cy - self.height / 2.0
    }

    /// Bottom edge y.
    pub fn bottom(&self) -> f64 {
        self.cy + self.height / 2.0
    }

    /// Bounding rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.left(), self.top(), self.right(), self.bottom())
    }

    /// Return `true` for point-sized nodes, which are anchored at their center.
    pub fn is_point(&self) -> bool {
        self.width < POINT_NODE_EXTENT && self.height < POINT_NODE_EXTENT
    }

    /// Midpoint of the box side facing `toward`.
    ///
    /// The dominant axis of the displacement picks top/bottom versus left/right; ties go to the
    /// horizontal sides.
    pub fn border_point_toward(&self, toward: Point) -> Point {
        let dx = toward.x - self.cx;
        let dy = toward.y - self.cy;
        if dy.abs() > dx.abs() {
            if dy > 0.0 {
                Point::new(self.cx, self.bottom())
            } else {
                Point::new(self.cx, self.top())
            }
        } else if dx > 0.0 {
            Point::new(self.right(), self.cy)
        } else {
            Point::new(self.left(), self.cy)
        }
    }
}

/// One routed edge in pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeLayout {
    /// Tail node.
    pub tail: NodeKey,
    /// Head node.
    pub head: NodeKey,
    /// Ordered polyline.
    pub points: Vec<Point>,
}

impl EdgeLayout {
    /// Return `true` when the edge joins `a` and `b` in either direction.
    pub fn joins(&self, a: NodeKey, b: NodeKey) -> bool {
        (self.tail == a && self.head == b) || (self.tail == b && self.head == a)
    }

    /// Same edge with tail and head (and the polyline) swapped.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            tail: self.head,
            head: self.tail,
            points,
        }
    }
}

/// Solved graph in pixel space: extent, node boxes, and edge polylines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphLayout {
    /// Drawing width in pixels.
    pub width: f64,
    /// Drawing height in pixels.
    pub height: f64,
    /// Node boxes by key.
    pub nodes: BTreeMap<NodeKey, NodeGeometry>,
    /// Edges in solver output order.
    pub edges: Vec<EdgeLayout>,
}

impl GraphLayout {
    /// Geometry of `key`, if laid out.
    pub fn node(&self, key: NodeKey) -> Option<&NodeGeometry> {
        self.nodes.get(&key)
    }

    /// Geometry of a person box.
    pub fn person(&self, id: PersonId) -> Option<&NodeGeometry> {
        self.nodes.get(&NodeKey::Person(id))
    }

    /// Edges joining `a` and `b` in either direction, in layout order.
    pub fn edges_between(&self, a: NodeKey, b: NodeKey) -> impl Iterator<Item = &EdgeLayout> {
        self.edges.iter().filter(move |e| e.joins(a, b))
    }

    /// Replace each edge's first and last point with the matching node boundary point.
    ///
    /// Point-sized nodes and junctions anchor at their center. The direction an endpoint faces
    /// is taken from its inner neighbour when the edge has interior points; otherwise from the
    /// center of the node at the other end (or the untouched other endpoint when that node is
    /// unknown). Every input to the correction is therefore left unchanged by it, so running it
    /// again is a no-op.
    pub fn fix_edge_endpoints(&mut self) {
        let nodes = &self.nodes;
        for edge in &mut self.edges {
            let n = edge.points.len();
            if n == 0 {
                continue;
            }
            let tail = nodes.get(&edge.tail);
            let head = nodes.get(&edge.head);

            let tail_toward = if n > 2 {
                edge.points[1]
            } else {
                match head {
                    Some(h) => h.center(),
                    None if n == 2 => edge.points[1],
                    None => tail.map(NodeGeometry::center).unwrap_or(edge.points[0]),
                }
            };
            let head_toward = if n > 2 {
                edge.points[n - 2]
            } else {
                match tail {
                    Some(t) => t.center(),
                    None if n == 2 => edge.points[0],
                    None => head.map(NodeGeometry::center).unwrap_or(edge.points[0]),
                }
            };

            if let Some(t) = tail {
                edge.points[0] = anchor(edge.tail, t, tail_toward);
            }
            if let Some(h) = head {
                edge.points[n - 1] = anchor(edge.head, h, head_toward);
            }
        }
    }

    /// Scale every box width by `factor` about its center, then re-anchor edges.
    ///
    /// Point-sized nodes and junctions keep their width.
    pub fn scale_node_widths(&mut self, factor: f64) -> FamflowResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(FamflowError::validation(format!(
                "node width scale must be finite and > 0, got {factor}"
            )));
        }
        for (key, node) in &mut self.nodes {
            if !key.is_junction() && !node.is_point() {
                node.width *= factor;
            }
        }
        self.fix_edge_endpoints();
        Ok(())
    }
}

fn anchor(key: NodeKey, node: &NodeGeometry, toward: Point) -> Point {
    if key.is_junction() || node.is_point() {
        node.center()
    } else {
        node.border_point_toward(toward)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/graph.rs"]
mod tests;
