use crate::family::model::{CoupleKey, PersonId};
use crate::layout::graph::{EdgeLayout, GraphLayout, NodeKey};

/// Fuse the two marriage half-edges of `a` and `b` into one stroke from `a` to `b`.
///
/// Halves are looked up in either direction and oriented away from their person, so the merged
/// path runs `a -> junction -> b` with the shared junction point kept once. When only one half
/// exists it is returned alone (oriented person to junction); when neither does the result is
/// empty.
pub fn merge_marriage_edges(layout: &GraphLayout, a: PersonId, b: PersonId) -> Vec<EdgeLayout> {
    let junction = NodeKey::Junction(CoupleKey::new(a, b));
    let half = |id: PersonId| -> Option<EdgeLayout> {
        let person = NodeKey::Person(id);
        layout
            .edges_between(person, junction)
            .next()
            .map(|e| if e.tail == person { e.clone() } else { e.reversed() })
    };

    match (half(a), half(b)) {
        (Some(from_a), Some(from_b)) => {
            let mut points = from_a.points;
            // from_b runs b -> junction; walk it backwards and skip the junction point.
            points.extend(from_b.points.iter().rev().skip(1).copied());
            vec![EdgeLayout {
                tail: NodeKey::Person(a),
                head: NodeKey::Person(b),
                points,
            }]
        }
        (Some(only), None) | (None, Some(only)) => vec![only],
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/merge.rs"]
mod tests;
