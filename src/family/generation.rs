use std::collections::{BTreeMap, VecDeque};

use crate::family::model::{FamilyGraph, PersonId};

/// Generation depth per person: 0 for the parentless, `max(parents) + 1` otherwise, equalized
/// across spouses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationMap {
    depths: BTreeMap<PersonId, u32>,
}

impl GenerationMap {
    /// Depth of `id`, if resolved.
    pub fn get(&self, id: PersonId) -> Option<u32> {
        self.depths.get(&id).copied()
    }

    /// `(id, depth)` pairs in ascending identity order.
    pub fn iter(&self) -> impl Iterator<Item = (PersonId, u32)> + '_ {
        self.depths.iter().map(|(k, v)| (*k, *v))
    }

    /// Number of resolved people.
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    /// Return `true` when no depth is resolved.
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Deepest generation, or 0 for an empty map.
    pub fn max_depth(&self) -> u32 {
        self.depths.values().copied().max().unwrap_or(0)
    }

    /// People at exactly `depth`, ascending.
    pub fn members(&self, depth: u32) -> Vec<PersonId> {
        self.depths
            .iter()
            .filter(|(_, d)| **d == depth)
            .map(|(id, _)| *id)
            .collect()
    }
}

/// Assign every person a generation depth.
///
/// Two relaxation passes over explicit worklists:
///
/// 1. parent -> child: seeded with the parentless at depth 0; a person is (re)computed once all
///    parents have a depth, and their children are re-queued whenever the value changes.
/// 2. spouse equalization: both spouses are raised to the larger depth; a raised spouse is
///    re-queued so chained marriages settle.
///
/// Pass 2 does not push raised depths down to descendants.
#[tracing::instrument(skip(graph), fields(people = graph.len()))]
pub fn resolve_generations(graph: &FamilyGraph) -> GenerationMap {
    let mut depths = BTreeMap::<PersonId, u32>::new();
    let mut queue = VecDeque::<PersonId>::new();

    for id in graph.ids() {
        let Some(p) = graph.get(id) else { continue };
        if p.is_parentless() {
            depths.insert(id, 0);
            queue.extend(graph.children_of(id).iter().map(|c| c.id));
        }
    }

    while let Some(id) = queue.pop_front() {
        let Some(p) = graph.get(id) else { continue };
        let parent_depths: Option<Vec<u32>> =
            p.parent_ids.iter().map(|pid| depths.get(pid).copied()).collect();
        let Some(parent_depths) = parent_depths else {
            // Re-queued by the last parent to resolve.
            continue;
        };
        let depth = parent_depths.iter().copied().max().unwrap_or(0) + 1;
        if depths.get(&id) != Some(&depth) {
            depths.insert(id, depth);
            queue.extend(graph.children_of(id).iter().map(|c| c.id));
        }
    }

    let mut spouse_queue: VecDeque<PersonId> = graph
        .ids()
        .into_iter()
        .filter(|id| graph.get(*id).is_some_and(|p| p.spouse_id.is_some()))
        .collect();
    while let Some(id) = spouse_queue.pop_front() {
        let Some(sid) = graph.get(id).and_then(|p| p.spouse_id) else {
            continue;
        };
        let (Some(a), Some(b)) = (depths.get(&id).copied(), depths.get(&sid).copied()) else {
            continue;
        };
        let max = a.max(b);
        if a != max {
            depths.insert(id, max);
            spouse_queue.push_back(id);
        }
        if b != max {
            depths.insert(sid, max);
            spouse_queue.push_back(sid);
        }
    }

    tracing::debug!(
        resolved = depths.len(),
        max_depth = depths.values().max().copied().unwrap_or(0),
        "generations resolved"
    );
    GenerationMap { depths }
}

#[cfg(test)]
#[path = "../../tests/unit/family/generation.rs"]
mod tests;
