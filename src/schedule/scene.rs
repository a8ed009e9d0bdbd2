use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::family::generation::GenerationMap;
use crate::family::model::{CoupleKey, FamilyGraph, PersonId};

/// How people are grouped into reveal steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePolicy {
    /// Roots first, then generation by generation: siblings together, spouses one by one.
    #[default]
    Generational,
    /// One person per scene in ingestion order.
    Enumeration,
}

/// Ordered, disjoint groups of people revealed together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneList {
    scenes: Vec<Vec<PersonId>>,
}

impl SceneList {
    /// Wrap pre-built scenes. Empty groups are dropped.
    pub fn new(scenes: Vec<Vec<PersonId>>) -> Self {
        Self {
            scenes: scenes.into_iter().filter(|s| !s.is_empty()).collect(),
        }
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Return `true` when there are no scenes.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Scenes in reveal order.
    pub fn iter(&self) -> impl Iterator<Item = &[PersonId]> {
        self.scenes.iter().map(Vec::as_slice)
    }

    /// Plain nested vectors, handy for comparisons.
    pub fn to_vecs(&self) -> Vec<Vec<u32>> {
        self.scenes
            .iter()
            .map(|s| s.iter().map(|id| id.0).collect())
            .collect()
    }

    /// Return `true` when every person of `graph` appears in exactly one scene and nothing else
    /// does.
    pub fn is_partition_of(&self, graph: &FamilyGraph) -> bool {
        let mut seen = HashSet::with_capacity(graph.len());
        for id in self.scenes.iter().flatten() {
            if !graph.contains(*id) || !seen.insert(*id) {
                return false;
            }
        }
        seen.len() == graph.len()
    }
}

/// Order every person of `graph` into reveal scenes under `policy`.
#[tracing::instrument(skip(graph, generations), fields(people = graph.len()))]
pub fn schedule_scenes(
    graph: &FamilyGraph,
    generations: &GenerationMap,
    policy: SchedulePolicy,
) -> SceneList {
    let scenes = match policy {
        SchedulePolicy::Generational => GenerationalScheduler::new(graph, generations).run(),
        SchedulePolicy::Enumeration => SceneList::new(graph.persons().map(|p| vec![p.id]).collect()),
    };
    tracing::debug!(scenes = scenes.len(), ?policy, "scenes scheduled");
    scenes
}

struct GenerationalScheduler<'a> {
    graph: &'a FamilyGraph,
    generations: &'a GenerationMap,
    shown: HashSet<PersonId>,
    scenes: Vec<Vec<PersonId>>,
}

impl<'a> GenerationalScheduler<'a> {
    fn new(graph: &'a FamilyGraph, generations: &'a GenerationMap) -> Self {
        Self {
            graph,
            generations,
            shown: HashSet::with_capacity(graph.len()),
            scenes: Vec::new(),
        }
    }

    fn run(mut self) -> SceneList {
        let (roots, root_spouses) = self.classify_roots();
        for id in roots.into_iter().chain(root_spouses) {
            self.emit(vec![id]);
        }

        let max_depth = self.generations.max_depth();
        for depth in 0..=max_depth {
            self.couple_round(depth);
        }

        // Fallbacks only apply once the couple rule has nobody left to reach.
        loop {
            while self.couple_round(max_depth) {}
            let revealed = self.reveal_other_children();
            if !revealed.is_empty() {
                self.reveal_spouses_of(&revealed);
                continue;
            }
            let Some(next) = self.graph.ids().into_iter().find(|id| !self.shown.contains(id))
            else {
                break;
            };
            self.emit(vec![next]);
        }
        SceneList::new(self.scenes)
    }

    /// Couple children at `depth`, then their spouses. Return `true` if anyone was shown.
    fn couple_round(&mut self, depth: u32) -> bool {
        let revealed = self.reveal_couple_children(depth);
        self.reveal_spouses_of(&revealed);
        !revealed.is_empty()
    }

    /// Split parentless people into roots and deferred root spouses, both ascending.
    ///
    /// When both spouses of a couple are parentless the lower identity is the root. A parentless
    /// person married to someone with parents is left for the spouse rule.
    fn classify_roots(&self) -> (Vec<PersonId>, Vec<PersonId>) {
        let mut roots = Vec::new();
        let mut root_spouses = Vec::new();
        for id in self.graph.ids() {
            let Some(p) = self.graph.get(id) else { continue };
            if !p.is_parentless() {
                continue;
            }
            match self.graph.spouse_of(id) {
                Some(s) if !s.is_parentless() => {}
                Some(s) if id > s.id => root_spouses.push(id),
                _ => roots.push(id),
            }
        }
        (roots, root_spouses)
    }

    /// One scene per shown couple at or above `depth`, holding its unshown common children.
    fn reveal_couple_children(&mut self, depth: u32) -> Vec<PersonId> {
        let couples: Vec<CoupleKey> = self
            .graph
            .couples()
            .into_iter()
            .filter(|c| {
                self.shown.contains(&c.lo)
                    && self.shown.contains(&c.hi)
                    && self.generations.get(c.lo).is_some_and(|d| d <= depth)
            })
            .collect();

        let mut revealed = Vec::new();
        for couple in couples {
            let mut kids: Vec<PersonId> = self
                .graph
                .couple_children(couple.lo, couple.hi)
                .iter()
                .map(|c| c.id)
                .filter(|id| !self.shown.contains(id))
                .collect();
            if kids.is_empty() {
                continue;
            }
            kids.sort_unstable();
            revealed.extend_from_slice(&kids);
            self.emit(kids);
        }
        revealed
    }

    /// Children whose parents are all shown but are not a married pair, grouped by parent set.
    fn reveal_other_children(&mut self) -> Vec<PersonId> {
        let mut groups = BTreeMap::<Vec<PersonId>, Vec<PersonId>>::new();
        for id in self.graph.ids() {
            if self.shown.contains(&id) {
                continue;
            }
            let Some(p) = self.graph.get(id) else { continue };
            if p.is_parentless() || !p.parent_ids.iter().all(|pid| self.shown.contains(pid)) {
                continue;
            }
            if self.has_married_parents(&p.parent_ids) {
                continue;
            }
            let mut key = p.parent_ids.clone();
            key.sort_unstable();
            groups.entry(key).or_default().push(id);
        }

        let mut revealed = Vec::new();
        for (_, kids) in groups {
            revealed.extend_from_slice(&kids);
            self.emit(kids);
        }
        revealed
    }

    fn reveal_spouses_of(&mut self, revealed: &[PersonId]) {
        for id in revealed {
            if let Some(sid) = self.graph.get(*id).and_then(|p| p.spouse_id)
                && !self.shown.contains(&sid)
            {
                self.emit(vec![sid]);
            }
        }
    }

    fn has_married_parents(&self, parents: &[PersonId]) -> bool {
        match parents {
            [a, b] => self.graph.get(*a).and_then(|p| p.spouse_id) == Some(*b),
            _ => false,
        }
    }

    fn emit(&mut self, group: Vec<PersonId>) {
        let group: Vec<PersonId> = group
            .into_iter()
            .filter(|id| self.shown.insert(*id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if !group.is_empty() {
            self.scenes.push(group);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scene.rs"]
mod tests;
