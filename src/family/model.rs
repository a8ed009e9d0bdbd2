use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;

use crate::foundation::error::{FamflowError, FamflowResult};

/// Unique identity of a person in the family graph.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub u32);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Biological sex as recorded in the source data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Sex {
    /// Male.
    #[serde(rename = "M", alias = "m")]
    Male,
    /// Female.
    #[serde(rename = "F", alias = "f")]
    Female,
}

/// One person record. Immutable once the [`FamilyGraph`] is built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Person {
    /// Unique identity.
    pub id: PersonId,
    /// Display name.
    pub name: String,
    /// Birth date (`YYYY-MM-DD`).
    pub birth_date: chrono::NaiveDate,
    /// Recorded sex.
    pub sex: Sex,
    /// Zero, one or two parent identities, in source order.
    #[serde(default)]
    pub parent_ids: Vec<PersonId>,
    /// Spouse identity, if married.
    #[serde(default)]
    pub spouse_id: Option<PersonId>,
    /// Open-ended extra attributes.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Person {
    /// Build a parentless, unmarried person with no metadata.
    pub fn new(
        id: PersonId,
        name: impl Into<String>,
        birth_date: chrono::NaiveDate,
        sex: Sex,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            birth_date,
            sex,
            parent_ids: Vec::new(),
            spouse_id: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Replace the recorded parents.
    pub fn with_parents(mut self, parents: impl IntoIterator<Item = PersonId>) -> Self {
        self.parent_ids = parents.into_iter().collect();
        self
    }

    /// Set the spouse.
    pub fn with_spouse(mut self, spouse: PersonId) -> Self {
        self.spouse_id = Some(spouse);
        self
    }

    /// Return `true` when the person has no recorded parents.
    pub fn is_parentless(&self) -> bool {
        self.parent_ids.is_empty()
    }
}

/// Unordered married pair, stored as `(min, max)`.
///
/// Doubles as the identity of the synthetic marriage junction in layouts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct CoupleKey {
    /// Lower identity of the pair.
    pub lo: PersonId,
    /// Higher identity of the pair.
    pub hi: PersonId,
}

impl CoupleKey {
    /// Build the key for a pair in either order.
    pub fn new(a: PersonId, b: PersonId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Return `true` when `id` is one of the two spouses.
    pub fn contains(self, id: PersonId) -> bool {
        self.lo == id || self.hi == id
    }

    /// The spouse of `id` within this couple.
    pub fn partner_of(self, id: PersonId) -> Option<PersonId> {
        if id == self.lo {
            Some(self.hi)
        } else if id == self.hi {
            Some(self.lo)
        } else {
            None
        }
    }
}

impl fmt::Display for CoupleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "couple_{}_{}", self.lo, self.hi)
    }
}

#[derive(serde::Deserialize)]
struct FamilyFile {
    persons: Vec<Person>,
}

/// Validated, read-only family graph.
///
/// Construction enforces referential integrity and acyclic parentage, so every later stage can
/// assume both. Iteration order is ingestion order.
#[derive(Clone, Debug)]
pub struct FamilyGraph {
    persons: IndexMap<PersonId, Person>,
    children: HashMap<PersonId, Vec<PersonId>>,
}

impl FamilyGraph {
    /// Build and validate a graph from person records in ingestion order.
    pub fn new(persons: impl IntoIterator<Item = Person>) -> FamflowResult<Self> {
        let mut map = IndexMap::<PersonId, Person>::new();
        for person in persons {
            if map.contains_key(&person.id) {
                return Err(FamflowError::graph(format!(
                    "duplicate person id {}",
                    person.id
                )));
            }
            map.insert(person.id, person);
        }

        let mut errors = Vec::<String>::new();
        for p in map.values() {
            if p.parent_ids.len() > 2 {
                errors.push(format!(
                    "person {} ({}) lists {} parents, at most 2 are allowed",
                    p.id,
                    p.name,
                    p.parent_ids.len()
                ));
            }
            let mut seen = BTreeSet::new();
            for pid in &p.parent_ids {
                if *pid == p.id {
                    errors.push(format!("person {} ({}) is listed as own parent", p.id, p.name));
                } else if !map.contains_key(pid) {
                    errors.push(format!(
                        "person {} ({}): parent id {} does not exist",
                        p.id, p.name, pid
                    ));
                }
                if !seen.insert(*pid) {
                    errors.push(format!(
                        "person {} ({}): parent id {} is listed twice",
                        p.id, p.name, pid
                    ));
                }
            }
            if let Some(sid) = p.spouse_id {
                if sid == p.id {
                    errors.push(format!("person {} ({}) is listed as own spouse", p.id, p.name));
                } else if !map.contains_key(&sid) {
                    errors.push(format!(
                        "person {} ({}): spouse id {} does not exist",
                        p.id, p.name, sid
                    ));
                }
            }
        }
        if !errors.is_empty() {
            return Err(FamflowError::graph(format!(
                "referential integrity errors:\n{}",
                errors
                    .iter()
                    .map(|e| format!("  - {e}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            )));
        }

        let mut children = HashMap::<PersonId, Vec<PersonId>>::new();
        for p in map.values() {
            for pid in &p.parent_ids {
                children.entry(*pid).or_default().push(p.id);
            }
        }

        let graph = Self {
            persons: map,
            children,
        };
        graph.reject_parentage_cycles()?;
        Ok(graph)
    }

    /// Parse a JSON family document (`{"persons": [...]}`).
    pub fn from_json_str(s: &str) -> FamflowResult<Self> {
        let file: FamilyFile = serde_json::from_str(s)
            .map_err(|e| FamflowError::serde(format!("invalid family JSON: {e}")))?;
        Self::new(file.persons)
    }

    /// Read and parse a JSON family document from disk.
    pub fn from_path(path: &Path) -> FamflowResult<Self> {
        use anyhow::Context as _;
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read family file '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Number of people.
    pub fn len(&self) -> usize {
        self.persons.len()
    }

    /// Return `true` when the graph has no people.
    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Look up a person by identity.
    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    /// Return `true` when `id` is part of the graph.
    pub fn contains(&self, id: PersonId) -> bool {
        self.persons.contains_key(&id)
    }

    /// People in ingestion order.
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    /// All identities in ascending order.
    pub fn ids(&self) -> Vec<PersonId> {
        let mut ids: Vec<_> = self.persons.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Recorded parents of `id` (in source order).
    pub fn parents_of(&self, id: PersonId) -> Vec<&Person> {
        self.get(id)
            .map(|p| p.parent_ids.iter().filter_map(|pid| self.get(*pid)).collect())
            .unwrap_or_default()
    }

    /// Children of `id`, in ingestion order.
    pub fn children_of(&self, id: PersonId) -> Vec<&Person> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.get(*c)).collect())
            .unwrap_or_default()
    }

    /// Spouse of `id`, if any.
    pub fn spouse_of(&self, id: PersonId) -> Option<&Person> {
        self.get(id)?.spouse_id.and_then(|sid| self.get(sid))
    }

    /// Children that list both `a` and `b` as parents, in ingestion order.
    pub fn couple_children(&self, a: PersonId, b: PersonId) -> Vec<&Person> {
        self.children
            .get(&a)
            .map(|ids| {
                ids.iter()
                    .filter_map(|c| self.get(*c))
                    .filter(|c| c.parent_ids.contains(&b))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every married pair, deduplicated, ascending by couple key.
    pub fn couples(&self) -> Vec<CoupleKey> {
        let set: BTreeSet<CoupleKey> = self
            .persons
            .values()
            .filter_map(|p| p.spouse_id.map(|sid| CoupleKey::new(p.id, sid)))
            .collect();
        set.into_iter().collect()
    }

    fn reject_parentage_cycles(&self) -> FamflowResult<()> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Visiting,
            Done,
        }

        // Iterative DFS over child -> parent links.
        let mut marks = HashMap::<PersonId, Mark>::with_capacity(self.persons.len());
        for root in self.persons.keys().copied() {
            if marks.contains_key(&root) {
                continue;
            }
            let mut stack: Vec<(PersonId, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::Visiting);
            while let Some(top) = stack.last_mut() {
                let (id, next) = *top;
                top.1 += 1;
                let parents = self
                    .persons
                    .get(&id)
                    .map(|p| p.parent_ids.as_slice())
                    .unwrap_or(&[]);
                if let Some(&pid) = parents.get(next) {
                    match marks.get(&pid) {
                        Some(Mark::Visiting) => {
                            return Err(FamflowError::graph(format!(
                                "parentage cycle: person {pid} is their own ancestor"
                            )));
                        }
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(pid, Mark::Visiting);
                            stack.push((pid, 0));
                        }
                    }
                } else {
                    marks.insert(id, Mark::Done);
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/family/model.rs"]
mod tests;
