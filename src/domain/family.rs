//! Union-tree builder for family trees.
//!
//! A [`Union`] records two parents and one child. Building descends from a
//! root person: each couple the person belongs to becomes a `union` node whose
//! children are the subtrees of that couple's children.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::record::Record;

/// A person as read from the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub person_id: i64,
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birthdate: Option<NaiveDate>,
}

impl Person {
    pub fn new(person_id: i64, name: &str) -> Self {
        Self {
            person_id,
            name: name.to_string(),
            gender: None,
            birthdate: None,
        }
    }

    pub fn with_gender(mut self, gender: &str) -> Self {
        self.gender = Some(gender.to_string());
        self
    }

    pub fn from_record(record: &Record) -> DomainResult<Self> {
        let birthdate = match record.optional_str("birthdate")? {
            Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
                DomainError::MalformedRecord {
                    field: "birthdate".to_string(),
                    reason: format!("'{}' is not a date: {}", raw, e),
                }
            })?),
            None => None,
        };
        Ok(Self {
            person_id: record.require_int("person_id")?,
            name: record.require_str("name")?.to_string(),
            gender: record.optional_str("gender")?.map(str::to_string),
            birthdate,
        })
    }
}

/// Two parents and one child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Union {
    pub parent1_id: i64,
    pub parent2_id: i64,
    pub child_id: i64,
}

impl Union {
    pub fn new(parent1_id: i64, parent2_id: i64, child_id: i64) -> Self {
        Self {
            parent1_id,
            parent2_id,
            child_id,
        }
    }

    pub fn from_record(record: &Record) -> DomainResult<Self> {
        Ok(Self {
            parent1_id: record.require_int("parent1_id")?,
            parent2_id: record.require_int("parent2_id")?,
            child_id: record.require_int("child_id")?,
        })
    }

    /// Parent pair with the smaller id first, so (1, 2) and (2, 1) compare equal.
    pub fn couple(&self) -> (i64, i64) {
        if self.parent1_id <= self.parent2_id {
            (self.parent1_id, self.parent2_id)
        } else {
            (self.parent2_id, self.parent1_id)
        }
    }
}

/// Validated people and unions, indexed for descent.
///
/// Construction enforces the integrity rules: every union references known
/// people, a child has at most one distinct union, and a union's parents are
/// two different people.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    people: BTreeMap<i64, Person>,
    by_child: BTreeMap<i64, Union>,
    /// Children per parent, in union input order
    by_parent: HashMap<i64, Vec<i64>>,
}

impl FamilyGraph {
    #[instrument(level = "debug", skip_all)]
    pub fn new(
        people: impl IntoIterator<Item = Person>,
        unions: impl IntoIterator<Item = Union>,
    ) -> DomainResult<Self> {
        let mut graph = FamilyGraph::default();

        for person in people {
            match graph.people.get(&person.person_id) {
                Some(existing) if *existing != person => {
                    return Err(DomainError::MalformedRecord {
                        field: "person_id".to_string(),
                        reason: format!("{} is used by more than one person", person.person_id),
                    });
                }
                Some(_) => continue,
                None => {
                    graph.people.insert(person.person_id, person);
                }
            }
        }

        for union in unions {
            graph.add_union(union)?;
        }

        debug!(
            "family graph: {} people, {} unions",
            graph.people.len(),
            graph.by_child.len()
        );
        Ok(graph)
    }

    pub fn from_records(people: &[Record], unions: &[Record]) -> DomainResult<Self> {
        let people = people
            .iter()
            .map(Person::from_record)
            .collect::<DomainResult<Vec<_>>>()?;
        let unions = unions
            .iter()
            .map(Union::from_record)
            .collect::<DomainResult<Vec<_>>>()?;
        Self::new(people, unions)
    }

    fn add_union(&mut self, union: Union) -> DomainResult<()> {
        for person_id in [union.parent1_id, union.parent2_id, union.child_id] {
            if !self.people.contains_key(&person_id) {
                return Err(DomainError::UnresolvedReference {
                    child_id: union.child_id,
                    person_id,
                });
            }
        }
        if union.parent1_id == union.parent2_id {
            return Err(DomainError::MalformedRecord {
                field: "parent2_id".to_string(),
                reason: format!("repeats parent1_id {} for child {}", union.parent1_id, union.child_id),
            });
        }

        if let Some(existing) = self.by_child.get(&union.child_id) {
            if existing.couple() == union.couple() {
                return Ok(());
            }
            return Err(DomainError::AmbiguousUnion {
                child_id: union.child_id,
                first: existing.couple(),
                second: union.couple(),
            });
        }

        self.by_child.insert(union.child_id, union);
        for parent in [union.parent1_id, union.parent2_id] {
            self.by_parent.entry(parent).or_default().push(union.child_id);
        }
        Ok(())
    }

    pub fn person(&self, person_id: i64) -> Option<&Person> {
        self.people.get(&person_id)
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.people.values()
    }

    /// The union in which `child_id` is the child.
    pub fn incoming_union(&self, child_id: i64) -> Option<&Union> {
        self.by_child.get(&child_id)
    }

    /// Unions in which `person_id` is a parent, in input order.
    pub fn outgoing_unions(&self, person_id: i64) -> Vec<&Union> {
        self.by_parent
            .get(&person_id)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child| self.by_child.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Outgoing unions grouped by couple, couples in first-seen order.
    ///
    /// Each group carries the first union recorded for the couple, which
    /// fixes the order its parents are shown in.
    fn couples_of(&self, person_id: i64) -> Vec<(Union, Vec<i64>)> {
        let mut couples: Vec<(Union, Vec<i64>)> = Vec::new();
        for union in self.outgoing_unions(person_id) {
            match couples
                .iter_mut()
                .find(|(first, _)| first.couple() == union.couple())
            {
                Some((_, children)) => children.push(union.child_id),
                None => couples.push((*union, vec![union.child_id])),
            }
        }
        couples
    }
}

/// Person as a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonNode {
    pub person_id: i64,
    pub name: String,
    pub gender: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub children: Vec<FamilyNode>,
}

impl PersonNode {
    fn leaf(person: &Person) -> Self {
        Self {
            person_id: person.person_id,
            name: person.name.clone(),
            gender: person.gender.clone(),
            birthdate: person.birthdate,
            children: Vec::new(),
        }
    }
}

/// Couple as a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnionNode {
    /// Display label, e.g. "Alice & Bob"
    pub name: String,
    /// Parents in the order the couple's first union recorded them
    pub parents: [Person; 2],
    pub children: Vec<FamilyNode>,
}

/// Synthetic wrapper holding several roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupNode {
    pub name: String,
    pub children: Vec<FamilyNode>,
}

/// Node of a family tree, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FamilyNode {
    Person(PersonNode),
    Union(UnionNode),
    Group(GroupNode),
}

impl FamilyNode {
    pub fn name(&self) -> &str {
        match self {
            FamilyNode::Person(p) => &p.name,
            FamilyNode::Union(u) => &u.name,
            FamilyNode::Group(g) => &g.name,
        }
    }

    pub fn children(&self) -> &[FamilyNode] {
        match self {
            FamilyNode::Person(p) => &p.children,
            FamilyNode::Union(u) => &u.children,
            FamilyNode::Group(g) => &g.children,
        }
    }

    pub fn as_union(&self) -> Option<&UnionNode> {
        match self {
            FamilyNode::Union(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_person(&self) -> Option<&PersonNode> {
        match self {
            FamilyNode::Person(p) => Some(p),
            _ => None,
        }
    }

    /// Number of levels, a single node being depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(FamilyNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Labels used by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyConfig {
    /// Name of the wrapper when there is not exactly one root
    pub sentinel: String,
    /// Joins the two parent names of a union label
    pub couple_separator: String,
}

impl Default for FamilyConfig {
    fn default() -> Self {
        Self {
            sentinel: "Family Tree".to_string(),
            couple_separator: " & ".to_string(),
        }
    }
}

/// Per-build traversal state.
#[derive(Default)]
struct Walk {
    /// People on the current descent path
    path: HashSet<i64>,
    /// Everyone emitted so far, as a node or as a union parent
    reached: HashSet<i64>,
}

/// Builds family trees from a validated [`FamilyGraph`].
///
/// Descent recurses once per generation without a depth limit; a chain deep
/// enough to exhaust the thread stack aborts rather than failing with a
/// [`DomainError`].
pub struct UnionTreeBuilder<'a> {
    graph: &'a FamilyGraph,
    config: FamilyConfig,
}

impl<'a> UnionTreeBuilder<'a> {
    pub fn new(graph: &'a FamilyGraph) -> Self {
        Self {
            graph,
            config: FamilyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: FamilyConfig) -> Self {
        self.config = config;
        self
    }

    /// Descend from `root_id`.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&self, root_id: i64) -> DomainResult<FamilyNode> {
        if self.graph.person(root_id).is_none() {
            return Err(DomainError::RootNotFound(root_id));
        }
        let mut walk = Walk::default();
        self.subtree(root_id, &mut walk)
    }

    /// Build every tree in the graph.
    ///
    /// Root candidates are people who are never a child. A couple is emitted
    /// once, under the first root that belongs to it; a couple whose other
    /// parent has recorded parents is left to that partner's ancestry. One
    /// candidate is returned unwrapped, otherwise the sentinel wraps them all.
    #[instrument(level = "debug", skip(self))]
    pub fn build_forest(&self) -> DomainResult<FamilyNode> {
        let mut walk = Walk::default();
        let mut emitted: HashSet<(i64, i64)> = HashSet::new();
        let mut roots = Vec::new();

        let candidates: Vec<&Person> = self
            .graph
            .people()
            .filter(|p| self.graph.incoming_union(p.person_id).is_none())
            .collect();

        for person in candidates {
            let id = person.person_id;
            let couples: Vec<_> = self
                .graph
                .couples_of(id)
                .into_iter()
                .filter(|(first, _)| !emitted.contains(&first.couple()))
                .filter(|(first, _)| {
                    let partner = if first.parent1_id == id {
                        first.parent2_id
                    } else {
                        first.parent1_id
                    };
                    self.graph.incoming_union(partner).is_none()
                })
                .collect();

            if couples.is_empty() {
                if self.graph.outgoing_unions(id).is_empty() {
                    walk.reached.insert(id);
                    roots.push(FamilyNode::Person(PersonNode::leaf(person)));
                }
                continue;
            }

            emitted.extend(couples.iter().map(|(first, _)| first.couple()));
            walk.path.insert(id);
            walk.reached.insert(id);
            let mut unions = Vec::with_capacity(couples.len());
            for (first, children) in couples {
                unions.push(self.union_node(&first, &children, &mut walk)?);
            }
            walk.path.remove(&id);
            roots.push(self.collapse(person, unions));
        }

        if let Some(stray) = self
            .graph
            .people()
            .find(|p| !walk.reached.contains(&p.person_id))
        {
            warn!("person {} is unreachable from any root", stray.person_id);
            return Err(DomainError::CyclicAncestry(stray.person_id.to_string()));
        }

        debug!("family forest with {} roots", roots.len());
        if roots.len() == 1 {
            return Ok(roots.remove(0));
        }
        Ok(FamilyNode::Group(GroupNode {
            name: self.config.sentinel.clone(),
            children: roots,
        }))
    }

    fn subtree(&self, person_id: i64, walk: &mut Walk) -> DomainResult<FamilyNode> {
        let person = self
            .graph
            .person(person_id)
            .ok_or(DomainError::RootNotFound(person_id))?;
        if !walk.path.insert(person_id) {
            return Err(DomainError::CyclicAncestry(person_id.to_string()));
        }
        walk.reached.insert(person_id);

        let mut unions = Vec::new();
        for (first, children) in self.graph.couples_of(person_id) {
            unions.push(self.union_node(&first, &children, walk)?);
        }

        walk.path.remove(&person_id);
        Ok(self.collapse(person, unions))
    }

    /// No unions: a person leaf. One: the union itself. Several: the person
    /// with one union child per partner.
    fn collapse(&self, person: &Person, mut unions: Vec<FamilyNode>) -> FamilyNode {
        match unions.len() {
            0 => FamilyNode::Person(PersonNode::leaf(person)),
            1 => unions.remove(0),
            _ => FamilyNode::Person(PersonNode {
                children: unions,
                ..PersonNode::leaf(person)
            }),
        }
    }

    fn union_node(
        &self,
        first: &Union,
        children: &[i64],
        walk: &mut Walk,
    ) -> DomainResult<FamilyNode> {
        let first_child = children.first().copied().unwrap_or_default();
        let resolve = |id: i64| {
            self.graph
                .person(id)
                .cloned()
                .ok_or(DomainError::UnresolvedReference {
                    child_id: first_child,
                    person_id: id,
                })
        };
        let parents = [resolve(first.parent1_id)?, resolve(first.parent2_id)?];
        walk.reached.insert(first.parent1_id);
        walk.reached.insert(first.parent2_id);

        let mut nodes = Vec::with_capacity(children.len());
        for &child in children {
            nodes.push(self.subtree(child, walk)?);
        }

        Ok(FamilyNode::Union(UnionNode {
            name: format!(
                "{}{}{}",
                parents[0].name, self.config.couple_separator, parents[1].name
            ),
            parents,
            children: nodes,
        }))
    }
}

/// Build the tree below `root_id` with default labels.
pub fn build_family_tree(graph: &FamilyGraph, root_id: i64) -> DomainResult<FamilyNode> {
    UnionTreeBuilder::new(graph).build(root_id)
}
