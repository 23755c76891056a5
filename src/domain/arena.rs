use std::collections::{HashMap, HashSet};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::node::Node;

/// Identity key of a hierarchy node.
///
/// Entities (authors, people) are identified by their display name alone, so
/// two records naming the same string merge into one node. Grouping nodes
/// (series, fallback label) are scoped to the entity that owns them:
/// "Standalone" under one author is distinct from "Standalone" under another.
/// Members (books) are scoped to the node they attach under and never merge
/// with an entity of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    Entity(String),
    Group { owner: String, label: String },
    Member { scope: Box<NodeKey>, name: String },
}

impl NodeKey {
    pub fn entity(name: &str) -> Self {
        NodeKey::Entity(name.to_string())
    }

    pub fn group(owner: &str, label: &str) -> Self {
        NodeKey::Group {
            owner: owner.to_string(),
            label: label.to_string(),
        }
    }

    pub fn member(scope: &NodeKey, name: &str) -> Self {
        NodeKey::Member {
            scope: Box::new(scope.clone()),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Entity(name) => write!(f, "{}", name),
            NodeKey::Group { owner, label } => write!(f, "{}/{}", owner, label),
            NodeKey::Member { scope, name } => write!(f, "{}/{}", scope, name),
        }
    }
}

/// Node in the arena-based hierarchy.
#[derive(Debug)]
pub struct HierarchyNode {
    pub key: NodeKey,
    /// Display name, emitted as `name` in the output
    pub name: String,
    /// Indices of every node this one was attached under
    pub parents: Vec<Index>,
    /// Indices of child nodes, in attach order
    pub children: Vec<Index>,
}

/// Arena of deduplicated nodes with parent/child links.
///
/// Links may form a DAG (a node attached under two parents); the strict tree
/// is produced by [`HierarchyArena::materialize`], which copies shared
/// descendants once per occurrence.
#[derive(Debug, Default)]
pub struct HierarchyArena {
    arena: Arena<HierarchyNode>,
    index: HashMap<NodeKey, Index>,
    /// Insertion order, used for deterministic root ordering
    order: Vec<Index>,
}

impl HierarchyArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the node for `key`, creating it if absent.
    #[instrument(level = "trace", skip(self))]
    pub fn ensure(&mut self, key: NodeKey, name: &str) -> Index {
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.arena.insert(HierarchyNode {
            key: key.clone(),
            name: name.to_string(),
            parents: Vec::new(),
            children: Vec::new(),
        });
        self.index.insert(key, idx);
        self.order.push(idx);
        idx
    }

    /// Attach `child` under `parent` unless it is already there.
    ///
    /// Returns true if a new link was created.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, parent: Index, child: Index) -> bool {
        let already = self
            .arena
            .get(parent)
            .map(|p| p.children.contains(&child))
            .unwrap_or(true);
        if already {
            return false;
        }
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.arena.get_mut(child) {
            c.parents.push(parent);
        }
        true
    }

    pub fn get_node(&self, idx: Index) -> Option<&HierarchyNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Nodes never attached under another node, in insertion order.
    #[instrument(level = "debug", skip(self))]
    pub fn roots(&self) -> Vec<Index> {
        self.order
            .iter()
            .copied()
            .filter(|&idx| {
                self.arena
                    .get(idx)
                    .map(|n| n.parents.is_empty())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Copy the subtree under `idx` into an owned [`Node`].
    ///
    /// Fails with [`DomainError::CyclicAncestry`] if a node is reached again
    /// on its own descent path.
    ///
    /// Descent is recursive with no depth limit, so a chain deep enough to
    /// exhaust the thread stack aborts instead of returning an error.
    #[instrument(level = "debug", skip(self))]
    pub fn materialize(&self, idx: Index) -> DomainResult<Node> {
        let mut path = HashSet::new();
        let mut reached = HashSet::new();
        self.materialize_inner(idx, &mut path, &mut reached)
    }

    /// Materialize every root; fails if any node is unreachable from the roots,
    /// which only happens when it sits on (or below) a cycle.
    #[instrument(level = "debug", skip(self))]
    pub fn materialize_roots(&self) -> DomainResult<Vec<Node>> {
        let mut reached = HashSet::new();
        let mut nodes = Vec::new();
        for root in self.roots() {
            let mut path = HashSet::new();
            nodes.push(self.materialize_inner(root, &mut path, &mut reached)?);
        }
        if let Some(&stray) = self.order.iter().find(|idx| !reached.contains(*idx)) {
            let name = self
                .arena
                .get(stray)
                .map(|n| n.key.to_string())
                .unwrap_or_default();
            return Err(DomainError::CyclicAncestry(name));
        }
        Ok(nodes)
    }

    fn materialize_inner(
        &self,
        idx: Index,
        path: &mut HashSet<Index>,
        reached: &mut HashSet<Index>,
    ) -> DomainResult<Node> {
        let node = self
            .arena
            .get(idx)
            .ok_or_else(|| DomainError::CyclicAncestry(format!("{:?}", idx)))?;
        if !path.insert(idx) {
            return Err(DomainError::CyclicAncestry(node.key.to_string()));
        }
        reached.insert(idx);

        let mut children = Vec::with_capacity(node.children.len());
        for &child in &node.children {
            children.push(self.materialize_inner(child, path, reached)?);
        }

        path.remove(&idx);
        Ok(Node::with_children(node.name.clone(), children))
    }
}
