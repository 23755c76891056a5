//! Flat-to-tree reducer.
//!
//! Turns a sequence of (parent, child[, group]) records into a strict tree of
//! [`Node`]s. Nodes are deduplicated by [`NodeKey`]; a grouping node, when the
//! field map names one, is interposed between parent and child. Under
//! [`ChildScope::Member`] a child is keyed by the node it attaches under, so
//! a book titled like an author stays a separate leaf.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use crate::domain::arena::{HierarchyArena, NodeKey};
use crate::domain::error::DomainResult;
use crate::domain::node::Node;
use crate::domain::record::{FieldMap, Record, Relation};

/// What to return when root detection yields exactly one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootPolicy {
    /// Always wrap the roots in the sentinel node.
    AlwaysWrap,
    /// Return a single root unwrapped; wrap zero or several.
    CollapseSingle,
}

/// Identity namespace of the child side of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildScope {
    /// Children share the parents' namespace and may be parents themselves.
    Shared,
    /// Children belong to the node they attach under.
    Member,
}

/// Reducer parameters: which fields to read and how to label synthetic nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducerConfig {
    pub fields: FieldMap,
    /// Name of the synthetic wrapper node
    pub sentinel: String,
    /// Label for children whose group field is null; `None` attaches them
    /// directly to the parent
    pub fallback_label: Option<String>,
    pub root_policy: RootPolicy,
    pub child_scope: ChildScope,
}

impl ReducerConfig {
    /// Author → series → book, always wrapped in "Library".
    pub fn library() -> Self {
        Self {
            fields: FieldMap::new("author", "book").grouped_by("series"),
            sentinel: "Library".to_string(),
            fallback_label: Some("Standalone".to_string()),
            root_policy: RootPolicy::AlwaysWrap,
            child_scope: ChildScope::Member,
        }
    }

    /// Person → descendant, single root unwrapped.
    pub fn lineage() -> Self {
        Self {
            fields: FieldMap::new("p", "descendant"),
            sentinel: "Tree".to_string(),
            fallback_label: None,
            root_policy: RootPolicy::CollapseSingle,
            child_scope: ChildScope::Shared,
        }
    }

    pub fn with_sentinel(mut self, sentinel: &str) -> Self {
        self.sentinel = sentinel.to_string();
        self
    }

    pub fn with_fallback_label(mut self, label: Option<&str>) -> Self {
        self.fallback_label = label.map(str::to_string);
        self
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_root_policy(mut self, policy: RootPolicy) -> Self {
        self.root_policy = policy;
        self
    }

    pub fn with_child_scope(mut self, scope: ChildScope) -> Self {
        self.child_scope = scope;
        self
    }
}

/// Reduce raw records. Every record is validated before any reshaping.
#[instrument(level = "debug", skip(records, config), fields(records = records.len()))]
pub fn reduce(records: &[Record], config: &ReducerConfig) -> DomainResult<Node> {
    let relations = records
        .iter()
        .map(|r| config.fields.extract(r))
        .collect::<DomainResult<Vec<_>>>()?;
    reduce_relations(&relations, config)
}

/// Reduce already-validated relations.
#[instrument(level = "debug", skip(relations, config), fields(relations = relations.len()))]
pub fn reduce_relations(relations: &[Relation], config: &ReducerConfig) -> DomainResult<Node> {
    if relations.is_empty() {
        warn!("no relations to reduce, returning empty '{}'", config.sentinel);
    }

    let mut arena = HierarchyArena::new();
    for relation in relations {
        let parent_key = NodeKey::entity(&relation.parent);
        let parent = arena.ensure(parent_key.clone(), &relation.parent);

        let (target, target_key) = match group_label(relation, config) {
            Some(label) => {
                let key = NodeKey::group(&relation.parent, label);
                let group = arena.ensure(key.clone(), label);
                arena.attach(parent, group);
                (group, key)
            }
            None => (parent, parent_key),
        };
        let child_key = match config.child_scope {
            ChildScope::Shared => NodeKey::entity(&relation.child),
            ChildScope::Member => NodeKey::member(&target_key, &relation.child),
        };
        let child = arena.ensure(child_key, &relation.child);
        if arena.attach(target, child) {
            trace!("attached '{}' under '{}'", relation.child, relation.parent);
        }
    }

    let mut roots = arena.materialize_roots()?;
    debug!("reduced {} nodes into {} roots", arena.len(), roots.len());

    match (config.root_policy, roots.len()) {
        (RootPolicy::CollapseSingle, 1) => Ok(roots.remove(0)),
        _ => Ok(Node::with_children(config.sentinel.clone(), roots)),
    }
}

fn group_label<'a>(relation: &'a Relation, config: &'a ReducerConfig) -> Option<&'a str> {
    config.fields.group.as_ref()?;
    relation
        .group
        .as_deref()
        .or(config.fallback_label.as_deref())
}
