//! Output node of the flat-to-tree reducer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Named unit in the output hierarchy.
///
/// Serializes to `{"name": ..., "children": [...]}`, the shape the
/// client-side `d3.hierarchy` call consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search for the first node with `name`.
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Number of levels, a single node being depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Names of all leaf nodes, left to right.
    pub fn leaf_names(&self) -> Vec<String> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves(&self, leaves: &mut Vec<String>) {
        if self.children.is_empty() {
            leaves.push(self.name.clone());
        } else {
            for child in &self.children {
                child.collect_leaves(leaves);
            }
        }
    }

    /// Every (parent name, child name) pair in the tree.
    pub fn edges(&self) -> BTreeSet<(String, String)> {
        let mut edges = BTreeSet::new();
        self.walk(&mut |node| {
            for child in &node.children {
                edges.insert((node.name.clone(), child.name.clone()));
            }
        });
        edges
    }

    /// Total number of nodes, counting repeated occurrences.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    fn walk(&self, visit: &mut impl FnMut(&Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
