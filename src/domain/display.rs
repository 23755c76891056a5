//! Terminal rendering of output trees via `termtree`.

use termtree::Tree;

use crate::domain::family::FamilyNode;
use crate::domain::node::Node;

pub trait ToTermTree {
    fn to_term_tree(&self) -> Tree<String>;
}

impl ToTermTree for Node {
    fn to_term_tree(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_term_tree()).collect();
        Tree::new(self.name.clone()).with_leaves(leaves)
    }
}

impl ToTermTree for FamilyNode {
    fn to_term_tree(&self) -> Tree<String> {
        let label = match self {
            FamilyNode::Person(p) => match &p.gender {
                Some(gender) => format!("{} ({})", p.name, gender),
                None => p.name.clone(),
            },
            FamilyNode::Union(u) => format!("⚭ {}", u.name),
            FamilyNode::Group(g) => g.name.clone(),
        };
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_term_tree()).collect();
        Tree::new(label).with_leaves(leaves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_renders_all_names() {
        let tree = Node::with_children(
            "Library",
            vec![Node::with_children("Austen", vec![Node::new("Emma")])],
        );
        let rendered = tree.to_term_tree().to_string();
        assert!(rendered.starts_with("Library"));
        assert!(rendered.contains("Austen"));
        assert!(rendered.contains("Emma"));
    }
}
