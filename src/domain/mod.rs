//! Domain layer: records, hierarchy builders and coercion
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).
//! Every function here is a pure, synchronous transformation over its inputs.

pub mod arena;
pub mod coerce;
pub mod display;
pub mod error;
pub mod family;
pub mod node;
pub mod record;
pub mod reducer;

pub use arena::{HierarchyArena, NodeKey};
pub use coerce::{coerce, CoercionRules};
pub use display::ToTermTree;
pub use error::{DomainError, DomainResult};
pub use family::{
    build_family_tree, FamilyConfig, FamilyGraph, FamilyNode, GroupNode, Person, PersonNode,
    Union, UnionNode, UnionTreeBuilder,
};
pub use node::Node;
pub use record::{FieldMap, Record, Relation, Value};
pub use reducer::{reduce, reduce_relations, ChildScope, ReducerConfig, RootPolicy};
