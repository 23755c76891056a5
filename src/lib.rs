//! vassar: reshape flat graph-query records into renderable hierarchies.
//!
//! Three views are built from the same kind of input, a list of records:
//! the library (authors → series → books), the lineage (parent → descendant)
//! and the family tree, where couples become union nodes.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
