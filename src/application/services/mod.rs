//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (GraphSource, TableReader)
//! but are themselves concrete structs, not traits.

mod hierarchy;
mod import;

pub use hierarchy::HierarchyService;
pub use import::{as_datasets, ImportService, ImportedTable};
