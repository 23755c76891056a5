//! Infrastructure layer: I/O implementations and DI container
//!
//! This layer implements I/O boundary traits and wires up services.

pub mod csv_reader;
pub mod di;
pub mod error;
pub mod snapshot;
pub mod traits;

pub use di::ServiceContainer;
pub use error::{InfraError, InfraResult};
