//! I/O boundary traits for testability
//!
//! These traits abstract the external collaborators (the graph store and the
//! tabular files fed to the bulk import), allowing services to be tested with
//! in-memory implementations.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Record;

/// The named queries the services issue against the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Authors, their books and optional series
    Library,
    /// Direct parent → child edges between people
    Lineage,
    /// Every person with id, name, gender, birthdate
    People,
    /// Two-parent/one-child groupings
    Unions,
}

impl QueryKind {
    /// Key under which a snapshot stores this query's result set.
    pub fn dataset(&self) -> &'static str {
        match self {
            QueryKind::Library => "library",
            QueryKind::Lineage => "lineage",
            QueryKind::People => "people",
            QueryKind::Unions => "unions",
        }
    }

    /// Cypher text producing the record shape the builders expect.
    pub fn cypher(&self) -> &'static str {
        match self {
            QueryKind::Library => {
                "MATCH (a:Author)-[:WROTE]->(b:Book) \
                 OPTIONAL MATCH (b)-[:BELONGS_TO]->(s:Series) \
                 RETURN a.name AS author, b.title AS book, s.name AS series"
            }
            QueryKind::Lineage => {
                "MATCH (p:Person)-[:PARENT_OF]->(d:Person) \
                 RETURN p.name AS p, d.name AS descendant"
            }
            QueryKind::People => {
                "MATCH (p:Person) \
                 RETURN p.person_id AS person_id, p.name AS name, p.gender AS gender, \
                 toString(p.birthdate) AS birthdate"
            }
            QueryKind::Unions => {
                "MATCH (p1:Person)-[:PARENT_OF]->(c:Person)<-[:PARENT_OF]-(p2:Person) \
                 WHERE p1.person_id < p2.person_id \
                 RETURN p1.person_id AS parent1_id, p2.person_id AS parent2_id, \
                 c.person_id AS child_id"
            }
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dataset())
    }
}

/// Failures of the external collaborators.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("query '{query}' unavailable: {reason}")]
    Unavailable { query: String, reason: String },

    #[error("I/O error: {context}")]
    Read {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode {context}: {message}")]
    Decode { context: String, message: String },
}

/// Result type for boundary operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Graph store handing out per-request sessions.
///
/// A session is acquired for the duration of one request and released when
/// dropped; no connection state lives at process scope.
pub trait GraphSource: Send + Sync {
    fn open_session(&self) -> SourceResult<Box<dyn GraphSession + '_>>;
}

/// One scoped conversation with the graph store.
pub trait GraphSession {
    /// Execute a named query and return its flat records.
    fn run(&mut self, query: QueryKind) -> SourceResult<Vec<Record>>;
}

/// Tabular input for the bulk import.
pub trait TableReader: Send + Sync {
    /// Tables below `path`: the file itself, or every table file in a directory.
    fn list_tables(&self, path: &Path) -> SourceResult<Vec<PathBuf>>;

    /// Rows of one table as header → raw text.
    fn read_rows(&self, path: &Path) -> SourceResult<Vec<BTreeMap<String, String>>>;
}
