//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors report structural problems in the graph records.
/// Builders never skip past one of these; they surface to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("malformed record: field '{field}' {reason}")]
    MalformedRecord { field: String, reason: String },

    #[error("root person not found: {0}")]
    RootNotFound(i64),

    #[error("ambiguous union for child {child_id}: parents ({first:?}) and ({second:?})")]
    AmbiguousUnion {
        child_id: i64,
        first: (i64, i64),
        second: (i64, i64),
    },

    #[error("cyclic ancestry detected at: {0}")]
    CyclicAncestry(String),

    #[error("unresolved reference in union for child {child_id}: person {person_id} is unknown")]
    UnresolvedReference { child_id: i64, person_id: i64 },

    #[error("cannot coerce field '{field}' value '{value}' to {target}")]
    Coercion {
        field: String,
        value: String,
        target: &'static str,
    },
}

impl DomainError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MalformedRecord {
            field: field.to_string(),
            reason: "is missing".to_string(),
        }
    }

    pub(crate) fn wrong_type(field: &str, expected: &str) -> Self {
        Self::MalformedRecord {
            field: field.to_string(),
            reason: format!("is not {}", expected),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
