//! Flat query records and the typed rows extracted from them.
//!
//! A [`Record`] is one row of a graph-query result: a read-only mapping from
//! field name to scalar [`Value`]. Builders never read a `Record` directly;
//! they validate it once into a typed row ([`Relation`], `Person`, `Union`)
//! and work on that.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Scalar value of a record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One row of a graph-query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: &str, value: impl Into<Value>) {
        self.fields.insert(field.to_string(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Non-null string field. Missing or null fails.
    pub fn require_str(&self, field: &str) -> DomainResult<&str> {
        match self.optional_str(field)? {
            Some(s) => Ok(s),
            None => Err(DomainError::missing(field)),
        }
    }

    /// String field that may be absent or null.
    pub fn optional_str(&self, field: &str) -> DomainResult<Option<&str>> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(DomainError::wrong_type(field, "a string")),
        }
    }

    /// Non-null integer field.
    pub fn require_int(&self, field: &str) -> DomainResult<i64> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(DomainError::missing(field)),
            Some(Value::Int(i)) => Ok(*i),
            Some(_) => Err(DomainError::wrong_type(field, "an integer")),
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Names of the fields that carry the parent, child and optional grouping key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub parent: String,
    pub child: String,
    pub group: Option<String>,
}

impl FieldMap {
    pub fn new(parent: &str, child: &str) -> Self {
        Self {
            parent: parent.to_string(),
            child: child.to_string(),
            group: None,
        }
    }

    pub fn grouped_by(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    /// Validate a record into a typed relation.
    pub fn extract(&self, record: &Record) -> DomainResult<Relation> {
        let parent = record.require_str(&self.parent)?.to_string();
        let child = record.require_str(&self.child)?.to_string();
        let group = match &self.group {
            Some(field) => record.optional_str(field)?.map(str::to_string),
            None => None,
        };
        Ok(Relation {
            parent,
            child,
            group,
        })
    }
}

/// A validated parent/child edge with an optional grouping label in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relation {
    pub parent: String,
    pub child: String,
    pub group: Option<String>,
}

impl Relation {
    pub fn new(parent: &str, child: &str) -> Self {
        Self {
            parent: parent.to_string(),
            child: child.to_string(),
            group: None,
        }
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }
}
