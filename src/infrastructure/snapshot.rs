//! Snapshot-backed graph source
//!
//! A snapshot is a JSON object mapping a dataset name to the records a
//! query returned, e.g. `{"library": [{"author": ..., "book": ..., "series": null}]}`.
//! It stands in for a live graph store: each query kind reads its dataset.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::Record;
use crate::infrastructure::traits::{GraphSession, GraphSource, QueryKind, SourceError, SourceResult};

/// Exported query results, keyed by dataset name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    datasets: BTreeMap<String, Vec<Record>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, name: &str, records: Vec<Record>) -> Self {
        self.datasets.insert(name.to_string(), records);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[Record]> {
        self.datasets.get(name).map(Vec::as_slice)
    }

    pub fn from_json(json: &str, origin: &str) -> SourceResult<Self> {
        serde_json::from_str(json).map_err(|e| SourceError::Decode {
            context: origin.to_string(),
            message: e.to_string(),
        })
    }

    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> SourceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SourceError::Read {
            context: format!("read snapshot {}", path.display()),
            source: e,
        })?;
        Self::from_json(&content, &path.display().to_string())
    }
}

/// [`GraphSource`] answering queries from a [`Snapshot`].
#[derive(Debug)]
pub struct SnapshotSource {
    snapshot: Option<Snapshot>,
    origin: String,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
            origin: "in-memory snapshot".to_string(),
        }
    }

    pub fn load(path: &Path) -> SourceResult<Self> {
        Ok(Self {
            snapshot: Some(Snapshot::load(path)?),
            origin: path.display().to_string(),
        })
    }

    /// Source without data; every query reports it is unavailable.
    pub fn unconfigured() -> Self {
        Self {
            snapshot: None,
            origin: "no snapshot configured".to_string(),
        }
    }
}

impl GraphSource for SnapshotSource {
    fn open_session(&self) -> SourceResult<Box<dyn GraphSession + '_>> {
        debug!("opening session on {}", self.origin);
        Ok(Box::new(SnapshotSession {
            snapshot: self.snapshot.as_ref(),
            origin: &self.origin,
            queries: 0,
        }))
    }
}

struct SnapshotSession<'a> {
    snapshot: Option<&'a Snapshot>,
    origin: &'a str,
    queries: usize,
}

impl GraphSession for SnapshotSession<'_> {
    fn run(&mut self, query: QueryKind) -> SourceResult<Vec<Record>> {
        debug!("EXECUTING_QUERY {}: {}", query, query.cypher());
        self.queries += 1;
        let snapshot = self.snapshot.ok_or_else(|| SourceError::Unavailable {
            query: query.to_string(),
            reason: self.origin.to_string(),
        })?;
        snapshot
            .get(query.dataset())
            .map(<[Record]>::to_vec)
            .ok_or_else(|| SourceError::Unavailable {
                query: query.to_string(),
                reason: format!("dataset missing from {}", self.origin),
            })
    }
}

impl Drop for SnapshotSession<'_> {
    fn drop(&mut self) {
        debug!("released session on {} after {} queries", self.origin, self.queries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_returns_dataset() {
        let snapshot = Snapshot::from_json(
            r#"{"lineage": [{"p": "A", "descendant": "B"}]}"#,
            "test",
        )
        .unwrap();
        let source = SnapshotSource::new(snapshot);
        let mut session = source.open_session().unwrap();
        let records = session.run(QueryKind::Lineage).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_dataset_is_unavailable() {
        let source = SnapshotSource::new(Snapshot::new());
        let mut session = source.open_session().unwrap();
        assert!(matches!(
            session.run(QueryKind::Library),
            Err(SourceError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_unconfigured_source() {
        let source = SnapshotSource::unconfigured();
        let mut session = source.open_session().unwrap();
        let err = session.run(QueryKind::People).unwrap_err();
        assert!(err.to_string().contains("no snapshot configured"));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        assert!(matches!(
            Snapshot::from_json("[1, 2]", "test"),
            Err(SourceError::Decode { .. })
        ));
    }
}
