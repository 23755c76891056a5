//! Bulk import service
//!
//! Reads tabular files and coerces every row into a typed record before it is
//! handed to the graph-population layer. A batch is all or nothing: the first
//! coercion failure aborts it with file, row and field named.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{CoercionRules, Record};
use crate::infrastructure::traits::TableReader;

/// Coerced records of one table, keyed by the file stem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportedTable {
    pub name: String,
    pub records: Vec<Record>,
}

/// Service coercing tabular rows into typed records.
pub struct ImportService {
    reader: Arc<dyn TableReader>,
    rules: CoercionRules,
}

impl ImportService {
    pub fn new(reader: Arc<dyn TableReader>, rules: CoercionRules) -> Self {
        Self { reader, rules }
    }

    /// Import a single table file or every table below a directory.
    #[instrument(level = "debug", skip(self))]
    pub fn import(&self, path: &Path) -> ApplicationResult<Vec<ImportedTable>> {
        let tables = self.reader.list_tables(path)?;
        debug!("import: {} tables under {}", tables.len(), path.display());

        let mut imported = Vec::with_capacity(tables.len());
        for table in tables {
            imported.push(self.import_table(&table)?);
        }
        Ok(imported)
    }

    fn import_table(&self, path: &Path) -> ApplicationResult<ImportedTable> {
        let rows = self.reader.read_rows(path)?;
        let records = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                self.rules
                    .coerce(row)
                    .map_err(|source| ApplicationError::Import {
                        path: path.to_path_buf(),
                        row: i + 1,
                        source,
                    })
            })
            .collect::<ApplicationResult<Vec<_>>>()?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!("imported {} rows from {}", records.len(), path.display());
        Ok(ImportedTable { name, records })
    }
}

/// Tables as a `name → records` map, the layout of a snapshot file.
pub fn as_datasets(tables: Vec<ImportedTable>) -> BTreeMap<String, Vec<Record>> {
    tables.into_iter().map(|t| (t.name, t.records)).collect()
}
