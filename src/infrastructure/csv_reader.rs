//! CSV implementation of [`TableReader`].

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::infrastructure::traits::{SourceError, SourceResult, TableReader};
use crate::util::path::PathExt;

/// Reads `*.csv` files with a header row.
#[derive(Debug, Default)]
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    #[instrument(level = "debug", skip(self))]
    fn list_tables(&self, path: &Path) -> SourceResult<Vec<PathBuf>> {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }
        if !path.is_dir() {
            return Err(SourceError::Read {
                context: format!("import path {}", path.display()),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            });
        }

        let mut tables = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry.map_err(|e| SourceError::Read {
                context: format!("walk {}", path.display()),
                source: e.into(),
            })?;
            if entry.path().is_csv_file() {
                tables.push(entry.into_path());
            }
        }
        let tables: Vec<_> = tables.into_iter().sorted().collect();
        debug!("found {} csv files", tables.len());
        Ok(tables)
    }

    #[instrument(level = "debug", skip(self))]
    fn read_rows(&self, path: &Path) -> SourceResult<Vec<BTreeMap<String, String>>> {
        let decode = |e: csv::Error| SourceError::Decode {
            context: path.display().to_string(),
            message: e.to_string(),
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(decode)?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(decode)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(decode)?;
            let row: BTreeMap<String, String> = headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }
}
