//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{HierarchyService, ImportService};
use crate::config::Settings;
use crate::domain::CoercionRules;
use crate::infrastructure::csv_reader::CsvTableReader;
use crate::infrastructure::snapshot::SnapshotSource;
use crate::infrastructure::traits::{GraphSource, TableReader};
use crate::infrastructure::InfraResult;

/// Container holding the settings and the boundary implementations.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Graph store
    pub source: Arc<dyn GraphSource>,

    /// Tabular input for imports
    pub tables: Arc<dyn TableReader>,
}

impl ServiceContainer {
    /// Create a container with real implementations.
    ///
    /// The configured snapshot is loaded eagerly so a bad file fails before
    /// any command runs.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let source: Arc<dyn GraphSource> = match &settings.snapshot {
            Some(path) => {
                debug!("using snapshot {}", path.display());
                Arc::new(SnapshotSource::load(path)?)
            }
            None => Arc::new(SnapshotSource::unconfigured()),
        };
        Ok(Self::with_deps(settings, source, Arc::new(CsvTableReader)))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        source: Arc<dyn GraphSource>,
        tables: Arc<dyn TableReader>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            source,
            tables,
        }
    }

    pub fn hierarchy_service(&self) -> HierarchyService {
        HierarchyService::new(self.source.clone(), self.settings.clone())
    }

    /// Import service using `rules`, or the configured field sets when `None`.
    pub fn import_service(&self, rules: Option<CoercionRules>) -> ImportService {
        let rules = rules.unwrap_or_else(|| self.settings.import.coercion_rules());
        ImportService::new(self.tables.clone(), rules)
    }
}
