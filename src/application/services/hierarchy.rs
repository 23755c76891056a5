//! Hierarchy service
//!
//! Fetches flat records from the graph store and reshapes them into the
//! library, lineage and family trees.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    reduce, FamilyGraph, FamilyNode, Node, Record, ReducerConfig, UnionTreeBuilder,
};
use crate::infrastructure::traits::{GraphSession, GraphSource, QueryKind};

/// Service building renderable trees from graph-query results.
pub struct HierarchyService {
    source: Arc<dyn GraphSource>,
    settings: Arc<Settings>,
}

impl HierarchyService {
    /// Create a new hierarchy service.
    pub fn new(source: Arc<dyn GraphSource>, settings: Arc<Settings>) -> Self {
        Self { source, settings }
    }

    /// Authors → series → books, wrapped in the library sentinel.
    pub fn library(&self) -> ApplicationResult<Node> {
        self.library_with(&self.settings.library.reducer_config())
    }

    /// Library view with caller-supplied reducer parameters.
    #[instrument(level = "debug", skip(self))]
    pub fn library_with(&self, config: &ReducerConfig) -> ApplicationResult<Node> {
        let records = self.fetch(QueryKind::Library)?;
        let tree = reduce(&records, config)?;
        info!("library: {} authors", tree.children.len());
        Ok(tree)
    }

    /// Person → descendant tree; a single root is returned unwrapped.
    #[instrument(level = "debug", skip(self))]
    pub fn lineage(&self) -> ApplicationResult<Node> {
        let records = self.fetch(QueryKind::Lineage)?;
        let tree = reduce(&records, &self.settings.lineage.reducer_config())?;
        info!("lineage: root '{}', depth {}", tree.name, tree.depth());
        Ok(tree)
    }

    /// Union tree below `root`, falling back to the configured root, or the
    /// whole forest when neither is set.
    #[instrument(level = "debug", skip(self))]
    pub fn family(&self, root: Option<i64>) -> ApplicationResult<FamilyNode> {
        let (people, unions) = {
            let mut session = self.source.open_session()?;
            let people = session.run(QueryKind::People)?;
            let unions = session.run(QueryKind::Unions)?;
            (people, unions)
        };
        debug!("family: {} people, {} unions", people.len(), unions.len());

        let graph = FamilyGraph::from_records(&people, &unions)?;
        let builder =
            UnionTreeBuilder::new(&graph).with_config(self.settings.family.family_config());
        let tree = match root.or(self.settings.family.root) {
            Some(root_id) => builder.build(root_id)?,
            None => builder.build_forest()?,
        };
        info!("family: '{}', depth {}", tree.name(), tree.depth());
        Ok(tree)
    }

    /// Run one query in its own session.
    fn fetch(&self, query: QueryKind) -> ApplicationResult<Vec<Record>> {
        let mut session: Box<dyn GraphSession + '_> = self.source.open_session()?;
        let records = session.run(query)?;
        debug!("{}: {} records", query, records.len());
        Ok(records)
    }
}
