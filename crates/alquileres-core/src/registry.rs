use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{InmoupAdapter, MendozapropAdapter};
use crate::data_source::{PropertyFilter, PropertyRecord, PropertySource, SourceError};
use crate::gateway::AuthenticatedGateway;
use crate::source::SourceId;

/// Source snapshot used by the `sources` CLI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSnapshot {
    pub id: SourceId,
    pub requires_coordinates: bool,
}

/// Static adapter registry keyed by [`SourceId`].
///
/// Sources are added with [`register`](Self::register); lookups by name fail
/// with [`SourceErrorKind::UnknownSource`](crate::SourceErrorKind::UnknownSource)
/// before any network call is made.
#[derive(Default)]
pub struct SourceRegistry {
    adapters: BTreeMap<SourceId, Arc<dyn PropertySource>>,
}

impl SourceRegistry {
    pub fn new(adapters: Vec<Arc<dyn PropertySource>>) -> Self {
        let mut registry = Self::default();
        for adapter in adapters {
            registry.register(adapter);
        }
        registry
    }

    /// Registry with every built-in adapter wired to `gateway`.
    pub fn with_default_sources(gateway: &AuthenticatedGateway, api_url: &str) -> Self {
        Self::new(vec![
            Arc::new(InmoupAdapter::new(gateway.clone(), api_url)),
            Arc::new(MendozapropAdapter::new(gateway.clone(), api_url)),
        ])
    }

    /// Adds or replaces the adapter for its id. Returns the replaced adapter.
    pub fn register(&mut self, adapter: Arc<dyn PropertySource>) -> Option<Arc<dyn PropertySource>> {
        let id = adapter.id();
        debug!(source = %id, "registering property source");
        self.adapters.insert(id, adapter)
    }

    pub fn get(&self, id: SourceId) -> Result<Arc<dyn PropertySource>, SourceError> {
        self.adapters
            .get(&id)
            .cloned()
            .ok_or_else(|| SourceError::unknown_source(id.as_str()))
    }

    /// Case-insensitive lookup by source name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn PropertySource>, SourceError> {
        let id = name.parse::<SourceId>()?;
        self.get(id)
    }

    pub async fn search(
        &self,
        source_name: &str,
        filter: PropertyFilter,
    ) -> Result<Vec<PropertyRecord>, SourceError> {
        let adapter = self.resolve(source_name)?;
        adapter.search_properties(filter).await
    }

    pub fn ids(&self) -> Vec<SourceId> {
        self.adapters.keys().copied().collect()
    }

    pub fn snapshots(&self) -> Vec<SourceSnapshot> {
        self.adapters
            .values()
            .map(|adapter| SourceSnapshot {
                id: adapter.id(),
                requires_coordinates: adapter.requires_coordinates(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.ids())
            .finish()
    }
}
