//! Composition root wiring storage, auth, gateway, adapters and geocoder.

use std::sync::Arc;

use tracing::info;

use crate::auth::AuthSessionManager;
use crate::config::ClientConfig;
use crate::data_source::{PropertyFilter, PropertyRecord, SourceError};
use crate::error::ConfigError;
use crate::gateway::AuthenticatedGateway;
use crate::geocoding::{Coordinates, Geocoder};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::registry::SourceRegistry;
use crate::session::SessionStore;
use crate::storage::{JsonFileStore, KeyValueStore, MemoryStore};

pub const STATE_FILE_NAME: &str = "alquileres_state.json";

/// Builder for [`AlquileresClient`].
///
/// ```rust,ignore
/// let client = ClientBuilder::new(ClientConfig::from_env()?).build()?;
/// let listings = client.search("mendozaprop", PropertyFilter::new()).await?;
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    session_scope: Option<Arc<dyn KeyValueStore>>,
    persistent_scope: Option<Arc<dyn KeyValueStore>>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http_client: None,
            session_scope: None,
            persistent_scope: None,
        }
    }

    /// Transport shared by every component. Defaults to reqwest.
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn with_session_scope(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session_scope = Some(store);
        self
    }

    /// Overrides the long-term scope otherwise derived from `state_dir`.
    pub fn with_persistent_scope(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.persistent_scope = Some(store);
        self
    }

    pub fn build(self) -> Result<AlquileresClient, ConfigError> {
        self.config.validate()?;

        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let session_scope = self
            .session_scope
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let persistent_scope = match (self.persistent_scope, &self.config.state_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(JsonFileStore::in_dir(dir, STATE_FILE_NAME)),
            (None, None) => Arc::new(MemoryStore::new()),
        };

        let session = Arc::new(SessionStore::new(session_scope, persistent_scope));
        let auth = Arc::new(AuthSessionManager::new(
            &self.config,
            http_client.clone(),
            session,
        ));
        let gateway = AuthenticatedGateway::new(auth.clone(), http_client.clone());
        let registry = SourceRegistry::with_default_sources(&gateway, &self.config.api_url);
        let geocoder = Geocoder::new(http_client, self.config.geocoding_url.clone());

        info!(
            api_url = %self.config.api_url,
            scheme = %self.config.credential_scheme,
            sources = registry.len(),
            "client ready"
        );

        Ok(AlquileresClient {
            config: self.config,
            auth,
            registry,
            geocoder,
        })
    }
}

#[derive(Debug)]
pub struct AlquileresClient {
    config: ClientConfig,
    auth: Arc<AuthSessionManager>,
    registry: SourceRegistry,
    geocoder: Geocoder,
}

impl AlquileresClient {
    pub fn from_env() -> Result<Self, ConfigError> {
        ClientBuilder::new(ClientConfig::from_env()?).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn auth(&self) -> &Arc<AuthSessionManager> {
        &self.auth
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub async fn search(
        &self,
        source_name: &str,
        filter: PropertyFilter,
    ) -> Result<Vec<PropertyRecord>, SourceError> {
        self.registry.search(source_name, filter).await
    }

    pub async fn geocode(&self, address: &str) -> Option<Coordinates> {
        self.geocoder.geocode(address).await
    }
}
