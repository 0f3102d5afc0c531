use crate::data_source::{PropertyFilter, PropertySource, SearchFuture};
use crate::gateway::AuthenticatedGateway;
use crate::source::SourceId;

use super::{search_backend, search_endpoint};

/// MendozaProp listings. The source sometimes omits geolocation, so records
/// without both coordinates are dropped.
#[derive(Debug, Clone)]
pub struct MendozapropAdapter {
    gateway: AuthenticatedGateway,
    endpoint: String,
}

impl MendozapropAdapter {
    pub fn new(gateway: AuthenticatedGateway, api_url: &str) -> Self {
        Self {
            gateway,
            endpoint: search_endpoint(api_url),
        }
    }
}

impl PropertySource for MendozapropAdapter {
    fn id(&self) -> SourceId {
        SourceId::Mendozaprop
    }

    fn requires_coordinates(&self) -> bool {
        true
    }

    fn search_properties<'a>(&'a self, filter: PropertyFilter) -> SearchFuture<'a> {
        Box::pin(async move {
            search_backend(&self.gateway, &self.endpoint, self.id(), &filter, true).await
        })
    }
}
