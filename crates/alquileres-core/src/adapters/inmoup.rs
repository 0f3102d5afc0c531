use crate::data_source::{PropertyFilter, PropertySource, SearchFuture};
use crate::gateway::AuthenticatedGateway;
use crate::source::SourceId;

use super::{search_backend, search_endpoint};

/// InmouP listings, returned as the backend sends them.
#[derive(Debug, Clone)]
pub struct InmoupAdapter {
    gateway: AuthenticatedGateway,
    endpoint: String,
}

impl InmoupAdapter {
    pub fn new(gateway: AuthenticatedGateway, api_url: &str) -> Self {
        Self {
            gateway,
            endpoint: search_endpoint(api_url),
        }
    }
}

impl PropertySource for InmoupAdapter {
    fn id(&self) -> SourceId {
        SourceId::Inmoup
    }

    fn requires_coordinates(&self) -> bool {
        false
    }

    fn search_properties<'a>(&'a self, filter: PropertyFilter) -> SearchFuture<'a> {
        Box::pin(async move {
            search_backend(&self.gateway, &self.endpoint, self.id(), &filter, false).await
        })
    }
}
