//! One adapter per listing source. All of them post to the same backend
//! search endpoint through the [`AuthenticatedGateway`]; they differ only in
//! the source tag and in whether records without coordinates are dropped.

mod inmoup;
mod mendozaprop;

pub use inmoup::InmoupAdapter;
pub use mendozaprop::MendozapropAdapter;

use serde_json::Value;
use tracing::{debug, warn};

use crate::data_source::{PropertyFilter, PropertyRecord, SourceError};
use crate::gateway::AuthenticatedGateway;
use crate::source::SourceId;

pub const SEARCH_PATH: &str = "/api/properties/search";

/// `<api_url>/api/properties/search`.
pub fn search_endpoint(api_url: &str) -> String {
    format!("{}{}", api_url.trim_end_matches('/'), SEARCH_PATH)
}

/// Shared search flow used by every adapter.
pub(crate) async fn search_backend(
    gateway: &AuthenticatedGateway,
    endpoint: &str,
    source: SourceId,
    filter: &PropertyFilter,
    require_coordinates: bool,
) -> Result<Vec<PropertyRecord>, SourceError> {
    let body = filter.to_request_body(source);
    let response = gateway.post_json(endpoint, &body).await.map_err(|error| {
        warn!(%source, %error, "search request failed");
        SourceError::from(error)
    })?;

    if !response.is_success() {
        warn!(%source, status = response.status, "search returned an error status");
        return Err(SourceError::upstream_status(source, response.status));
    }

    let parsed: Value = response.json().map_err(|error| {
        SourceError::malformed_response(format!("{source} search body is not JSON: {error}"))
    })?;
    let Value::Array(items) = parsed else {
        return Err(SourceError::malformed_response(format!(
            "{source} search body is not an array"
        )));
    };

    let total = items.len();
    let records = items
        .into_iter()
        .map(PropertyRecord::new)
        .filter(|record| !require_coordinates || record.has_coordinates())
        .collect::<Vec<_>>();

    debug!(
        %source,
        total,
        returned = records.len(),
        "search completed"
    );
    Ok(records)
}
