//! Address geocoding through a Nominatim-compatible search API.
//!
//! Failures never propagate: every error is logged and reported as `None`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::http_client::{HttpClient, HttpRequest};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

#[derive(Clone)]
pub struct Geocoder {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
}

impl Geocoder {
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
        }
    }

    pub async fn geocode(&self, address: &str) -> Option<Coordinates> {
        let query = qualify_address(address);
        let url = format!(
            "{}/search?format=json&q={}&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&query)
        );

        let response = match self.http_client.execute(HttpRequest::get(url)).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "geocoding request failed");
                return None;
            }
        };

        if !response.is_success() {
            warn!(status = response.status, "geocoding service returned an error status");
            return None;
        }

        let hits: Vec<SearchHit> = match response.json() {
            Ok(hits) => hits,
            Err(error) => {
                warn!(%error, "geocoding response is not a result list");
                return None;
            }
        };

        let Some(hit) = hits.into_iter().next() else {
            debug!(address = %query, "no coordinates found");
            return None;
        };

        match (hit.lat.trim().parse(), hit.lon.trim().parse()) {
            (Ok(latitude), Ok(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => {
                warn!(lat = %hit.lat, lon = %hit.lon, "geocoding result has unparseable coordinates");
                None
            }
        }
    }
}

impl std::fmt::Debug for Geocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geocoder")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Appends the region so bare street addresses resolve inside Mendoza.
pub fn qualify_address(address: &str) -> String {
    let lower = address.to_lowercase();
    if lower.contains("argentina") {
        address.to_owned()
    } else if lower.contains("mendoza") {
        format!("{address}, Argentina")
    } else {
        format!("{address}, Mendoza, Argentina")
    }
}
