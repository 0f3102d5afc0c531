use alquileres_core::{AlquileresClient, SourceId};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
struct SourceStatus {
    id: SourceId,
    filters_by_geolocation: bool,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceStatus>,
}

pub fn run(client: &AlquileresClient) -> Result<Value, CliError> {
    let sources = client
        .registry()
        .snapshots()
        .into_iter()
        .map(|snapshot| SourceStatus {
            id: snapshot.id,
            filters_by_geolocation: snapshot.requires_coordinates,
        })
        .collect::<Vec<_>>();

    Ok(serde_json::to_value(SourcesResponseData { sources })?)
}
