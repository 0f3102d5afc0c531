use alquileres_core::{AlquileresClient, PropertyFilter};
use serde_json::Value;
use tracing::info;

use crate::cli::SearchArgs;
use crate::error::CliError;

pub async fn run(args: &SearchArgs, client: &AlquileresClient) -> Result<Value, CliError> {
    let source = args.source.trim();
    if source.is_empty() {
        return Err(CliError::Command(String::from("--source must not be empty")));
    }

    let mut filter = PropertyFilter::new();
    if let Some(province) = &args.province {
        filter = filter.with_province(province.clone());
    }
    if !args.cities.is_empty() {
        filter = filter.with_cities(args.cities.iter().cloned());
    }
    if let Some(property_type) = &args.property_type {
        filter = filter.with_property_type(property_type.clone());
    }

    let records = client.search(source, filter).await?;
    info!(source, count = records.len(), "search complete");

    Ok(Value::Array(
        records.into_iter().map(|record| record.into_value()).collect(),
    ))
}
