use alquileres_core::AlquileresClient;
use serde_json::Value;

use crate::cli::GeocodeArgs;
use crate::error::CliError;

pub async fn run(args: &GeocodeArgs, client: &AlquileresClient) -> Result<Value, CliError> {
    let address = args.address.trim();
    if address.is_empty() {
        return Err(CliError::Command(String::from("address must not be empty")));
    }

    let coordinates = client.geocode(address).await;
    Ok(serde_json::to_value(coordinates)?)
}
