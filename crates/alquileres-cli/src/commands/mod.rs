mod geocode;
mod login;
mod search;
mod sources;

use alquileres_core::{AlquileresClient, ClientBuilder, ClientConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let client = build_client(cli)?;

    match &cli.command {
        Command::Search(args) => search::run(args, &client).await,
        Command::Sources => sources::run(&client),
        Command::Login(args) => login::run(args, &client).await,
        Command::Geocode(args) => geocode::run(args, &client).await,
    }
}

fn build_client(cli: &Cli) -> Result<AlquileresClient, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url.clone());
    }
    Ok(ClientBuilder::new(config).build()?)
}
