use alquileres_core::{AlquileresClient, Credentials};
use serde_json::{json, Value};

use crate::cli::LoginArgs;
use crate::error::CliError;

pub async fn run(args: &LoginArgs, client: &AlquileresClient) -> Result<Value, CliError> {
    let credentials = match (&args.username, &args.password) {
        (Some(username), Some(password)) => Credentials::new(username.clone(), password.clone()),
        _ => client.config().service_credentials.clone().ok_or_else(|| {
            CliError::Command(String::from(
                "no credentials given and ALQUILERES_API_USERNAME/ALQUILERES_API_PASSWORD are unset",
            ))
        })?,
    };

    let token = client.auth().login(&credentials).await?;

    Ok(json!({
        "authenticated": client.auth().is_authenticated(),
        "token_type": token.token_type,
        "user": client.auth().current_user(),
    }))
}
