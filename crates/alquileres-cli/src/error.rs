use alquileres_core::{AuthError, ConfigError, SourceError, SourceErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Command(_) => 2,
            Self::Auth(_) => 3,
            Self::Source(error) => match error.kind() {
                SourceErrorKind::UnknownSource | SourceErrorKind::InvalidRequest => 2,
                SourceErrorKind::AuthenticationRequired => 3,
                SourceErrorKind::Unavailable
                | SourceErrorKind::UpstreamStatus
                | SourceErrorKind::MalformedResponse => 5,
            },
            Self::Serialization(_) => 4,
        }
    }
}
