//! Client configuration.
//!
//! # Environment Variables
//!
//! | Setting | Primary | Fallback | Default |
//! |---------|---------|----------|---------|
//! | API base URL | `ALQUILERES_API_URL` | `VITE_API_URL` | `http://localhost:8000` |
//! | Service username | `ALQUILERES_API_USERNAME` | `VITE_API_USERNAME` | - |
//! | Service password | `ALQUILERES_API_PASSWORD` | `VITE_API_PASSWORD` | - |
//! | Credential scheme | `ALQUILERES_CREDENTIAL_SCHEME` | - | `tagged` |
//! | Login timeout (ms) | `ALQUILERES_LOGIN_TIMEOUT_MS` | - | `15000` |
//! | Geocoding base URL | `ALQUILERES_GEOCODING_URL` | - | `https://nominatim.openstreetmap.org` |
//! | Long-term state dir | `ALQUILERES_STATE_DIR` | - | in-memory |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::credentials::{CredentialScheme, Credentials};
use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Bounded wait applied by callers that find a login already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginWaitPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for LoginWaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(100),
            max_attempts: 50,
        }
    }
}

impl LoginWaitPolicy {
    pub fn deadline(self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub service_credentials: Option<Credentials>,
    pub credential_scheme: CredentialScheme,
    pub login_timeout: Duration,
    pub login_wait: LoginWaitPolicy,
    pub geocoding_url: String,
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: String::from(DEFAULT_API_URL),
            service_credentials: None,
            credential_scheme: CredentialScheme::default(),
            login_timeout: DEFAULT_LOGIN_TIMEOUT,
            login_wait: LoginWaitPolicy::default(),
            geocoding_url: String::from(DEFAULT_GEOCODING_URL),
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Reads every setting from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |primary: &str, fallback: Option<&str>| {
            lookup(primary)
                .or_else(|| fallback.and_then(&lookup))
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = read("ALQUILERES_API_URL", Some("VITE_API_URL")) {
            config.api_url = url;
        }

        let username = read("ALQUILERES_API_USERNAME", Some("VITE_API_USERNAME"));
        let password = read("ALQUILERES_API_PASSWORD", Some("VITE_API_PASSWORD"));
        if let (Some(username), Some(password)) = (username, password) {
            config.service_credentials = Some(Credentials::new(username, password));
        }

        if let Some(scheme) = read("ALQUILERES_CREDENTIAL_SCHEME", None) {
            config.credential_scheme = scheme.parse()?;
        }

        if let Some(raw) = read("ALQUILERES_LOGIN_TIMEOUT_MS", None) {
            let millis = raw
                .parse::<u64>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidNumber {
                    name: "ALQUILERES_LOGIN_TIMEOUT_MS",
                    value: raw.clone(),
                })?;
            config.login_timeout = Duration::from_millis(millis);
        }

        if let Some(url) = read("ALQUILERES_GEOCODING_URL", None) {
            config.geocoding_url = url;
        }

        config.state_dir = read("ALQUILERES_STATE_DIR", None).map(PathBuf::from);

        Ok(config)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_service_credentials(mut self, credentials: Credentials) -> Self {
        self.service_credentials = Some(credentials);
        self
    }

    pub fn with_credential_scheme(mut self, scheme: CredentialScheme) -> Self {
        self.credential_scheme = scheme;
        self
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn with_login_wait(mut self, policy: LoginWaitPolicy) -> Self {
        self.login_wait = policy;
        self
    }

    pub fn with_geocoding_url(mut self, url: impl Into<String>) -> Self {
        self.geocoding_url = url.into();
        self
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = Some(dir.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Empty { name: "api_url" });
        }
        if self.geocoding_url.trim().is_empty() {
            return Err(ConfigError::Empty {
                name: "geocoding_url",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect::<HashMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).expect("config");

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.service_credentials, None);
        assert_eq!(config.credential_scheme, CredentialScheme::Tagged);
        assert_eq!(config.login_timeout, Duration::from_secs(15));
        assert_eq!(config.login_wait.deadline(), Duration::from_secs(5));
    }

    #[test]
    fn primary_variables_win_over_fallbacks() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ALQUILERES_API_URL", "https://api.example"),
            ("VITE_API_URL", "https://legacy.example"),
            ("VITE_API_USERNAME", "svc"),
            ("VITE_API_PASSWORD", "pw"),
            ("ALQUILERES_CREDENTIAL_SCHEME", "csrf"),
            ("ALQUILERES_LOGIN_TIMEOUT_MS", "2500"),
        ]))
        .expect("config");

        assert_eq!(config.api_url, "https://api.example");
        assert_eq!(
            config.service_credentials,
            Some(Credentials::new("svc", "pw"))
        );
        assert_eq!(config.credential_scheme, CredentialScheme::CsrfAugmented);
        assert_eq!(config.login_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn half_configured_credentials_are_ignored() {
        let config =
            ClientConfig::from_lookup(lookup(&[("ALQUILERES_API_USERNAME", "svc")])).expect("config");
        assert_eq!(config.service_credentials, None);
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let error = ClientConfig::from_lookup(lookup(&[("ALQUILERES_LOGIN_TIMEOUT_MS", "0")]))
            .expect_err("zero timeout");
        assert!(matches!(error, ConfigError::InvalidNumber { .. }));
    }
}
