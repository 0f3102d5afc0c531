//! Credential obfuscation for the token endpoint.
//!
//! None of these schemes are cryptographic. They only keep the password out
//! of plain sight in request logs and devtools.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

use crate::error::{AuthError, ConfigError};

/// Marker prepended to base64 passwords in the tagged scheme.
pub const TAGGED_PREFIX: &str = "CUSTOM_ENC:";

/// Username/password pair. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialScheme {
    /// Username and password sent as typed.
    Plain,
    /// Password base64-encoded behind [`TAGGED_PREFIX`].
    #[default]
    Tagged,
    /// Both fields base64-encoded, CSRF token attached, optionally wrapped
    /// into a single JSON field.
    CsrfAugmented,
}

impl CredentialScheme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Tagged => "tagged",
            Self::CsrfAugmented => "csrf",
        }
    }

    pub const fn requires_csrf(self) -> bool {
        matches!(self, Self::CsrfAugmented)
    }
}

impl Display for CredentialScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialScheme {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "tagged" | "base64" => Ok(Self::Tagged),
            "csrf" | "csrf-augmented" => Ok(Self::CsrfAugmented),
            other => Err(ConfigError::InvalidScheme {
                value: other.to_owned(),
            }),
        }
    }
}

/// CSRF material gathered before a login under [`CredentialScheme::CsrfAugmented`].
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfContext {
    pub token: String,
    /// Set when the backend advertised a public key.
    pub encrypted: bool,
}

impl std::fmt::Debug for CsrfContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfContext")
            .field("token", &"<redacted>")
            .field("encrypted", &self.encrypted)
            .finish()
    }
}

/// Form fields ready for the token endpoint, in submission order.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedCredentials {
    fields: Vec<(String, String)>,
}

impl EncodedCredentials {
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl std::fmt::Debug for EncodedCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self.fields.iter().map(|(name, _)| name).collect::<Vec<_>>();
        f.debug_struct("EncodedCredentials")
            .field("fields", &names)
            .finish()
    }
}

#[derive(Serialize)]
struct WrappedCredentials<'a> {
    username: &'a str,
    password: &'a str,
    csrf_token: &'a str,
}

/// Stateless transform from [`Credentials`] to form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CredentialObfuscator {
    scheme: CredentialScheme,
}

impl CredentialObfuscator {
    pub const fn new(scheme: CredentialScheme) -> Self {
        Self { scheme }
    }

    pub const fn scheme(&self) -> CredentialScheme {
        self.scheme
    }

    /// Encodes `credentials` for submission.
    ///
    /// # Errors
    ///
    /// [`AuthError::Encoding`] when the CSRF scheme is selected without a CSRF
    /// context, or when the wrapped payload cannot be serialized. Callers must
    /// abort the login instead of falling back to plain fields.
    pub fn transform(
        &self,
        credentials: &Credentials,
        csrf: Option<&CsrfContext>,
    ) -> Result<EncodedCredentials, AuthError> {
        let fields = match self.scheme {
            CredentialScheme::Plain => vec![
                (String::from("username"), credentials.username.clone()),
                (String::from("password"), credentials.password.clone()),
            ],
            CredentialScheme::Tagged => vec![
                (String::from("username"), credentials.username.clone()),
                (
                    String::from("password"),
                    format!("{TAGGED_PREFIX}{}", STANDARD.encode(&credentials.password)),
                ),
            ],
            CredentialScheme::CsrfAugmented => {
                let csrf = csrf.ok_or_else(|| {
                    AuthError::Encoding(String::from(
                        "csrf scheme selected but no csrf token was provided",
                    ))
                })?;
                if csrf.token.is_empty() {
                    return Err(AuthError::Encoding(String::from("csrf token is empty")));
                }

                let username = STANDARD.encode(&credentials.username);
                let password = STANDARD.encode(&credentials.password);

                if csrf.encrypted {
                    let wrapped = serde_json::to_string(&WrappedCredentials {
                        username: &username,
                        password: &password,
                        csrf_token: &csrf.token,
                    })
                    .map_err(|error| AuthError::Encoding(error.to_string()))?;
                    vec![
                        (String::from("credentials"), wrapped),
                        (String::from("encrypted"), String::from("true")),
                    ]
                } else {
                    vec![
                        (String::from("username"), username),
                        (String::from("password"), password),
                        (String::from("csrf_token"), csrf.token.clone()),
                    ]
                }
            }
        };

        Ok(EncodedCredentials { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("api", "s3cret")
    }

    #[test]
    fn plain_scheme_passes_fields_through() {
        let encoded = CredentialObfuscator::new(CredentialScheme::Plain)
            .transform(&creds(), None)
            .expect("encode");

        assert_eq!(encoded.field("username"), Some("api"));
        assert_eq!(encoded.field("password"), Some("s3cret"));
    }

    #[test]
    fn tagged_scheme_prefixes_base64_password() {
        let encoded = CredentialObfuscator::new(CredentialScheme::Tagged)
            .transform(&creds(), None)
            .expect("encode");

        assert_eq!(encoded.field("username"), Some("api"));
        assert_eq!(encoded.field("password"), Some("CUSTOM_ENC:czNjcmV0"));
    }

    #[test]
    fn csrf_scheme_encodes_both_fields_and_attaches_token() {
        let csrf = CsrfContext {
            token: String::from("csrf-1"),
            encrypted: false,
        };
        let encoded = CredentialObfuscator::new(CredentialScheme::CsrfAugmented)
            .transform(&creds(), Some(&csrf))
            .expect("encode");

        assert_eq!(encoded.field("username"), Some("YXBp"));
        assert_eq!(encoded.field("password"), Some("czNjcmV0"));
        assert_eq!(encoded.field("csrf_token"), Some("csrf-1"));
    }

    #[test]
    fn csrf_scheme_wraps_bundle_when_encrypted() {
        let csrf = CsrfContext {
            token: String::from("csrf-1"),
            encrypted: true,
        };
        let encoded = CredentialObfuscator::new(CredentialScheme::CsrfAugmented)
            .transform(&creds(), Some(&csrf))
            .expect("encode");

        assert_eq!(encoded.fields().len(), 2);
        assert_eq!(encoded.field("encrypted"), Some("true"));
        let wrapped: serde_json::Value =
            serde_json::from_str(encoded.field("credentials").expect("wrapped")).expect("json");
        assert_eq!(wrapped["username"], "YXBp");
        assert_eq!(wrapped["password"], "czNjcmV0");
        assert_eq!(wrapped["csrf_token"], "csrf-1");
    }

    #[test]
    fn csrf_scheme_without_token_fails_instead_of_sending_plain() {
        let error = CredentialObfuscator::new(CredentialScheme::CsrfAugmented)
            .transform(&creds(), None)
            .expect_err("missing csrf");

        assert!(matches!(error, AuthError::Encoding(_)));
    }

    #[test]
    fn scheme_names_parse_case_insensitively() {
        assert_eq!("TAGGED".parse(), Ok(CredentialScheme::Tagged));
        assert_eq!(" csrf ".parse(), Ok(CredentialScheme::CsrfAugmented));
        assert!("rot13".parse::<CredentialScheme>().is_err());
    }

    #[test]
    fn debug_output_never_contains_password() {
        let rendered = format!("{:?}", creds());
        assert!(!rendered.contains("s3cret"));
    }
}
