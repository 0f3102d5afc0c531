//! Property source contract and request/response types.
//!
//! | Type | Role |
//! |------|------|
//! | [`PropertyFilter`] | normalized search input, all fields optional |
//! | [`SearchRequestBody`] | JSON body sent to `POST /api/properties/search` |
//! | [`PropertyRecord`] | one backend listing, kept opaque |
//! | [`PropertySource`] | capability implemented by every adapter |
//! | [`SourceError`] | structured adapter error |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AuthError;
use crate::source::SourceId;

pub const DEFAULT_PROPERTY_TYPE: &str = "Departamentos";

/// Search input. Unset fields fall back to empty province, no cities and
/// [`DEFAULT_PROPERTY_TYPE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilter {
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub cities: Option<Vec<String>>,
    #[serde(default, alias = "property_type")]
    pub property_type: Option<String>,
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_province(mut self, province: impl Into<String>) -> Self {
        self.province = Some(province.into());
        self
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = Some(cities.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into());
        self
    }

    /// Source-tagged body with defaults applied.
    pub fn to_request_body(&self, source: SourceId) -> SearchRequestBody {
        SearchRequestBody {
            source,
            province: self.province.clone().unwrap_or_default(),
            cities: self.cities.clone().unwrap_or_default(),
            property_type: self
                .property_type
                .clone()
                .unwrap_or_else(|| String::from(DEFAULT_PROPERTY_TYPE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequestBody {
    pub source: SourceId,
    pub province: String,
    pub cities: Vec<String>,
    pub property_type: String,
}

/// Backend-defined listing. Only the coordinates are interpreted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyRecord(Value);

impl PropertyRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn latitude(&self) -> Option<f64> {
        self.coordinate(&["latitude", "lat"]).and_then(as_f64)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.coordinate(&["longitude", "lon", "lng"]).and_then(as_f64)
    }

    /// Both coordinates present and non-null.
    pub fn has_coordinates(&self) -> bool {
        self.coordinate(&["latitude", "lat"]).is_some()
            && self.coordinate(&["longitude", "lon", "lng"]).is_some()
    }

    fn coordinate(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .find(|value| !value.is_null())
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    AuthenticationRequired,
    Unavailable,
    UpstreamStatus,
    MalformedResponse,
    UnknownSource,
    InvalidRequest,
}

/// Structured error returned by adapters and the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn authentication_required(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::AuthenticationRequired,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn upstream_status(source: SourceId, status: u16) -> Self {
        Self {
            kind: SourceErrorKind::UpstreamStatus,
            message: format!("{source} search returned HTTP {status}"),
            retryable: status >= 500,
        }
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unknown_source(name: impl AsRef<str>) -> Self {
        Self {
            kind: SourceErrorKind::UnknownSource,
            message: format!("no property source registered for '{}'", name.as_ref()),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::AuthenticationRequired => "source.authentication_required",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::UpstreamStatus => "source.upstream_status",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
            SourceErrorKind::UnknownSource => "source.unknown_source",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<AuthError> for SourceError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Transport(_) | AuthError::Timeout { .. } => {
                Self::unavailable(error.to_string())
            }
            AuthError::Encoding(_) => Self::invalid_request(error.to_string()),
            other => Self::authentication_required(other.to_string()),
        }
    }
}

pub type SearchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<PropertyRecord>, SourceError>> + Send + 'a>>;

/// Capability implemented by every listing source.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl PropertySource for MyAdapter {
///     fn id(&self) -> SourceId {
///         SourceId::Inmoup
///     }
///
///     fn requires_coordinates(&self) -> bool {
///         false
///     }
///
///     fn search_properties<'a>(&'a self, filter: PropertyFilter) -> SearchFuture<'a> {
///         Box::pin(async move { search_backend(&self.gateway, &self.url, self.id(), &filter, false).await })
///     }
/// }
/// ```
pub trait PropertySource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Whether records lacking coordinates are dropped before returning.
    fn requires_coordinates(&self) -> bool;

    /// Searches the source.
    ///
    /// # Errors
    ///
    /// - [`SourceErrorKind::AuthenticationRequired`] if no session could be established
    /// - [`SourceErrorKind::UpstreamStatus`] on a non-2xx answer
    /// - [`SourceErrorKind::MalformedResponse`] if the body is not a JSON array
    fn search_properties<'a>(&'a self, filter: PropertyFilter) -> SearchFuture<'a>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_filter_applies_defaults() {
        let body = PropertyFilter::default().to_request_body(SourceId::Inmoup);

        assert_eq!(
            serde_json::to_value(&body).expect("json"),
            json!({
                "source": "inmoup",
                "province": "",
                "cities": [],
                "property_type": "Departamentos"
            })
        );
    }

    #[test]
    fn filter_accepts_camel_case_input() {
        let filter: PropertyFilter =
            serde_json::from_value(json!({"province": "Mendoza", "propertyType": "Casas"}))
                .expect("filter");

        assert_eq!(filter.province.as_deref(), Some("Mendoza"));
        assert_eq!(filter.property_type.as_deref(), Some("Casas"));
        assert_eq!(filter.cities, None);
    }

    #[test]
    fn coordinates_accept_short_and_long_keys() {
        let short = PropertyRecord::new(json!({"lat": 1, "lon": 2}));
        let long = PropertyRecord::new(json!({"latitude": "-32.89", "longitude": -68.84}));
        let missing = PropertyRecord::new(json!({"lat": null, "lon": null}));
        let half = PropertyRecord::new(json!({"latitude": -32.8}));

        assert!(short.has_coordinates());
        assert_eq!(short.latitude(), Some(1.0));
        assert!(long.has_coordinates());
        assert_eq!(long.latitude(), Some(-32.89));
        assert!(!missing.has_coordinates());
        assert!(!half.has_coordinates());
    }

    #[test]
    fn auth_errors_map_to_source_kinds() {
        let required: SourceError =
            AuthError::AuthenticationRequired(String::from("no session")).into();
        let timeout: SourceError = AuthError::Timeout { timeout_ms: 10 }.into();

        assert_eq!(required.kind(), SourceErrorKind::AuthenticationRequired);
        assert_eq!(timeout.kind(), SourceErrorKind::Unavailable);
        assert!(timeout.retryable());
    }
}
