//! # Alquileres Core
//!
//! Client-side data layer for the alquileres property-listing application.
//!
//! ## Overview
//!
//! - **Session store** holding the bearer token and a stripped user profile
//! - **Credential obfuscation** with three selectable schemes
//! - **Auth session manager** with single-flight silent login
//! - **Authenticated gateway** that re-authenticates once on HTTP 401
//! - **Property source adapters** behind a static registry
//! - **Geocoding** of free-form addresses
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Per-source search adapters (InmouP, MendozaProp) |
//! | [`auth`] | Login, silent login, logout, auth headers |
//! | [`client`] | Composition root |
//! | [`config`] | Environment-driven configuration |
//! | [`credentials`] | Credential schemes and obfuscator |
//! | [`data_source`] | Source trait, filters, records, source errors |
//! | [`error`] | Auth, storage and config errors |
//! | [`gateway`] | Authenticated request gateway |
//! | [`geocoding`] | Address to coordinates |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`registry`] | Source registry |
//! | [`session`] | Session store |
//! | [`source`] | Source identifiers |
//! | [`storage`] | Storage scopes |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / UI       │
//! └────────┬────────┘
//!          │ search(source, filter)
//!          ▼
//! ┌─────────────────┐
//! │ Source Registry │
//! └────────┬────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Property Source │────▶│ Authenticated    │
//! │ (Adapter Trait) │     │ Gateway          │
//! └─────────────────┘     └────────┬─────────┘
//!                                  │ 401 / no token
//!                                  ▼
//!                         ┌──────────────────┐     ┌───────────────┐
//!                         │ Auth Session     │────▶│ Session Store │
//!                         │ Manager          │     └───────────────┘
//!                         └────────┬─────────┘
//!                                  ▼
//!                         ┌──────────────────┐
//!                         │ HTTP Client      │
//!                         └──────────────────┘
//! ```
//!
//! ## Security
//!
//! - Tokens live in the session-lifetime scope only
//! - Only `username` and `disabled` are persisted from the profile
//! - Passwords and tokens are redacted from `Debug` output and never logged

pub mod adapters;
pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod data_source;
pub mod error;
pub mod gateway;
pub mod geocoding;
pub mod http_client;
pub mod registry;
pub mod session;
pub mod source;
pub mod storage;

pub use adapters::{InmoupAdapter, MendozapropAdapter};

pub use auth::{AuthSessionManager, AuthState, LogoutOutcome, TokenResponse};

pub use client::{AlquileresClient, ClientBuilder};

pub use config::{ClientConfig, LoginWaitPolicy};

pub use credentials::{
    CredentialObfuscator, CredentialScheme, Credentials, CsrfContext, EncodedCredentials,
};

pub use data_source::{
    PropertyFilter, PropertyRecord, PropertySource, SearchRequestBody, SourceError,
    SourceErrorKind,
};

pub use error::{AuthError, ConfigError, StorageError};

pub use gateway::AuthenticatedGateway;

pub use geocoding::{Coordinates, Geocoder};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpFuture, HttpMethod, HttpRequest, HttpResponse,
    NoopHttpClient, ReqwestHttpClient,
};

pub use registry::{SourceRegistry, SourceSnapshot};

pub use session::{SessionStore, UserProfile};

pub use source::SourceId;

pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
