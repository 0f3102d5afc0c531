//! Auth session manager: login, silent re-authentication and auth headers.
//!
//! # States
//!
//! | State | Condition |
//! |-------|-----------|
//! | [`AuthState::LoggedOut`] | no token stored, no login running |
//! | [`AuthState::Authenticating`] | a login body is running |
//! | [`AuthState::LoggedIn`] | a token is stored |
//!
//! At most one login body runs per manager. [`AuthSessionManager::silent_login`]
//! callers that arrive while one is running park until it finishes (bounded
//! by [`LoginWaitPolicy`]) and report the resulting state instead of starting
//! a second login.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::{Notify, OnceCell};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{ClientConfig, LoginWaitPolicy};
use crate::credentials::{CredentialObfuscator, Credentials, CsrfContext};
use crate::error::AuthError;
use crate::http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::session::{SessionStore, UserProfile};

pub const TOKEN_PATH: &str = "/token";
pub const PROFILE_PATH: &str = "/users/me";
pub const CSRF_TOKEN_PATH: &str = "/auth/csrf-token";
pub const PUBLIC_KEY_PATH: &str = "/auth/public-key";
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    Authenticating,
    LoggedIn,
}

/// Successful `/token` payload.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Where the caller should send the user after [`AuthSessionManager::logout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutOutcome {
    pub redirect_to: &'static str,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct CsrfTokenResponse {
    csrf_token: String,
}

pub struct AuthSessionManager {
    api_url: String,
    service_credentials: Option<Credentials>,
    login_timeout: Duration,
    login_wait: LoginWaitPolicy,
    obfuscator: CredentialObfuscator,
    http_client: Arc<dyn HttpClient>,
    session: Arc<SessionStore>,
    in_flight: AtomicBool,
    login_finished: Notify,
    encryption_probe: OnceCell<bool>,
}

/// Clears the in-flight flag and wakes waiters on every exit path,
/// including unwinding and cancellation of the login future.
struct LoginGuard<'a> {
    manager: &'a AuthSessionManager,
}

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.manager.in_flight.store(false, Ordering::SeqCst);
        self.manager.login_finished.notify_waiters();
    }
}

impl AuthSessionManager {
    pub fn new(
        config: &ClientConfig,
        http_client: Arc<dyn HttpClient>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            api_url: config.api_url.clone(),
            service_credentials: config.service_credentials.clone(),
            login_timeout: config.login_timeout,
            login_wait: config.login_wait,
            obfuscator: CredentialObfuscator::new(config.credential_scheme),
            http_client,
            session,
            in_flight: AtomicBool::new(false),
            login_finished: Notify::new(),
            encryption_probe: OnceCell::new(),
        }
    }

    pub fn state(&self) -> AuthState {
        if self.login_in_flight() {
            AuthState::Authenticating
        } else if self.is_authenticated() {
            AuthState::LoggedIn
        } else {
            AuthState::LoggedOut
        }
    }

    pub fn login_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// True iff a token is stored. Expiry is only discovered through 401s.
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn token(&self) -> Option<String> {
        match self.session.token() {
            Ok(token) => token.filter(|value| !value.is_empty()),
            Err(error) => {
                warn!(%error, "failed to read session token");
                None
            }
        }
    }

    pub fn auth(&self) -> HttpAuth {
        self.token().map_or(HttpAuth::None, HttpAuth::BearerToken)
    }

    /// `authorization: Bearer <token>` when authenticated, otherwise empty.
    pub fn auth_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        self.auth().apply(&mut headers);
        headers
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        match self.session.user_data() {
            Ok(user) => user,
            Err(error) => {
                warn!(%error, "stored user profile is unreadable");
                None
            }
        }
    }

    /// Logs in with explicit credentials.
    ///
    /// # Errors
    ///
    /// - [`AuthError::LoginInProgress`] if another login body is running
    /// - [`AuthError::Timeout`] if `/token` does not answer within the bound;
    ///   the session is left untouched
    /// - [`AuthError::Rejected`] on a non-2xx `/token` answer
    /// - [`AuthError::Encoding`] if the credentials cannot be encoded
    /// - [`AuthError::ProfileUnavailable`] if `/users/me` fails; the freshly
    ///   stored token is cleared again
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, AuthError> {
        let _guard = self.try_begin_login().ok_or(AuthError::LoginInProgress)?;
        self.perform_login(credentials).await
    }

    /// Best-effort background login with the configured service credentials.
    /// Never fails; the outcome is reported as a boolean.
    pub async fn silent_login(&self) -> bool {
        if self.login_in_flight() {
            return self.wait_for_login().await;
        }

        if self.is_authenticated() {
            return true;
        }

        let Some(_guard) = self.try_begin_login() else {
            return self.wait_for_login().await;
        };

        let Some(credentials) = self.service_credentials.as_ref() else {
            error!("service credentials are not configured; silent login is unavailable");
            return false;
        };

        match self.perform_login(credentials).await {
            Ok(_) => true,
            Err(error) => {
                warn!(%error, "silent login failed");
                false
            }
        }
    }

    /// Re-fetches `/users/me` with the stored token and stores the stripped
    /// profile. On any failure the token is cleared.
    pub async fn fetch_user_info(&self) -> Result<UserProfile, AuthError> {
        let result = self.fetch_profile().await;
        if let Err(error) = &result {
            warn!(%error, "profile fetch failed; clearing token");
            if let Err(clear_error) = self.session.clear_token() {
                error!(error = %clear_error, "failed to clear token after profile failure");
            }
        }
        result
    }

    /// Drops token and profile. Navigation is left to the caller.
    ///
    /// Both removals are attempted; the first failure is returned after
    /// the second has run.
    pub fn logout(&self) -> Result<LogoutOutcome, AuthError> {
        let token = self.session.clear_token();
        let user = self.session.clear_user_data();
        if let Err(error) = &user {
            warn!(%error, "failed to remove stored profile on logout");
        }
        token.and(user)?;
        info!("logged out");
        Ok(LogoutOutcome {
            redirect_to: LOGIN_ROUTE,
        })
    }

    /// Invalidates the stored token, e.g. after a 401.
    pub fn clear_token(&self) -> Result<(), AuthError> {
        self.session.clear_token()?;
        Ok(())
    }

    fn try_begin_login(&self) -> Option<LoginGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| LoginGuard { manager: self })
    }

    async fn wait_for_login(&self) -> bool {
        debug!("login already in flight; waiting for it to finish");
        let wait = async {
            loop {
                let notified = self.login_finished.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if !self.login_in_flight() {
                    break;
                }
                notified.await;
            }
        };

        if tokio::time::timeout(self.login_wait.deadline(), wait)
            .await
            .is_err()
        {
            warn!(
                waited_ms = self.login_wait.deadline().as_millis() as u64,
                "gave up waiting for in-flight login"
            );
        }

        self.is_authenticated()
    }

    async fn perform_login(&self, credentials: &Credentials) -> Result<TokenResponse, AuthError> {
        let started = Instant::now();
        info!(
            username = %credentials.username,
            scheme = %self.obfuscator.scheme(),
            "starting login"
        );

        let csrf = if self.obfuscator.scheme().requires_csrf() {
            Some(self.csrf_context().await?)
        } else {
            None
        };
        let encoded = self.obfuscator.transform(credentials, csrf.as_ref())?;

        let request = HttpRequest::post(self.endpoint(TOKEN_PATH))
            .with_form(encoded.fields())
            .with_timeout_ms(self.login_timeout_ms());
        let response = self.send_bounded(request).await?;

        if !response.is_success() {
            let detail = rejection_detail(&response);
            warn!(status = response.status, %detail, "login rejected");
            return Err(AuthError::Rejected {
                status: response.status,
                detail,
            });
        }

        let token: TokenResponse = response
            .json()
            .map_err(|error| invalid_response(TOKEN_PATH, error.to_string()))?;
        if token.access_token.is_empty() {
            return Err(invalid_response(TOKEN_PATH, "access_token is empty"));
        }

        self.session.set_token(&token.access_token)?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "token stored; fetching profile"
        );

        self.fetch_user_info().await?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "login completed"
        );
        Ok(token)
    }

    async fn fetch_profile(&self) -> Result<UserProfile, AuthError> {
        let token = self.token().ok_or_else(|| {
            AuthError::AuthenticationRequired(String::from("no token stored"))
        })?;

        let request = HttpRequest::get(self.endpoint(PROFILE_PATH))
            .with_auth(&HttpAuth::BearerToken(token))
            .with_timeout_ms(self.login_timeout_ms());
        let response = self.send_bounded(request).await?;

        if !response.is_success() {
            return Err(AuthError::ProfileUnavailable {
                status: response.status,
            });
        }

        let profile: UserProfile = response
            .json()
            .map_err(|error| invalid_response(PROFILE_PATH, error.to_string()))?;
        self.session.set_user_data(&profile)?;
        Ok(profile)
    }

    async fn csrf_context(&self) -> Result<CsrfContext, AuthError> {
        let token = match self.session.csrf_token()? {
            Some(token) if !token.is_empty() => token,
            _ => {
                let token = match self.fetch_csrf_token().await {
                    Some(token) => token,
                    None => {
                        debug!("csrf endpoint unavailable; generating a local token");
                        Uuid::new_v4().simple().to_string()
                    }
                };
                self.session.set_csrf_token(&token)?;
                token
            }
        };

        Ok(CsrfContext {
            token,
            encrypted: self.encryption_available().await,
        })
    }

    async fn fetch_csrf_token(&self) -> Option<String> {
        let request = HttpRequest::get(self.endpoint(CSRF_TOKEN_PATH))
            .with_timeout_ms(self.login_timeout_ms());
        match self.send_bounded(request).await {
            Ok(response) if response.is_success() => response
                .json::<CsrfTokenResponse>()
                .ok()
                .map(|body| body.csrf_token)
                .filter(|token| !token.is_empty()),
            Ok(response) => {
                debug!(status = response.status, "csrf endpoint refused");
                None
            }
            Err(error) => {
                debug!(%error, "csrf endpoint unreachable");
                None
            }
        }
    }

    /// Probes `/auth/public-key` once per manager; failures mean "no".
    async fn encryption_available(&self) -> bool {
        *self
            .encryption_probe
            .get_or_init(|| async {
                let request = HttpRequest::get(self.endpoint(PUBLIC_KEY_PATH))
                    .with_timeout_ms(self.login_timeout_ms());
                let available = matches!(
                    self.send_bounded(request).await,
                    Ok(response) if response.is_success() && !response.body.trim().is_empty()
                );
                debug!(available, "public key probe finished");
                available
            })
            .await
    }

    /// Executes `request`, aborting it once the login timeout elapses.
    async fn send_bounded(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        bounded(self.login_timeout, self.http_client.execute(request)).await
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }

    fn login_timeout_ms(&self) -> u64 {
        u64::try_from(self.login_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl std::fmt::Debug for AuthSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSessionManager")
            .field("api_url", &self.api_url)
            .field("state", &self.state())
            .field("scheme", &self.obfuscator.scheme())
            .finish_non_exhaustive()
    }
}

async fn bounded<F>(limit: Duration, call: F) -> Result<HttpResponse, AuthError>
where
    F: Future<Output = Result<HttpResponse, HttpError>>,
{
    let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
    match tokio::time::timeout(limit, call).await {
        Err(_) => Err(AuthError::Timeout { timeout_ms }),
        Ok(Err(error)) if error.is_timeout() => Err(AuthError::Timeout { timeout_ms }),
        Ok(Err(error)) => Err(AuthError::Transport(error)),
        Ok(Ok(response)) => Ok(response),
    }
}

fn rejection_detail(response: &HttpResponse) -> String {
    match response.json::<ErrorDetail>().ok().and_then(|body| body.detail) {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => detail,
        Some(serde_json::Value::Null) | None => String::from("login failed"),
        Some(other) => other.to_string(),
    }
}

fn invalid_response(endpoint: &str, message: impl Into<String>) -> AuthError {
    AuthError::InvalidResponse {
        endpoint: endpoint.to_owned(),
        message: message.into(),
    }
}
