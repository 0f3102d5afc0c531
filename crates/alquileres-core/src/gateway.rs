//! Authenticated request gateway.
//!
//! Every backend call made by a property source goes through
//! [`AuthenticatedGateway::execute`]:
//!
//! 1. no token: run a silent login first, fail with
//!    [`AuthError::AuthenticationRequired`] if it does not succeed
//! 2. send the request with auth headers (caller headers win)
//! 3. on 401: clear the token, silent login again, retry exactly once
//! 4. any other status, including a second 401, goes back to the caller

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::AuthSessionManager;
use crate::error::AuthError;
use crate::http_client::{HttpClient, HttpRequest, HttpResponse};

#[derive(Clone)]
pub struct AuthenticatedGateway {
    auth: Arc<AuthSessionManager>,
    http_client: Arc<dyn HttpClient>,
}

impl AuthenticatedGateway {
    pub fn new(auth: Arc<AuthSessionManager>, http_client: Arc<dyn HttpClient>) -> Self {
        Self { auth, http_client }
    }

    pub fn auth(&self) -> &Arc<AuthSessionManager> {
        &self.auth
    }

    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        if !self.auth.is_authenticated() && !self.auth.silent_login().await {
            return Err(AuthError::AuthenticationRequired(String::from(
                "automatic login failed",
            )));
        }

        let response = self.http_client.execute(self.authorize(&request)).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        warn!(method = %request.method, url = %request.url, "backend answered 401; re-authenticating");
        if let Err(error) = self.auth.clear_token() {
            warn!(%error, "token invalidation was incomplete; re-authenticating anyway");
        }

        if !self.auth.silent_login().await {
            return Err(AuthError::AuthenticationRequired(String::from(
                "re-authentication after 401 failed",
            )));
        }

        let retried = self.http_client.execute(self.authorize(&request)).await?;
        if retried.is_unauthorized() {
            warn!(url = %request.url, "still unauthorized after retry; not retrying again");
        } else {
            debug!(url = %request.url, status = retried.status, "retry after re-authentication succeeded");
        }
        Ok(retried)
    }

    pub async fn get(&self, url: impl Into<String>) -> Result<HttpResponse, AuthError> {
        self.execute(HttpRequest::get(url)).await
    }

    pub async fn post_json<T: Serialize>(
        &self,
        url: impl Into<String>,
        body: &T,
    ) -> Result<HttpResponse, AuthError> {
        let request = HttpRequest::post(url)
            .with_json(body)
            .map_err(|error| AuthError::Encoding(error.to_string()))?;
        self.execute(request).await
    }

    /// Auth headers computed now, JSON content type for bodies, then the
    /// caller's own headers on top.
    fn authorize(&self, request: &HttpRequest) -> HttpRequest {
        let mut headers = self.auth.auth_headers();
        if request.body.is_some() {
            headers.insert(
                String::from("content-type"),
                String::from("application/json"),
            );
        }
        headers.extend(
            request
                .headers
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.clone())),
        );

        HttpRequest {
            headers,
            ..request.clone()
        }
    }
}

impl std::fmt::Debug for AuthenticatedGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedGateway")
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}
