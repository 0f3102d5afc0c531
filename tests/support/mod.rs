//! Scripted in-process backend shared by the behaviour tests.
//!
//! Every request is recorded. The test handler decides the reply per path and
//! per call index; unanswered `/token` and `/users/me` calls fall back to a
//! working login, anything else to 404.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alquileres_core::{
    AlquileresClient, AuthSessionManager, AuthenticatedGateway, ClientBuilder, ClientConfig,
    Credentials, HttpClient, HttpError, HttpFuture, HttpRequest, HttpResponse, LoginWaitPolicy,
    SessionStore,
};

pub const API_URL: &str = "http://api.test";

pub enum Reply {
    Respond(HttpResponse),
    After(Duration, HttpResponse),
    Fail(HttpError),
    Hang,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self::Respond(HttpResponse::new(status, body))
    }
}

type Handler = dyn Fn(&str, usize, &HttpRequest) -> Option<Reply> + Send + Sync;

pub struct ScriptedBackend {
    handler: Box<Handler>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedBackend {
    /// `handler` gets the request path, the zero-based call index for that
    /// path and the request itself.
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&str, usize, &HttpRequest) -> Option<Reply> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Backend that only knows the login routes.
    pub fn login_only() -> Arc<Self> {
        Self::new(|_, _, _| None)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| path_of(&request.url) == path)
            .collect()
    }

    pub fn calls(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }
}

impl HttpClient for ScriptedBackend {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let path = path_of(&request.url);
        let index = {
            let mut requests = self.requests.lock().expect("requests lock");
            let index = requests
                .iter()
                .filter(|seen| path_of(&seen.url) == path)
                .count();
            requests.push(request.clone());
            index
        };

        let reply = (self.handler)(&path, index, &request)
            .or_else(|| login_route(&path, index))
            .unwrap_or_else(|| Reply::json(404, r#"{"detail":"Not Found"}"#));

        Box::pin(async move {
            match reply {
                Reply::Respond(response) => Ok(response),
                Reply::After(delay, response) => {
                    tokio::time::sleep(delay).await;
                    Ok(response)
                }
                Reply::Fail(error) => Err(error),
                Reply::Hang => std::future::pending().await,
            }
        })
    }
}

pub fn path_of(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    without_query
        .strip_prefix(API_URL)
        .unwrap_or(without_query)
        .to_owned()
}

fn login_route(path: &str, index: usize) -> Option<Reply> {
    match path {
        "/token" => Some(Reply::Respond(token_response(&format!("token-{}", index + 1)))),
        "/users/me" => Some(Reply::Respond(profile_response())),
        _ => None,
    }
}

pub fn token_response(token: &str) -> HttpResponse {
    HttpResponse::ok_json(format!(
        r#"{{"access_token":"{token}","token_type":"bearer"}}"#
    ))
}

pub fn profile_response() -> HttpResponse {
    HttpResponse::ok_json(
        r#"{"username":"api","email":"api@example.com","full_name":"Service","disabled":false,"hashed_password":"$2b$12$secret"}"#,
    )
}

pub fn config() -> ClientConfig {
    ClientConfig::default()
        .with_api_url(API_URL)
        .with_service_credentials(Credentials::new("api", "s3cret"))
        .with_login_timeout(Duration::from_secs(2))
        .with_login_wait(LoginWaitPolicy {
            interval: Duration::from_millis(10),
            max_attempts: 200,
        })
}

pub fn manager(
    backend: &Arc<ScriptedBackend>,
    config: &ClientConfig,
    session: Arc<SessionStore>,
) -> Arc<AuthSessionManager> {
    Arc::new(AuthSessionManager::new(config, backend.clone(), session))
}

pub fn gateway(backend: &Arc<ScriptedBackend>, config: &ClientConfig) -> AuthenticatedGateway {
    let auth = manager(backend, config, Arc::new(SessionStore::in_memory()));
    AuthenticatedGateway::new(auth, backend.clone())
}

pub fn client(backend: &Arc<ScriptedBackend>, config: ClientConfig) -> AlquileresClient {
    ClientBuilder::new(config)
        .with_http_client(backend.clone())
        .build()
        .expect("valid test config")
}
