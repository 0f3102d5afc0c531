//! Session store: bearer token, cached CSRF token and the stripped user profile.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, MemoryStore};

pub const TOKEN_KEY: &str = "alquileres_token";
pub const USER_KEY: &str = "alquileres_user";
pub const CSRF_TOKEN_KEY: &str = "alquileres_csrf_token";

/// The only profile fields ever persisted. Any other field the backend
/// returns is dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub disabled: bool,
}

/// Storage-only view over the two scopes. Holds no auth logic.
pub struct SessionStore {
    session_scope: Arc<dyn KeyValueStore>,
    persistent_scope: Arc<dyn KeyValueStore>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl SessionStore {
    pub fn new(
        session_scope: Arc<dyn KeyValueStore>,
        persistent_scope: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            session_scope,
            persistent_scope,
        }
    }

    /// Both scopes in memory; nothing outlives the process.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.session_scope.set(TOKEN_KEY, token)
    }

    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.session_scope.get(TOKEN_KEY)
    }

    /// Removes the token from both scopes; older builds wrote it to the
    /// long-term scope.
    ///
    /// The session-scope removal always runs. A failing long-term scope is
    /// logged and reported only after the live token is gone.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        let live = self.session_scope.remove(TOKEN_KEY);
        let legacy = self.persistent_scope.remove(TOKEN_KEY);
        if let Err(error) = &legacy {
            warn!(%error, "failed to remove long-term token copy");
        }
        live.and(legacy)
    }

    pub fn set_user_data(&self, user: &UserProfile) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(user).map_err(|source| StorageError::Encode {
            key: USER_KEY.to_owned(),
            source,
        })?;
        self.persistent_scope.set(USER_KEY, &encoded)
    }

    pub fn user_data(&self) -> Result<Option<UserProfile>, StorageError> {
        let Some(raw) = self.persistent_scope.get(USER_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: USER_KEY.to_owned(),
                source,
            })
    }

    pub fn clear_user_data(&self) -> Result<(), StorageError> {
        self.persistent_scope.remove(USER_KEY)
    }

    pub fn csrf_token(&self) -> Result<Option<String>, StorageError> {
        self.session_scope.get(CSRF_TOKEN_KEY)
    }

    pub fn set_csrf_token(&self, token: &str) -> Result<(), StorageError> {
        self.session_scope.set(CSRF_TOKEN_KEY, token)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
