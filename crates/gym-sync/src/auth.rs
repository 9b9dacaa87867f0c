//! # Session Authentication
//!
//! Resolves the signed-in identity the remote backend scopes rows by.
//!
//! ## Resolution Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  current_identity()                                                     │
//! │       │                                                                 │
//! │       ├── no session token ──────────────► RepoError::Auth (no request) │
//! │       │                                                                 │
//! │       ├── identity cached ───────────────► Identity                     │
//! │       │                                                                 │
//! │       └── GET {endpoint}/auth/v1/user                                   │
//! │              ├── 200 {"id": ...} ─► cache ► Identity                    │
//! │              └── 401 / 403 ──────────────► RepoError::Auth              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Signing in is the application's job; this module only receives the
//! resulting access token through [`SessionAuth::set_access_token`].

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use gym_core::{RepoError, RepoResult};

use crate::remote::RemoteClient;

/// Message of the error returned when no identity can be resolved.
pub const UNAUTHENTICATED: &str = "User must be authenticated to access data";

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
}

/// Source of the caller's identity for remote requests.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the signed-in identity or fails with [`RepoError::Auth`].
    async fn current_identity(&self) -> RepoResult<Identity>;

    /// Bearer token for read requests, if a session exists.
    async fn access_token(&self) -> Option<String>;
}

#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

/// Identity provider backed by the service's auth endpoint.
pub struct SessionAuth {
    client: RemoteClient,
    session: RwLock<Option<Session>>,
}

impl SessionAuth {
    pub fn new(client: RemoteClient) -> Self {
        SessionAuth {
            client,
            session: RwLock::new(None),
        }
    }

    /// Installs the access token of a freshly signed-in session.
    pub async fn set_access_token(&self, access_token: impl Into<String>) {
        *self.session.write().await = Some(Session {
            access_token: access_token.into(),
            user_id: None,
        });
        debug!("Session token installed");
    }

    pub async fn sign_out(&self) {
        *self.session.write().await = None;
        info!("Signed out");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_some()
    }

    async fn fetch_user(&self, access_token: &str) -> RepoResult<String> {
        let response = self
            .client
            .http()
            .get(self.client.url("auth/v1/user"))
            .header("apikey", self.client.api_key())
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| RepoError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(RepoError::Auth(UNAUTHENTICATED.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RepoError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| RepoError::Serialization(e.to_string()))?;
        Ok(user.id)
    }
}

#[async_trait]
impl IdentityProvider for SessionAuth {
    async fn current_identity(&self) -> RepoResult<Identity> {
        let access_token = {
            let guard = self.session.read().await;
            match guard.as_ref() {
                None => return Err(RepoError::Auth(UNAUTHENTICATED.to_string())),
                Some(Session {
                    access_token,
                    user_id: Some(user_id),
                }) => {
                    return Ok(Identity {
                        user_id: user_id.clone(),
                        access_token: access_token.clone(),
                    })
                }
                Some(session) => session.access_token.clone(),
            }
        };

        let user_id = self.fetch_user(&access_token).await?;

        // Only cache if the session was not replaced while the request ran.
        let mut guard = self.session.write().await;
        if let Some(session) = guard.as_mut() {
            if session.access_token == access_token {
                session.user_id = Some(user_id.clone());
            }
        }
        debug!(user_id = %user_id, "Resolved identity");

        Ok(Identity {
            user_id,
            access_token,
        })
    }

    async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
    }
}
