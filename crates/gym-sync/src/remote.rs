//! # Remote Repository
//!
//! [`Repository`] over a REST-fronted relational service: one table per
//! collection, snake_case columns, rows scoped by an ownership column the
//! service enforces.
//!
//! ## Request Mapping
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ Operation        │ Request (all under {endpoint}/rest/v1/{table})       │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ get_all          │ GET    ?select=*&order=created_at.desc               │
//! │ get_by_id        │ GET    ?select=*&id=eq.{id}                          │
//! │ create           │ POST   [row + owner]          (identity required)    │
//! │ batch_create     │ POST   [rows + owner]         (identity required)    │
//! │ update           │ PATCH  ?id=eq.{id}            (identity required)    │
//! │ delete           │ DELETE ?id=eq.{id}            (identity required)    │
//! │ batch_delete     │ DELETE ?id=in.({ids})         (identity required)    │
//! │ clear            │ DELETE ?{owner}=eq.{user_id}  (identity required)    │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! Every request carries the `apikey` header; writes use the caller's bearer
//! token, reads fall back to the API key when no session exists. Writes ask
//! for `Prefer: return=representation` so the stored row comes back.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use gym_core::naming::FieldMap;
use gym_core::{Entity, RepoError, RepoResult, Repository};

use crate::auth::IdentityProvider;
use crate::error::{SyncError, SyncResult};

// =============================================================================
// HTTP Client
// =============================================================================

/// Shared HTTP connection settings for one service endpoint.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: Client,
    endpoint: Arc<str>,
    api_key: Arc<str>,
}

impl RemoteClient {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> SyncResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(RemoteClient {
            http,
            endpoint: Arc::from(endpoint.trim_end_matches('/')),
            api_key: Arc::from(api_key),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Absolute URL for a path relative to the endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

// =============================================================================
// Remote Repository
// =============================================================================

/// Repository for one collection in the remote service.
pub struct RemoteRepository<T> {
    client: RemoteClient,
    identity: Arc<dyn IdentityProvider>,
    owner_column: String,
    fields: Arc<FieldMap>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> RemoteRepository<T> {
    pub fn new(
        client: RemoteClient,
        identity: Arc<dyn IdentityProvider>,
        owner_column: impl Into<String>,
    ) -> Self {
        RemoteRepository {
            client,
            identity,
            owner_column: owner_column.into(),
            fields: FieldMap::for_entity::<T>(),
            _entity: PhantomData,
        }
    }

    fn table_url(&self) -> String {
        self.client.url(&format!("rest/v1/{}", T::KIND.table_name()))
    }

    /// Read request, authorized with the session token if there is one.
    async fn read(&self) -> RequestBuilder {
        let bearer = match self.identity.access_token().await {
            Some(token) => token,
            None => self.client.api_key().to_string(),
        };
        self.client
            .http()
            .get(self.table_url())
            .header("apikey", self.client.api_key())
            .bearer_auth(bearer)
            .query(&[("select", "*")])
    }

    fn write(&self, method: reqwest::Method, access_token: &str) -> RequestBuilder {
        self.client
            .http()
            .request(method, self.table_url())
            .header("apikey", self.client.api_key())
            .header("Prefer", "return=representation")
            .bearer_auth(access_token)
    }

    fn encode(&self, item: &T, owner: Option<&str>) -> RepoResult<Value> {
        let mut row = self.fields.encode_row(serde_json::to_value(item)?);
        if let (Some(owner), Value::Object(map)) = (owner, &mut row) {
            map.insert(self.owner_column.clone(), Value::String(owner.to_string()));
        }
        Ok(row)
    }

    fn decode(&self, rows: Vec<Value>) -> RepoResult<Vec<T>> {
        rows.into_iter()
            .map(|row| -> RepoResult<T> {
                Ok(serde_json::from_value(self.fields.decode_row(row))?)
            })
            .collect()
    }

    async fn rows(&self, request: RequestBuilder) -> RepoResult<Vec<T>> {
        let response = send(request).await?;
        let rows: Vec<Value> = response
            .json()
            .await
            .map_err(|e| RepoError::Serialization(e.to_string()))?;
        self.decode(rows)
    }
}

async fn send(request: RequestBuilder) -> RepoResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| RepoError::Network(e.to_string()))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RepoError::Auth(message)),
        _ => Err(RepoError::Rejected {
            status: status.as_u16(),
            message,
        }),
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for RemoteRepository<T> {
    async fn get_all(&self) -> RepoResult<Vec<T>> {
        let request = self.read().await.query(&[("order", "created_at.desc")]);
        let items = self.rows(request).await?;
        debug!(table = T::KIND.table_name(), count = items.len(), "Fetched rows");
        Ok(items)
    }

    async fn get_by_id(&self, id: &str) -> RepoResult<Option<T>> {
        let request = self.read().await.query(&[("id", format!("eq.{id}"))]);
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn create(&self, item: &T) -> RepoResult<T> {
        let identity = self.identity.current_identity().await?;
        let row = self.encode(item, Some(&identity.user_id))?;

        let request = self
            .write(reqwest::Method::POST, &identity.access_token)
            .json(&[row]);
        let created = self.rows(request).await?.into_iter().next();

        debug!(table = T::KIND.table_name(), id = %item.id(), "Inserted row");
        created.ok_or_else(|| RepoError::Rejected {
            status: 200,
            message: "insert returned no row".into(),
        })
    }

    async fn update(&self, id: &str, item: &T) -> RepoResult<T> {
        let identity = self.identity.current_identity().await?;
        let row = self.encode(item, None)?;

        let request = self
            .write(reqwest::Method::PATCH, &identity.access_token)
            .query(&[("id", format!("eq.{id}"))])
            .json(&row);

        // Rows owned by someone else are invisible, so an empty result is
        // indistinguishable from a missing id.
        let updated = self.rows(request).await?.into_iter().next();
        debug!(table = T::KIND.table_name(), id = %id, "Updated row");
        updated.ok_or_else(|| RepoError::not_found(T::KIND.collection_name(), id))
    }

    async fn delete(&self, id: &str) -> RepoResult<()> {
        let identity = self.identity.current_identity().await?;
        let request = self
            .write(reqwest::Method::DELETE, &identity.access_token)
            .query(&[("id", format!("eq.{id}"))]);
        send(request).await?;
        debug!(table = T::KIND.table_name(), id = %id, "Deleted row");
        Ok(())
    }

    async fn clear(&self) -> RepoResult<()> {
        let identity = self.identity.current_identity().await?;
        let request = self
            .write(reqwest::Method::DELETE, &identity.access_token)
            .query(&[(self.owner_column.as_str(), format!("eq.{}", identity.user_id))]);
        send(request).await?;
        debug!(table = T::KIND.table_name(), "Cleared rows");
        Ok(())
    }

    async fn batch_create(&self, items: &[T]) -> RepoResult<Vec<T>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let identity = self.identity.current_identity().await?;
        let rows = items
            .iter()
            .map(|item| self.encode(item, Some(&identity.user_id)))
            .collect::<RepoResult<Vec<_>>>()?;

        let request = self
            .write(reqwest::Method::POST, &identity.access_token)
            .json(&rows);
        let created = self.rows(request).await?;
        debug!(table = T::KIND.table_name(), count = created.len(), "Inserted rows");
        Ok(created)
    }

    async fn batch_delete(&self, ids: &[String]) -> RepoResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let identity = self.identity.current_identity().await?;
        let request = self
            .write(reqwest::Method::DELETE, &identity.access_token)
            .query(&[("id", format!("in.({})", ids.join(",")))]);
        send(request).await?;
        debug!(table = T::KIND.table_name(), count = ids.len(), "Deleted rows");
        Ok(())
    }
}
