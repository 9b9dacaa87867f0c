//! # Backend Selection
//!
//! The storage backend is chosen once, from [`StorageConfig`], and handed to
//! every store as a [`Backend`] value. Stores never inspect which variant
//! they got; they only ask it for a [`Repository`].
//!
//! ```text
//!   StorageConfig::resolve()
//!          │
//!          ├── Local  ──► Database (SQLite) ──► LocalRepository<T>
//!          │
//!          └── Remote ──► RemoteClient + SessionAuth ──► RemoteRepository<T>
//! ```

use std::sync::Arc;

use gym_core::{Entity, Repository};
use gym_store::{Database, StoreConfig};

use crate::auth::SessionAuth;
use crate::config::{BackendKind, ConfigWarning, StorageConfig};
use crate::error::{SyncError, SyncResult};
use crate::logging::Logger;
use crate::remote::{RemoteClient, RemoteRepository};

/// Connected storage backend.
#[derive(Clone)]
pub enum Backend {
    Local {
        db: Database,
        namespace: String,
    },
    Remote {
        client: RemoteClient,
        auth: Arc<SessionAuth>,
        owner_column: String,
    },
}

impl Backend {
    /// Opens the backend the configuration resolves to.
    ///
    /// Returns the fallback warning, if any, alongside the backend.
    pub async fn connect(
        config: &StorageConfig,
        logger: &Logger,
    ) -> SyncResult<(Backend, Option<ConfigWarning>)> {
        let (kind, warning) = config.resolve();
        if let Some(warning) = &warning {
            logger.warn(&warning.to_string());
        }

        let backend = match kind {
            BackendKind::Local => {
                let path = config.database_path();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        SyncError::Storage(format!("cannot create {}: {e}", parent.display()))
                    })?;
                }
                let db = Database::new(StoreConfig::new(path)).await?;
                Backend::local(db, config.namespace())
            }
            BackendKind::Remote => {
                let url = config.remote.url.as_deref().unwrap_or_default();
                let key = config.remote.access_key.as_deref().unwrap_or_default();
                let client = RemoteClient::new(url, key, config.remote.request_timeout())?;
                let auth = Arc::new(SessionAuth::new(client.clone()));
                Backend::remote(client, auth, &config.remote.owner_column)
            }
        };

        logger.info(&format!("Connected to {} storage backend", backend.kind()));
        Ok((backend, warning))
    }

    pub fn local(db: Database, namespace: &str) -> Self {
        Backend::Local {
            db,
            namespace: namespace.to_string(),
        }
    }

    pub fn remote(client: RemoteClient, auth: Arc<SessionAuth>, owner_column: &str) -> Self {
        Backend::Remote {
            client,
            auth,
            owner_column: owner_column.to_string(),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Local { .. } => BackendKind::Local,
            Backend::Remote { .. } => BackendKind::Remote,
        }
    }

    /// Session handle of the remote backend.
    pub fn auth(&self) -> Option<&Arc<SessionAuth>> {
        match self {
            Backend::Local { .. } => None,
            Backend::Remote { auth, .. } => Some(auth),
        }
    }

    /// Repository for the collection of `T`.
    pub fn repository<T: Entity>(&self) -> Arc<dyn Repository<T>> {
        match self {
            Backend::Local { db, namespace } => Arc::new(db.collection::<T>(namespace)),
            Backend::Remote {
                client,
                auth,
                owner_column,
            } => Arc::new(RemoteRepository::<T>::new(
                client.clone(),
                auth.clone(),
                owner_column.clone(),
            )),
        }
    }
}
