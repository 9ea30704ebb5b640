//! Shared types for the HTTP layer.

use std::path::PathBuf;
use std::sync::Arc;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::db;

/// Shared context for all API routes and middleware.
///
/// Holds the store location only. Each request opens its own connection on a
/// blocking worker, so concurrent requests never share a connection and
/// writers serialize on the store's own lock.
#[derive(Clone)]
pub struct ApiContext {
    pub db_path: Arc<PathBuf>,
}

impl ApiContext {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    /// Run `f` against a fresh connection on the blocking thread pool.
    pub async fn with_db<T, F>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = Arc::clone(&self.db_path);
        tokio::task::spawn_blocking(move || {
            let conn = db::open_database(&db_path)?;
            f(&conn)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("database task failed: {e}")))?
    }
}

/// The bearer token the current request was authenticated with.
#[derive(Clone)]
pub struct SessionToken(pub String);
